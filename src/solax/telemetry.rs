use crate::prelude::*;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;

pub const TELEMETRY_LEN: usize = 50;

// {{{ TelemetryPayload
/// Borrowed view over a telemetry payload with one accessor per field.
/// Every accessor is bounds-checked against the underlying bytes.
pub struct TelemetryPayload<'a>(&'a [u8]);

macro_rules! u16_fields {
    ($($name:ident = $offset:expr),* $(,)?) => {
        $(
            pub fn $name(&self) -> Result<u16> {
                self.u16_at($offset)
            }
        )*
    };
}

macro_rules! u32_fields {
    ($($name:ident = $offset:expr),* $(,)?) => {
        $(
            pub fn $name(&self) -> Result<u32> {
                self.u32_at($offset)
            }
        )*
    };
}

impl<'a> TelemetryPayload<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() != TELEMETRY_LEN {
            return Err(Error::UnexpectedPayloadLength {
                expected: TELEMETRY_LEN,
                actual: data.len(),
            });
        }
        Ok(Self(data))
    }

    fn u16_at(&self, offset: usize) -> Result<u16> {
        Utils::u16_at(self.0, offset).ok_or(Error::PayloadTooShort {
            minimum: offset + 2,
            actual: self.0.len(),
        })
    }

    fn u32_at(&self, offset: usize) -> Result<u32> {
        Utils::u32_at(self.0, offset).ok_or(Error::PayloadTooShort {
            minimum: offset + 4,
            actual: self.0.len(),
        })
    }

    u16_fields! {
        temperature = 0,
        energy_today = 2,
        pv1_voltage = 4,
        pv2_voltage = 6,
        pv1_current = 8,
        pv2_current = 10,
        ac_current = 12,
        ac_voltage = 14,
        frequency = 16,
        power = 18,
        // 20..22 unused
        mode = 30,
        grid_voltage_fault = 32,
        grid_frequency_fault = 34,
        dc_injection_fault = 36,
        temperature_fault = 38,
        pv1_voltage_fault = 40,
        pv2_voltage_fault = 42,
        gfc_fault = 44,
    }

    u32_fields! {
        energy_total = 22,
        elapsed_hours = 26,
        fault_code = 46,
    }
}
// }}}

// {{{ RawTelemetry
/// Telemetry exactly as reported, before any scaling.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RawTelemetry {
    pub temperature: u16,          // °C
    pub energy_today: u16,         // 0.1 kWh
    pub pv1_voltage: u16,          // 0.1 V
    pub pv2_voltage: u16,          // 0.1 V
    pub pv1_current: u16,          // 0.1 A
    pub pv2_current: u16,          // 0.1 A
    pub ac_current: u16,           // 0.1 A
    pub ac_voltage: u16,           // 0.1 V
    pub frequency: u16,            // 0.01 Hz
    pub power: u16,                // W
    pub energy_total: u32,         // 0.1 kWh
    pub elapsed_hours: u32,        // h
    pub mode: u16,
    pub grid_voltage_fault: u16,   // 0.1 V
    pub grid_frequency_fault: u16, // 0.01 Hz
    pub dc_injection_fault: u16,   // mA
    pub temperature_fault: u16,
    pub pv1_voltage_fault: u16,    // 0.1 V
    pub pv2_voltage_fault: u16,    // 0.1 V
    pub gfc_fault: u16,            // mA
    pub fault_code: u32,           // bitmask, see FAULT_NAMES
}

impl RawTelemetry {
    pub fn from_payload(data: &[u8]) -> Result<Self> {
        let p = TelemetryPayload::new(data)?;

        Ok(Self {
            temperature: p.temperature()?,
            energy_today: p.energy_today()?,
            pv1_voltage: p.pv1_voltage()?,
            pv2_voltage: p.pv2_voltage()?,
            pv1_current: p.pv1_current()?,
            pv2_current: p.pv2_current()?,
            ac_current: p.ac_current()?,
            ac_voltage: p.ac_voltage()?,
            frequency: p.frequency()?,
            power: p.power()?,
            energy_total: p.energy_total()?,
            elapsed_hours: p.elapsed_hours()?,
            mode: p.mode()?,
            grid_voltage_fault: p.grid_voltage_fault()?,
            grid_frequency_fault: p.grid_frequency_fault()?,
            dc_injection_fault: p.dc_injection_fault()?,
            temperature_fault: p.temperature_fault()?,
            pv1_voltage_fault: p.pv1_voltage_fault()?,
            pv2_voltage_fault: p.pv2_voltage_fault()?,
            gfc_fault: p.gfc_fault()?,
            fault_code: p.fault_code()?,
        })
    }
}
// }}}

// {{{ OperatingMode
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum OperatingMode {
    Wait = 0,
    Check = 1,
    Normal = 2,
    Fault = 3,
    PermanentFault = 4,
    Update = 5,
    Selftest = 6,
}

impl OperatingMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Wait => "Wait",
            Self::Check => "Check",
            Self::Normal => "Normal",
            Self::Fault => "Fault",
            Self::PermanentFault => "Permanent Fault",
            Self::Update => "Update",
            Self::Selftest => "Selftest",
        }
    }

    /// Name for a raw mode code; codes outside the known set stay visible.
    pub fn describe(code: u16) -> String {
        match Self::try_from(code) {
            Ok(mode) => mode.name().to_string(),
            Err(_) => format!("Unknown({})", code),
        }
    }
}
// }}}

// {{{ FaultCodes
/// Fault names indexed from the most significant bit: entry `i` names bit `31 - i`.
/// Placeholder entries are reserved bits.
pub const FAULT_NAMES: [&str; 32] = [
    // byte 0
    "TzProtectFault",
    "MainsLostFault",
    "GridVoltFault",
    "GridFreqFault",
    "PLLLostFault",
    "BusVoltFault",
    "BIT06",
    "OciFault",
    // byte 1
    "Dci_OCP_Fault",
    "ResidualCurrentFault",
    "PvVoltFault",
    "Ac10Mins_Voltage_Fault",
    "IsolationFault",
    "TemperatureOverFault",
    "FanFault",
    "bit15",
    // byte 2
    "SpiCommsFault",
    "SciCommsFault",
    "BIT18",
    "InputConfigFault",
    "EepromFault",
    "RelayFault",
    "SampleConsistenceFault",
    "ResidualCurrent_DeviceFault",
    // byte 3
    "BIT24",
    "BIT25",
    "BIT26",
    "BIT27",
    "BIT28",
    "DCI_DeviceFault",
    "OtherDeviceFault",
    "BIT31",
];

pub struct FaultCodes;
impl FaultCodes {
    /// Names of every set bit, from bit 31 down to bit 0.
    pub fn from_value(value: u32) -> Vec<&'static str> {
        FAULT_NAMES
            .iter()
            .enumerate()
            .filter(|(i, _)| value & (1 << (31 - i)) != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}
// }}}

// {{{ Telemetry
/// Telemetry in physical units.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Telemetry {
    pub temperature: u16,           // °C
    pub energy_today: f64,          // kWh
    pub pv1_voltage: f64,           // V
    pub pv2_voltage: f64,           // V
    pub pv1_current: f64,           // A
    pub pv2_current: f64,           // A
    pub ac_current: f64,            // A
    pub ac_voltage: f64,            // V
    pub frequency: f64,             // Hz
    pub power: u16,                 // W
    pub energy_total: f64,          // kWh
    pub elapsed_hours: u32,         // h
    pub mode_code: u16,
    pub mode: String,
    pub grid_voltage_fault: f64,    // V
    pub grid_frequency_fault: f64,  // Hz
    pub dc_injection_fault: f64,    // A
    pub temperature_fault: f64,
    pub pv1_voltage_fault: f64,     // V
    pub pv2_voltage_fault: f64,     // V
    pub gfc_fault: f64,             // A
    pub faults: Vec<String>,
}

fn div10(v: impl Into<f64>) -> f64 {
    v.into() / 10.0
}

fn div100(v: impl Into<f64>) -> f64 {
    v.into() / 100.0
}

fn div1000(v: impl Into<f64>) -> f64 {
    v.into() / 1000.0
}

pub fn normalize(raw: &RawTelemetry) -> Telemetry {
    Telemetry {
        temperature: raw.temperature,
        energy_today: div10(raw.energy_today),
        pv1_voltage: div10(raw.pv1_voltage),
        pv2_voltage: div10(raw.pv2_voltage),
        pv1_current: div10(raw.pv1_current),
        pv2_current: div10(raw.pv2_current),
        ac_current: div10(raw.ac_current),
        ac_voltage: div10(raw.ac_voltage),
        frequency: div100(raw.frequency),
        power: raw.power,
        energy_total: div10(raw.energy_total),
        elapsed_hours: raw.elapsed_hours,
        mode_code: raw.mode,
        mode: OperatingMode::describe(raw.mode),
        grid_voltage_fault: div10(raw.grid_voltage_fault),
        grid_frequency_fault: div100(raw.grid_frequency_fault),
        dc_injection_fault: div1000(raw.dc_injection_fault),
        temperature_fault: f64::from(raw.temperature_fault),
        pv1_voltage_fault: div10(raw.pv1_voltage_fault),
        pv2_voltage_fault: div10(raw.pv2_voltage_fault),
        gfc_fault: div1000(raw.gfc_fault),
        faults: FaultCodes::from_value(raw.fault_code)
            .into_iter()
            .map(String::from)
            .collect(),
    }
}

impl From<&RawTelemetry> for Telemetry {
    fn from(raw: &RawTelemetry) -> Self {
        normalize(raw)
    }
}
// }}}
