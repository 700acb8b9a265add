use crate::prelude::*;

use chrono::{DateTime, Local};
use prettytable::{format, row, Table};
use serde::Serialize;

pub struct Output;

impl Output {
    pub fn json<T: Serialize>(value: &T) -> anyhow::Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(row!["Parameter", "Value", "Unit"]);
        table
    }

    pub fn telemetry_table(t: &Telemetry, updated: DateTime<Local>) -> Table {
        let mut table = Self::table();

        table.add_row(row!["Temperature", t.temperature, "Celsius"]);
        table.add_row(row!["EnergyToday", format!("{:.1}", t.energy_today), "kWh"]);
        table.add_row(row!["Vpv1", format!("{:.1}", t.pv1_voltage), "Volt"]);
        table.add_row(row!["Vpv2", format!("{:.1}", t.pv2_voltage), "Volt"]);
        table.add_row(row!["Apv1", format!("{:.1}", t.pv1_current), "Ampere"]);
        table.add_row(row!["Apv2", format!("{:.1}", t.pv2_current), "Ampere"]);
        table.add_row(row!["Iac", format!("{:.1}", t.ac_current), "Ampere"]);
        table.add_row(row!["Vac", format!("{:.1}", t.ac_voltage), "Volt"]);
        table.add_row(row!["Frequency", format!("{:.2}", t.frequency), "Hz"]);
        table.add_row(row!["Power", t.power, "W"]);
        table.add_row(row!["EnergyTotal", format!("{:.1}", t.energy_total), "kWh"]);
        table.add_row(row!["TimeTotal", t.elapsed_hours, "Hours"]);
        table.add_row(row!["Mode", format!("{} - {}", t.mode_code, t.mode), "-"]);
        table.add_row(row!["GridVoltFault", format!("{:.1}", t.grid_voltage_fault), "Volt"]);
        table.add_row(row!["GridFreqFault", format!("{:.2}", t.grid_frequency_fault), "Hz"]);
        table.add_row(row!["DCIFault", format!("{:.3}", t.dc_injection_fault), "A"]);
        table.add_row(row!["TemperatureFault", format!("{:.2}", t.temperature_fault), "-"]);
        table.add_row(row!["PV1Fault", format!("{:.1}", t.pv1_voltage_fault), "Volt"]);
        table.add_row(row!["PV2Fault", format!("{:.1}", t.pv2_voltage_fault), "Volt"]);
        table.add_row(row!["GFCFault", format!("{:.3}", t.gfc_fault), "A"]);
        table.add_row(row!["ErrMessage", t.faults.join(", "), "-"]);
        table.add_row(row!["Last update", updated.format("%Y-%m-%d %H:%M:%S"), ""]);

        table
    }

    pub fn device_info_table(info: &DeviceInfo) -> Table {
        let mut table = Self::table();

        table.add_row(row!["Phase", info.phase, "-"]);
        table.add_row(row!["RatedPower", info.rated_power, "W"]);
        table.add_row(row!["FirmwareVersion", info.firmware_version, "-"]);
        table.add_row(row!["ModuleName", info.module_name, "-"]);
        table.add_row(row!["FactoryName", info.factory_name, "-"]);
        table.add_row(row!["SerialNumber", info.serial_number, "-"]);
        table.add_row(row!["RatedBusVoltage", info.rated_bus_voltage, "V"]);

        table
    }
}
