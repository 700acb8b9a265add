use crate::prelude::*;

use serde::Serialize;
use std::ops::Range;

pub const DEVICE_INFO_MIN_LEN: usize = 67;

const PHASE: usize = 9;
const RATED_POWER: Range<usize> = 10..16;
const FIRMWARE_VERSION: Range<usize> = 16..21;
const MODULE_NAME: Range<usize> = 21..35;
const FACTORY_NAME: Range<usize> = 35..49;
const SERIAL_NUMBER: Range<usize> = 49..63;
const RATED_BUS_VOLTAGE: Range<usize> = 63..67;

/// Static inverter details. Text fields are fixed-width ASCII, with
/// padding trimmed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub phase: u8,
    pub rated_power: String,
    pub firmware_version: String,
    pub module_name: String,
    pub factory_name: String,
    pub serial_number: String,
    pub rated_bus_voltage: String,
}

impl DeviceInfo {
    pub fn from_payload(data: &[u8]) -> Result<Self> {
        if data.len() < DEVICE_INFO_MIN_LEN {
            return Err(Error::PayloadTooShort {
                minimum: DEVICE_INFO_MIN_LEN,
                actual: data.len(),
            });
        }

        Ok(Self {
            phase: Self::byte(data, PHASE)?,
            rated_power: Self::text(data, RATED_POWER)?,
            firmware_version: Self::text(data, FIRMWARE_VERSION)?,
            module_name: Self::text(data, MODULE_NAME)?,
            factory_name: Self::text(data, FACTORY_NAME)?,
            serial_number: Self::text(data, SERIAL_NUMBER)?,
            rated_bus_voltage: Self::text(data, RATED_BUS_VOLTAGE)?,
        })
    }

    fn byte(data: &[u8], offset: usize) -> Result<u8> {
        data.get(offset).copied().ok_or(Error::PayloadTooShort {
            minimum: offset + 1,
            actual: data.len(),
        })
    }

    fn text(data: &[u8], range: Range<usize>) -> Result<String> {
        let end = range.end;
        let bytes = data.get(range).ok_or(Error::PayloadTooShort {
            minimum: end,
            actual: data.len(),
        })?;

        Ok(String::from_utf8_lossy(bytes)
            .trim_end_matches(|c: char| c == '\0' || c == ' ')
            .to_string())
    }
}
