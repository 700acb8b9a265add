pub use std::str::FromStr;

pub use anyhow::{anyhow, bail};
pub use log::{debug, error, info, trace, warn};

pub use crate::config::{self, Config, ConfigWrapper};
pub use crate::error::{Error, ErrorCategory, Result};
pub use crate::options::Options;
pub use crate::utils::Utils;

pub use crate::solax::{
    catalog::{Exchange, MessageCommon, Request},
    client::{Client, TransactionState},
    device_info::DeviceInfo,
    inverter::{Inverter, Serial},
    packet::{ControlCode, Packet},
    telemetry::{normalize, FaultCodes, OperatingMode, RawTelemetry, Telemetry},
    transport::{SerialTransport, Transport},
};
