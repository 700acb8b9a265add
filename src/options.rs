use clap::{Parser, Subcommand};

use crate::solax::Serial;

/// Solax reads data from a Solax X1 inverter over RS485.
///
/// Register an inverter once with `find` followed by `register`, then read
/// it with `info` or `deviceinfo`.
#[derive(Debug, Parser)]
#[clap(name = "solax", author, version)]
pub struct Options {
    /// Config file to read; missing file means defaults
    #[clap(short = 'c', long = "config", global = true, default_value = "config.yaml")]
    pub config_file: String,

    /// Serial device for communication
    #[clap(short = 'd', long = "device", global = true)]
    pub device: Option<String>,

    /// Bus address of the inverter (1..255). Without it, info and
    /// deviceinfo poll every enabled inverter in the config file
    #[clap(short = 'a', long = "address", global = true)]
    pub address: Option<u16>,

    /// Output results as JSON
    #[clap(short = 'j', long = "json", global = true)]
    pub json: bool,

    /// Log at debug level and print the raw response
    #[clap(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Subcommands,
}

#[derive(Debug, Subcommand)]
pub enum Subcommands {
    /// Finds the next unregistered inverter on the bus
    Find,
    /// Register an inverter
    Register {
        /// Inverter serial, hex
        #[clap(short = 's', long = "serial")]
        serial: Serial,
    },
    /// Remove the registration from an inverter
    Unregister {
        /// Inverter serial, hex; looked up in the config file by address if omitted
        #[clap(short = 's', long = "serial")]
        serial: Option<Serial>,
    },
    /// Get real-time inverter information
    Info,
    /// Get inverter device details
    #[clap(name = "deviceinfo")]
    DeviceInfo,
}

impl Options {
    pub fn new() -> Self {
        Self::parse()
    }
}
