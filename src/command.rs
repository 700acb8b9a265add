use crate::prelude::*;

use anyhow::{Context, Result};

use crate::options::Subcommands;
use crate::output::Output;

/// Smallest serial `register` accepts.
pub const MIN_SERIAL_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Find,
    Register(Serial, u8),
    Unregister(Serial, u8),
    Info(Vec<u8>),
    DeviceInfo(Vec<u8>),
}

impl Command {
    /// Validates the command line against the config; nothing touches the
    /// bus until this passes.
    pub fn from_options(options: &Options, config: &ConfigWrapper) -> Result<Self> {
        use Subcommands::*;

        let address = options.address;

        match &options.command {
            Find => Ok(Command::Find),
            Register { serial } => {
                let address = Self::registration_address(address)?;
                if serial.len() < MIN_SERIAL_LEN {
                    bail!("You need to provide a valid serial (at least {} bytes)", MIN_SERIAL_LEN);
                }
                Ok(Command::Register(serial.clone(), address))
            }
            Unregister { serial } => {
                let address = Self::registration_address(address)?;
                let serial = match serial {
                    Some(serial) => serial.clone(),
                    None => config
                        .inverter_with_address(address)
                        .and_then(|i| i.serial().cloned())
                        .ok_or_else(|| {
                            anyhow!("No serial for address {}: use --serial or list it under inverters in the config", address)
                        })?,
                };
                Ok(Command::Unregister(serial, address))
            }
            Info => Ok(Command::Info(Self::query_addresses(address, config)?)),
            DeviceInfo => Ok(Command::DeviceInfo(Self::query_addresses(address, config)?)),
        }
    }

    fn registration_address(address: Option<u16>) -> Result<u8> {
        let Some(address) = address else {
            bail!("Address must be given with --address (1-255)");
        };
        match u8::try_from(address) {
            Ok(a) if a >= 1 => Ok(a),
            _ => bail!("Address must be between 1-255, got {}", address),
        }
    }

    /// An explicit address wins; otherwise every enabled configured inverter,
    /// falling back to 0 when none are configured.
    fn query_addresses(address: Option<u16>, config: &ConfigWrapper) -> Result<Vec<u8>> {
        if let Some(address) = address {
            let address = u8::try_from(address)
                .map_err(|_| anyhow!("Address must be between 0-255, got {}", address))?;
            return Ok(vec![address]);
        }

        let configured: Vec<u8> = config
            .enabled_inverters()
            .iter()
            .map(|i| i.address())
            .collect();

        if configured.is_empty() {
            Ok(vec![0x00])
        } else {
            debug!("Polling configured inverters at {:?}", configured);
            Ok(configured)
        }
    }

    /// Runs the command and returns what should be printed, if anything.
    pub async fn execute<T: Transport>(&self, client: &mut Client<T>, json: bool) -> Result<Option<String>> {
        match self {
            Command::Find => match client.discover().await {
                Ok(inverter) => {
                    if json {
                        Ok(Some(Output::json(&inverter)?))
                    } else {
                        Ok(Some(format!("Found inverter\nSerial: {}", inverter.serial)))
                    }
                }
                Err(Error::NoDeviceResponded) => {
                    info!("No unregistered inverters found");
                    Ok(None)
                }
                Err(err) => Err(anyhow::Error::new(err).context("discovery failed")),
            },

            Command::Register(serial, address) => {
                let mut inverter = Inverter::unregistered(serial.clone());
                client
                    .register(&mut inverter, *address)
                    .await
                    .with_context(|| format!("registering {} at address {}", serial, address))?;
                info!("Inverter registered with address {}", inverter.address);
                Ok(None)
            }

            Command::Unregister(serial, address) => {
                let mut inverter = Inverter::new(serial.clone(), *address);
                client
                    .deregister(&mut inverter)
                    .await
                    .with_context(|| format!("unregistering address {}", address))?;
                info!("Inverter with address {} no longer registered", address);
                Ok(None)
            }

            Command::Info(addresses) => {
                let mut out = Vec::with_capacity(addresses.len());
                for address in addresses {
                    let raw = client
                        .query_telemetry(*address)
                        .await
                        .with_context(|| format!("reading telemetry from address {}", address))?;
                    let telemetry = normalize(&raw);

                    if json {
                        out.push(Output::json(&telemetry)?);
                    } else {
                        let table = Output::telemetry_table(&telemetry, chrono::Local::now());
                        out.push(format!("Real-time inverter information (address {}):\n{}", address, table));
                    }
                }
                Ok(Some(out.join("\n")))
            }

            Command::DeviceInfo(addresses) => {
                let mut out = Vec::with_capacity(addresses.len());
                for address in addresses {
                    let info = client
                        .query_device_info(*address)
                        .await
                        .with_context(|| format!("reading device info from address {}", address))?;

                    if json {
                        out.push(Output::json(&info)?);
                    } else {
                        let table = Output::device_info_table(&info);
                        out.push(format!("Inverter device information (address {}):\n{}", address, table));
                    }
                }
                Ok(Some(out.join("\n")))
            }
        }
    }
}
