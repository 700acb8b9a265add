use crate::prelude::*;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_with::{serde_as, DurationMilliSeconds};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::solax::client::DEFAULT_DWELL;
use crate::solax::transport::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Serial device, e.g. /dev/ttyUSB0. May instead come from --device.
    pub device: Option<String>,

    #[serde(default = "Config::default_baud_rate")]
    pub baud_rate: u32,

    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "dwell_ms", default = "Config::default_dwell")]
    pub dwell: Duration,

    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "read_timeout_ms", default = "Config::default_read_timeout")]
    pub read_timeout: Duration,

    #[serde(default = "Config::default_loglevel")]
    pub loglevel: String,

    #[serde(default = "Vec::new")]
    pub inverters: Vec<Inverter>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: None,
            baud_rate: Self::default_baud_rate(),
            dwell: Self::default_dwell(),
            read_timeout: Self::default_read_timeout(),
            loglevel: Self::default_loglevel(),
            inverters: Vec::new(),
        }
    }
}

// Inverter {{{
#[derive(Clone, Debug, Deserialize)]
pub struct Inverter {
    #[serde(default = "Config::default_enabled")]
    pub enabled: bool,

    #[serde(default, deserialize_with = "de_serial")]
    pub serial: Option<Serial>,
    pub address: u8,
}

impl Inverter {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn serial(&self) -> Option<&Serial> {
        self.serial.as_ref()
    }

    pub fn address(&self) -> u8 {
        self.address
    }
} // }}}

pub struct ConfigWrapper {
    config: Arc<Mutex<Config>>,
}

impl Clone for ConfigWrapper {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
        }
    }
}

impl ConfigWrapper {
    pub fn new(file: String) -> Result<Self> {
        Ok(Self::from_config(Config::new(file)?))
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Config> {
        // a poisoned lock still holds a usable config
        self.config.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn device(&self) -> Option<String> {
        self.lock().device.clone()
    }

    pub fn set_device(&self, device: String) {
        self.lock().device = Some(device);
    }

    pub fn baud_rate(&self) -> u32 {
        self.lock().baud_rate
    }

    pub fn dwell(&self) -> Duration {
        self.lock().dwell
    }

    pub fn read_timeout(&self) -> Duration {
        self.lock().read_timeout
    }

    pub fn log_summary(&self) {
        self.lock().log_summary();
    }

    pub fn loglevel(&self) -> String {
        self.lock().loglevel.clone()
    }

    pub fn set_loglevel(&self, loglevel: &str) {
        self.lock().loglevel = loglevel.to_string();
    }

    pub fn inverters(&self) -> Vec<Inverter> {
        self.lock().inverters.clone()
    }

    pub fn enabled_inverters(&self) -> Vec<Inverter> {
        self.inverters().into_iter().filter(|i| i.enabled()).collect()
    }

    pub fn inverter_with_address(&self, address: u8) -> Option<Inverter> {
        self.inverters().into_iter().find(|i| i.address() == address)
    }
}

impl Config {
    pub fn new(file: String) -> Result<Self> {
        let content = std::fs::read_to_string(&file)
            .map_err(|err| anyhow!("error reading {}: {}", file, err))?;

        let config: Self =
            serde_yaml::from_str(&content).with_context(|| format!("error parsing {}", file))?;

        config.validate()?;
        Ok(config)
    }

    /// Called once logging is up, since loading happens before the logger
    /// knows its level.
    pub fn log_summary(&self) {
        info!("Configuration:");
        info!("  Device: {}", self.device.as_deref().unwrap_or("-"));
        info!("  Baud rate: {}", self.baud_rate);
        info!("  Dwell: {}ms", self.dwell.as_millis());
        info!("  Read timeout: {}ms", self.read_timeout.as_millis());
        info!(
            "  Inverters: {} configured, {} enabled",
            self.inverters.len(),
            self.inverters.iter().filter(|i| i.enabled).count()
        );
        for (i, inv) in self.inverters.iter().enumerate() {
            info!(
                "    Inverter[{}]: address {} serial {} {}",
                i,
                inv.address,
                inv.serial.as_ref().map(|s| s.to_string()).unwrap_or_default(),
                if inv.enabled { "enabled" } else { "disabled" }
            );
        }
        info!("  Log Level: {}", self.loglevel);
    }

    /// Settings file is optional; a missing file yields the defaults.
    pub fn load_or_default(file: &str) -> Result<Self> {
        if std::path::Path::new(file).exists() {
            Self::new(file.to_string())
        } else {
            debug!("{} not found, using defaults", file);
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            bail!("baud_rate must be greater than 0");
        }

        if let Some(device) = &self.device {
            if device.is_empty() {
                bail!("device cannot be empty");
            }
        }

        if self.read_timeout.is_zero() {
            bail!("read_timeout_ms must be greater than 0");
        }

        for (i, inv) in self.inverters.iter().enumerate() {
            if inv.address == 0 {
                bail!("inverter[{}].address must be between 1 and 255", i);
            }
            if let Some(dup) = self.inverters[..i].iter().find(|o| o.address == inv.address) {
                bail!(
                    "inverter[{}].address {} already used by serial {}",
                    i,
                    inv.address,
                    dup.serial.as_ref().map(|s| s.to_string()).unwrap_or_default()
                );
            }
        }

        Ok(())
    }

    fn default_baud_rate() -> u32 {
        DEFAULT_BAUD_RATE
    }

    fn default_dwell() -> Duration {
        DEFAULT_DWELL
    }

    fn default_read_timeout() -> Duration {
        DEFAULT_READ_TIMEOUT
    }

    fn default_loglevel() -> String {
        "info".to_string()
    }

    fn default_enabled() -> bool {
        true
    }
}

fn de_serial<'de, D>(deserializer: D) -> std::result::Result<Option<Serial>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        Ok(None)
    } else {
        Serial::from_str(&s).map(Some).map_err(serde::de::Error::custom)
    }
}
