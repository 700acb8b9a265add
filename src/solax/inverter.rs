use crate::prelude::*;

use serde::{Serialize, Serializer};

// Serial {{{
/// Factory serial as reported on discovery. Variable length; shown as hex.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Serial(Vec<u8>);

impl Serial {
    pub fn new(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Serial {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for Serial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Utils::hex(&self.0))
    }
}

impl std::fmt::Debug for Serial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Serial({})", self)
    }
}

impl Serialize for Serial {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl std::str::FromStr for Serial {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bytes = Utils::parse_hex(s).map_err(|err| anyhow!("invalid serial {}: {}", s, err))?;
        if bytes.is_empty() {
            bail!("serial must not be empty");
        }
        Ok(Self(bytes))
    }
} // }}}

/// An inverter on the bus. Address 0 means unregistered.
///
/// The caller owns this value; [`crate::solax::Client`] updates the address
/// after successful register/deregister exchanges and never stores it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Inverter {
    pub serial: Serial,
    pub address: u8,
}

impl Inverter {
    pub fn new(serial: Serial, address: u8) -> Self {
        Self { serial, address }
    }

    pub fn unregistered(serial: Serial) -> Self {
        Self::new(serial, 0x00)
    }

    pub fn is_registered(&self) -> bool {
        self.address != 0x00
    }
}
