use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse grouping of [`Error`] variants, used by callers that only care
/// whether a failure came from the wire, the device, the bus or the port.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
    Framing,
    Semantic,
    Availability,
    Transport,
}

#[derive(Debug, Error)]
pub enum Error {
    // framing
    #[error("payload of {0} bytes exceeds the 255 byte limit")]
    PayloadTooLarge(usize),
    #[error("frame too short: minimum packet size is 11 bytes, got {actual}")]
    FrameTooShort { actual: usize },
    #[error("length mismatch: packet specifies length of {declared}, got {actual} instead")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("checksum mismatch: packet specifies {expected:#06X}, computed {actual:#06X}")]
    ChecksumMismatch { expected: u16, actual: u16 },
    #[error("header mismatch: expected 0xAA55, got {0:#06X}")]
    BadHeader(u16),

    // semantic
    #[error("unexpected control code: expected {expected:#04X}, got {actual:#04X}")]
    UnexpectedControlCode { expected: u8, actual: u8 },
    #[error("unexpected function code: expected {expected:#04X}, got {actual:#04X}")]
    UnexpectedFunctionCode { expected: u8, actual: u8 },
    #[error("malformed status: expected a single ACK (0x06) or NACK (0x15) byte, got {payload:02X?}")]
    MalformedStatus { payload: Vec<u8> },
    #[error("inverter rejected request (function {function:#04X}) with NACK")]
    DeviceRejected { function: u8 },
    #[error("unexpected payload length: expected {expected} bytes, got {actual}")]
    UnexpectedPayloadLength { expected: usize, actual: usize },
    #[error("payload too short: expected at least {minimum} bytes, got {actual}")]
    PayloadTooShort { minimum: usize, actual: usize },
    #[error("invalid bus address {0}: must be between 1 and 255")]
    InvalidAddress(u8),

    // availability
    #[error("no inverter responded to call")]
    NoDeviceResponded,

    // transport
    #[error("failed to write full body: wrote {written} of {expected} bytes")]
    IncompleteWrite { expected: usize, written: usize },
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        use Error::*;

        match self {
            PayloadTooLarge(_)
            | FrameTooShort { .. }
            | LengthMismatch { .. }
            | ChecksumMismatch { .. }
            | BadHeader(_) => ErrorCategory::Framing,
            UnexpectedControlCode { .. }
            | UnexpectedFunctionCode { .. }
            | MalformedStatus { .. }
            | DeviceRejected { .. }
            | UnexpectedPayloadLength { .. }
            | PayloadTooShort { .. }
            | InvalidAddress(_) => ErrorCategory::Semantic,
            NoDeviceResponded => ErrorCategory::Availability,
            IncompleteWrite { .. } | Io(_) => ErrorCategory::Transport,
        }
    }
}
