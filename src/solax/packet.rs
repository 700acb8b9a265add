use crate::prelude::*;

use nom::{
    multi::length_data,
    number::complete::{be_u16, be_u8},
    sequence::tuple,
    IResult,
};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/*
Packet format used on the Solax X1 RS485 bus. It bears some resemblance to
modbus, but is not modbus.

Header              2   0xAA55  always the same
Source address      2   0x0000  typically
Destination address 2   0x00XX  bus address in the low byte, 0 for broadcast
Control code        1   0xXX    operation category
Function code       1   0xXX    operation within the category
Data length         1   0xXX    can be 0
Data 0..N           N
Checksum            2   sum of all bytes above, mod 65536
*/

pub const HEADER: u16 = 0xAA55;
pub const MAX_PAYLOAD_LEN: usize = 0xFF;
/// Frame size excluding the payload.
pub const ENVELOPE_LEN: usize = 11;

// {{{ ControlCode
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ControlCode {
    Register = 0x10,
    Read = 0x11,
    // no request builders exist for these two
    Write = 0x12,
    Execute = 0x13,
}
// }}}

// {{{ Status
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Status {
    Ack = 0x06,
    Nack = 0x15,
}
// }}}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Packet {
    pub header: u16,
    pub source: u16,
    pub destination: u16,
    pub control_code: u8,
    pub function_code: u8,
    pub payload: Vec<u8>,
}

impl Default for Packet {
    fn default() -> Self {
        Self {
            header: HEADER,
            source: 0x0000,
            destination: 0x0000,
            control_code: 0,
            function_code: 0,
            payload: Vec::new(),
        }
    }
}

impl Packet {
    pub fn new(control_code: ControlCode, function_code: u8) -> Self {
        Self {
            control_code: control_code.into(),
            function_code,
            ..Self::default()
        }
    }

    /// Targets a single inverter; the address goes in the low byte.
    pub fn with_destination(mut self, address: u8) -> Self {
        self.destination = u16::from_be_bytes([0x00, address]);
        self
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        // the length field is a single byte
        let len = self.payload.len();
        if len > MAX_PAYLOAD_LEN {
            return Err(Error::PayloadTooLarge(len));
        }

        let mut r = Vec::with_capacity(ENVELOPE_LEN + len);
        r.extend_from_slice(&Utils::u16_to_bytes(self.header));
        r.extend_from_slice(&Utils::u16_to_bytes(self.source));
        r.extend_from_slice(&Utils::u16_to_bytes(self.destination));
        r.push(self.control_code);
        r.push(self.function_code);
        r.push(len as u8);
        r.extend_from_slice(&self.payload);

        let checksum = Utils::checksum(&r);
        r.extend_from_slice(&Utils::u16_to_bytes(checksum));

        Ok(r)
    }

    /// Validates and parses a complete frame. Checks run in a fixed order
    /// (size, declared length, checksum, header) and the first failure wins.
    pub fn decode(input: &[u8]) -> Result<Self> {
        let len = input.len();
        if len < ENVELOPE_LEN {
            return Err(Error::FrameTooShort { actual: len });
        }

        let declared = usize::from(input[8]) + ENVELOPE_LEN;
        if declared != len {
            return Err(Error::LengthMismatch {
                declared,
                actual: len,
            });
        }

        let (body, trailer) = input.split_at(len - 2);
        let expected = Utils::u16_from_bytes(trailer).ok_or(Error::FrameTooShort { actual: len })?;
        let actual = Utils::checksum(body);
        if expected != actual {
            return Err(Error::ChecksumMismatch { expected, actual });
        }

        let header = Utils::u16_at(input, 0).ok_or(Error::FrameTooShort { actual: len })?;
        if header != HEADER {
            return Err(Error::BadHeader(header));
        }

        let (_, (header, source, destination, control_code, function_code, payload)) =
            Self::envelope(body).map_err(|_| Error::FrameTooShort { actual: len })?;

        Ok(Self {
            header,
            source,
            destination,
            control_code,
            function_code,
            payload: payload.to_vec(),
        })
    }

    #[allow(clippy::type_complexity)]
    fn envelope(input: &[u8]) -> IResult<&[u8], (u16, u16, u16, u8, u8, &[u8])> {
        tuple((be_u16, be_u16, be_u16, be_u8, be_u8, length_data(be_u8)))(input)
    }

    /// Bus address targeted by this packet (low byte of the destination).
    pub fn address(&self) -> u8 {
        Utils::u16_to_bytes(self.destination)[1]
    }
}
