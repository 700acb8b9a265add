use crate::prelude::*;

use enum_dispatch::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::device_info::DeviceInfo;
use super::inverter::Serial;
use super::packet::{ControlCode, Packet, Status};
use super::telemetry::RawTelemetry;

/// Responses carry the request's function code with the high bit set.
pub const RESPONSE_FLAG: u8 = 0x80;

/*
Control code 0x10, registration:
0x00  client -> inverter  query unregistered
0x80  inverter -> client  respond with serial
0x01  client -> inverter  set address
0x81  inverter -> client  confirm address
0x02  client -> inverter  remove address
0x82  inverter -> client  confirm removal

Control code 0x11, read:
0x02  client -> inverter  query live data
0x82  inverter -> client  live data
0x03  client -> inverter  query device info
0x83  inverter -> client  device info
*/

// {{{ RegisterFunction
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RegisterFunction {
    QueryUnregistered = 0x00,
    SetAddress = 0x01,
    RemoveAddress = 0x02,
}
// }}}

// {{{ ReadFunction
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ReadFunction {
    Telemetry = 0x02,
    DeviceInfo = 0x03,
}
// }}}

#[enum_dispatch]
pub trait MessageCommon {
    fn control_code(&self) -> ControlCode;
    fn function_code(&self) -> u8;

    fn response_code(&self) -> u8 {
        self.function_code() | RESPONSE_FLAG
    }

    /// 0 for broadcast requests.
    fn destination(&self) -> u8 {
        0x00
    }

    fn payload(&self) -> Vec<u8> {
        Vec::new()
    }

    fn packet(&self) -> Packet {
        Packet::new(self.control_code(), self.function_code())
            .with_destination(self.destination())
            .with_payload(self.payload())
    }

    /// Decodes `input` and checks it answers this request.
    fn expect_reply(&self, input: &[u8]) -> Result<Packet> {
        let packet = Packet::decode(input)?;

        let expected = u8::from(self.control_code());
        if packet.control_code != expected {
            return Err(Error::UnexpectedControlCode {
                expected,
                actual: packet.control_code,
            });
        }

        let expected = self.response_code();
        if packet.function_code != expected {
            return Err(Error::UnexpectedFunctionCode {
                expected,
                actual: packet.function_code,
            });
        }

        Ok(packet)
    }
}

/// A request together with the parser for its reply.
pub trait Exchange: MessageCommon {
    type Response;

    fn parse_response(&self, input: &[u8]) -> Result<Self::Response>;
}

#[enum_dispatch(MessageCommon)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Request {
    Discover(Discover),
    Register(Register),
    Deregister(Deregister),
    QueryTelemetry(QueryTelemetry),
    QueryDeviceInfo(QueryDeviceInfo),
}

impl Request {
    pub fn is_discovery(&self) -> bool {
        matches!(self, Request::Discover(_))
    }
}

fn parse_status(packet: &Packet) -> Result<()> {
    if packet.payload.len() != 1 {
        return Err(Error::MalformedStatus {
            payload: packet.payload.clone(),
        });
    }

    match Status::try_from(packet.payload[0]) {
        Ok(Status::Ack) => Ok(()),
        Ok(Status::Nack) => Err(Error::DeviceRejected {
            function: packet.function_code,
        }),
        Err(_) => Err(Error::MalformedStatus {
            payload: packet.payload.clone(),
        }),
    }
}

/////////////
//
// REGISTRATION
//
/////////////

/// Asks the (single) unregistered inverter on the bus for its serial.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Discover;

impl MessageCommon for Discover {
    fn control_code(&self) -> ControlCode {
        ControlCode::Register
    }
    fn function_code(&self) -> u8 {
        RegisterFunction::QueryUnregistered.into()
    }
}

impl Exchange for Discover {
    type Response = Serial;

    fn parse_response(&self, input: &[u8]) -> Result<Serial> {
        let packet = self.expect_reply(input)?;
        Ok(Serial::from(packet.payload))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Register {
    pub serial: Serial,
    pub address: u8,
}

impl MessageCommon for Register {
    fn control_code(&self) -> ControlCode {
        ControlCode::Register
    }
    fn function_code(&self) -> u8 {
        RegisterFunction::SetAddress.into()
    }
    fn payload(&self) -> Vec<u8> {
        let mut data = self.serial.as_bytes().to_vec();
        data.push(self.address);
        data
    }
}

impl Exchange for Register {
    type Response = ();

    fn parse_response(&self, input: &[u8]) -> Result<()> {
        parse_status(&self.expect_reply(input)?)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deregister {
    pub serial: Serial,
    pub address: u8,
}

impl MessageCommon for Deregister {
    fn control_code(&self) -> ControlCode {
        ControlCode::Register
    }
    fn function_code(&self) -> u8 {
        RegisterFunction::RemoveAddress.into()
    }
    fn payload(&self) -> Vec<u8> {
        let mut data = self.serial.as_bytes().to_vec();
        data.push(self.address);
        data
    }
}

impl Exchange for Deregister {
    type Response = ();

    fn parse_response(&self, input: &[u8]) -> Result<()> {
        parse_status(&self.expect_reply(input)?)
    }
}

/////////////
//
// READ
//
/////////////

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryTelemetry {
    pub address: u8,
}

impl MessageCommon for QueryTelemetry {
    fn control_code(&self) -> ControlCode {
        ControlCode::Read
    }
    fn function_code(&self) -> u8 {
        ReadFunction::Telemetry.into()
    }
    fn destination(&self) -> u8 {
        self.address
    }
}

impl Exchange for QueryTelemetry {
    type Response = RawTelemetry;

    fn parse_response(&self, input: &[u8]) -> Result<RawTelemetry> {
        let packet = self.expect_reply(input)?;
        RawTelemetry::from_payload(&packet.payload)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryDeviceInfo {
    pub address: u8,
}

impl MessageCommon for QueryDeviceInfo {
    fn control_code(&self) -> ControlCode {
        ControlCode::Read
    }
    fn function_code(&self) -> u8 {
        ReadFunction::DeviceInfo.into()
    }
    fn destination(&self) -> u8 {
        self.address
    }
}

impl Exchange for QueryDeviceInfo {
    type Response = DeviceInfo;

    fn parse_response(&self, input: &[u8]) -> Result<DeviceInfo> {
        let packet = self.expect_reply(input)?;
        DeviceInfo::from_payload(&packet.payload)
    }
}
