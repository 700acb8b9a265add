mod common;
use common::*;
use solax_rs485::prelude::*;
use solax_rs485::solax::catalog::*;

#[test]
fn discover_request_is_broadcast() {
    let packet = Request::from(Discover).packet();

    assert_eq!(packet.control_code, 0x10);
    assert_eq!(packet.function_code, 0x00);
    assert_eq!(packet.destination, 0x0000);
    assert!(packet.payload.is_empty());
}

#[test]
fn register_payload_is_serial_then_address() {
    let serial = Factory::serial();
    let request = Request::from(Register {
        serial: serial.clone(),
        address: 0x0A,
    });
    let packet = request.packet();

    let mut expected = serial.as_bytes().to_vec();
    expected.push(0x0A);
    assert_eq!(packet.function_code, 0x01);
    assert_eq!(packet.payload, expected);
    assert_eq!(request.response_code(), 0x81);
}

#[test]
fn deregister_uses_remove_address() {
    let request = Deregister {
        serial: Factory::serial(),
        address: 3,
    };

    assert_eq!(request.control_code(), ControlCode::Register);
    assert_eq!(request.function_code(), 0x02);
    assert_eq!(request.payload().last(), Some(&3));
}

#[test]
fn read_requests_target_address() {
    let telemetry = QueryTelemetry { address: 5 }.packet();
    assert_eq!(telemetry.control_code, 0x11);
    assert_eq!(telemetry.function_code, 0x02);
    assert_eq!(telemetry.address(), 5);

    let info = QueryDeviceInfo { address: 6 }.packet();
    assert_eq!(info.function_code, 0x03);
    assert_eq!(info.address(), 6);
}

#[test]
fn only_discover_is_discovery() {
    assert!(Request::from(Discover).is_discovery());
    assert!(!Request::from(QueryTelemetry { address: 1 }).is_discovery());
}

#[test]
fn discover_reply_yields_serial() {
    let serial = Factory::serial();
    let parsed = Discover.parse_response(&Factory::discover_reply(&serial)).unwrap();

    assert_eq!(parsed, serial);
}

#[test]
fn rejects_wrong_control_code() {
    let reply = Factory::frame(ControlCode::Read, 0x80, 0, b"abc");

    assert!(matches!(
        Discover.parse_response(&reply),
        Err(Error::UnexpectedControlCode { expected: 0x10, actual: 0x11 })
    ));
}

#[test]
fn rejects_wrong_function_code() {
    let reply = Factory::frame(ControlCode::Read, 0x83, 1, &Factory::device_info_payload());
    let err = QueryTelemetry { address: 1 }.parse_response(&reply).unwrap_err();

    assert!(matches!(
        err,
        Error::UnexpectedFunctionCode { expected: 0x82, actual: 0x83 }
    ));
    assert_eq!(err.category(), ErrorCategory::Semantic);
}

#[test]
fn status_replies() {
    let request = Register {
        serial: Factory::serial(),
        address: 1,
    };

    assert!(request.parse_response(&Factory::status_reply(0x01, 0x06)).is_ok());
    assert!(matches!(
        request.parse_response(&Factory::status_reply(0x01, 0x15)),
        Err(Error::DeviceRejected { function: 0x81 })
    ));
    assert!(matches!(
        request.parse_response(&Factory::status_reply(0x01, 0x07)),
        Err(Error::MalformedStatus { .. })
    ));

    let two_bytes = Factory::frame(ControlCode::Register, 0x81, 0, &[0x06, 0x06]);
    assert!(matches!(
        request.parse_response(&two_bytes),
        Err(Error::MalformedStatus { .. })
    ));
}

#[test]
fn telemetry_reply_must_be_exact_length() {
    let reply = Factory::frame(ControlCode::Read, 0x82, 1, &[0u8; 49]);

    assert!(matches!(
        QueryTelemetry { address: 1 }.parse_response(&reply),
        Err(Error::UnexpectedPayloadLength { expected: 50, actual: 49 })
    ));
}
