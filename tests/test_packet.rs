mod common;
use common::*;
use solax_rs485::prelude::*;
use solax_rs485::solax::packet::{HEADER, MAX_PAYLOAD_LEN};

#[test]
fn encodes_discovery_request() {
    let bytes = Packet::new(ControlCode::Register, 0x00).encode().unwrap();

    assert_eq!(
        bytes,
        vec![0xAA, 0x55, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x01, 0x0F]
    );
}

#[test]
fn destination_uses_low_byte() {
    let bytes = Packet::new(ControlCode::Read, 0x02)
        .with_destination(0x0A)
        .encode()
        .unwrap();

    assert_eq!(&bytes[4..6], &[0x00, 0x0A]);
    assert_eq!(bytes.len(), 11);
}

#[test]
fn round_trip_preserves_fields() {
    for len in [0usize, 1, 14, 50, MAX_PAYLOAD_LEN] {
        let payload: Vec<u8> = (0..len).map(|i| i as u8).collect();
        let packet = Packet::new(ControlCode::Read, 0x83)
            .with_destination(7)
            .with_payload(payload.clone());

        let decoded = Packet::decode(&packet.encode().unwrap()).unwrap();

        assert_eq!(decoded, packet);
        assert_eq!(decoded.header, HEADER);
        assert_eq!(decoded.address(), 7);
        assert_eq!(decoded.payload, payload);
    }
}

#[test]
fn rejects_oversized_payload() {
    let packet = Packet::new(ControlCode::Register, 0x01).with_payload(vec![0; 256]);

    assert!(matches!(packet.encode(), Err(Error::PayloadTooLarge(256))));
}

#[test]
fn rejects_short_frame() {
    let err = Packet::decode(&[0xAA, 0x55, 0x00]).unwrap_err();
    assert!(matches!(err, Error::FrameTooShort { actual: 3 }));
    assert_eq!(err.category(), ErrorCategory::Framing);

    assert!(matches!(Packet::decode(&[]), Err(Error::FrameTooShort { actual: 0 })));
}

#[test]
fn rejects_length_mismatch() {
    let mut bytes = Factory::discover_reply(&Factory::serial());
    bytes.push(0x00);

    assert!(matches!(
        Packet::decode(&bytes),
        Err(Error::LengthMismatch { declared: 25, actual: 26 })
    ));
}

#[test]
fn rejects_bad_checksum() {
    let mut bytes = Factory::discover_reply(&Factory::serial());
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    assert!(matches!(Packet::decode(&bytes), Err(Error::ChecksumMismatch { .. })));
}

#[test]
fn any_payload_byte_flip_fails_checksum() {
    let reply = Factory::telemetry_reply(1);
    let payload = 9..reply.len() - 2;
    assert_eq!(payload.len(), 50);

    for i in payload {
        let mut bytes = reply.clone();
        bytes[i] ^= 0x01;

        assert!(
            matches!(Packet::decode(&bytes), Err(Error::ChecksumMismatch { .. })),
            "byte {} flipped",
            i
        );
    }
}

#[test]
fn rejects_bad_header() {
    let packet = Packet {
        header: 0x55AA,
        ..Packet::new(ControlCode::Register, 0x80)
    };
    let bytes = packet.encode().unwrap();

    assert!(matches!(Packet::decode(&bytes), Err(Error::BadHeader(0x55AA))));
}

#[test]
fn checksum_is_checked_before_header() {
    let packet = Packet {
        header: 0x1234,
        ..Packet::new(ControlCode::Register, 0x80)
    };
    let mut bytes = packet.encode().unwrap();
    bytes[10] = bytes[10].wrapping_add(1);

    assert!(matches!(Packet::decode(&bytes), Err(Error::ChecksumMismatch { .. })));
}
