#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;
use solax_rs485::prelude::*;
use solax_rs485::solax::catalog::RESPONSE_FLAG;
use solax_rs485::solax::telemetry::TELEMETRY_LEN;

// MockTransport {{{
#[derive(Default)]
pub struct MockState {
    pub reads: VecDeque<Vec<u8>>,
    pub writes: Vec<Vec<u8>>,
    pub flushes: usize,
    pub written_at: Vec<Instant>,
    pub read_at: Vec<Instant>,
    /// Accept at most this many bytes per write.
    pub write_limit: Option<usize>,
}

/// In-memory bus. Clones share state so a test can inspect what the
/// client sent after handing the transport over.
#[derive(Clone, Default)]
pub struct MockTransport {
    pub state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(replies: Vec<Vec<u8>>) -> Self {
        let mock = Self::new();
        mock.state.lock().unwrap().reads = replies.into();
        mock
    }

    pub fn push_reply(&self, reply: Vec<u8>) {
        self.state.lock().unwrap().reads.push_back(reply);
    }

    pub fn limit_writes(&self, limit: usize) {
        self.state.lock().unwrap().write_limit = Some(limit);
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().writes.clone()
    }

    /// Time between each write and the read that followed it.
    pub fn read_delays(&self) -> Vec<std::time::Duration> {
        let state = self.state.lock().unwrap();
        state
            .written_at
            .iter()
            .zip(&state.read_at)
            .map(|(w, r)| r.duration_since(*w))
            .collect()
    }

    pub fn flushes(&self) -> usize {
        self.state.lock().unwrap().flushes
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn flush(&mut self) -> std::io::Result<()> {
        self.state.lock().unwrap().flushes += 1;
        Ok(())
    }

    async fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        let n = state.write_limit.map_or(bytes.len(), |l| l.min(bytes.len()));
        state.writes.push(bytes[..n].to_vec());
        state.written_at.push(Instant::now());
        Ok(n)
    }

    async fn read_available(&mut self) -> std::io::Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.read_at.push(Instant::now());
        Ok(state.reads.pop_front().unwrap_or_default())
    }
}
// }}}

pub struct Factory;
impl Factory {
    pub fn serial() -> Serial {
        Serial::new(b"XM2A0123456789")
    }

    pub fn frame(control: ControlCode, function: u8, address: u8, payload: &[u8]) -> Vec<u8> {
        Packet::new(control, function)
            .with_destination(address)
            .with_payload(payload.to_vec())
            .encode()
            .unwrap()
    }

    pub fn discover_reply(serial: &Serial) -> Vec<u8> {
        Self::frame(ControlCode::Register, RESPONSE_FLAG, 0x00, serial.as_bytes())
    }

    /// 0x06 ACK, 0x15 NACK
    pub fn status_reply(function: u8, status: u8) -> Vec<u8> {
        Self::frame(ControlCode::Register, function | RESPONSE_FLAG, 0x00, &[status])
    }

    pub fn telemetry_payload() -> Vec<u8> {
        let mut p = Vec::with_capacity(TELEMETRY_LEN);
        for v in [42u16, 123, 2345, 0, 35, 0, 31, 2301, 5002, 712, 0] {
            p.extend_from_slice(&v.to_be_bytes());
        }
        p.extend_from_slice(&123456u32.to_be_bytes()); // energy_total
        p.extend_from_slice(&9876u32.to_be_bytes()); // elapsed_hours
        for v in [2u16, 2400, 5000, 150, 0, 0, 0, 25] {
            p.extend_from_slice(&v.to_be_bytes());
        }
        p.extend_from_slice(&0u32.to_be_bytes()); // fault_code
        assert_eq!(p.len(), TELEMETRY_LEN);
        p
    }

    pub fn telemetry_reply(address: u8) -> Vec<u8> {
        Self::frame(ControlCode::Read, 0x82, address, &Self::telemetry_payload())
    }

    fn padded(text: &str, width: usize) -> Vec<u8> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.resize(width, b' ');
        bytes
    }

    pub fn device_info_payload() -> Vec<u8> {
        let mut p = vec![0u8; 9];
        p.push(1); // phase
        p.extend(Self::padded("700", 6));
        p.extend(Self::padded("1.01", 5));
        p.extend(Self::padded("X1-Air-0.7", 14));
        p.extend(Self::padded("solax", 14));
        p.extend(Self::padded("XM2A0123456789", 14));
        p.extend(Self::padded("360", 4));
        p
    }

    pub fn device_info_reply(address: u8) -> Vec<u8> {
        Self::frame(ControlCode::Read, 0x83, address, &Self::device_info_payload())
    }
}
