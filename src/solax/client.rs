use crate::prelude::*;

use std::time::Duration;

use super::catalog::{
    Deregister, Discover, Exchange, MessageCommon, QueryDeviceInfo, QueryTelemetry, Register,
    Request,
};
use super::device_info::DeviceInfo;
use super::inverter::Inverter;
use super::telemetry::RawTelemetry;
use super::transport::Transport;

/// Wait between sending a request and reading the reply.
pub const DEFAULT_DWELL: Duration = Duration::from_millis(250);

/// Where the current (or most recent) transaction stands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionState {
    Idle,
    Sent,
    Waiting,
    ReadDone,
    Parsed,
    Failed,
}

/// Runs one request/response exchange at a time over a [`Transport`].
///
/// Every exchange flushes stale input, writes the request, sleeps for the
/// full dwell interval, drains the reply and parses it. Nothing is retried.
pub struct Client<T> {
    transport: T,
    dwell: Duration,
    state: TransactionState,
    transitions: Vec<TransactionState>,
    last_response: Vec<u8>,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self::with_dwell(transport, DEFAULT_DWELL)
    }

    pub fn with_dwell(transport: T, dwell: Duration) -> Self {
        Self {
            transport,
            dwell,
            state: TransactionState::Idle,
            transitions: Vec::new(),
            last_response: Vec::new(),
        }
    }

    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    pub fn set_dwell(&mut self, dwell: Duration) {
        self.dwell = dwell;
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Every state the most recent transaction passed through, in order.
    pub fn transitions(&self) -> &[TransactionState] {
        &self.transitions
    }

    /// Raw bytes of the last read, kept even when parsing failed.
    pub fn last_response(&self) -> &[u8] {
        &self.last_response
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Finds the first unregistered inverter (address 0x00) on the bus.
    /// Follow up with [`Client::register`] to give it an address.
    pub async fn discover(&mut self) -> Result<Inverter> {
        let serial = self.transact(Discover).await?;
        info!("Found unregistered inverter {}", serial);
        Ok(Inverter::unregistered(serial))
    }

    /// Sets the bus address of an unregistered inverter.
    pub async fn register(&mut self, inverter: &mut Inverter, address: u8) -> Result<()> {
        if address == 0x00 {
            return Err(Error::InvalidAddress(address));
        }

        self.transact(Register {
            serial: inverter.serial.clone(),
            address,
        })
        .await?;

        inverter.address = address;
        info!("Inverter {} registered at address {}", inverter.serial, address);
        Ok(())
    }

    /// Removes the inverter's bus address; it reverts to 0x00.
    pub async fn deregister(&mut self, inverter: &mut Inverter) -> Result<()> {
        self.transact(Deregister {
            serial: inverter.serial.clone(),
            address: inverter.address,
        })
        .await?;

        info!("Inverter {} at address {} deregistered", inverter.serial, inverter.address);
        inverter.address = 0x00;
        Ok(())
    }

    pub async fn query_telemetry(&mut self, address: u8) -> Result<RawTelemetry> {
        self.transact(QueryTelemetry { address }).await
    }

    pub async fn query_device_info(&mut self, address: u8) -> Result<DeviceInfo> {
        self.transact(QueryDeviceInfo { address }).await
    }

    async fn transact<M>(&mut self, message: M) -> Result<M::Response>
    where
        M: Exchange + Clone + Into<Request>,
    {
        let request: Request = message.clone().into();

        let result = match self.exchange(&request).await {
            Ok(response) => message.parse_response(&response),
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => self.transition(TransactionState::Parsed),
            Err(e) => {
                debug!("{:?} failed: {}", request, e);
                self.transition(TransactionState::Failed);
            }
        }

        result
    }

    async fn exchange(&mut self, request: &Request) -> Result<Vec<u8>> {
        self.transitions.clear();
        self.transition(TransactionState::Idle);
        self.last_response.clear();

        let bytes = request.packet().encode()?;

        self.transport.flush().await?;

        debug!("TX {:?}: {}", request, Utils::hex(&bytes));
        let written = self.transport.write(&bytes).await?;
        if written != bytes.len() {
            return Err(Error::IncompleteWrite {
                expected: bytes.len(),
                written,
            });
        }
        self.transition(TransactionState::Sent);

        // no early completion: always sit out the full dwell
        self.transition(TransactionState::Waiting);
        tokio::time::sleep(self.dwell).await;

        let response = self.transport.read_available().await?;
        debug!("RX {} bytes: {}", response.len(), Utils::hex(&response));
        self.last_response = response.clone();
        self.transition(TransactionState::ReadDone);

        if response.is_empty() && request.is_discovery() {
            return Err(Error::NoDeviceResponded);
        }

        Ok(response)
    }

    fn transition(&mut self, state: TransactionState) {
        debug!("transaction {:?} -> {:?}", self.state, state);
        self.state = state;
        self.transitions.push(state);
    }
}
