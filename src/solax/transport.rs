use crate::prelude::*;

use {
    async_trait::async_trait,
    bytes::BytesMut,
    std::time::Duration,
    tokio::io::{AsyncReadExt, AsyncWriteExt},
    tokio_serial::{ClearBuffer, DataBits, Parity, SerialPort, SerialPortBuilderExt, SerialStream, StopBits},
};

/// Default line settings: 9600 baud, 8 data bits, no parity, 1 stop bit.
pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// The byte pipe a [`crate::solax::Client`] drives. One owner at a time.
#[async_trait]
pub trait Transport: Send {
    /// Discards any stale, unread input.
    async fn flush(&mut self) -> std::io::Result<()>;

    /// Returns how many bytes were accepted, which may be fewer than offered.
    async fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize>;

    /// Drains whatever is currently available; may be empty.
    async fn read_available(&mut self) -> std::io::Result<Vec<u8>>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn flush(&mut self) -> std::io::Result<()> {
        (**self).flush().await
    }

    async fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        (**self).write(bytes).await
    }

    async fn read_available(&mut self) -> std::io::Result<Vec<u8>> {
        (**self).read_available().await
    }
}

// SerialTransport {{{
pub struct SerialTransport {
    device: String,
    stream: SerialStream,
    read_timeout: Duration,
}

impl SerialTransport {
    pub fn open(device: &str, baud_rate: u32, read_timeout: Duration) -> std::io::Result<Self> {
        info!("Opening {} at {} baud", device, baud_rate);

        let stream = tokio_serial::new(device, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(read_timeout)
            .open_native_async()
            .map_err(std::io::Error::from)?;

        Ok(Self {
            device: device.to_string(),
            stream,
            read_timeout,
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("device", &self.device)
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn flush(&mut self) -> std::io::Result<()> {
        self.stream
            .clear(ClearBuffer::All)
            .map_err(std::io::Error::from)
    }

    async fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        let n = AsyncWriteExt::write(&mut self.stream, bytes).await?;
        AsyncWriteExt::flush(&mut self.stream).await?;
        Ok(n)
    }

    async fn read_available(&mut self) -> std::io::Result<Vec<u8>> {
        const MAX_BUFFER_SIZE: usize = 4096;
        let mut buf = BytesMut::with_capacity(MAX_BUFFER_SIZE);

        // keep reading until the line stays quiet for a full read timeout
        loop {
            if buf.len() >= MAX_BUFFER_SIZE {
                warn!("{}: read buffer full at {} bytes", self.device, buf.len());
                break;
            }

            match tokio::time::timeout(self.read_timeout, self.stream.read_buf(&mut buf)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => trace!("{}: read {} bytes", self.device, n),
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Ok(Err(e)) => return Err(e),
                Err(_) => break,
            }
        }

        Ok(buf.to_vec())
    }
}
// }}}
