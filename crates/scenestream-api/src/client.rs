//! Frame client streaming documents to a visualization server

use crate::serialization::{Codec, CodecError, write_frame};
use scenestream_core::Document;
use std::io::Write;
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};

/// Default server port
pub const DEFAULT_PORT: u16 = 12345;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server IP address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Payload codec
    pub codec: Codec,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            codec: Codec::Json,
        }
    }
}

impl ClientConfig {
    /// Resolve the configured endpoint
    ///
    /// The host must be an IP literal; no name resolution is performed.
    pub fn address(&self) -> Result<SocketAddr, ClientError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ClientError::InvalidAddress(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(#[source] std::io::Error),

    #[error("Write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Connection closed")]
    Closed,
}

/// Sends one frame per call over a persistent stream
///
/// After a failed write the client is closed for good; later sends return
/// [`ClientError::Closed`] without touching the stream.
pub struct FrameClient<W: Write = TcpStream> {
    writer: Option<W>,
    codec: Codec,
    frames_sent: u64,
    bytes_sent: u64,
}

impl FrameClient<TcpStream> {
    /// Connect to the configured server
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let address = config.address()?;
        let stream = TcpStream::connect(address).map_err(ClientError::ConnectionFailed)?;
        info!("Connected to {}", address);

        Ok(Self {
            codec: config.codec,
            ..Self::from_writer(stream)
        })
    }
}

impl<W: Write> FrameClient<W> {
    /// Wrap an already established stream
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: Some(writer),
            codec: Codec::Json,
            frames_sent: 0,
            bytes_sent: 0,
        }
    }

    /// Check if the stream is still usable
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Number of complete frames written
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Number of bytes written by complete frames
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Borrow the underlying stream
    pub fn get_ref(&self) -> Option<&W> {
        self.writer.as_ref()
    }

    /// Serialize and send one document
    ///
    /// Returns the number of bytes written, markers included.
    pub fn send_frame(&mut self, document: &Document) -> Result<usize, ClientError> {
        let writer = self.writer.as_mut().ok_or(ClientError::Closed)?;
        let started = Instant::now();

        let payload = self.codec.encode(document)?;
        match write_frame(writer, &payload) {
            Ok(written) => {
                self.frames_sent += 1;
                self.bytes_sent += written as u64;
                debug!(
                    payload = payload.len(),
                    elapsed_us = started.elapsed().as_micros() as u64,
                    "Sent frame {}",
                    self.frames_sent
                );
                Ok(written)
            }
            Err(e) => {
                error!("Frame write failed, closing connection: {}", e);
                self.writer = None;
                Err(ClientError::Write(e))
            }
        }
    }

    /// Give up the stream
    ///
    /// Returns the stream if it was still open.
    pub fn close(&mut self) -> Option<W> {
        self.writer.take()
    }
}

/// Stream a frame client writes to
///
/// `finish` runs once after the last frame. The default does nothing.
pub trait FrameSink: Write {
    fn finish(&mut self) {}
}

impl FrameSink for TcpStream {
    /// Shut the socket down in both directions
    fn finish(&mut self) {
        if let Err(e) = self.shutdown(Shutdown::Both) {
            debug!("Socket shutdown failed: {}", e);
        }
    }
}

impl FrameSink for Vec<u8> {}
