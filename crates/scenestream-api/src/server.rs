//! Frame server receiving scene documents
//!
//! The visualization side of the protocol: accepts exporter connections,
//! scans the byte stream for frame markers and decodes every payload into a
//! [`Document`].

use crate::client::DEFAULT_PORT;
use crate::serialization::{CHUNK_SIZE, Codec, FrameDecoder};
use scenestream_core::Document;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub listen_address: String,
    /// Payload codec
    pub codec: Codec,
    /// Bytes requested per socket read
    pub read_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: format!("127.0.0.1:{}", DEFAULT_PORT),
            codec: Codec::Json,
            read_size: CHUNK_SIZE,
        }
    }
}

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document channel closed")]
    ChannelClosed,
}

/// Listens for exporter connections
pub struct FrameServer {
    config: ServerConfig,
    listener: TcpListener,
    frames_received: Arc<AtomicU64>,
}

impl FrameServer {
    /// Bind the listen address
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.listen_address).await?;
        info!("Waiting for a connection on {}", listener.local_addr()?);

        Ok(Self {
            config,
            listener,
            frames_received: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Address actually bound
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Documents decoded over all connections
    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    /// Accept the next connection
    pub async fn accept(&self) -> Result<FrameStream, ServerError> {
        let (stream, peer) = self.listener.accept().await?;
        info!("Accepted connection from {}", peer);

        Ok(FrameStream {
            stream,
            peer,
            decoder: FrameDecoder::new(),
            codec: self.config.codec,
            read_size: self.config.read_size.max(1),
            frames_received: self.frames_received.clone(),
        })
    }

    /// Accept connections and forward every document
    ///
    /// Each connection is read on its own task. Returns `Ok` once the
    /// receiving end of `sender` is dropped, or an error if accepting fails.
    pub async fn serve(self, sender: mpsc::Sender<Document>) -> Result<(), ServerError> {
        loop {
            let mut connection = tokio::select! {
                connection = self.accept() => connection?,
                _ = sender.closed() => {
                    info!("Document receiver dropped, stopping server");
                    return Ok(());
                }
            };
            let sender = sender.clone();

            tokio::spawn(async move {
                let peer = connection.peer_addr();
                if let Err(e) = connection.forward(&sender).await {
                    error!("Connection from {} ended: {}", peer, e);
                }
            });
        }
    }
}

/// One exporter connection
pub struct FrameStream {
    stream: TcpStream,
    peer: SocketAddr,
    decoder: FrameDecoder,
    codec: Codec,
    read_size: usize,
    frames_received: Arc<AtomicU64>,
}

impl FrameStream {
    /// Remote address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Read until the next complete document
    ///
    /// Returns `None` once the peer closes the connection. Payloads that fail
    /// to decode are skipped.
    pub async fn next_document(&mut self) -> Result<Option<Document>, ServerError> {
        let mut buffer = vec![0u8; self.read_size];

        loop {
            while let Some(payload) = self.decoder.next_payload() {
                match self.codec.decode::<Document>(&payload) {
                    Ok(document) => {
                        self.frames_received.fetch_add(1, Ordering::Relaxed);
                        debug!(
                            bytes = payload.len(),
                            iteration = ?document.iteration,
                            "Received frame from {}",
                            self.peer
                        );
                        return Ok(Some(document));
                    }
                    Err(e) => warn!("Skipping frame from {}: {}", self.peer, e),
                }
            }

            let read = self.stream.read(&mut buffer).await?;
            if read == 0 {
                if self.decoder.buffered() > 0 {
                    debug!(
                        "Discarding {} trailing bytes from {}",
                        self.decoder.buffered(),
                        self.peer
                    );
                }
                info!("Connection from {} closed", self.peer);
                return Ok(None);
            }
            self.decoder.push(&buffer[..read]);
        }
    }

    /// Forward every document until the peer disconnects
    pub async fn forward(&mut self, sender: &mpsc::Sender<Document>) -> Result<(), ServerError> {
        while let Some(document) = self.next_document().await? {
            sender
                .send(document)
                .await
                .map_err(|_| ServerError::ChannelClosed)?;
        }
        Ok(())
    }
}
