use core::time::Duration;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::Mutex};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::{Error, Result};

/// Connection attempts made by [`ClientConfig::new`] before giving up.
pub const DEFAULT_MAX_CONNECT_ATTEMPTS: u32 = 5;

/// Pause between failed connection attempts used by [`ClientConfig::new`].
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Largest frame either side may send. Batches of a few hundred thousand
/// short candidates fit comfortably.
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 64 * 1024 * 1024;

type Connection = Framed<TcpStream, LengthDelimitedCodec>;

/// Where and how a [`DispatchClient`] connects.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Identifies this client in logs and in the requests it sends.
    pub id: String,
    /// Total connection attempts, including the first. Must be at least one.
    pub max_connect_attempts: u32,
    /// Pause after each failed attempt except the last.
    pub retry_delay: Duration,
    pub max_frame_length: usize,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            id: String::from("dcw"),
            max_connect_attempts: DEFAULT_MAX_CONNECT_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A request/response client over one persistent TCP connection.
///
/// Every message is a single length-delimited frame. Calls are serialized: a
/// call holds the connection until its response frame arrives, so responses
/// can never be handed to the wrong caller. Share the client behind an
/// [`Arc`](std::sync::Arc) to call it from several tasks.
#[derive(Debug)]
pub struct DispatchClient {
    config: ClientConfig,
    conn: Mutex<Option<Connection>>,
}

impl DispatchClient {
    /// Connects to `config.addr()`, retrying failed attempts.
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] if `config.max_connect_attempts` is zero
    /// - [`Error::Connect`] with the last failure once every attempt failed
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        if config.max_connect_attempts == 0 {
            return Err(Error::InvalidConfig {
                reason: String::from("max_connect_attempts must be greater than 0"),
            });
        }

        let addr = config.addr();
        let mut attempt = 0;
        let stream = loop {
            attempt += 1;
            match TcpStream::connect(&addr).await {
                Ok(stream) => break stream,
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        "Client {} can't connect to {} (attempt {}/{}): {}",
                        config.id,
                        addr,
                        attempt,
                        config.max_connect_attempts,
                        e
                    );
                    if attempt >= config.max_connect_attempts {
                        return Err(Error::Connect {
                            addr,
                            attempts: attempt,
                            source: e,
                        });
                    }
                    tokio::time::sleep(config.retry_delay).await;
                }
            }
        };
        stream.set_nodelay(true)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Client {} connected to {}", config.id, addr);

        let codec = LengthDelimitedCodec::builder()
            .max_frame_length(config.max_frame_length)
            .new_codec();
        Ok(Self {
            conn: Mutex::new(Some(Framed::new(stream, codec))),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends `request` as one frame and waits for the response frame.
    ///
    /// # Errors
    /// - [`Error::ClientClosed`] after [`Self::close`]
    /// - [`Error::Io`] if sending or receiving fails
    /// - [`Error::ConnectionClosed`] if the peer hangs up before answering
    /// - [`Error::InvalidResponse`] if the response frame is empty
    pub async fn call(&self, request: Bytes) -> Result<Bytes> {
        let mut conn = self.conn.lock().await;
        let framed = conn.as_mut().ok_or(Error::ClientClosed)?;

        framed.send(request).await?;
        #[cfg(feature = "tracing")]
        tracing::trace!("Client {} sent request", self.config.id);

        let response = framed.next().await.ok_or(Error::ConnectionClosed)??;
        #[cfg(feature = "tracing")]
        tracing::trace!(
            "Client {} received {} byte response",
            self.config.id,
            response.len()
        );

        if response.is_empty() {
            return Err(Error::InvalidResponse);
        }
        Ok(response.freeze())
    }

    /// Flushes and shuts down the connection. Closing twice is a no-op.
    ///
    /// # Errors
    /// - [`Error::Io`] if flushing or shutting down the socket fails
    pub async fn close(&self) -> Result<()> {
        let mut conn = self.conn.lock().await;
        if let Some(mut framed) = conn.take() {
            SinkExt::<Bytes>::close(&mut framed).await?;
            #[cfg(feature = "tracing")]
            tracing::debug!("Client {} closed", self.config.id);
        }
        Ok(())
    }
}
