//! Error types for the dispatch layer.
//!
//! ## Error Cases
//! - `Connect`: every connection attempt to the worker failed.
//! - `Io`: the established connection failed mid-exchange.
//! - `ConnectionClosed`: the worker hung up before answering.
//! - `ClientClosed`: the client was used after [`DispatchClient::close`].
//! - `InvalidResponse`: the worker answered with an empty frame.
//! - `InvalidConfig` / `InvalidTemplate`: rejected at construction.
//! - `Encoding`: a batch request could not be encoded or decoded.
//!
//! [`DispatchClient::close`]: crate::DispatchClient::close

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the dispatch layer.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No connection could be established within the allowed attempts.
    #[error("Failed to connect to {addr} after {attempts} attempt(s): {source}")]
    Connect {
        addr: String,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to an established connection failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection before sending a response.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// The client was already closed.
    #[error("Client is closed")]
    ClientClosed,

    /// The peer answered with an empty message.
    #[error("Invalid response")]
    InvalidResponse,

    /// The client configuration was rejected.
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// The request template was rejected.
    #[error("Invalid template: {reason}")]
    InvalidTemplate { reason: String },

    /// A batch request could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}
