//! # Shared Dispatch Types
//!
//! Types shared by the controller and the workers it ships batches to. Both
//! sides must agree on these at compile time: the request document is the
//! whole contract between them.
//!
//! ## Type Aliases
//!
//! - [`Generator`] - The candidate generator driven by the controller
//!
//! ## Wire Format
//!
//! A [`BatchRequest`] travels as a single JSON document inside one frame:
//!
//! ```json
//! {"id":"controller","sequence":7,"candidates":["0700","0701"]}
//! ```

use bytes::Bytes;
use dcw::LockCandidateGenerator;
use serde::{Deserialize, Serialize};

use crate::Result;

/// The candidate generator used by the controller.
pub type Generator = LockCandidateGenerator;

/// Placeholder substituted with the candidate by a [`BodyBuilder`].
///
/// [`BodyBuilder`]: crate::BodyBuilder
pub const CANDIDATE_PLACEHOLDER: &str = "{candidate}";

/// One batch of candidates addressed to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Identifies the sender.
    pub id: String,
    /// Position of this batch in the sender's run, starting at zero.
    pub sequence: u64,
    /// The candidates, in generation order.
    pub candidates: Vec<String>,
}

impl BatchRequest {
    pub fn new(id: impl Into<String>, sequence: u64, candidates: Vec<String>) -> Self {
        Self {
            id: id.into(),
            sequence,
            candidates,
        }
    }

    /// Encodes the request into the bytes of one frame.
    pub fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    /// Decodes a request from the bytes of one frame.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn wire_format_is_stable() {
        let request = BatchRequest::new("controller", 7, vec!["0700".into(), "0701".into()]);
        let bytes = request.encode().unwrap();
        assert_eq!(
            &bytes[..],
            br#"{"id":"controller","sequence":7,"candidates":["0700","0701"]}"#
        );
        assert_eq!(BatchRequest::decode(&bytes).unwrap(), request);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            BatchRequest::decode(b"\x00\x01"),
            Err(Error::Encoding(_))
        ));
    }
}
