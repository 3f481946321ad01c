//! Module: transport
//! Responsibility: the request/response seam to the remote store.
//! Does not own: connection handling, TLS, retries, or authentication.
//! Boundary: everything the engine consumes from the store collaborator.

use crate::view::ViewQuery;
use serde_json::Value;
use std::io::Read;
use thiserror::Error as ThisError;

///
/// TransportError
///
/// Failures raised by the transport collaborator. The engine propagates
/// these unchanged; no retries happen at this layer.
///

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("transport i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote store returned status {status}: {reason}")]
    Remote { status: u16, reason: String },
}

///
/// Transport
///
/// One blocking round trip per call. Response bodies are raw byte streams;
/// the caller owns closing whatever resource backs them.
///

pub trait Transport {
    /// Streamed response body.
    type Body: Read;

    /// Run a view query and return the streamed result body.
    fn view_query(&self, query: &ViewQuery) -> Result<Self::Body, TransportError>;

    /// Send a bulk request body. `content_length` may be unknown when the
    /// body is produced by streaming.
    fn send_bulk(
        &self,
        body: &mut dyn Read,
        content_length: Option<u64>,
    ) -> Result<Self::Body, TransportError>;

    /// Batch-fetch documents by id, returned in the order the ids were given.
    fn fetch_documents(&self, ids: &[String]) -> Result<Vec<Value>, TransportError>;
}
