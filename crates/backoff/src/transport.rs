//! Write transport - one network write, no retries

use bytes::Bytes;

use crate::error::TransportError;

/// Status and body of a completed write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResponse {
    pub status: u16,
    pub body: Bytes,
}

impl WriteResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 204 No Content, the only accepted success
    pub fn no_content() -> Self {
        Self::new(204, Bytes::new())
    }

    /// Body as text, for error messages
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one already-encoded payload
///
/// Implementations perform exactly one request per call. Retry and
/// backoff decisions belong to `BackoffController`.
#[trait_variant::make(WriteTransport: Send)]
pub trait LocalWriteTransport {
    /// Send `body`; `gzip` marks it as gzip-encoded
    ///
    /// Retries hand the same `Bytes` back, so cloning it must stay cheap.
    async fn send(&self, body: Bytes, gzip: bool) -> Result<WriteResponse, TransportError>;
}
