//! Write outcome classification

use crate::transport::WriteResponse;

/// Status returned on a successful write
pub const STATUS_SUCCESS: u16 = 204;

/// Status that may carry an overload phrase
pub const STATUS_SERVER_ERROR: u16 = 500;

/// Body phrases the server uses when it wants the client to slow down
pub const OVERLOAD_PHRASES: &[&str] = &[
    "engine: cache maximum memory size exceeded",
    "write failed: hinted handoff queue not empty",
    "write failed: engine: cache-max-memory-size exceeded",
    "timeout",
    "write failed: can not exceed max connections of 500",
];

/// Overload only when both halves appear
const READ_TIMEOUT_PHRASES: (&str, &str) = ("write failed: read message type: read tcp", "i/o timeout");

/// What a single response means for the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Server is overloaded; wait and resend without spending an attempt
    Overload,
    /// Anything else; spends one bounded attempt
    Failure,
}

/// Classify a completed response
pub fn classify(response: &WriteResponse) -> Outcome {
    match response.status {
        STATUS_SUCCESS => Outcome::Success,
        STATUS_SERVER_ERROR if is_overload(&response.body) => Outcome::Overload,
        _ => Outcome::Failure,
    }
}

/// True when a response body carries a known overload phrase
pub fn is_overload(body: &[u8]) -> bool {
    let (read_tcp, io_timeout) = READ_TIMEOUT_PHRASES;
    OVERLOAD_PHRASES
        .iter()
        .any(|phrase| contains(body, phrase.as_bytes()))
        || (contains(body, read_tcp.as_bytes()) && contains(body, io_timeout.as_bytes()))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
