/// Error types for the Arbor group management core.
/// One variant per failure class a caller has to tell apart.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroupError {
    /// The query transport failed before a correlated response arrived
    /// (timeout, connection loss). Produced by `QueryTransport`
    /// implementations and propagated unchanged; never retried here.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with an error-shaped response. Carries the
    /// server's reason so callers can distinguish rejection from transport
    /// loss. Produced by `QueryTransport` implementations.
    #[error("server returned error {code}: {text}")]
    Protocol { code: u16, text: String },

    /// A success response was missing structure the protocol guarantees.
    /// This is a contract violation of the exchange, not a recoverable
    /// condition.
    #[error("malformed group response: {0}")]
    Decode(String),

    /// Local history/event delivery failed. Best-effort consumers log and
    /// continue; sink implementations return this to say what went wrong.
    #[error("local event delivery failed: {0}")]
    Event(String),
}

impl GroupError {
    /// Shorthand for a decode-contract violation.
    pub fn decode(msg: impl Into<String>) -> Self {
        GroupError::Decode(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, GroupError>;
