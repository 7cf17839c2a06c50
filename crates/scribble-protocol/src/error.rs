/// Failures turning frames into messages and back.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("could not encode frame: {0}")]
    Encode(#[source] serde_json::Error),

    /// Malformed JSON, an unknown `type` tag, or a payload of the wrong shape.
    #[error("could not decode frame: {0}")]
    Decode(#[source] serde_json::Error),

    /// Well-formed JSON that breaks a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
