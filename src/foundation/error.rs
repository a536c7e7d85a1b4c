/// Convenience result type used across memfy.
pub type MemfyResult<T> = Result<T, MemfyError>;

/// Top-level error taxonomy used by editor APIs.
///
/// Every variant is meant to be shown to the user as-is at the boundary of the action that
/// triggered it; nothing in the crate retries.
#[derive(thiserror::Error, Debug)]
pub enum MemfyError {
    /// The selected input was refused before decoding (wrong declared media type).
    #[error("input rejected: {0}")]
    InputRejected(String),

    /// The GIF bitstream could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The operation needs state the session does not have (e.g. no GIF loaded).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The GIF encoder (or the compositing feeding it) failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Invalid user-provided parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing edit scripts.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MemfyError {
    /// Build a [`MemfyError::InputRejected`] value.
    pub fn input_rejected(msg: impl Into<String>) -> Self {
        Self::InputRejected(msg.into())
    }

    /// Build a [`MemfyError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`MemfyError::InvalidState`] value.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Build a [`MemfyError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`MemfyError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MemfyError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
