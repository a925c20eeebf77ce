//! Error types for the receipt encoder

use thiserror::Error;

/// Receipt encoder error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Input does not match either receipt shape, or a required field is missing
    #[error("Invalid receipt: {0}")]
    InvalidReceipt(String),

    /// Input is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input is not valid base64
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Text contains a character the selected code page cannot print
    #[error("Unsupported character {ch:?} in {text:?}")]
    UnsupportedCharacter { ch: char, text: String },

    /// QR payload does not fit the 2-byte length field
    #[error("QR payload too large: {0} bytes")]
    QrPayloadTooLarge(usize),

    /// A dispatch is already in flight
    #[error("Print dispatch already in progress")]
    Busy,

    /// The URI launcher failed
    #[error("Launch failed: {0}")]
    Launch(String),

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for encoder operations
pub type PrintResult<T> = Result<T, PrintError>;
