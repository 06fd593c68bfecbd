use thiserror::Error;

/// Why a news fetch produced no items.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("News API key is not configured")]
    CredentialMissing,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("News API returned status '{status}' ({code}): {message}")]
    ApiStatus {
        status: String,
        code: String,
        message: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid thresholds: negative ({negative}) must not exceed positive ({positive})")]
    InvalidThresholds { negative: f64, positive: f64 },

    #[error("Invalid time window: {from} is after {to}")]
    InvalidWindow { from: String, to: String },

    #[error("Search query must not be empty")]
    EmptyQuery,
}
