//! Client error types.

/// Errors that can occur when using the PromptPix client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a failure envelope.
    #[error("API error: {status} - {message}")]
    Api {
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The balance does not cover the amount. Also returned when a racing
    /// request spent the credits first and the charge was cancelled.
    #[error("insufficient credits: available={available}, required={required}")]
    InsufficientCredits {
        /// Current balance.
        available: i64,
        /// Required amount.
        required: i64,
    },

    /// The caller has no account.
    #[error("account not found")]
    AccountNotFound,

    /// Missing or rejected bearer token.
    #[error("unauthorized")]
    Unauthorized,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
