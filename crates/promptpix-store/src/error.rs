//! Error types for PromptPix storage.

use promptpix_core::LedgerError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("not found")]
    NotFound,

    /// A unique key (account id or email) is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The credit change would overflow the stored balance.
    #[error("balance overflow")]
    BalanceOverflow,
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::AccountNotFound {
                user_id: String::from("unknown"),
            },
            StoreError::Conflict(key) => Self::AccountExists(key),
            StoreError::BalanceOverflow => {
                Self::InvalidAmount("Amount would overflow the balance".into())
            }
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Storage(msg),
        }
    }
}
