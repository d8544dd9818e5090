//! Error types for the credit ledger.

use crate::ids::IdError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No account identity was attached to the request.
    #[error("authentication required")]
    Unauthenticated,

    /// Account not found.
    #[error("account not found: {user_id}")]
    AccountNotFound {
        /// The user ID that was not found.
        user_id: String,
    },

    /// The balance does not cover the required amount.
    #[error("insufficient credits: required={required}, available={available}")]
    InsufficientCredits {
        /// Credits the operation needs.
        required: i64,
        /// Credits the account holds.
        available: i64,
    },

    /// Settlement detected an overdraft and compensated it.
    #[error("insufficient credits, operation cancelled")]
    OperationCancelled {
        /// Credits the operation needed.
        required: i64,
        /// Balance after compensation.
        available: i64,
    },

    /// Missing, zero or negative amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// An account with this id or email already exists.
    #[error("account already exists: {0}")]
    AccountExists(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// The document store failed or is unreachable.
    #[error("storage error: {0}")]
    Storage(String),
}
