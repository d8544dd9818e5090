//! Account document storage for PromptPix.
//!
//! Each account is one document holding the balance, profile, usage counters
//! and the embedded credit history. The [`Store`] trait exposes single-document
//! primitives only; the credit ledger builds its gate/settle/compensate flow on
//! top of [`Store::apply_credit_change`] and [`Store::revert_credit_change`].
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local, for tests and local development.
//! - `RocksStore` (feature `rocksdb-backend`): persistent, CBOR-encoded
//!   documents in `RocksDB` column families.
//!
//! The backend is picked explicitly by configuration. Nothing here switches
//! backends on a connection failure.
//!
//! # Example
//!
//! ```
//! use promptpix_core::{Account, CreditChange, UserId};
//! use promptpix_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let user_id = UserId::generate();
//! store.insert_account(&Account::new(user_id, "ada@example.com", "Ada", 10)).unwrap();
//!
//! let updated = store
//!     .apply_credit_change(&user_id, &CreditChange::purchase(5, None))
//!     .unwrap();
//! assert_eq!(updated.credits, 15);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;

#[cfg(feature = "rocksdb-backend")]
pub mod keys;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use promptpix_core::{Account, CreditChange, UserId};

/// The storage trait defining all account document operations.
///
/// Every method touches exactly one account document and is atomic with
/// respect to other calls on the same document.
pub trait Store: Send + Sync {
    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the user ID or email is already taken.
    fn insert_account(&self, account: &Account) -> Result<()>;

    /// Get an account by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, user_id: &UserId) -> Result<Option<Account>>;

    /// Find an account by (lowercase) email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Replace the profile fields of an existing account.
    ///
    /// Only `display_name`, `profile` and `updated_at` are taken from
    /// `account`; the balance and history are left as stored so a concurrent
    /// settlement is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn update_profile(&self, account: &Account) -> Result<Account>;

    /// Delete an account by user ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn delete_account(&self, user_id: &UserId) -> Result<()>;

    // =========================================================================
    // Credit Operations
    // =========================================================================

    /// Atomically add `change.delta()` to the balance, append the history
    /// entry and bump the usage counter.
    ///
    /// Returns the post-mutation document. The balance is not validated here:
    /// a negative result is reported back so the caller can compensate.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn apply_credit_change(&self, user_id: &UserId, change: &CreditChange) -> Result<Account>;

    /// Atomically undo a change made by [`Store::apply_credit_change`]:
    /// subtract the delta, remove the entry with the change's id and
    /// un-bump the usage counter.
    ///
    /// If the entry is no longer present the document is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn revert_credit_change(&self, user_id: &UserId, change: &CreditChange) -> Result<Account>;
}
