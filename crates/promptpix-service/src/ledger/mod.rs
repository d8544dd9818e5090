//! The credit ledger.
//!
//! Costly image operations are charged in two steps separated by the external
//! call:
//!
//! 1. [`CreditLedger::gate`] reads the balance and rejects the request up
//!    front if it cannot pay. Nothing is written.
//! 2. [`CreditLedger::settle`] runs after the operation succeeded. It applies
//!    the debit and the history entry in one atomic store command, then checks
//!    the post-mutation balance. A negative balance means another request on
//!    the same account settled in between; the change is reverted and the
//!    request fails with `OperationCancelled`.
//!
//! Purchases and direct debits ([`CreditLedger::add_credits`],
//! [`CreditLedger::use_credits`]) and the history query live alongside.

mod adjust;
mod gate;
mod history;
mod settlement;

use std::sync::Arc;

use promptpix_core::{Account, CreditCost, LedgerError, Result, UserId};
use promptpix_store::{Store, StoreError};

use crate::config::DEFAULT_HISTORY_LIMIT;

pub use adjust::{validate_amount, MAX_CREDIT_AMOUNT};

/// Per-request state handed from the gate to settlement.
#[derive(Debug, Clone)]
pub struct CreditContext {
    /// Account snapshot read at gate time.
    pub account: Account,
    /// What the operation costs and how it is labelled.
    pub cost: CreditCost,
}

impl CreditContext {
    /// The account being charged.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.account.user_id
    }

    /// Credits the operation requires.
    #[must_use]
    pub fn required(&self) -> i64 {
        self.cost.amount
    }
}

/// Credit accounting over an account [`Store`].
#[derive(Clone)]
pub struct CreditLedger {
    store: Arc<dyn Store>,
    history_default_limit: usize,
}

impl CreditLedger {
    /// Create a ledger with the default history page size.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            history_default_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Override the number of history entries returned when no limit is given.
    #[must_use]
    pub fn with_history_default_limit(mut self, limit: usize) -> Self {
        self.history_default_limit = limit;
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Load an account or fail with `AccountNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `Storage`.
    pub fn load(&self, user_id: &UserId) -> Result<Account> {
        self.store
            .get_account(user_id)
            .map_err(store_error(user_id))?
            .ok_or_else(|| not_found(user_id))
    }
}

fn not_found(user_id: &UserId) -> LedgerError {
    LedgerError::AccountNotFound {
        user_id: user_id.to_string(),
    }
}

fn store_error(user_id: &UserId) -> impl FnOnce(StoreError) -> LedgerError + '_ {
    move |err| match err {
        StoreError::NotFound => not_found(user_id),
        other => other.into(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use promptpix_core::{Account, UserId};
    use promptpix_store::{MemoryStore, Store};

    use super::CreditLedger;

    /// A ledger over a fresh memory store holding one account.
    pub fn ledger_with(credits: i64) -> (CreditLedger, UserId) {
        let store = Arc::new(MemoryStore::new());
        let user_id = UserId::generate();
        store
            .insert_account(&Account::new(user_id, "ada@example.com", "Ada", credits))
            .unwrap();
        (CreditLedger::new(store), user_id)
    }
}
