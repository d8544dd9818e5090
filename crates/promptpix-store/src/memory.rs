//! In-memory storage implementation.
//!
//! All documents live in one map behind a `parking_lot::RwLock`; every mutating
//! primitive runs under the write guard, which gives the same single-document
//! atomicity the persistent backend provides.

use std::collections::HashMap;

use parking_lot::RwLock;

use promptpix_core::{Account, CreditChange, UserId};

use crate::error::{Result, StoreError};
use crate::Store;

#[derive(Default)]
struct Inner {
    accounts: HashMap<UserId, Account>,
    by_email: HashMap<String, UserId>,
}

/// Process-local storage for tests and local development.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().accounts.len()
    }

    /// Whether the store holds no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for MemoryStore {
    fn insert_account(&self, account: &Account) -> Result<()> {
        let mut inner = self.inner.write();

        if inner.accounts.contains_key(&account.user_id) {
            return Err(StoreError::Conflict(format!("user {}", account.user_id)));
        }
        if inner.by_email.contains_key(&account.email) {
            return Err(StoreError::Conflict(format!("email {}", account.email)));
        }

        inner
            .by_email
            .insert(account.email.clone(), account.user_id);
        inner.accounts.insert(account.user_id, account.clone());
        Ok(())
    }

    fn get_account(&self, user_id: &UserId) -> Result<Option<Account>> {
        Ok(self.inner.read().accounts.get(user_id).cloned())
    }

    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let inner = self.inner.read();
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    fn update_profile(&self, account: &Account) -> Result<Account> {
        let mut inner = self.inner.write();
        let stored = inner
            .accounts
            .get_mut(&account.user_id)
            .ok_or(StoreError::NotFound)?;

        stored.display_name.clone_from(&account.display_name);
        stored.profile = account.profile.clone();
        stored.updated_at = account.updated_at;
        Ok(stored.clone())
    }

    fn delete_account(&self, user_id: &UserId) -> Result<()> {
        let mut inner = self.inner.write();
        let account = inner.accounts.remove(user_id).ok_or(StoreError::NotFound)?;
        inner.by_email.remove(&account.email);
        Ok(())
    }

    fn apply_credit_change(&self, user_id: &UserId, change: &CreditChange) -> Result<Account> {
        let mut inner = self.inner.write();
        let account = inner.accounts.get_mut(user_id).ok_or(StoreError::NotFound)?;
        if !account.apply(change) {
            return Err(StoreError::BalanceOverflow);
        }
        Ok(account.clone())
    }

    fn revert_credit_change(&self, user_id: &UserId, change: &CreditChange) -> Result<Account> {
        let mut inner = self.inner.write();
        let account = inner.accounts.get_mut(user_id).ok_or(StoreError::NotFound)?;
        if !account.revert(change) {
            tracing::warn!(
                user_id = %user_id,
                entry_id = %change.entry.id,
                "Credit change to revert is not in history"
            );
        }
        Ok(account.clone())
    }
}
