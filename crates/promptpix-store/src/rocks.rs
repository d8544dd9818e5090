//! `RocksDB` storage implementation.
//!
//! Account documents are CBOR-encoded into the `accounts` column family, with
//! an email index alongside. `RocksDB` has no read-modify-write primitive, so
//! every mutation holds `write_lock` from the read until its `WriteBatch` is
//! committed.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options, WriteBatch,
};

use promptpix_core::{Account, CreditChange, UserId};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn write_account(&self, account: &Account) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let value = Self::serialize(account)?;
        self.db
            .put_cf(&cf, keys::account_key(&account.user_id), value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Read, mutate and write back one document under the write lock.
    fn modify<F>(&self, user_id: &UserId, mutate: F) -> Result<Account>
    where
        F: FnOnce(&mut Account) -> Result<()>,
    {
        let _guard = self.write_lock.lock();
        let mut account = self.get_account(user_id)?.ok_or(StoreError::NotFound)?;
        mutate(&mut account)?;
        self.write_account(&account)?;
        Ok(account)
    }
}

impl Store for RocksStore {
    fn insert_account(&self, account: &Account) -> Result<()> {
        let _guard = self.write_lock.lock();
        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        let cf_email = self.cf(cf::ACCOUNTS_BY_EMAIL)?;

        let account_key = keys::account_key(&account.user_id);
        let email_key = keys::email_key(&account.email);

        if self
            .db
            .get_cf(&cf_accounts, &account_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some()
        {
            return Err(StoreError::Conflict(format!("user {}", account.user_id)));
        }
        if self
            .db
            .get_cf(&cf_email, &email_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some()
        {
            return Err(StoreError::Conflict(format!("email {}", account.email)));
        }

        let value = Self::serialize(account)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_accounts, &account_key, &value);
        batch.put_cf(&cf_email, &email_key, &account_key);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_account(&self, user_id: &UserId) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;

        self.db
            .get_cf(&cf, keys::account_key(user_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS_BY_EMAIL)?;

        let Some(value) = self
            .db
            .get_cf(&cf, keys::email_key(email))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let user_id = keys::user_id_from_index(&value)
            .ok_or_else(|| StoreError::Serialization("corrupt email index entry".into()))?;
        self.get_account(&user_id)
    }

    fn update_profile(&self, account: &Account) -> Result<Account> {
        self.modify(&account.user_id, |stored| {
            stored.display_name.clone_from(&account.display_name);
            stored.profile = account.profile.clone();
            stored.updated_at = account.updated_at;
            Ok(())
        })
    }

    fn delete_account(&self, user_id: &UserId) -> Result<()> {
        let _guard = self.write_lock.lock();
        let account = self.get_account(user_id)?.ok_or(StoreError::NotFound)?;

        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        let cf_email = self.cf(cf::ACCOUNTS_BY_EMAIL)?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf_accounts, keys::account_key(user_id));
        batch.delete_cf(&cf_email, keys::email_key(&account.email));

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn apply_credit_change(&self, user_id: &UserId, change: &CreditChange) -> Result<Account> {
        self.modify(user_id, |account| {
            if account.apply(change) {
                Ok(())
            } else {
                Err(StoreError::BalanceOverflow)
            }
        })
    }

    fn revert_credit_change(&self, user_id: &UserId, change: &CreditChange) -> Result<Account> {
        self.modify(user_id, |account| {
            if !account.revert(change) {
                tracing::warn!(
                    user_id = %user_id,
                    entry_id = %change.entry.id,
                    "Credit change to revert is not in history"
                );
            }
            Ok(())
        })
    }
}
