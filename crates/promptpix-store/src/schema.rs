//! Database schema definitions and column families.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Account documents (with embedded credit history), keyed by `user_id`.
    pub const ACCOUNTS: &str = "accounts";

    /// Index: email to `user_id`, enforcing email uniqueness.
    pub const ACCOUNTS_BY_EMAIL: &str = "accounts_by_email";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::ACCOUNTS, cf::ACCOUNTS_BY_EMAIL]
}
