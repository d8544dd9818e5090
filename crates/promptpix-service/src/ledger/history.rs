//! History query.

use promptpix_core::{CreditHistoryEntry, Result, UserId};

use super::CreditLedger;
use crate::config::MAX_HISTORY_LIMIT;

impl CreditLedger {
    /// The account's most recent history entries, newest first.
    ///
    /// `limit` defaults to the configured page size and is capped at
    /// [`MAX_HISTORY_LIMIT`]. Entries sharing a timestamp are ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub fn history(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<CreditHistoryEntry>> {
        let limit = limit
            .unwrap_or(self.history_default_limit)
            .min(MAX_HISTORY_LIMIT);

        let mut entries = self.load(user_id)?.credit_history;
        entries.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}
