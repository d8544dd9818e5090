//! Account types for PromptPix.
//!
//! An account carries its credit balance and, embedded in the same document,
//! the full credit history. Keeping both in one document is what lets the store
//! change the balance and append history in a single atomic write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credits::{CreditChange, CreditHistoryEntry, UsageKind};
use crate::{EntryId, UserId};

/// Credits granted to every new account.
pub const DEFAULT_STARTING_CREDITS: i64 = 10;

/// A registered PromptPix user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The user ID (the `sub` claim of the bearer token).
    pub user_id: UserId,

    /// Email address, stored lowercase. Unique across accounts.
    pub email: String,

    /// Name shown in the gallery and profile page.
    pub display_name: String,

    /// Current credit balance.
    pub credits: i64,

    /// Profile metadata.
    #[serde(default)]
    pub profile: Profile,

    /// Image usage counters.
    #[serde(default)]
    pub usage: UsageCounters,

    /// Append-only credit history, oldest first.
    #[serde(default)]
    pub credit_history: Vec<CreditHistoryEntry>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with the given starting balance.
    #[must_use]
    pub fn new(
        user_id: UserId,
        email: impl Into<String>,
        display_name: impl Into<String>,
        starting_credits: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email: email.into().trim().to_lowercase(),
            display_name: display_name.into(),
            credits: starting_credits,
            profile: Profile::default(),
            usage: UsageCounters::default(),
            credit_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the account can pay `amount` credits.
    #[must_use]
    pub fn has_sufficient_credits(&self, amount: i64) -> bool {
        self.credits >= amount
    }

    /// Apply a credit change in place: move the balance, append the entry and
    /// bump the usage counter.
    ///
    /// Stores call this inside their atomic section. Returns `false`, leaving
    /// the account untouched, if the new balance would overflow.
    #[must_use]
    pub fn apply(&mut self, change: &CreditChange) -> bool {
        let Some(credits) = self.credits.checked_add(change.entry.amount) else {
            return false;
        };
        self.credits = credits;
        self.credit_history.push(change.entry.clone());
        if let Some(kind) = change.usage {
            self.usage.bump(kind);
        }
        self.updated_at = Utc::now();
        true
    }

    /// Undo a credit change previously applied with [`Account::apply`].
    ///
    /// Only the entry with the change's id is removed. Returns `false` if that
    /// entry was not present or the balance cannot take the reversal, in which
    /// case the account is left untouched.
    pub fn revert(&mut self, change: &CreditChange) -> bool {
        let Some(position) = self.position_of(change.entry.id) else {
            return false;
        };
        let Some(credits) = self.credits.checked_sub(change.entry.amount) else {
            return false;
        };
        self.credit_history.remove(position);
        self.credits = credits;
        if let Some(kind) = change.usage {
            self.usage.unbump(kind);
        }
        self.updated_at = Utc::now();
        true
    }

    fn position_of(&self, id: EntryId) -> Option<usize> {
        self.credit_history.iter().rposition(|e| e.id == id)
    }
}

/// Free-form profile metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Short biography.
    pub bio: Option<String>,
    /// URL of the profile picture.
    pub picture_url: Option<String>,
}

/// Per-account image usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounters {
    /// Images produced by text-to-image.
    pub images_generated: u64,
    /// Images produced by the editing tools (upscale, uncrop, background removal).
    pub images_edited: u64,
}

impl UsageCounters {
    fn bump(&mut self, kind: UsageKind) {
        match kind {
            UsageKind::Generated => self.images_generated += 1,
            UsageKind::Edited => self.images_edited += 1,
        }
    }

    fn unbump(&mut self, kind: UsageKind) {
        match kind {
            UsageKind::Generated => self.images_generated = self.images_generated.saturating_sub(1),
            UsageKind::Edited => self.images_edited = self.images_edited.saturating_sub(1),
        }
    }
}
