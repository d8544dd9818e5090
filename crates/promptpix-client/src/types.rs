//! Request and response types for the PromptPix API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use promptpix_core::{CreditHistoryEntry, Profile, UsageCounters};

/// Success envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Failure envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// An account as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub user_id: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Current balance.
    pub credits: i64,
    /// Profile metadata.
    pub profile: Profile,
    /// Usage counters.
    pub usage: UsageCounters,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserData {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BalanceData {
    pub credits: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HistoryData {
    pub history: Vec<CreditHistoryEntry>,
}

/// Body of the add and use endpoints.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreditAmountRequest<'a> {
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}
