//! Credit history and pricing types.
//!
//! Every balance change is described by a [`CreditChange`]: the signed history
//! entry to append plus the usage counter the change bumps, if any. The store
//! applies a change as one atomic write and can revert it by entry id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::EntryId;

/// Operation label recorded for credit purchases.
pub const PURCHASE_OPERATION: &str = "purchase";

/// Operation label recorded for client-initiated debits.
pub const USE_OPERATION: &str = "use";

/// One immutable record of a balance change, embedded in the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditHistoryEntry {
    /// Unique entry ID (ULID for time-ordering).
    pub id: EntryId,

    /// Tool name, `"purchase"` or `"use"`.
    pub operation: String,

    /// Positive for additions, negative for deductions.
    pub amount: i64,

    /// When the change was made.
    pub timestamp: DateTime<Utc>,

    /// Human-readable description.
    pub description: String,
}

impl CreditHistoryEntry {
    /// Create a new entry stamped with the current time.
    #[must_use]
    pub fn new(operation: impl Into<String>, amount: i64, description: impl Into<String>) -> Self {
        Self {
            id: EntryId::generate(),
            operation: operation.into(),
            amount,
            timestamp: Utc::now(),
            description: description.into(),
        }
    }
}

/// Which usage counter an operation increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    /// A new image was generated.
    Generated,
    /// An existing image was edited.
    Edited,
}

/// A balance change to be applied atomically by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditChange {
    /// The history entry to append. Its `amount` is the balance delta.
    pub entry: CreditHistoryEntry,
    /// Usage counter to bump alongside the balance.
    pub usage: Option<UsageKind>,
}

impl CreditChange {
    /// A deduction charged for a gated operation.
    #[must_use]
    pub fn debit(cost: &CreditCost) -> Self {
        Self {
            entry: CreditHistoryEntry::new(
                cost.operation.clone(),
                -cost.amount.saturating_abs(),
                format!("Used {} credits for {}", cost.amount.saturating_abs(), cost.operation),
            ),
            usage: cost.usage,
        }
    }

    /// A credit purchase.
    #[must_use]
    pub fn purchase(amount: i64, description: Option<String>) -> Self {
        Self {
            entry: CreditHistoryEntry::new(
                PURCHASE_OPERATION,
                amount.saturating_abs(),
                description
                    .unwrap_or_else(|| format!("Purchased {} credits", amount.saturating_abs())),
            ),
            usage: None,
        }
    }

    /// A direct debit not tied to an image operation.
    #[must_use]
    pub fn manual_use(amount: i64, description: Option<String>) -> Self {
        Self {
            entry: CreditHistoryEntry::new(
                USE_OPERATION,
                -amount.saturating_abs(),
                description
                    .unwrap_or_else(|| format!("Used {} credits", amount.saturating_abs())),
            ),
            usage: None,
        }
    }

    /// The signed balance delta.
    #[must_use]
    pub const fn delta(&self) -> i64 {
        self.entry.amount
    }
}

/// The price of one gated operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCost {
    /// Label written to the history entry.
    pub operation: String,
    /// Credits required (non-negative).
    pub amount: i64,
    /// Usage counter bumped on settlement.
    pub usage: Option<UsageKind>,
}

impl CreditCost {
    /// A cost that is not tied to an image tool.
    #[must_use]
    pub fn new(operation: impl Into<String>, amount: i64) -> Self {
        Self {
            operation: operation.into(),
            amount,
            usage: None,
        }
    }

    /// Whether the operation is free and skips settlement.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.amount == 0
    }
}

/// The image tools exposed by PromptPix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageOperation {
    /// Generate an image from a text prompt.
    TextToImage,
    /// Upscale an existing image.
    Upscale,
    /// Extend an image beyond its borders.
    Uncrop,
    /// Remove the background of an image.
    RemoveBackground,
}

impl ImageOperation {
    /// All operations, in display order.
    pub const ALL: [Self; 4] = [
        Self::TextToImage,
        Self::Upscale,
        Self::Uncrop,
        Self::RemoveBackground,
    ];

    /// The label recorded in credit history.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TextToImage => "text-to-image",
            Self::Upscale => "upscale",
            Self::Uncrop => "uncrop",
            Self::RemoveBackground => "remove-background",
        }
    }

    /// The usage counter this operation bumps.
    #[must_use]
    pub const fn usage_kind(self) -> UsageKind {
        match self {
            Self::TextToImage => UsageKind::Generated,
            Self::Upscale | Self::Uncrop | Self::RemoveBackground => UsageKind::Edited,
        }
    }

    /// Build the cost for this operation at the given price.
    #[must_use]
    pub fn cost(self, amount: i64) -> CreditCost {
        CreditCost {
            operation: self.label().to_string(),
            amount,
            usage: Some(self.usage_kind()),
        }
    }
}

/// Credit prices per image operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCosts {
    /// Text-to-image price.
    pub text_to_image: i64,
    /// Upscale price.
    pub upscale: i64,
    /// Uncrop price.
    pub uncrop: i64,
    /// Background removal price.
    pub remove_background: i64,
}

impl Default for OperationCosts {
    fn default() -> Self {
        Self {
            text_to_image: 1,
            upscale: 2,
            uncrop: 2,
            remove_background: 1,
        }
    }
}

impl OperationCosts {
    /// The configured cost of `operation`.
    #[must_use]
    pub fn cost_of(&self, operation: ImageOperation) -> CreditCost {
        let amount = match operation {
            ImageOperation::TextToImage => self.text_to_image,
            ImageOperation::Upscale => self.upscale,
            ImageOperation::Uncrop => self.uncrop,
            ImageOperation::RemoveBackground => self.remove_background,
        };
        operation.cost(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_is_always_negative() {
        let change = CreditChange::debit(&ImageOperation::Upscale.cost(2));
        assert_eq!(change.delta(), -2);
        assert_eq!(change.entry.operation, "upscale");
        assert_eq!(change.usage, Some(UsageKind::Edited));
    }

    #[test]
    fn purchase_is_positive_with_default_description() {
        let change = CreditChange::purchase(5, None);
        assert_eq!(change.delta(), 5);
        assert_eq!(change.entry.operation, PURCHASE_OPERATION);
        assert_eq!(change.entry.description, "Purchased 5 credits");
        assert_eq!(change.usage, None);
    }

    #[test]
    fn manual_use_keeps_custom_description() {
        let change = CreditChange::manual_use(3, Some("Gallery export".into()));
        assert_eq!(change.delta(), -3);
        assert_eq!(change.entry.description, "Gallery export");
    }

    #[test]
    fn default_costs() {
        let costs = OperationCosts::default();
        assert_eq!(costs.cost_of(ImageOperation::TextToImage).amount, 1);
        assert_eq!(costs.cost_of(ImageOperation::Upscale).amount, 2);
        assert_eq!(costs.cost_of(ImageOperation::Uncrop).amount, 2);
        assert_eq!(costs.cost_of(ImageOperation::RemoveBackground).amount, 1);
    }

    #[test]
    fn text_to_image_counts_as_generated() {
        assert_eq!(ImageOperation::TextToImage.usage_kind(), UsageKind::Generated);
        assert_eq!(ImageOperation::RemoveBackground.usage_kind(), UsageKind::Edited);
    }

    #[test]
    fn entry_wire_layout() {
        let entry = CreditHistoryEntry::new("upscale", -2, "Used 2 credits for upscale");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["operation"], "upscale");
        assert_eq!(json["amount"], -2);
        assert!(json["timestamp"].is_string());
        assert_eq!(json["description"], "Used 2 credits for upscale");
    }
}
