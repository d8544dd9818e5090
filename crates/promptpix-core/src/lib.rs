//! Core types for the PromptPix credits service.
//!
//! This crate provides the domain types shared by the store, the HTTP service
//! and the client SDK:
//!
//! - **Identifiers**: `UserId`, `EntryId`
//! - **Accounts**: `Account`, `Profile`, `UsageCounters`
//! - **Credits**: `CreditHistoryEntry`, `CreditChange`, `ImageOperation`, `OperationCosts`
//! - **Errors**: `LedgerError`
//!
//! # Credit Unit
//!
//! One credit pays for one unit of image work. Balances are stored as `i64`
//! so that a transient overdraft produced by two racing settlements can be
//! observed and compensated; a settled balance is never negative.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod credits;
pub mod error;
pub mod ids;

pub use account::{Account, Profile, UsageCounters, DEFAULT_STARTING_CREDITS};
pub use credits::{
    CreditChange, CreditCost, CreditHistoryEntry, ImageOperation, OperationCosts, UsageKind,
    PURCHASE_OPERATION, USE_OPERATION,
};
pub use error::{LedgerError, Result};
pub use ids::{EntryId, IdError, UserId};
