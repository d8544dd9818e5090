//! PromptPix HTTP API Service.
//!
//! This crate provides the HTTP API for PromptPix, including:
//!
//! - Account registration and profile management
//! - Credit balance, purchases, debits and history
//! - Credit-guarded image operations backed by an external image API
//!
//! # Authentication
//!
//! Every `/api/v1` route expects an HS256 bearer token issued by the identity
//! provider. The `sub` claim is the account's user ID.
//!
//! # Charging
//!
//! Image routes are wrapped by [`credit_guard`](credit_guard::credit_guard):
//! the [`CreditLedger`] gate runs first, the handler calls the image API, and
//! settlement charges the account only if the handler succeeded.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers must be async for axum

pub mod auth;
pub mod config;
pub mod credit_guard;
pub mod error;
pub mod handlers;
pub mod imaging;
pub mod ledger;
pub mod routes;
pub mod state;
pub mod throttle;

pub use auth::{sign_token, AuthUser};
pub use config::{ServiceConfig, StoreBackend};
pub use error::ApiError;
pub use imaging::{ClipdropClient, ImageApi, ImageOutput, ImageRequest, ImagingError};
pub use ledger::{CreditContext, CreditLedger};
pub use routes::create_router;
pub use state::AppState;
pub use throttle::{GovernorThrottle, UpdateThrottle};
