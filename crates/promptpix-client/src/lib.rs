//! PromptPix Client SDK.
//!
//! This crate provides a client library for frontends and tools that talk to
//! the PromptPix credits API on behalf of a signed-in user.
//!
//! # Example
//!
//! ```no_run
//! use promptpix_client::PromptPixClient;
//!
//! # async fn example() -> Result<(), promptpix_client::ClientError> {
//! let client = PromptPixClient::new("http://promptpix:8080", "user-jwt")?;
//!
//! let user = client.add_credits(20, Some("Starter pack")).await?;
//! println!("New balance: {} credits", user.credits);
//!
//! for entry in client.credit_history(Some(10)).await? {
//!     println!("{} {:+} {}", entry.timestamp, entry.amount, entry.description);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, PromptPixClient};
pub use error::ClientError;
pub use types::*;
