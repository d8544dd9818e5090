//! Credit guard middleware for the image routes.
//!
//! Runs the gate before the handler and settles after it. A handler that
//! fails is never charged; its response passes through untouched.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use axum::RequestExt;

use promptpix_core::{ImageOperation, LedgerError};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the balance after settlement.
pub const CREDITS_REMAINING_HEADER: &str = "x-credits-remaining";

/// Middleware state: the app plus the operation being guarded.
#[derive(Clone)]
pub struct CreditGuard {
    state: Arc<AppState>,
    operation: ImageOperation,
}

impl CreditGuard {
    /// Guard `operation` using the costs configured in `state`.
    #[must_use]
    pub fn new(state: Arc<AppState>, operation: ImageOperation) -> Self {
        Self { state, operation }
    }
}

/// Gate, run the handler, then settle on success.
pub async fn credit_guard(
    State(guard): State<CreditGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ledger = &guard.state.ledger;
    let cost = guard.state.config.operation_costs.cost_of(guard.operation);

    let user_id = request
        .extract_parts_with_state::<AuthUser, _>(&guard.state)
        .await
        .map(|auth| auth.user_id)
        .map_err(|_| LedgerError::Unauthenticated)?;

    let context = ledger.gate(Some(&user_id), &cost)?;
    if let Some(context) = &context {
        request.extensions_mut().insert(context.clone());
    }

    let mut response = next.run(request).await;
    if !response.status().is_success() {
        tracing::debug!(
            operation = %guard.operation.label(),
            status = %response.status(),
            "Guarded handler failed, nothing charged"
        );
        return Ok(response);
    }

    let balance = match ledger.settle(context)? {
        Some(account) => account.credits,
        // Free operation; report the current balance.
        None => ledger.load(&user_id)?.credits,
    };

    response
        .headers_mut()
        .insert(CREDITS_REMAINING_HEADER, HeaderValue::from(balance));
    Ok(response)
}
