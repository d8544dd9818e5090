//! Credit handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use promptpix_core::CreditHistoryEntry;

use super::accounts::UserData;
use super::{success, Envelope};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Balance payload.
#[derive(Debug, Serialize)]
pub struct BalanceData {
    /// Current balance.
    pub credits: i64,
}

/// Add or use credits request.
#[derive(Debug, Deserialize)]
pub struct CreditAmountRequest {
    /// Number of credits; must be a positive integer.
    pub amount: Option<i64>,
    /// Optional history description.
    pub description: Option<String>,
}

/// History query parameters.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum entries to return.
    pub limit: Option<usize>,
}

/// History payload.
#[derive(Debug, Serialize)]
pub struct HistoryData {
    /// Entries, newest first.
    pub history: Vec<CreditHistoryEntry>,
}

/// Get the current balance.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Envelope<BalanceData>>, ApiError> {
    let account = state.ledger.load(&auth.user_id)?;
    Ok(success(BalanceData {
        credits: account.credits,
    }))
}

/// Add purchased credits.
pub async fn add_credits(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreditAmountRequest>,
) -> Result<Json<Envelope<UserData>>, ApiError> {
    let account = state
        .ledger
        .add_credits(&auth.user_id, body.amount, body.description)?;
    Ok(success(UserData::from(&account)))
}

/// Debit credits directly.
pub async fn use_credits(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreditAmountRequest>,
) -> Result<Json<Envelope<UserData>>, ApiError> {
    let account = state
        .ledger
        .use_credits(&auth.user_id, body.amount, body.description)?;
    Ok(success(UserData::from(&account)))
}

/// List the most recent history entries.
pub async fn credit_history(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Envelope<HistoryData>>, ApiError> {
    let history = state.ledger.history(&auth.user_id, query.limit)?;
    Ok(success(HistoryData { history }))
}
