//! Account management handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use promptpix_core::{Account, Profile, UsageCounters};
use promptpix_store::Store;

use super::{success, Envelope};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Longest accepted display name, in characters.
const MAX_DISPLAY_NAME_CHARS: usize = 64;

/// Longest accepted bio, in characters.
const MAX_BIO_CHARS: usize = 500;

/// Account as returned by the API. The history has its own endpoint.
#[derive(Debug, Serialize)]
pub struct UserResponse {
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
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl From<&Account> for UserResponse {
    fn from(account: &Account) -> Self {
        Self {
            user_id: account.user_id.to_string(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            credits: account.credits,
            profile: account.profile.clone(),
            usage: account.usage,
            created_at: account.created_at.to_rfc3339(),
            updated_at: account.updated_at.to_rfc3339(),
        }
    }
}

/// `data` payload carrying one account.
#[derive(Debug, Serialize)]
pub struct UserData {
    /// The account.
    pub user: UserResponse,
}

impl From<&Account> for UserData {
    fn from(account: &Account) -> Self {
        Self {
            user: UserResponse::from(account),
        }
    }
}

/// Create account request.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Email address.
    pub email: String,
    /// Display name; defaults to the local part of the email.
    pub display_name: Option<String>,
}

/// Profile update request. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name.
    pub display_name: Option<String>,
    /// New bio.
    pub bio: Option<String>,
    /// New picture URL.
    pub picture_url: Option<String>,
}

/// Register the caller's account with the configured starting balance.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Envelope<UserData>>), ApiError> {
    let email = body.email.trim().to_lowercase();
    if !is_plausible_email(&email) {
        return Err(ApiError::BadRequest("A valid email is required".into()));
    }

    let display_name = match body.display_name {
        Some(name) => validate_display_name(&name)?,
        None => email.split('@').next().unwrap_or_default().to_string(),
    };

    if state.store.get_account(&auth.user_id)?.is_some()
        || state.store.find_account_by_email(&email)?.is_some()
    {
        return Err(ApiError::Conflict("Account already exists".into()));
    }

    let account = Account::new(
        auth.user_id,
        email,
        display_name,
        state.config.starting_credits,
    );
    state.store.insert_account(&account)?;

    tracing::info!(
        user_id = %auth.user_id,
        credits = account.credits,
        "Account created"
    );

    Ok((StatusCode::CREATED, success(UserData::from(&account))))
}

/// Get the current user's account.
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Envelope<UserData>>, ApiError> {
    let account = state.ledger.load(&auth.user_id)?;
    Ok(success(UserData::from(&account)))
}

/// Update the current user's profile.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<Envelope<UserData>>, ApiError> {
    let mut account = state.ledger.load(&auth.user_id)?;

    if let Some(name) = body.display_name {
        account.display_name = validate_display_name(&name)?;
    }
    if let Some(bio) = body.bio {
        if bio.chars().count() > MAX_BIO_CHARS {
            return Err(ApiError::BadRequest(format!(
                "Bio must be at most {MAX_BIO_CHARS} characters"
            )));
        }
        account.profile.bio = non_empty(bio);
    }
    if let Some(url) = body.picture_url {
        let url = url.trim().to_string();
        if !url.is_empty() && !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ApiError::BadRequest("Picture URL must be http(s)".into()));
        }
        account.profile.picture_url = non_empty(url);
    }

    // Only accepted requests count against the cooldown.
    state.throttle.check(&auth.user_id).map_err(|wait| {
        tracing::debug!(user_id = %auth.user_id, wait = ?wait, "Profile update throttled");
        ApiError::RateLimited {
            retry_after_seconds: wait.as_secs() + u64::from(wait.subsec_nanos() > 0),
        }
    })?;

    account.updated_at = chrono::Utc::now();
    let account = state.store.update_profile(&account)?;

    tracing::info!(user_id = %auth.user_id, "Profile updated");

    Ok(success(UserData::from(&account)))
}

/// Delete the current user's account.
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    state.store.delete_account(&auth.user_id)?;

    tracing::info!(user_id = %auth.user_id, "Account deleted");

    Ok(success(serde_json::json!({ "deleted": true })))
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

fn validate_display_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Display name must be 1 to {MAX_DISPLAY_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
