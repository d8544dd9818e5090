//! PromptPix HTTP client implementation.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::types::{
    BalanceData, CreditAmountRequest, CreditHistoryEntry, Envelope, ErrorEnvelope, HistoryData,
    User, UserData,
};

/// PromptPix API client acting for one user.
#[derive(Debug, Clone)]
pub struct PromptPixClient {
    client: Client,
    base_url: String,
    token: String,
}

impl PromptPixClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the service (e.g., `"http://promptpix:8080"`)
    /// * `token` - The user's bearer token
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, token, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        token: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Get the caller's account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_account(&self) -> Result<User, ClientError> {
        let data: UserData = self.get("/api/v1/accounts/me", &[]).await?;
        Ok(data.user)
    }

    /// Get the caller's current balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_balance(&self) -> Result<i64, ClientError> {
        let data: BalanceData = self.get("/api/v1/credits/balance", &[]).await?;
        Ok(data.credits)
    }

    /// Add purchased credits.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn add_credits(
        &self,
        amount: i64,
        description: Option<&str>,
    ) -> Result<User, ClientError> {
        self.post_amount("/api/v1/credits/add", amount, description)
            .await
    }

    /// Debit credits.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientCredits` if the balance does not cover `amount`,
    /// or another error if the request fails.
    pub async fn use_credits(
        &self,
        amount: i64,
        description: Option<&str>,
    ) -> Result<User, ClientError> {
        self.post_amount("/api/v1/credits/use", amount, description)
            .await
    }

    /// List the most recent history entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn credit_history(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<CreditHistoryEntry>, ClientError> {
        let query: Vec<(&str, String)> = limit
            .map(|limit| vec![("limit", limit.to_string())])
            .unwrap_or_default();
        let data: HistoryData = self.get("/api/v1/credits/history", &query).await?;
        Ok(data.history)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        handle_response(response).await
    }

    async fn post_amount(
        &self,
        path: &str,
        amount: i64,
        description: Option<&str>,
    ) -> Result<User, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let request = CreditAmountRequest {
            amount,
            description,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        let data: UserData = handle_response(response).await?;
        Ok(data.user)
    }
}

/// Unwrap the success envelope or map the failure envelope to a typed error.
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        let body = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)?;
        return Ok(envelope.data);
    }

    let Ok(failure) = response.json::<ErrorEnvelope>().await else {
        return Err(ClientError::Api {
            message: format!("HTTP {status}"),
            status: status.as_u16(),
        });
    };

    tracing::debug!(status = %status, message = %failure.message, "PromptPix request failed");

    let detail = |key: &str| {
        failure
            .details
            .as_ref()
            .and_then(|d| d.get(key))
            .and_then(serde_json::Value::as_i64)
    };

    match status {
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ClientError::AccountNotFound),
        StatusCode::BAD_REQUEST => match (detail("required"), detail("available")) {
            (Some(required), Some(available)) => Err(ClientError::InsufficientCredits {
                available,
                required,
            }),
            _ => Err(ClientError::Api {
                message: failure.message,
                status: status.as_u16(),
            }),
        },
        _ => Err(ClientError::Api {
            message: failure.message,
            status: status.as_u16(),
        }),
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_json(credits: i64) -> serde_json::Value {
        json!({
            "user_id": "8f7c3f5e-1d2a-4b8e-9a51-2f4d7f0c9b11",
            "email": "ada@example.com",
            "display_name": "Ada",
            "credits": credits,
            "profile": { "bio": null, "picture_url": null },
            "usage": { "images_generated": 0, "images_edited": 0 },
            "created_at": "2026-01-01T12:00:00+00:00",
            "updated_at": "2026-01-01T12:00:00+00:00"
        })
    }

    fn client(server: &MockServer) -> PromptPixClient {
        PromptPixClient::new(server.uri(), "user-jwt").unwrap()
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = PromptPixClient::new("http://localhost:8080/", "t").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn get_balance_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/credits/balance"))
            .and(header("authorization", "Bearer user-jwt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "success", "data": { "credits": 7 } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server).get_balance().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn get_account_parses_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/accounts/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({ "status": "success", "data": { "user": user_json(10) } }),
            ))
            .mount(&server)
            .await;

        let user = client(&server).get_account().await.unwrap();
        assert_eq!(user.display_name, "Ada");
        assert_eq!(user.credits, 10);
    }

    #[tokio::test]
    async fn add_credits_posts_amount() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/credits/add"))
            .and(body_json(json!({ "amount": 5, "description": "Gift" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({ "status": "success", "data": { "user": user_json(15) } }),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let user = client(&server)
            .add_credits(5, Some("Gift"))
            .await
            .unwrap();
        assert_eq!(user.credits, 15);
    }

    #[tokio::test]
    async fn use_credits_maps_insufficient_credits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/credits/use"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": "fail",
                "message": "Insufficient credits: 5 required, 3 available",
                "details": { "required": 5, "available": 3 }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .use_credits(5, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::InsufficientCredits {
                available: 3,
                required: 5
            }
        ));
    }

    #[tokio::test]
    async fn validation_failure_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/credits/add"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": "fail",
                "message": "Amount must be a positive integer"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .add_credits(0, None)
            .await
            .unwrap_err();
        match err {
            ClientError::Api { message, status } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Amount must be a positive integer");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn credit_history_passes_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/credits/history"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": { "history": [{
                    "id": "01HV6Y9Z4S3W0B1M2N3P4Q5R6S",
                    "operation": "purchase",
                    "amount": 5,
                    "timestamp": "2026-01-01T12:00:00Z",
                    "description": "Purchased 5 credits"
                }] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let history = client(&server).credit_history(Some(2)).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, 5);
    }

    #[tokio::test]
    async fn missing_account_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/accounts/me"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status": "fail",
                "message": "Account not found"
            })))
            .mount(&server)
            .await;

        assert!(matches!(
            client(&server).get_account().await,
            Err(ClientError::AccountNotFound)
        ));
    }
}
