//! Common test utilities for promptpix integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use tokio::sync::Barrier;

use promptpix_core::UserId;
use promptpix_service::{
    create_router, sign_token, AppState, ImageApi, ImageOutput, ImageRequest, ImagingError,
    ServiceConfig,
};
use promptpix_store::{MemoryStore, Store};

/// Bytes every successful stub call returns.
pub const STUB_IMAGE: &[u8] = b"\x89PNG stub";

/// Image backend that answers without leaving the process.
#[derive(Default)]
pub struct StubImageApi {
    /// Fail every call with an API error.
    pub fail: bool,
    /// Hold every call until this many calls are in flight.
    pub barrier: Option<Arc<Barrier>>,
    /// Number of calls seen.
    pub calls: AtomicUsize,
}

impl StubImageApi {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn rendezvous(parties: usize) -> Self {
        Self {
            barrier: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageApi for StubImageApi {
    async fn run(&self, _request: ImageRequest) -> Result<ImageOutput, ImagingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.fail {
            return Err(ImagingError::Api {
                status: 500,
                message: "upstream exploded".into(),
            });
        }
        Ok(ImageOutput {
            bytes: STUB_IMAGE.to_vec(),
            content_type: "image/png".into(),
        })
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server.
    pub store: Arc<MemoryStore>,
    /// The image backend behind the server.
    pub images: Arc<StubImageApi>,
    /// Configuration the server runs with.
    pub config: ServiceConfig,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
}

impl TestHarness {
    /// Create a new test harness with a fresh store.
    pub fn new() -> Self {
        Self::with_image_api(StubImageApi::default())
    }

    /// Create a harness around a specific image backend.
    pub fn with_image_api(images: StubImageApi) -> Self {
        Self::with_config(Self::test_config(), images)
    }

    /// Configuration every harness starts from.
    pub fn test_config() -> ServiceConfig {
        ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            jwt_secret: "integration-test-secret".into(),
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            ..ServiceConfig::default()
        }
    }

    /// Create a harness with a custom configuration.
    pub fn with_config(config: ServiceConfig, images: StubImageApi) -> Self {
        let store = Arc::new(MemoryStore::new());
        let images = Arc::new(images);

        let state = AppState::new(Arc::clone(&store) as Arc<dyn Store>, config.clone())
            .with_image_api(Arc::clone(&images) as Arc<dyn ImageApi>);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            images,
            config,
            test_user_id: UserId::generate(),
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        self.auth_header_for(&self.test_user_id)
    }

    /// Authorization header for any user.
    pub fn auth_header_for(&self, user_id: &UserId) -> String {
        let token = sign_token(&self.config, user_id, chrono::Duration::minutes(10))
            .expect("Failed to sign token");
        format!("Bearer {token}")
    }

    /// Get a different user's auth header (for testing isolation).
    pub fn other_user_auth_header(&self) -> String {
        self.auth_header_for(&UserId::generate())
    }

    /// Register the test user through the API.
    pub async fn register(&self) {
        self.server
            .post("/api/v1/accounts")
            .add_header("authorization", self.user_auth_header())
            .json(&json!({ "email": "ada@example.com", "display_name": "Ada" }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    /// Set the test user's balance directly in the store.
    pub fn set_credits(&self, credits: i64) {
        let mut account = self
            .store
            .get_account(&self.test_user_id)
            .expect("store read")
            .expect("account registered");
        let delta = credits - account.credits;
        if delta != 0 {
            let change = if delta > 0 {
                promptpix_core::CreditChange::purchase(delta, None)
            } else {
                promptpix_core::CreditChange::manual_use(-delta, None)
            };
            account = self
                .store
                .apply_credit_change(&self.test_user_id, &change)
                .expect("credit change");
        }
        assert_eq!(account.credits, credits);
    }

    /// The test user's account as stored.
    pub fn account(&self) -> promptpix_core::Account {
        self.store
            .get_account(&self.test_user_id)
            .expect("store read")
            .expect("account registered")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
