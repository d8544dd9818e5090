//! Application state.

use std::sync::Arc;
use std::time::Duration;

use promptpix_store::Store;

use crate::config::ServiceConfig;
use crate::imaging::{ClipdropClient, DisabledImageApi, ImageApi};
use crate::ledger::CreditLedger;
use crate::throttle::{GovernorThrottle, UpdateThrottle};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The account store.
    pub store: Arc<dyn Store>,

    /// Credit accounting over `store`.
    pub ledger: CreditLedger,

    /// Service configuration.
    pub config: ServiceConfig,

    /// External image backend.
    pub images: Arc<dyn ImageApi>,

    /// Profile update throttle.
    pub throttle: Arc<dyn UpdateThrottle>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let images: Arc<dyn ImageApi> = match config.imaging_api_key.as_ref() {
            Some(key) => match ClipdropClient::new(
                &config.imaging_api_url,
                key,
                Duration::from_secs(config.request_timeout_seconds),
            ) {
                Ok(client) => {
                    tracing::info!(imaging_url = %config.imaging_api_url, "Image API enabled");
                    Arc::new(client)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create image API client");
                    Arc::new(DisabledImageApi)
                }
            },
            None => {
                tracing::warn!("Image API not configured - image routes will fail");
                Arc::new(DisabledImageApi)
            }
        };

        let throttle = Arc::new(GovernorThrottle::new(Duration::from_secs(
            config.profile_update_cooldown_seconds,
        )));

        let ledger = CreditLedger::new(Arc::clone(&store))
            .with_history_default_limit(config.history_default_limit);

        Self {
            store,
            ledger,
            config,
            images,
            throttle,
        }
    }

    /// Replace the image backend.
    #[must_use]
    pub fn with_image_api(mut self, images: Arc<dyn ImageApi>) -> Self {
        self.images = images;
        self
    }

    /// Replace the profile update throttle.
    #[must_use]
    pub fn with_throttle(mut self, throttle: Arc<dyn UpdateThrottle>) -> Self {
        self.throttle = throttle;
        self
    }
}
