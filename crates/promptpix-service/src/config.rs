//! Service configuration.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use promptpix_core::{OperationCosts, DEFAULT_STARTING_CREDITS};

/// Default number of history entries returned by the history query.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Upper bound on the history limit a client may request.
pub const MAX_HISTORY_LIMIT: usize = 500;

/// Which account store to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local store; data is lost on restart.
    Memory,
    /// Persistent `RocksDB` store under `data_dir`.
    RocksDb,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "rocksdb" | "rocks" => Ok(Self::RocksDb),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Storage backend (default: memory).
    pub store_backend: StoreBackend,

    /// Path to `RocksDB` data directory (default: "/data/promptpix").
    pub data_dir: String,

    /// HS256 secret shared with the identity provider.
    pub jwt_secret: String,

    /// Expected JWT audience (default: "promptpix").
    pub jwt_audience: String,

    /// Credits granted at registration.
    pub starting_credits: i64,

    /// Credit price per image operation.
    pub operation_costs: OperationCosts,

    /// Default history page size.
    pub history_default_limit: usize,

    /// Minimum seconds between two profile updates of one account.
    pub profile_update_cooldown_seconds: u64,

    /// Image API base URL (default: `<https://clipdrop-api.co>`).
    pub imaging_api_url: String,

    /// Image API key (optional; image routes answer 502 without it).
    pub imaging_api_key: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Image API secrets file structure.
#[derive(Debug, Deserialize)]
struct ImagingSecrets {
    #[serde(default)]
    api_url: Option<String>,
    api_key: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let (imaging_api_url, imaging_api_key) = load_imaging_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            store_backend: env_parse("STORE_BACKEND").unwrap_or(defaults.store_backend),
            data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or_else(|_| {
                tracing::warn!("JWT_SECRET not set - using an insecure development secret");
                defaults.jwt_secret
            }),
            jwt_audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.jwt_audience),
            starting_credits: env_credits("STARTING_CREDITS")
                .unwrap_or(defaults.starting_credits),
            operation_costs: OperationCosts {
                text_to_image: env_credits("CREDIT_COST_GENERATE")
                    .unwrap_or(defaults.operation_costs.text_to_image),
                upscale: env_credits("CREDIT_COST_UPSCALE")
                    .unwrap_or(defaults.operation_costs.upscale),
                uncrop: env_credits("CREDIT_COST_UNCROP")
                    .unwrap_or(defaults.operation_costs.uncrop),
                remove_background: env_credits("CREDIT_COST_REMOVE_BACKGROUND")
                    .unwrap_or(defaults.operation_costs.remove_background),
            },
            history_default_limit: env_parse("HISTORY_DEFAULT_LIMIT")
                .unwrap_or(defaults.history_default_limit),
            profile_update_cooldown_seconds: env_parse("PROFILE_UPDATE_COOLDOWN_SECONDS")
                .unwrap_or(defaults.profile_update_cooldown_seconds),
            imaging_api_url: imaging_api_url.unwrap_or(defaults.imaging_api_url),
            imaging_api_key,
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = %name, value = %raw, "Ignoring unparsable setting");
            None
        }
    }
}

/// A credit amount from the environment. Negative values fall back to the default.
fn env_credits(name: &str) -> Option<i64> {
    env_parse(name).and_then(|value| non_negative(name, value))
}

fn non_negative(name: &str, value: i64) -> Option<i64> {
    if value < 0 {
        tracing::warn!(variable = %name, value = value, "Ignoring negative credit setting");
        return None;
    }
    Some(value)
}

/// Load image API secrets from file or environment.
fn load_imaging_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/imaging.json",
        "promptpix/.secrets/imaging.json",
        "../.secrets/imaging.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<ImagingSecrets>(path) {
            tracing::info!(path = %path, "Loaded image API secrets from file");
            return (secrets.api_url, Some(secrets.api_key));
        }
    }

    tracing::debug!("Image API secrets file not found, using environment variables");
    (
        std::env::var("IMAGING_API_URL").ok(),
        std::env::var("IMAGING_API_KEY").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            store_backend: StoreBackend::Memory,
            data_dir: "/data/promptpix".into(),
            jwt_secret: "promptpix-dev-secret".into(),
            jwt_audience: "promptpix".into(),
            starting_credits: DEFAULT_STARTING_CREDITS,
            operation_costs: OperationCosts::default(),
            history_default_limit: DEFAULT_HISTORY_LIMIT,
            profile_update_cooldown_seconds: 30,
            imaging_api_url: "https://clipdrop-api.co".into(),
            imaging_api_key: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 10 * 1024 * 1024, // 10MB, room for source images
            request_timeout_seconds: 60,
        }
    }
}
