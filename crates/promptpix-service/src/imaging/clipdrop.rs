//! Clipdrop-style image API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::{ImageApi, ImageOutput, ImageRequest, ImagingError};

/// Content type assumed when the API does not send one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Multipart image API client.
#[derive(Debug, Clone)]
pub struct ClipdropClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ClipdropClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API URL (e.g., `"https://clipdrop-api.co"`)
    /// * `api_key` - API key sent as `x-api-key`
    /// * `timeout` - per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ImagingError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImagingError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn post_form(&self, path: &str, form: Form) -> Result<ImageOutput, ImagingError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImagingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(ImageOutput {
            bytes,
            content_type,
        })
    }
}

fn image_part(image: Vec<u8>) -> Result<Part, ImagingError> {
    Ok(Part::bytes(image)
        .file_name("image")
        .mime_str(FALLBACK_CONTENT_TYPE)?)
}

#[async_trait]
impl ImageApi for ClipdropClient {
    async fn run(&self, request: ImageRequest) -> Result<ImageOutput, ImagingError> {
        let operation = request.operation();

        let (path, form) = match request {
            ImageRequest::TextToImage { prompt } => {
                ("/text-to-image/v1", Form::new().text("prompt", prompt))
            }
            ImageRequest::Upscale {
                image,
                target_width,
                target_height,
            } => (
                "/image-upscaling/v1/upscale",
                Form::new()
                    .part("image_file", image_part(image)?)
                    .text("target_width", target_width.to_string())
                    .text("target_height", target_height.to_string()),
            ),
            ImageRequest::Uncrop {
                image,
                extend_left,
                extend_right,
                extend_up,
                extend_down,
            } => (
                "/uncrop/v1",
                Form::new()
                    .part("image_file", image_part(image)?)
                    .text("extend_left", extend_left.to_string())
                    .text("extend_right", extend_right.to_string())
                    .text("extend_up", extend_up.to_string())
                    .text("extend_down", extend_down.to_string()),
            ),
            ImageRequest::RemoveBackground { image } => (
                "/remove-background/v1",
                Form::new().part("image_file", image_part(image)?),
            ),
        };

        tracing::debug!(operation = %operation.label(), path = %path, "Calling image API");
        self.post_form(path, form).await
    }
}
