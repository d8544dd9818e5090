//! External image API.
//!
//! The service never touches pixels. Each operation forwards the caller's
//! input to the image API and hands back whatever bytes it returns.

mod clipdrop;

pub use clipdrop::ClipdropClient;

use async_trait::async_trait;

use promptpix_core::ImageOperation;

/// Error type for image API calls.
#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The image API answered with a non-success status.
    #[error("Image API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body, as returned.
        message: String,
    },

    /// No API key is configured.
    #[error("Image API is not configured")]
    NotConfigured,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Input for one image operation.
#[derive(Debug, Clone)]
pub enum ImageRequest {
    /// Generate an image from a prompt.
    TextToImage {
        /// Prompt text.
        prompt: String,
    },
    /// Upscale an image to the target size.
    Upscale {
        /// Source image bytes.
        image: Vec<u8>,
        /// Target width in pixels.
        target_width: u32,
        /// Target height in pixels.
        target_height: u32,
    },
    /// Extend an image past its borders.
    Uncrop {
        /// Source image bytes.
        image: Vec<u8>,
        /// Pixels to add on the left.
        extend_left: u32,
        /// Pixels to add on the right.
        extend_right: u32,
        /// Pixels to add on top.
        extend_up: u32,
        /// Pixels to add at the bottom.
        extend_down: u32,
    },
    /// Remove the background of an image.
    RemoveBackground {
        /// Source image bytes.
        image: Vec<u8>,
    },
}

impl ImageRequest {
    /// The operation this request performs.
    #[must_use]
    pub const fn operation(&self) -> ImageOperation {
        match self {
            Self::TextToImage { .. } => ImageOperation::TextToImage,
            Self::Upscale { .. } => ImageOperation::Upscale,
            Self::Uncrop { .. } => ImageOperation::Uncrop,
            Self::RemoveBackground { .. } => ImageOperation::RemoveBackground,
        }
    }
}

/// Image bytes returned by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutput {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// MIME type reported by the API.
    pub content_type: String,
}

/// An image backend.
#[async_trait]
pub trait ImageApi: Send + Sync {
    /// Run one operation.
    async fn run(&self, request: ImageRequest) -> Result<ImageOutput, ImagingError>;
}

/// Backend used when no API key is configured. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledImageApi;

#[async_trait]
impl ImageApi for DisabledImageApi {
    async fn run(&self, request: ImageRequest) -> Result<ImageOutput, ImagingError> {
        tracing::warn!(
            operation = %request.operation().label(),
            "Image request rejected, image API not configured"
        );
        Err(ImagingError::NotConfigured)
    }
}
