//! Image operation handlers.
//!
//! Each route sits behind [`credit_guard`](crate::credit_guard::credit_guard),
//! which gates before the handler runs and settles after it returns success.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::imaging::{ImageOutput, ImageRequest};
use crate::state::AppState;

/// Longest accepted prompt, in characters.
const MAX_PROMPT_CHARS: usize = 1000;

/// Largest upscale target edge, in pixels.
const MAX_UPSCALE_EDGE: u32 = 4096;

/// Generate request.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Prompt text.
    pub prompt: String,
}

/// Upscale query parameters.
#[derive(Debug, Deserialize)]
pub struct UpscaleParams {
    /// Target width in pixels.
    pub target_width: u32,
    /// Target height in pixels.
    pub target_height: u32,
}

/// Uncrop query parameters. Missing edges are not extended.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UncropParams {
    /// Pixels to add on the left.
    pub extend_left: u32,
    /// Pixels to add on the right.
    pub extend_right: u32,
    /// Pixels to add on top.
    pub extend_up: u32,
    /// Pixels to add at the bottom.
    pub extend_down: u32,
}

/// Generate an image from a prompt.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateRequest>,
) -> Result<Response, ApiError> {
    let prompt = body.prompt.trim();
    if prompt.is_empty() || prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Prompt must be 1 to {MAX_PROMPT_CHARS} characters"
        )));
    }

    let output = state
        .images
        .run(ImageRequest::TextToImage {
            prompt: prompt.to_string(),
        })
        .await?;
    Ok(image_response(output))
}

/// Upscale an image.
pub async fn upscale(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UpscaleParams>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let image = require_image(body)?;
    for edge in [params.target_width, params.target_height] {
        if edge == 0 || edge > MAX_UPSCALE_EDGE {
            return Err(ApiError::BadRequest(format!(
                "Target size must be 1 to {MAX_UPSCALE_EDGE} pixels"
            )));
        }
    }

    let output = state
        .images
        .run(ImageRequest::Upscale {
            image,
            target_width: params.target_width,
            target_height: params.target_height,
        })
        .await?;
    Ok(image_response(output))
}

/// Extend an image past its borders.
pub async fn uncrop(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UncropParams>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let image = require_image(body)?;
    if params.extend_left == 0
        && params.extend_right == 0
        && params.extend_up == 0
        && params.extend_down == 0
    {
        return Err(ApiError::BadRequest(
            "At least one edge must be extended".into(),
        ));
    }

    let output = state
        .images
        .run(ImageRequest::Uncrop {
            image,
            extend_left: params.extend_left,
            extend_right: params.extend_right,
            extend_up: params.extend_up,
            extend_down: params.extend_down,
        })
        .await?;
    Ok(image_response(output))
}

/// Remove the background of an image.
pub async fn remove_background(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let image = require_image(body)?;
    let output = state
        .images
        .run(ImageRequest::RemoveBackground { image })
        .await?;
    Ok(image_response(output))
}

fn require_image(body: Bytes) -> Result<Vec<u8>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Image body is required".into()));
    }
    Ok(body.to_vec())
}

fn image_response(output: ImageOutput) -> Response {
    ([(CONTENT_TYPE, output.content_type)], output.bytes).into_response()
}
