//! API handlers.

pub mod accounts;
pub mod credits;
pub mod health;
pub mod images;

use axum::Json;
use serde::Serialize;

/// JSON success envelope: `{ "status": "success", "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// Always `"success"`.
    pub status: &'static str,
    /// Response payload.
    pub data: T,
}

/// Wrap `data` in the success envelope.
pub fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        status: "success",
        data,
    })
}
