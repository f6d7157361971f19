pub mod reports;
pub mod status;
pub mod tags;

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Body returned for work handed to the game loop
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
}

pub(crate) fn queued() -> (StatusCode, Json<QueuedResponse>) {
    (StatusCode::ACCEPTED, Json(QueuedResponse { queued: true }))
}
