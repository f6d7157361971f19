use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::{queued, QueuedResponse};
use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::game::InboundMessage;
use crate::infrastructure::Inbound;

/// Request body naming an agent
#[derive(Debug, Deserialize)]
pub struct VehicleRequest {
    pub vname: String,
}

impl VehicleRequest {
    fn validated(self) -> Result<String, ApiError> {
        let vname = self.vname.trim().to_string();
        if vname.is_empty() {
            return Err(ApiError::bad_request("vname must not be empty"));
        }
        Ok(vname)
    }
}

/// Request a tag; resolved on the next cycle
///
/// POST /api/tags
pub async fn request_tag(
    State(state): State<AppState>,
    Json(req): Json<VehicleRequest>,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    let vname = req.validated()?;
    state
        .driver
        .submit(Inbound::Message(InboundMessage::TagRequest { vname }))
        .await?;

    Ok(queued())
}

/// Request release of a tagged agent
///
/// POST /api/untags
pub async fn request_untag(
    State(state): State<AppState>,
    Json(req): Json<VehicleRequest>,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    let vname = req.validated()?;
    state
        .driver
        .submit(Inbound::Message(InboundMessage::UntagRequest { vname }))
        .await?;

    Ok(queued())
}
