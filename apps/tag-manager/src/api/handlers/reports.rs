use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;

use super::{queued, QueuedResponse};
use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::domain::agent::PositionReport;
use crate::game::{InboundMessage, MailEnvelope};
use crate::infrastructure::Inbound;

/// Submit a position report
///
/// POST /api/reports
///
/// A body that does not decode as a report is still accepted and counted
/// as a dropped report by the game loop.
pub async fn submit_report(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    let inbound = match serde_json::from_value::<PositionReport>(body) {
        Ok(report) => Inbound::Message(InboundMessage::Report(report)),
        Err(e) => Inbound::RejectedReport(e.to_string()),
    };
    state.driver.submit(inbound).await?;

    Ok(queued())
}

/// Submit raw bus mail (`NODE_REPORT`, `TAG_REQUEST`, ...)
///
/// POST /api/mail
pub async fn submit_mail(
    State(state): State<AppState>,
    Json(mail): Json<MailEnvelope>,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    if mail.key.trim().is_empty() {
        return Err(ApiError::bad_request("Mail key must not be empty"));
    }

    state.driver.submit(Inbound::Mail(mail)).await?;

    Ok(queued())
}
