use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::domain::zone::Zone;
use crate::game::{AgentStatus, FieldSnapshot, PublishedPost, TagError};

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// Full field snapshot from the last cycle
///
/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<FieldSnapshot> {
    Json(state.driver.snapshot().as_ref().clone())
}

/// Response listing tagged agents
#[derive(Debug, Serialize)]
pub struct TaggedResponse {
    pub time: f64,
    pub tagged: Vec<String>,
}

/// Currently tagged agents
///
/// GET /api/tagged
pub async fn get_tagged(State(state): State<AppState>) -> Json<TaggedResponse> {
    let snapshot = state.driver.snapshot();
    Json(TaggedResponse {
        time: snapshot.time,
        tagged: snapshot.tagged.clone(),
    })
}

/// One agent's record and tag state
///
/// GET /api/agents/:name
pub async fn get_agent(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<AgentStatus>, ApiError> {
    let snapshot = state.driver.snapshot();
    let status = snapshot
        .agent(&name)
        .cloned()
        .ok_or_else(|| ApiError::from(TagError::UnknownVehicle(name)))?;

    Ok(Json(status))
}

/// Zone definitions
///
/// GET /api/zones
pub async fn get_zones(State(state): State<AppState>) -> Json<Vec<Zone>> {
    Json(state.driver.snapshot().zones.clone())
}

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    #[serde(default)]
    pub after: u64,
}

/// Recent posts newer than `after`
///
/// GET /api/posts?after=N
pub async fn get_posts(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Json<Vec<PublishedPost>> {
    Json(state.driver.snapshot().posts_after(query.after))
}
