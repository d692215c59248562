//! Axum route handlers for the Match API.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::engine::{BatchScore, MatchResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct BatchMatchRequest {
    pub user_id: Uuid,
    pub job_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BatchMatchResponse {
    pub scores: BTreeMap<Uuid, BatchScore>,
}

/// GET /api/v1/jobs/:job_id/match
///
/// Returns the score, all factors, and the explanation for one job.
pub async fn handle_match(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<MatchResult>, AppError> {
    let result = state.matcher.score(params.user_id, job_id).await?;
    Ok(Json(result))
}

/// POST /api/v1/jobs/match/batch
///
/// Returns score + label per job for list views. Jobs that do not exist are
/// omitted rather than reported as errors.
pub async fn handle_batch_match(
    State(state): State<AppState>,
    Json(request): Json<BatchMatchRequest>,
) -> Result<Json<BatchMatchResponse>, AppError> {
    if request.job_ids.is_empty() {
        return Err(AppError::Validation("job_ids cannot be empty".to_string()));
    }
    let limit = state.config.match_batch_limit;
    if request.job_ids.len() > limit {
        return Err(AppError::Validation(format!(
            "at most {limit} job_ids per request, got {}",
            request.job_ids.len()
        )));
    }

    let scores = state
        .matcher
        .score_batch(request.user_id, &request.job_ids)
        .await?;

    Ok(Json(BatchMatchResponse { scores }))
}
