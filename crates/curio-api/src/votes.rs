use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use curio_core::votes;
use curio_types::api::CastVoteRequest;
use curio_types::models::ProductId;

use crate::auth::AppState;
use crate::error::{ApiError, run_blocking};
use crate::extract::ApiJson;
use crate::middleware::Session;

pub async fn cast_vote(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Extension(Session(acting)): Extension<Session>,
    ApiJson(req): ApiJson<CastVoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let vote = run_blocking(&state, move |db| {
        votes::cast_vote(db, acting, product_id, req.value)
    })
    .await?;
    Ok(Json(vote))
}

/// Responds with `null` when the caller has no vote or is anonymous.
pub async fn get_vote(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Extension(Session(acting)): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let vote = run_blocking(&state, move |db| votes::get_vote(db, acting, product_id)).await?;
    Ok(Json(vote))
}

pub async fn list_votes(
    State(state): State<AppState>,
    Extension(Session(acting)): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let votes = run_blocking(&state, move |db| votes::list_votes_for_user(db, acting)).await?;
    Ok(Json(votes))
}
