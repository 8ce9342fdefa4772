use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use curio_core::users;
use curio_types::api::ProfilePatch;
use curio_types::models::UserId;

use crate::auth::AppState;
use crate::error::{ApiError, run_blocking};
use crate::extract::ApiJson;
use crate::middleware::Session;

pub async fn get_me(
    State(state): State<AppState>,
    Extension(Session(acting)): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(&state, move |db| users::get_me(db, acting)).await?;
    Ok(Json(user))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(Session(acting)): Extension<Session>,
    ApiJson(patch): ApiJson<ProfilePatch>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(&state, move |db| users::update_profile(db, acting, &patch)).await?;
    Ok(Json(user))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = run_blocking(&state, move |db| users::get_profile(db, user_id)).await?;
    Ok(Json(profile))
}
