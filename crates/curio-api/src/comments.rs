use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use curio_core::comments;
use curio_types::api::{CreateCommentRequest, EditCommentRequest};
use curio_types::models::{CommentId, ProductId};

use crate::auth::AppState;
use crate::error::{ApiError, run_blocking};
use crate::extract::ApiJson;
use crate::middleware::Session;

/// GET /products/{id}/comments, flat list in creation order.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = run_blocking(&state, move |db| comments::list_comments(db, product_id)).await?;
    Ok(Json(comments))
}

/// GET /products/{id}/thread, nested and depth-bounded.
pub async fn get_thread(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse, ApiError> {
    let thread = run_blocking(&state, move |db| comments::get_thread(db, product_id)).await?;
    Ok(Json(thread))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Extension(Session(acting)): Extension<Session>,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = run_blocking(&state, move |db| {
        comments::create_comment(db, acting, product_id, &req.content, req.parent_id)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn edit_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<CommentId>,
    Extension(Session(acting)): Extension<Session>,
    ApiJson(req): ApiJson<EditCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = run_blocking(&state, move |db| {
        comments::edit_comment(db, acting, comment_id, &req.content)
    })
    .await?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<CommentId>,
    Extension(Session(acting)): Extension<Session>,
) -> Result<StatusCode, ApiError> {
    run_blocking(&state, move |db| comments::delete_comment(db, acting, comment_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
