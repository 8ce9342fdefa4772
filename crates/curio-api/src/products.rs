use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use curio_core::products;
use curio_types::api::{NewProduct, ProductPatch, SetFeaturedRequest};
use curio_types::models::{ProductId, UserId};
use tracing::warn;

use crate::auth::AppState;
use crate::error::{ApiError, run_blocking};
use crate::extract::ApiJson;
use crate::middleware::Session;

/// Header carrying the payment collaborator's shared secret.
pub const FEATURE_SECRET_HEADER: &str = "x-feature-secret";

pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = run_blocking(&state, products::list_products).await?;
    Ok(Json(products))
}

pub async fn list_user_products(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, ApiError> {
    let products = run_blocking(&state, move |db| products::list_products_by_user(db, user_id)).await?;
    Ok(Json(products))
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(Session(acting)): Extension<Session>,
    ApiJson(req): ApiJson<NewProduct>,
) -> Result<impl IntoResponse, ApiError> {
    let product = run_blocking(&state, move |db| products::create_product(db, acting, &req)).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse, ApiError> {
    let product = run_blocking(&state, move |db| products::get_product(db, product_id)).await?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Extension(Session(acting)): Extension<Session>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let product = run_blocking(&state, move |db| {
        products::update_product(db, acting, product_id, patch)
    })
    .await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Extension(Session(acting)): Extension<Session>,
) -> Result<StatusCode, ApiError> {
    run_blocking(&state, move |db| products::delete_product(db, acting, product_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /products/{id}/featured, called by the payment collaborator once a
/// promotion has been paid for.
pub async fn set_featured(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<SetFeaturedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let presented = headers
        .get(FEATURE_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    match (state.feature_secret.as_deref(), presented) {
        (Some(expected), Some(given)) if secrets_match(expected, given) => {}
        _ => {
            warn!("Rejected featured update for product {}", product_id);
            return Err(ApiError::new(StatusCode::FORBIDDEN, "feature secret required"));
        }
    }

    let product = run_blocking(&state, move |db| {
        products::set_featured(db, product_id, req.featured)
    })
    .await?;
    Ok(Json(product))
}

/// Compares without short-circuiting on the first differing byte.
fn secrets_match(expected: &str, given: &str) -> bool {
    let (a, b) = (expected.as_bytes(), given.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
