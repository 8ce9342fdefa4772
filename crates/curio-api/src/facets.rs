use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use curio_core::facets;
use curio_types::api::FacetCountsResponse;
use curio_types::models::Taxonomy;

use crate::auth::AppState;
use crate::error::{ApiError, run_blocking};

fn parse_taxonomy(raw: &str) -> Result<Taxonomy, ApiError> {
    raw.parse().map_err(|e: String| ApiError::new(StatusCode::BAD_REQUEST, e))
}

pub async fn facet_counts(
    State(state): State<AppState>,
    Path(taxonomy): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let taxonomy = parse_taxonomy(&taxonomy)?;
    let counts = run_blocking(&state, move |db| facets::facet_counts(db, taxonomy)).await?;
    Ok(Json(FacetCountsResponse { taxonomy, counts }))
}

pub async fn products_by_facet(
    State(state): State<AppState>,
    Path((taxonomy, value)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let taxonomy = parse_taxonomy(&taxonomy)?;
    let products = run_blocking(&state, move |db| {
        facets::products_by_facet(db, taxonomy, &value)
    })
    .await?;
    Ok(Json(products))
}
