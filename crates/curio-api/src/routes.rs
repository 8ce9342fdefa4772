use axum::{
    Json, Router, middleware,
    routing::{get, patch, post},
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::middleware::resolve_session;
use crate::{comments, facets, products, users, votes};

/// Builds the HTTP surface. Every route sees a resolved session; handlers
/// decide whether an anonymous one is acceptable.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/users/me", get(users::get_me).patch(users::update_me))
        .route("/users/{user_id}", get(users::get_profile))
        .route("/users/{user_id}/products", get(products::list_user_products))
        .route("/products", get(products::list_products).post(products::create_product))
        .route(
            "/products/{product_id}",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/{product_id}/featured", post(products::set_featured))
        .route("/products/{product_id}/vote", get(votes::get_vote).post(votes::cast_vote))
        .route("/votes", get(votes::list_votes))
        .route(
            "/products/{product_id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/products/{product_id}/thread", get(comments::get_thread))
        .route("/comments/{comment_id}", patch(comments::edit_comment).delete(comments::delete_comment))
        .route("/facets/{taxonomy}", get(facets::facet_counts))
        .route("/facets/{taxonomy}/{value}", get(facets::products_by_facet))
        .layer(middleware::from_fn_with_state(state.clone(), resolve_session))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
