use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use curio_types::api::Claims;
use curio_types::models::UserId;
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

use crate::auth::AppState;

/// The acting user for one request, or `None` for anonymous callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Session(pub Option<UserId>);

/// Resolves the bearer token into a [`Session`] request extension. A missing
/// or invalid token yields an anonymous session; operations that need a user
/// reject it themselves.
pub async fn resolve_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let session = Session(
        bearer_token(req.headers())
            .and_then(|token| verify_token(&state.jwt_secret, token))
            .map(|claims| claims.sub),
    );
    req.extensions_mut().insert(session);
    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

pub fn verify_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| debug!("Rejected session token: {}", e))
    .ok()
}
