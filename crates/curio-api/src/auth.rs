use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};

use curio_core::{CoreError, users};
use curio_db::Database;
use curio_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};
use curio_types::models::UserId;

use crate::error::{ApiError, run_blocking};
use crate::extract::ApiJson;

const MIN_PASSWORD_LEN: usize = 8;
const TOKEN_TTL_DAYS: i64 = 30;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Shared secret the payment collaborator presents to feature a listing.
    /// `None` disables the endpoint.
    pub feature_secret: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(CoreError::invalid(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        ))
        .into());
    }

    let user = run_blocking(&state, move |db| {
        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| CoreError::Store(anyhow::anyhow!("Password hashing failed: {}", e)))?
            .to_string();

        users::register(db, &req.username, &password_hash, req.email.as_deref())
    })
    .await?;

    let token = create_token(&state.jwt_secret, user.id, &user.username)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user_id: user.id,
            username: user.username,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(&state, move |db| {
        let user = db
            .get_user_by_username(req.username.trim())?
            .ok_or(CoreError::Unauthenticated)?;

        // Verify password
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|e| CoreError::Store(anyhow::anyhow!("Corrupt password hash: {}", e)))?;
        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| CoreError::Unauthenticated)?;

        Ok(user)
    })
    .await?;

    let token = create_token(&state.jwt_secret, user.id, &user.username)?;

    Ok(Json(AuthResponse {
        user_id: user.id,
        username: user.username,
        token,
    }))
}

pub fn create_token(secret: &str, user_id: UserId, username: &str) -> Result<String, ApiError> {
    let exp = (chrono::Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp();
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: usize::try_from(exp).map_err(|_| ApiError::internal())?,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("Token encoding failed: {}", e);
        ApiError::internal()
    })
}
