use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CommentId, FacetCount, Taxonomy, UserId};

// -- JWT Claims --

/// Session token claims. `sub` is the acting user's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: UserId,
    pub username: String,
    pub token: String,
}

// -- Profiles --

#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: UserId,
    pub username: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Partial profile update. An empty string clears `email` or `avatar_url`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_subscribed_to_newsletter: Option<bool>,
}

// -- Products --

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProduct {
    pub title: String,
    pub company_name: String,
    pub link: String,
    pub image_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub country: String,
    #[serde(default)]
    pub materials: Vec<String>,
    pub collection: String,
}

/// Owner edits. Has no `score` or `featured` field, and unknown fields are
/// rejected during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
    pub materials: Option<Vec<String>>,
    pub collection: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetFeaturedRequest {
    pub featured: bool,
}

// -- Votes --

/// `value` stays a raw integer so out-of-range input reaches the ledger and
/// is reported as an invalid argument.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CastVoteRequest {
    pub value: i64,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditCommentRequest {
    pub content: String,
}

// -- Facets --

#[derive(Debug, Serialize)]
pub struct FacetCountsResponse {
    pub taxonomy: Taxonomy,
    pub counts: Vec<FacetCount>,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
