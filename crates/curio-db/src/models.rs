//! Database row types. These map directly to SQLite rows and are converted
//! into `curio-types` models at the edge of this crate.

use chrono::{DateTime, NaiveDateTime, Utc};
use curio_types::models::{Comment, Product, User, Vote, VoteValue};
use tracing::warn;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub newsletter: bool,
    pub created_at: String,
}

pub struct ProductRow {
    pub id: i64,
    pub title: String,
    pub company_name: String,
    pub link: String,
    pub image_url: String,
    pub description: Option<String>,
    pub country: String,
    /// JSON array of strings.
    pub materials: String,
    pub collection: String,
    pub user_id: i64,
    pub score: i64,
    pub featured: bool,
    pub created_at: String,
}

pub struct VoteRow {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub value: i64,
}

pub struct CommentRow {
    pub id: i64,
    pub content: String,
    pub user_id: i64,
    pub product_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS[.SSS]" without timezone.
/// They are always written in UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

fn timestamp_or_default(raw: &str, what: &str, id: i64) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!("Corrupt timestamp '{}' on {} {}", raw, what, id);
        DateTime::default()
    })
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            created_at: timestamp_or_default(&self.created_at, "user", self.id),
            id: self.id,
            username: self.username,
            email: self.email,
            avatar_url: self.avatar_url,
            is_subscribed_to_newsletter: self.newsletter,
        }
    }
}

impl ProductRow {
    pub fn into_product(self) -> Product {
        let materials = serde_json::from_str::<Vec<String>>(&self.materials).unwrap_or_else(|e| {
            warn!("Corrupt materials '{}' on product {}: {}", self.materials, self.id, e);
            Vec::new()
        });

        Product {
            created_at: timestamp_or_default(&self.created_at, "product", self.id),
            id: self.id,
            title: self.title,
            company_name: self.company_name,
            link: self.link,
            image_url: self.image_url,
            description: self.description,
            country: self.country,
            materials,
            collection: self.collection,
            user_id: self.user_id,
            score: self.score,
            featured: self.featured,
        }
    }
}

impl VoteRow {
    pub fn into_vote(self) -> Vote {
        let value = VoteValue::try_from(self.value).unwrap_or_else(|e| {
            warn!("Corrupt vote {}: {}", self.id, e);
            VoteValue::None
        });

        Vote {
            id: Some(self.id),
            user_id: self.user_id,
            product_id: self.product_id,
            value,
        }
    }
}

impl CommentRow {
    pub fn into_comment(self) -> Comment {
        Comment {
            created_at: timestamp_or_default(&self.created_at, "comment", self.id),
            updated_at: self.updated_at.as_deref().and_then(parse_timestamp),
            id: self.id,
            content: self.content,
            user_id: self.user_id,
            product_id: self.product_id,
            parent_id: self.parent_id,
        }
    }
}
