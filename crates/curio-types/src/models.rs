use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type ProductId = i64;
pub type VoteId = i64;
pub type CommentId = i64;

/// Full user record. Only ever returned to the user it describes; other
/// callers get [`crate::api::PublicProfile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_subscribed_to_newsletter: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub company_name: String,
    pub link: String,
    pub image_url: String,
    pub description: Option<String>,
    pub country: String,
    pub materials: Vec<String>,
    pub collection: String,
    pub user_id: UserId,
    /// Cached sum of all vote values for this product.
    pub score: i64,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

/// A vote is either cast (`Up`) or retracted (`None`). There are no downvotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum VoteValue {
    #[default]
    None,
    Up,
}

impl VoteValue {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Up => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidVoteValue(pub i64);

impl fmt::Display for InvalidVoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vote value must be 0 or 1, got {}", self.0)
    }
}

impl std::error::Error for InvalidVoteValue {}

impl TryFrom<i64> for VoteValue {
    type Error = InvalidVoteValue;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Up),
            other => Err(InvalidVoteValue(other)),
        }
    }
}

impl From<VoteValue> for i64 {
    fn from(value: VoteValue) -> Self {
        value.as_i64()
    }
}

/// One (user, product) vote. `id` is `None` when no row exists yet, which is
/// how "no vote" is represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: Option<VoteId>,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub value: VoteValue,
}

impl Vote {
    pub fn none(user_id: UserId, product_id: ProductId) -> Self {
        Self {
            id: None,
            user_id,
            product_id,
            value: VoteValue::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub parent_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A comment placed in its reconstructed discussion thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub depth: usize,
    pub replies: Vec<CommentNode>,
}

// -- Facets --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taxonomy {
    Materials,
    Countries,
    Collections,
}

impl Taxonomy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Materials => "materials",
            Self::Countries => "countries",
            Self::Collections => "collections",
        }
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Taxonomy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "materials" => Ok(Self::Materials),
            "countries" => Ok(Self::Countries),
            "collections" => Ok(Self::Collections),
            other => Err(format!("unknown taxonomy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}
