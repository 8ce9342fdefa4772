use curio_db::models::UserRow;
use curio_db::{Database, is_unique_violation};
use curio_types::api::{ProfilePatch, PublicProfile};
use curio_types::models::{User, UserId};
use tracing::info;

use crate::error::{CoreError, CoreResult, require_user};
use crate::validate;

/// Creates an account. The caller hashes the password; this only checks the
/// identity fields.
pub fn register(
    db: &Database,
    username: &str,
    password_hash: &str,
    email: Option<&str>,
) -> CoreResult<User> {
    let username = validate::username(username)?;
    let email = validate::optional_email(email)?;

    if db.get_user_by_username(&username)?.is_some() {
        return Err(taken(&username));
    }
    let id = db
        .create_user(&username, password_hash, email.as_deref())
        .map_err(|e| {
            if is_unique_violation(&e) {
                taken(&username)
            } else {
                CoreError::Store(e)
            }
        })?;

    info!("User {} registered as '{}'", id, username);
    get_me(db, Some(id))
}

pub fn get_profile(db: &Database, user_id: UserId) -> CoreResult<PublicProfile> {
    let user = load(db, user_id)?;
    Ok(PublicProfile {
        id: user.id,
        username: user.username,
        avatar_url: user.avatar_url,
        created_at: user.created_at,
    })
}

pub fn get_me(db: &Database, acting: Option<UserId>) -> CoreResult<User> {
    load(db, require_user(acting)?)
}

pub fn update_profile(
    db: &Database,
    acting: Option<UserId>,
    patch: &ProfilePatch,
) -> CoreResult<User> {
    let user_id = require_user(acting)?;
    let mut row = db
        .get_user_by_id(user_id)?
        .ok_or_else(|| CoreError::not_found("user", user_id))?;

    if let Some(name) = patch.username.as_deref() {
        let name = validate::username(name)?;
        if let Some(existing) = db.get_user_by_username(&name)? {
            if existing.id != user_id {
                return Err(taken(&name));
            }
        }
        row.username = name;
    }
    if patch.email.is_some() {
        row.email = validate::optional_email(patch.email.as_deref())?;
    }
    if patch.avatar_url.is_some() {
        row.avatar_url = validate::optional_url("avatar_url", patch.avatar_url.as_deref())?;
    }
    if let Some(subscribed) = patch.is_subscribed_to_newsletter {
        row.newsletter = subscribed;
    }

    db.update_user(&row).map_err(|e| {
        if is_unique_violation(&e) {
            taken(&row.username)
        } else {
            CoreError::Store(e)
        }
    })?;
    get_me(db, Some(user_id))
}

fn load(db: &Database, user_id: UserId) -> CoreResult<User> {
    db.get_user_by_id(user_id)?
        .map(UserRow::into_user)
        .ok_or_else(|| CoreError::not_found("user", user_id))
}

fn taken(username: &str) -> CoreError {
    CoreError::Conflict(format!("username '{username}' is taken"))
}
