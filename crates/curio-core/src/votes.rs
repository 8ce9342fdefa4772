//! Vote ledger: one row per (user, product), kept in step with the
//! product's cached score.

use curio_db::Database;
use curio_db::models::VoteRow;
use curio_types::models::{ProductId, UserId, Vote, VoteValue};
use tracing::info;

use crate::error::{CoreError, CoreResult, require_user};

/// Sets the acting user's vote on a product to `value` (0 or 1).
///
/// Product owners cannot vote on their own product; the vote they hold comes
/// from product creation and is not reachable through this call. Retracting
/// a vote that was never cast is a no-op that returns a zero vote without an
/// id.
pub fn cast_vote(
    db: &Database,
    acting: Option<UserId>,
    product_id: ProductId,
    value: i64,
) -> CoreResult<Vote> {
    let user_id = require_user(acting)?;
    let value = VoteValue::try_from(value).map_err(|e| CoreError::invalid(e.to_string()))?;

    let product = db
        .get_product(product_id)?
        .ok_or_else(|| CoreError::not_found("product", product_id))?;
    if product.user_id == user_id {
        return Err(CoreError::forbidden("cannot vote on your own product"));
    }

    let outcome = db
        .upsert_vote(user_id, product_id, value.as_i64())?
        .ok_or_else(|| CoreError::not_found("product", product_id))?;
    let delta = outcome.delta();
    if delta != 0 {
        info!(
            "User {} voted {} on product {} (delta {}, score {})",
            user_id,
            value.as_i64(),
            product_id,
            delta,
            outcome.score
        );
    }

    Ok(outcome
        .vote
        .map(VoteRow::into_vote)
        .unwrap_or_else(|| Vote::none(user_id, product_id)))
}

/// The acting user's vote, or `None` when anonymous or never voted.
pub fn get_vote(
    db: &Database,
    acting: Option<UserId>,
    product_id: ProductId,
) -> CoreResult<Option<Vote>> {
    let Some(user_id) = acting else {
        return Ok(None);
    };
    Ok(db.get_vote(user_id, product_id)?.map(VoteRow::into_vote))
}

pub fn list_votes_for_user(db: &Database, acting: Option<UserId>) -> CoreResult<Vec<Vote>> {
    let Some(user_id) = acting else {
        return Ok(Vec::new());
    };
    Ok(db
        .list_votes_for_user(user_id)?
        .into_iter()
        .map(VoteRow::into_vote)
        .collect())
}
