//! Vote storage. The read-modify-write of a vote and the product score it
//! feeds always run inside a single IMMEDIATE transaction on the writer.

use crate::Database;
use crate::models::VoteRow;
use crate::queries::OptionalExt;
use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row, TransactionBehavior};

/// Result of [`Database::upsert_vote`].
pub struct VoteOutcome {
    /// `None` when there was nothing to retract and no row was written.
    pub vote: Option<VoteRow>,
    pub previous: i64,
    pub score: i64,
}

impl VoteOutcome {
    pub fn delta(&self) -> i64 {
        self.vote.as_ref().map_or(0, |v| v.value) - self.previous
    }
}

impl Database {
    pub fn get_vote(&self, user_id: i64, product_id: i64) -> Result<Option<VoteRow>> {
        self.with_conn(|conn| query_vote(conn, user_id, product_id))
    }

    pub fn list_votes_for_user(&self, user_id: i64) -> Result<Vec<VoteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, product_id, value FROM votes
                 WHERE user_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([user_id], vote_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Sets the (user, product) vote to `value` and recomputes the product's
    /// score, atomically. Never creates a second row for the pair, and does
    /// not insert a row just to record a zero. Returns `None` when the
    /// product no longer exists.
    pub fn upsert_vote(
        &self,
        user_id: i64,
        product_id: i64,
        value: i64,
    ) -> Result<Option<VoteOutcome>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let Some(score) = current_score(&tx, product_id)? else {
                return Ok(None);
            };
            let existing = query_vote(&tx, user_id, product_id)?;
            let previous = existing.as_ref().map_or(0, |v| v.value);

            if existing.is_none() && value == 0 {
                tx.commit()?;
                return Ok(Some(VoteOutcome {
                    vote: None,
                    previous,
                    score,
                }));
            }

            tx.execute(
                "INSERT INTO votes (user_id, product_id, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id, product_id) DO UPDATE SET
                    value = excluded.value,
                    updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')",
                [user_id, product_id, value],
            )?;
            let score = recompute_score(&tx, product_id)?;
            let vote = query_vote(&tx, user_id, product_id)?
                .ok_or_else(|| anyhow!("Vote for user {} on product {} vanished", user_id, product_id))?;

            tx.commit()?;
            Ok(Some(VoteOutcome {
                vote: Some(vote),
                previous,
                score,
            }))
        })
    }

    /// Sum of live vote values, the source of truth behind `products.score`.
    pub fn vote_sum(&self, product_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COALESCE(SUM(value), 0) FROM votes WHERE product_id = ?1",
                [product_id],
                |r| r.get(0),
            )?)
        })
    }
}

/// Rewrites `products.score` from the vote rows and returns the new value.
pub(crate) fn recompute_score(conn: &Connection, product_id: i64) -> Result<i64> {
    conn.execute(
        "UPDATE products
         SET score = (SELECT COALESCE(SUM(value), 0) FROM votes WHERE product_id = ?1)
         WHERE id = ?1",
        [product_id],
    )?;
    current_score(conn, product_id)?.ok_or_else(|| anyhow!("Product not found: {}", product_id))
}

fn current_score(conn: &Connection, product_id: i64) -> Result<Option<i64>> {
    conn.query_row("SELECT score FROM products WHERE id = ?1", [product_id], |r| r.get(0))
        .optional()
}

fn query_vote(conn: &Connection, user_id: i64, product_id: i64) -> Result<Option<VoteRow>> {
    conn.query_row(
        "SELECT id, user_id, product_id, value FROM votes WHERE user_id = ?1 AND product_id = ?2",
        [user_id, product_id],
        vote_from_row,
    )
    .optional()
}

fn vote_from_row(row: &Row<'_>) -> rusqlite::Result<VoteRow> {
    Ok(VoteRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        product_id: row.get(2)?,
        value: row.get(3)?,
    })
}
