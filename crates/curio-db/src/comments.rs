use crate::Database;
use crate::models::CommentRow;
use crate::queries::OptionalExt;
use anyhow::Result;
use rusqlite::{Row, TransactionBehavior};

const COMMENT_COLUMNS: &str = "id, content, user_id, product_id, parent_id, created_at, updated_at";

/// Result of [`Database::insert_comment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentInsert {
    Inserted(i64),
    MissingProduct,
    MissingParent(i64),
    /// The parent exists but hangs off a different product.
    ForeignParent(i64),
}

impl Database {
    /// Inserts a comment after checking, in the same transaction, that the
    /// product and the parent still exist.
    pub fn insert_comment(
        &self,
        user_id: i64,
        product_id: i64,
        content: &str,
        parent_id: Option<i64>,
    ) -> Result<CommentInsert> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let product: Option<i64> = tx
                .query_row("SELECT id FROM products WHERE id = ?1", [product_id], |r| r.get(0))
                .optional()?;
            if product.is_none() {
                return Ok(CommentInsert::MissingProduct);
            }
            if let Some(parent_id) = parent_id {
                let parent_product: Option<i64> = tx
                    .query_row("SELECT product_id FROM comments WHERE id = ?1", [parent_id], |r| {
                        r.get(0)
                    })
                    .optional()?;
                match parent_product {
                    None => return Ok(CommentInsert::MissingParent(parent_id)),
                    Some(p) if p != product_id => return Ok(CommentInsert::ForeignParent(parent_id)),
                    Some(_) => {}
                }
            }

            tx.execute(
                "INSERT INTO comments (content, user_id, product_id, parent_id) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![content, user_id, product_id, parent_id],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(CommentInsert::Inserted(id))
        })
    }

    pub fn get_comment(&self, id: i64) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1");
            conn.query_row(&sql, [id], comment_from_row).optional()
        })
    }

    /// Flat list in creation order.
    pub fn list_comments(&self, product_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMMENT_COLUMNS} FROM comments WHERE product_id = ?1
                 ORDER BY created_at, id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([product_id], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_comment_content(&self, id: i64, content: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE comments SET content = ?2, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
                 WHERE id = ?1",
                rusqlite::params![id, content],
            )?;
            Ok(())
        })
    }

    /// Deletes the comment only if nothing replies to it. Returns false when
    /// the row is missing or still has replies.
    pub fn delete_leaf_comment(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "DELETE FROM comments
                 WHERE id = ?1 AND NOT EXISTS (SELECT 1 FROM comments WHERE parent_id = ?1)",
                [id],
            )?;
            Ok(n > 0)
        })
    }
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        content: row.get(1)?,
        user_id: row.get(2)?,
        product_id: row.get(3)?,
        parent_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
