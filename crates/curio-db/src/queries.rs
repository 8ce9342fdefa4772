use crate::Database;
use crate::ledger::recompute_score;
use crate::models::{ProductRow, UserRow};
use anyhow::Result;
use curio_types::api::{NewProduct, ProductPatch};
use rusqlite::{Connection, Row, TransactionBehavior};

const USER_COLUMNS: &str = "id, username, password, email, avatar_url, newsletter, created_at";

const PRODUCT_COLUMNS: &str = "id, title, company_name, link, image_url, description, country, \
     materials, collection, user_id, score, featured, created_at";

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (username, password, email) VALUES (?1, ?2, ?3)",
                (username, password_hash, email),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
            conn.query_row(&sql, [username], user_from_row).optional()
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
            conn.query_row(&sql, [id], user_from_row).optional()
        })
    }

    /// Overwrites the editable profile columns of `row.id`.
    pub fn update_user(&self, row: &UserRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET username = ?2, email = ?3, avatar_url = ?4, newsletter = ?5
                 WHERE id = ?1",
                rusqlite::params![row.id, row.username, row.email, row.avatar_url, row.newsletter],
            )?;
            Ok(())
        })
    }

    // -- Products --

    /// Inserts a product together with its owner's automatic creation vote.
    /// Both rows and the resulting score are written in one transaction.
    pub fn insert_product(&self, owner_id: i64, product: &NewProduct) -> Result<i64> {
        let materials = serde_json::to_string(&product.materials)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute(
                "INSERT INTO products
                    (title, company_name, link, image_url, description, country, materials, collection, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    product.title,
                    product.company_name,
                    product.link,
                    product.image_url,
                    product.description,
                    product.country,
                    materials,
                    product.collection,
                    owner_id,
                ],
            )?;
            let product_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO votes (user_id, product_id, value) VALUES (?1, ?2, 1)",
                [owner_id, product_id],
            )?;
            recompute_score(&tx, product_id)?;

            tx.commit()?;
            Ok(product_id)
        })
    }

    pub fn get_product(&self, id: i64) -> Result<Option<ProductRow>> {
        self.with_conn(|conn| query_product(conn, id))
    }

    /// All products, featured first, then newest first.
    pub fn list_products(&self) -> Result<Vec<ProductRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {PRODUCT_COLUMNS} FROM products
                 ORDER BY featured DESC, created_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], product_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_products_by_user(&self, user_id: i64) -> Result<Vec<ProductRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], product_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Overwrites the owner-editable columns. `score`, `featured`, `user_id`
    /// and `created_at` are never touched here.
    /// Writes only the columns the patch sets, in one statement, so
    /// concurrent patches touching different fields do not overwrite each
    /// other. An empty `description` clears it. Returns false when the
    /// product is gone.
    pub fn update_product(&self, id: i64, patch: &ProductPatch) -> Result<bool> {
        let materials = patch.materials.as_ref().map(serde_json::to_string).transpose()?;

        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE products SET
                    title = COALESCE(?2, title),
                    company_name = COALESCE(?3, company_name),
                    link = COALESCE(?4, link),
                    image_url = COALESCE(?5, image_url),
                    description = CASE WHEN ?6 IS NULL THEN description ELSE NULLIF(?6, '') END,
                    country = COALESCE(?7, country),
                    materials = COALESCE(?8, materials),
                    collection = COALESCE(?9, collection)
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    patch.title,
                    patch.company_name,
                    patch.link,
                    patch.image_url,
                    patch.description,
                    patch.country,
                    materials,
                    patch.collection,
                ],
            )?;
            Ok(n > 0)
        })
    }

    /// Deletes the product; votes and comments go with it via ON DELETE CASCADE.
    /// Returns false when no row matched.
    pub fn delete_product(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    pub fn set_featured(&self, id: i64, featured: bool) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE products SET featured = ?2 WHERE id = ?1",
                rusqlite::params![id, featured],
            )?;
            Ok(n > 0)
        })
    }
}

pub(crate) fn query_product(conn: &Connection, id: i64) -> Result<Option<ProductRow>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
    conn.query_row(&sql, [id], product_from_row).optional()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        email: row.get(3)?,
        avatar_url: row.get(4)?,
        newsletter: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<ProductRow> {
    Ok(ProductRow {
        id: row.get(0)?,
        title: row.get(1)?,
        company_name: row.get(2)?,
        link: row.get(3)?,
        image_url: row.get(4)?,
        description: row.get(5)?,
        country: row.get(6)?,
        materials: row.get(7)?,
        collection: row.get(8)?,
        user_id: row.get(9)?,
        score: row.get(10)?,
        featured: row.get(11)?,
        created_at: row.get(12)?,
    })
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
