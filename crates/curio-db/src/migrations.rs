use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                email       TEXT,
                avatar_url  TEXT,
                newsletter  INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE TABLE products (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                title         TEXT NOT NULL,
                company_name  TEXT NOT NULL,
                link          TEXT NOT NULL,
                image_url     TEXT NOT NULL,
                description   TEXT,
                country       TEXT NOT NULL,
                materials     TEXT NOT NULL DEFAULT '[]',
                collection    TEXT NOT NULL,
                user_id       INTEGER NOT NULL REFERENCES users(id),
                score         INTEGER NOT NULL DEFAULT 0,
                featured      INTEGER NOT NULL DEFAULT 0,
                created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE INDEX idx_products_user ON products(user_id);
            CREATE INDEX idx_products_created ON products(created_at);

            CREATE TABLE votes (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                product_id  INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                value       INTEGER NOT NULL CHECK (value IN (0, 1)),
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                UNIQUE(user_id, product_id)
            );

            CREATE INDEX idx_votes_product ON votes(product_id);

            CREATE TABLE comments (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                content     TEXT NOT NULL,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                product_id  INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                parent_id   INTEGER REFERENCES comments(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                updated_at  TEXT
            );

            CREATE INDEX idx_comments_product ON comments(product_id, created_at);
            CREATE INDEX idx_comments_parent ON comments(parent_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
