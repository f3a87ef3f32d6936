//! # lf-db-sqlite
//!
//! This module implements the data mapping between the SQLite relational
//! model and the `lf-core` domain models, including the atomic dual-flip
//! that retires a matched pair.

use async_trait::async_trait;
use lf_core::models::{Item, ItemStatus, User};
use lf_core::traits::{ItemRepo, UserRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

/// Opens (and creates if missing) the database and bootstraps the schema.
///
/// In-memory databases exist per connection, so `:memory:` URLs get a
/// single-connection pool, otherwise every pooled connection would see
/// its own empty schema.
pub async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id            BLOB PRIMARY KEY,
            name          TEXT NOT NULL,
            email         TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL
        )",
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS items (
            id          BLOB PRIMARY KEY,
            title       TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            status      TEXT NOT NULL,
            owner_id    BLOB NOT NULL,
            image_ref   TEXT NOT NULL,
            matched     INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        )",
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Item> {
    let status: String = row.get("status");
    Ok(Item {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        title: row.get("title"),
        description: row.get("description"),
        status: ItemStatus::from_str(&status)?,
        owner_id: blob_to_uuid(row.get::<Vec<u8>, _>("owner_id").as_slice()),
        image_ref: row.get("image_ref"),
        matched: row.get("matched"),
        created_at: row.get("created_at"),
    })
}

pub struct SqliteItemRepo {
    pool: SqlitePool,
}

impl SqliteItemRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepo for SqliteItemRepo {
    async fn create_item(&self, item: Item) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO items (id, title, description, status, owner_id, image_ref, matched, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(item.id))
        .bind(item.title)
        .bind(item.description)
        .bind(item.status.as_str())
        .bind(uuid_to_blob(item.owner_id))
        .bind(item.image_ref)
        .bind(item.matched)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> anyhow::Result<Option<Item>> {
        let row = sqlx::query("SELECT * FROM items WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_item).transpose()
    }

    async fn list_items(&self) -> anyhow::Result<Vec<Item>> {
        let rows = sqlx::query("SELECT * FROM items ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_item).collect()
    }

    /// The candidate scan. Creation order is the de facto tie-break for
    /// the matcher, so the ordering here must stay stable.
    async fn list_unmatched(&self, status: ItemStatus) -> anyhow::Result<Vec<Item>> {
        let rows = sqlx::query(
            "SELECT * FROM items WHERE status = ? AND matched = 0 ORDER BY created_at ASC, id ASC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_item).collect()
    }

    /// Flips `matched` on both rows inside one transaction, guarded by a
    /// compare-and-swap on each row.
    ///
    /// # Developer Note
    /// The `matched = 0` predicate is what makes two racing submissions
    /// safe: the second one to commit sees zero affected rows on the
    /// already-claimed side, rolls back, and reports `Ok(false)`. A
    /// half-flagged pair can never persist.
    async fn commit_match(&self, a: Uuid, b: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        let first = sqlx::query("UPDATE items SET matched = 1 WHERE id = ? AND matched = 0")
            .bind(uuid_to_blob(a))
            .execute(&mut *tx)
            .await?;
        let second = sqlx::query("UPDATE items SET matched = 1 WHERE id = ? AND matched = 0")
            .bind(uuid_to_blob(b))
            .execute(&mut *tx)
            .await?;

        if first.rows_affected() == 1 && second.rows_affected() == 1 {
            tx.commit().await?;
            Ok(true)
        } else {
            tx.rollback().await?;
            Ok(false)
        }
    }
}

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
    }
}

#[async_trait]
impl UserRepo for SqliteUserRepo {
    async fn create_user(&self, user: User) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO users (id, name, email, password_hash) VALUES (?, ?, ?, ?)")
            .bind(uuid_to_blob(user.id))
            .bind(user.name)
            .bind(user.email)
            .bind(user.password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_user))
    }
}
