// src/core/database.rs
//! Connection management and schema migrations

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// How long a connection waits for another one's write lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        login TEXT NOT NULL UNIQUE,
        email TEXT,
        authorities TEXT NOT NULL DEFAULT 'ROLE_EMPLOYER',
        activated BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS professions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS advertisements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        active BOOLEAN NOT NULL DEFAULT FALSE,
        profession_id INTEGER NOT NULL REFERENCES professions(id),
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS candidates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        email_key TEXT NOT NULL UNIQUE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_applications (
        advertisement_id INTEGER NOT NULL REFERENCES advertisements(id) ON DELETE CASCADE,
        candidate_id INTEGER NOT NULL REFERENCES candidates(id) ON DELETE CASCADE,
        applied_at TEXT NOT NULL,
        PRIMARY KEY (advertisement_id, candidate_id)
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_advertisements_user_active ON advertisements(user_id, active);",
    "CREATE INDEX IF NOT EXISTS idx_advertisements_profession ON advertisements(profession_id);",
    "CREATE INDEX IF NOT EXISTS idx_job_applications_candidate ON job_applications(candidate_id);",
];

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let options = SqliteConnectOptions::from_str(&database_url)?
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to database: {}", database_path.display())
            })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database. A single long-lived connection keeps the
    /// data alive for the lifetime of the pool.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Transaction that holds the database write lock from its first
    /// statement. A deferred `BEGIN` would fail with SQLITE_BUSY when it later
    /// tries to upgrade its read lock while another connection is writing.
    pub async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }

    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .context("Failed to apply schema migration")?;
        }

        info!("Database migrations completed");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::in_memory().await.unwrap();
        db.health_check().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec![
                "advertisements",
                "candidates",
                "job_applications",
                "professions",
                "users"
            ]
        );
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("board.db");

        let db = Database::new(&path).await.unwrap();
        sqlx::query("INSERT INTO professions (name) VALUES ('Welder')")
            .execute(db.pool())
            .await
            .unwrap();
        db.pool().close().await;

        let reopened = Database::new(&path).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM professions")
            .fetch_one(reopened.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_file_database_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("board.db")).await.unwrap();
        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_write_transactions_wait_for_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("board.db")).await.unwrap();

        let writers = (0..16).map(|i| {
            let db = db.clone();
            tokio::spawn(async move {
                let mut tx = db.begin_write().await?;
                let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM professions")
                    .fetch_one(&mut *tx)
                    .await?;
                sqlx::query("INSERT INTO professions (name) VALUES (?)")
                    .bind(format!("Trade {} after {}", i, count))
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await
            })
        });
        for writer in futures::future::join_all(writers).await {
            writer.unwrap().unwrap();
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM professions")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 16);
    }
}
