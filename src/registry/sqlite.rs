// SPDX-License-Identifier: GPL-3.0-only
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::registry::error::{RegistryError, RegistryResult};

/// Current schema version, stored in `PRAGMA user_version`
const SCHEMA_VERSION: i64 = 1;

/// Shared SQLite connection pool with the plot/wishlist schema applied
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database file at `db_path`
    pub async fn open(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    /// Private in-memory database; a single long-lived connection keeps it alive
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> anyhow::Result<()> {
        let version: i64 = sqlx::query("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await?
            .get(0);

        if version < 1 {
            self.migrate_v1().await?;
        }

        info!(version = SCHEMA_VERSION, "Initialized SQLite registry schema");
        Ok(())
    }

    async fn migrate_v1(&self) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS plots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                dimensions TEXT NOT NULL,
                location TEXT NOT NULL,
                price TEXT NOT NULL,
                owner_name TEXT NOT NULL,
                phone_number TEXT NOT NULL,
                whatsapp_number TEXT NOT NULL,
                description TEXT,
                posted_at TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS plot_images (
                plot_id INTEGER NOT NULL REFERENCES plots(id),
                position INTEGER NOT NULL,
                image_url TEXT NOT NULL,
                PRIMARY KEY (plot_id, position)
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS wishlists (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                plot_id INTEGER NOT NULL REFERENCES plots(id),
                added_at TEXT NOT NULL,
                UNIQUE (user_id, plot_id)
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_plots_active_posted ON plots (is_active, posted_at)")
            .execute(&mut *tx)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_wishlists_user_added ON wishlists (user_id, added_at)")
            .execute(&mut *tx)
            .await?;

        sqlx::query("PRAGMA user_version = 1")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Migrated registry schema to version 1");
        Ok(())
    }
}

/// Fixed-width RFC 3339 so that text order matches time order
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> RegistryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| RegistryError::Corrupt(format!("invalid timestamp '{}': {}", raw, e)))
}

/// Current time truncated to the stored precision
pub(crate) fn now() -> DateTime<Utc> {
    let now = Utc::now();
    // Round-trips exactly through format_timestamp/parse_timestamp
    parse_timestamp(&format_timestamp(&now)).unwrap_or(now)
}
