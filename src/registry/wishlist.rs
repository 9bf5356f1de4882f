// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::registry::error::RegistryResult;
use crate::registry::models::{Plot, PlotId, WishlistEntry};
use crate::registry::sqlite::{SqliteStore, format_timestamp, now, parse_timestamp};
use crate::registry::traits::{PlotRegistry, WishlistRegistry};

pub struct SqliteWishlistRegistry {
    pool: SqlitePool,
    plots: Arc<dyn PlotRegistry>,
}

impl SqliteWishlistRegistry {
    pub fn new(store: &SqliteStore, plots: Arc<dyn PlotRegistry>) -> Self {
        Self {
            pool: store.pool().clone(),
            plots,
        }
    }

    fn entry_from_row(&self, row: &SqliteRow) -> RegistryResult<WishlistEntry> {
        Ok(WishlistEntry {
            id: row.get::<i64, _>("id"),
            user_id: row.get::<String, _>("user_id"),
            plot_id: row.get::<i64, _>("plot_id"),
            added_at: parse_timestamp(&row.get::<String, _>("added_at"))?,
        })
    }
}

#[async_trait]
impl WishlistRegistry for SqliteWishlistRegistry {
    async fn get_user_wishlist(&self, user_id: &str) -> RegistryResult<Vec<Plot>> {
        let entries = self.list_entries(user_id).await?;

        let mut plots = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.plots.get_by_id(entry.plot_id).await? {
                Some(plot) if plot.is_active => plots.push(plot),
                Some(_) => {
                    debug!(user_id = %user_id, plot_id = entry.plot_id, "Skipping inactive wishlisted plot");
                }
                None => {
                    error!(user_id = %user_id, plot_id = entry.plot_id, "Wishlist entry references missing plot");
                }
            }
        }

        Ok(plots)
    }

    async fn list_entries(&self, user_id: &str) -> RegistryResult<Vec<WishlistEntry>> {
        let rows = sqlx::query(
            "SELECT id, user_id, plot_id, added_at FROM wishlists WHERE user_id = ?1 ORDER BY added_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match self.entry_from_row(&row) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    error!(error = %e, "Failed to parse wishlist entry from database");
                }
            }
        }

        Ok(entries)
    }

    async fn add_to_wishlist(&self, user_id: &str, plot_id: PlotId) -> RegistryResult<bool> {
        match self.plots.get_by_id(plot_id).await? {
            Some(plot) if plot.is_active => {}
            _ => return Ok(false),
        }

        // The UNIQUE (user_id, plot_id) constraint decides duplicates, so concurrent adds cannot both succeed
        let result = sqlx::query(
            r#"
            INSERT INTO wishlists (user_id, plot_id, added_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (user_id, plot_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(plot_id)
        .bind(format_timestamp(&now()))
        .execute(&self.pool)
        .await?;

        let added = result.rows_affected() > 0;
        if added {
            info!(user_id = %user_id, plot_id, "Added plot to wishlist");
        }

        Ok(added)
    }

    async fn remove_from_wishlist(&self, user_id: &str, plot_id: PlotId) -> RegistryResult<bool> {
        if self.plots.get_by_id(plot_id).await?.is_none() {
            return Ok(false);
        }

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM wishlists WHERE user_id = ?1 AND plot_id = ?2")
            .bind(user_id)
            .bind(plot_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if result.rows_affected() > 0 {
            info!(user_id = %user_id, plot_id, "Removed plot from wishlist");
        }

        Ok(true)
    }

    async fn is_in_wishlist(&self, user_id: &str, plot_id: PlotId) -> RegistryResult<bool> {
        if self.plots.get_by_id(plot_id).await?.is_none() {
            return Ok(false);
        }

        let row = sqlx::query("SELECT 1 FROM wishlists WHERE user_id = ?1 AND plot_id = ?2")
            .bind(user_id)
            .bind(plot_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }
}
