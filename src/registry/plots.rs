// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};
use std::collections::HashMap;
use tracing::{error, info};

use crate::registry::error::{RegistryError, RegistryResult};
use crate::registry::models::{Plot, PlotData, PlotId};
use crate::registry::sqlite::{SqliteStore, format_timestamp, now, parse_timestamp};
use crate::registry::traits::PlotRegistry;
use crate::registry::validation::validate_plot_data;
use crate::utils::contains_pattern;

const PLOT_COLUMNS: &str = "id, title, dimensions, location, price, owner_name, phone_number, \
                            whatsapp_number, description, posted_at, is_active";

/// Plot ids bound per image lookup query
const IMAGE_LOOKUP_BATCH: usize = 500;

pub struct SqlitePlotRegistry {
    pool: SqlitePool,
}

impl SqlitePlotRegistry {
    pub fn new(store: &SqliteStore) -> Self {
        Self { pool: store.pool().clone() }
    }

    fn plot_from_row(&self, row: &SqliteRow) -> RegistryResult<Plot> {
        Ok(Plot {
            id: row.get::<i64, _>("id"),
            title: row.get::<String, _>("title"),
            dimensions: row.get::<String, _>("dimensions"),
            location: row.get::<String, _>("location"),
            price: row.get::<String, _>("price"),
            owner_name: row.get::<String, _>("owner_name"),
            phone_number: row.get::<String, _>("phone_number"),
            whatsapp_number: row.get::<String, _>("whatsapp_number"),
            images: Vec::new(),
            description: row.get::<Option<String>, _>("description"),
            posted_at: parse_timestamp(&row.get::<String, _>("posted_at"))?,
            is_active: row.get::<bool, _>("is_active"),
        })
    }

    /// Parse plot rows and fill in their images, skipping rows that fail to parse
    async fn collect_plots(&self, rows: Vec<SqliteRow>) -> RegistryResult<Vec<Plot>> {
        let mut plots = Vec::with_capacity(rows.len());
        for row in rows {
            match self.plot_from_row(&row) {
                Ok(plot) => plots.push(plot),
                Err(e) => {
                    error!(error = %e, "Failed to parse plot from database");
                }
            }
        }

        self.attach_images(&mut plots).await?;
        Ok(plots)
    }

    async fn attach_images(&self, plots: &mut [Plot]) -> RegistryResult<()> {
        let mut images: HashMap<PlotId, Vec<String>> = HashMap::new();

        // SQLite limits the number of bound parameters per statement
        for batch in plots.chunks(IMAGE_LOOKUP_BATCH) {
            let mut query =
                QueryBuilder::<Sqlite>::new("SELECT plot_id, image_url FROM plot_images WHERE plot_id IN (");
            let mut ids = query.separated(", ");
            for plot in batch {
                ids.push_bind(plot.id);
            }
            ids.push_unseparated(") ORDER BY plot_id, position");

            for row in query.build().fetch_all(&self.pool).await? {
                images
                    .entry(row.get::<i64, _>("plot_id"))
                    .or_default()
                    .push(row.get::<String, _>("image_url"));
            }
        }

        for plot in plots.iter_mut() {
            plot.images = images.remove(&plot.id).unwrap_or_default();
        }

        Ok(())
    }

    async fn replace_images(conn: &mut SqliteConnection, id: PlotId, images: &[String]) -> RegistryResult<()> {
        sqlx::query("DELETE FROM plot_images WHERE plot_id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        for (position, url) in images.iter().enumerate() {
            sqlx::query("INSERT INTO plot_images (plot_id, position, image_url) VALUES (?1, ?2, ?3)")
                .bind(id)
                .bind(position as i64)
                .bind(url)
                .execute(&mut *conn)
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl PlotRegistry for SqlitePlotRegistry {
    async fn list_active(&self) -> RegistryResult<Vec<Plot>> {
        let rows = sqlx::query(&format!(
            "SELECT {PLOT_COLUMNS} FROM plots WHERE is_active = 1 ORDER BY posted_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.collect_plots(rows).await
    }

    async fn get_by_id(&self, id: PlotId) -> RegistryResult<Option<Plot>> {
        let row = sqlx::query(&format!("SELECT {PLOT_COLUMNS} FROM plots WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut plot = [self.plot_from_row(&row)?];
                self.attach_images(&mut plot).await?;
                let [plot] = plot;
                Ok(Some(plot))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, data: PlotData) -> RegistryResult<Plot> {
        validate_plot_data(&data)?;

        let posted_at = now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO plots (title, dimensions, location, price, owner_name, phone_number, whatsapp_number, description, posted_at, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1)
            "#,
        )
        .bind(&data.title)
        .bind(&data.dimensions)
        .bind(&data.location)
        .bind(&data.price)
        .bind(&data.owner_name)
        .bind(&data.phone_number)
        .bind(&data.whatsapp_number)
        .bind(&data.description)
        .bind(format_timestamp(&posted_at))
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        Self::replace_images(&mut tx, id, &data.images).await?;
        tx.commit().await?;

        info!(plot_id = id, title = %data.title, "Created plot");

        Ok(Plot {
            id,
            title: data.title,
            dimensions: data.dimensions,
            location: data.location,
            price: data.price,
            owner_name: data.owner_name,
            phone_number: data.phone_number,
            whatsapp_number: data.whatsapp_number,
            images: data.images,
            description: data.description,
            posted_at,
            is_active: true,
        })
    }

    async fn update(&self, id: PlotId, data: PlotData) -> RegistryResult<Plot> {
        validate_plot_data(&data)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE plots
            SET title = ?2, dimensions = ?3, location = ?4, price = ?5, owner_name = ?6, phone_number = ?7, whatsapp_number = ?8, description = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.dimensions)
        .bind(&data.location)
        .bind(&data.price)
        .bind(&data.owner_name)
        .bind(&data.phone_number)
        .bind(&data.whatsapp_number)
        .bind(&data.description)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Err(RegistryError::NotFound(id));
        }

        Self::replace_images(&mut tx, id, &data.images).await?;
        tx.commit().await?;

        info!(plot_id = id, "Updated plot");

        self.get_by_id(id).await?.ok_or(RegistryError::NotFound(id))
    }

    async fn soft_delete(&self, id: PlotId) -> RegistryResult<bool> {
        let result = sqlx::query("UPDATE plots SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let found = result.rows_affected() > 0;
        if found {
            info!(plot_id = id, "Soft-deleted plot");
        }

        Ok(found)
    }

    async fn search(&self, keyword: Option<&str>) -> RegistryResult<Vec<Plot>> {
        let keyword = match keyword.map(str::trim) {
            Some(k) if !k.is_empty() => k,
            _ => return self.list_active().await,
        };

        let rows = sqlx::query(&format!(
            r#"
            SELECT {PLOT_COLUMNS} FROM plots
            WHERE is_active = 1
              AND (LOWER(title) LIKE ?1 ESCAPE '\'
                   OR LOWER(location) LIKE ?1 ESCAPE '\'
                   OR LOWER(description) LIKE ?1 ESCAPE '\')
            ORDER BY posted_at DESC, id DESC
            "#
        ))
        .bind(contains_pattern(keyword))
        .fetch_all(&self.pool)
        .await?;

        self.collect_plots(rows).await
    }

    async fn search_by_location(&self, location: &str) -> RegistryResult<Vec<Plot>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PLOT_COLUMNS} FROM plots
            WHERE is_active = 1 AND LOWER(location) LIKE ?1 ESCAPE '\'
            ORDER BY posted_at DESC, id DESC
            "#
        ))
        .bind(contains_pattern(location))
        .fetch_all(&self.pool)
        .await?;

        self.collect_plots(rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_plot_data, setup_test_database};

    async fn setup_test_registry() -> SqlitePlotRegistry {
        let store = setup_test_database().await.unwrap();
        SqlitePlotRegistry::new(&store)
    }

    async fn count_rows(registry: &SqlitePlotRegistry, table: &str) -> i64 {
        sqlx::query(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&registry.pool)
            .await
            .unwrap()
            .get(0)
    }

    #[tokio::test]
    async fn test_list_active_empty() {
        let registry = setup_test_registry().await;
        let plots = registry.list_active().await.unwrap();
        assert_eq!(plots.len(), 0);
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let registry = setup_test_registry().await;
        let mut data = sample_plot_data("Prime Commercial Plot in BTM Layout");
        data.images = vec![
            "https://images.example.com/3.jpg".to_string(),
            "https://images.example.com/1.jpg".to_string(),
            "https://images.example.com/2.jpg".to_string(),
        ];

        let created = registry.create(data.clone()).await.unwrap();
        assert!(created.id > 0);
        assert!(created.is_active);

        let retrieved = registry.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(retrieved, created);
        assert_eq!(retrieved.title, data.title);
        assert_eq!(retrieved.dimensions, data.dimensions);
        assert_eq!(retrieved.location, data.location);
        assert_eq!(retrieved.price, data.price);
        assert_eq!(retrieved.owner_name, data.owner_name);
        assert_eq!(retrieved.phone_number, data.phone_number);
        assert_eq!(retrieved.whatsapp_number, data.whatsapp_number);
        assert_eq!(retrieved.images, data.images);
        assert_eq!(retrieved.description, data.description);
    }

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() {
        let registry = setup_test_registry().await;
        let first = registry.create(sample_plot_data("First")).await.unwrap();
        let second = registry.create(sample_plot_data("Second")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert!(second.posted_at >= first.posted_at);
    }

    #[tokio::test]
    async fn test_create_without_description_or_images() {
        let registry = setup_test_registry().await;
        let mut data = sample_plot_data("Bare plot");
        data.description = None;
        data.images.clear();

        let created = registry.create(data).await.unwrap();
        let retrieved = registry.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(retrieved.description, None);
        assert!(retrieved.images.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_nine_digit_phone() {
        let registry = setup_test_registry().await;
        let mut data = sample_plot_data("Short phone");
        data.phone_number = "778027040".to_string();

        match registry.create(data).await {
            Err(RegistryError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "phoneNumber");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(count_rows(&registry, "plots").await, 0);
    }

    #[tokio::test]
    async fn test_get_by_id_not_exists() {
        let registry = setup_test_registry().await;
        assert!(registry.get_by_id(12345).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_active_newest_first() {
        let registry = setup_test_registry().await;
        let first = registry.create(sample_plot_data("First")).await.unwrap();
        let second = registry.create(sample_plot_data("Second")).await.unwrap();
        let third = registry.create(sample_plot_data("Third")).await.unwrap();

        let ids: Vec<PlotId> = registry.list_active().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_lists_but_not_lookup() {
        let registry = setup_test_registry().await;
        let kept = registry.create(sample_plot_data("Kept")).await.unwrap();
        let deleted = registry.create(sample_plot_data("Deleted")).await.unwrap();

        assert!(registry.soft_delete(deleted.id).await.unwrap());

        let retrieved = registry.get_by_id(deleted.id).await.unwrap().unwrap();
        assert!(!retrieved.is_active);
        assert_eq!(retrieved.title, "Deleted");

        let active = registry.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, kept.id);
        assert!(active.iter().all(|p| p.is_active));

        let found = registry.search(Some("deleted")).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_soft_delete_not_exists_is_noop() {
        let registry = setup_test_registry().await;
        registry.create(sample_plot_data("Untouched")).await.unwrap();

        assert!(!registry.soft_delete(999).await.unwrap());
        assert_eq!(registry.list_active().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_overwrites_mutable_fields() {
        let registry = setup_test_registry().await;
        let created = registry.create(sample_plot_data("Original")).await.unwrap();

        let mut data = sample_plot_data("Renamed");
        data.location = "Whitefield, Bangalore".to_string();
        data.price = "₹60 Lakhs".to_string();
        data.images = vec!["https://images.example.com/new.jpg".to_string()];
        data.description = None;

        let updated = registry.update(created.id, data.clone()).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.posted_at, created.posted_at);
        assert!(updated.is_active);
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.location, "Whitefield, Bangalore");
        assert_eq!(updated.price, "₹60 Lakhs");
        assert_eq!(updated.images, data.images);
        assert_eq!(updated.description, None);

        assert_eq!(count_rows(&registry, "plot_images").await, 1);
    }

    #[tokio::test]
    async fn test_update_keeps_plot_inactive() {
        let registry = setup_test_registry().await;
        let created = registry.create(sample_plot_data("Gone")).await.unwrap();
        registry.soft_delete(created.id).await.unwrap();

        let updated = registry.update(created.id, sample_plot_data("Still gone")).await.unwrap();
        assert!(!updated.is_active);
        assert!(registry.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_non_existent_plot() {
        let registry = setup_test_registry().await;
        let created = registry.create(sample_plot_data("Only plot")).await.unwrap();

        let result = registry.update(created.id + 100, sample_plot_data("Ghost")).await;
        assert!(matches!(result, Err(RegistryError::NotFound(id)) if id == created.id + 100));

        assert_eq!(count_rows(&registry, "plots").await, 1);
        let unchanged = registry.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(unchanged, created);
    }

    #[tokio::test]
    async fn test_update_validates_payload() {
        let registry = setup_test_registry().await;
        let created = registry.create(sample_plot_data("Valid")).await.unwrap();

        let mut data = sample_plot_data("Valid");
        data.whatsapp_number = "12345".to_string();

        assert!(matches!(
            registry.update(created.id, data).await,
            Err(RegistryError::Validation(_))
        ));
        let unchanged = registry.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(unchanged.whatsapp_number, created.whatsapp_number);
    }

    #[tokio::test]
    async fn test_search_matches_title_case_insensitively() {
        let registry = setup_test_registry().await;
        let btm = registry.create(sample_plot_data("Prime Commercial Plot in BTM Layout")).await.unwrap();
        registry.create(sample_plot_data("Residential Plot near Electronic City")).await.unwrap();

        let found = registry.search(Some("btm")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, btm.id);

        registry.soft_delete(btm.id).await.unwrap();
        assert!(registry.search(Some("btm")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_location_and_description() {
        let registry = setup_test_registry().await;
        let mut by_location = sample_plot_data("Plot A");
        by_location.location = "Mysore Road, Bangalore".to_string();
        let by_location = registry.create(by_location).await.unwrap();

        let mut by_description = sample_plot_data("Plot B");
        by_description.description = Some("Close to MYSORE road junction".to_string());
        let by_description = registry.create(by_description).await.unwrap();

        let mut unrelated = sample_plot_data("Plot C");
        unrelated.description = None;
        registry.create(unrelated).await.unwrap();

        let ids: Vec<PlotId> = registry.search(Some("  mysore ")).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![by_description.id, by_location.id]);
    }

    #[tokio::test]
    async fn test_search_blank_keyword_lists_active() {
        let registry = setup_test_registry().await;
        registry.create(sample_plot_data("One")).await.unwrap();
        registry.create(sample_plot_data("Two")).await.unwrap();

        let all = registry.list_active().await.unwrap();
        assert_eq!(registry.search(None).await.unwrap(), all);
        assert_eq!(registry.search(Some("   ")).await.unwrap(), all);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let registry = setup_test_registry().await;
        registry.create(sample_plot_data("Plot 100 sqft")).await.unwrap();
        let discounted = registry.create(sample_plot_data("Plot 10% off")).await.unwrap();

        let found = registry.search(Some("10%")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, discounted.id);

        assert!(registry.search(Some("_")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_by_location() {
        let registry = setup_test_registry().await;
        let mut ecity = sample_plot_data("Residential Plot");
        ecity.location = "Electronic City, Bangalore".to_string();
        let ecity = registry.create(ecity).await.unwrap();

        let mut btm = sample_plot_data("Electronic City adjacent");
        btm.location = "BTM Layout, Bangalore".to_string();
        let btm = registry.create(btm).await.unwrap();

        let found = registry.search_by_location("electronic").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ecity.id);

        let bangalore = registry.search_by_location("BANGALORE").await.unwrap();
        assert_eq!(bangalore.len(), 2);

        registry.soft_delete(btm.id).await.unwrap();
        let bangalore = registry.search_by_location("bangalore").await.unwrap();
        assert_eq!(bangalore.len(), 1);
        assert_eq!(bangalore[0].id, ecity.id);
    }

    #[tokio::test]
    async fn test_list_attaches_images_per_plot() {
        let registry = setup_test_registry().await;
        let mut first = sample_plot_data("First");
        first.images = vec!["https://images.example.com/f.jpg".to_string()];
        let first = registry.create(first).await.unwrap();

        let mut second = sample_plot_data("Second");
        second.images = vec![
            "https://images.example.com/s1.jpg".to_string(),
            "https://images.example.com/s2.jpg".to_string(),
        ];
        let second = registry.create(second).await.unwrap();

        let plots = registry.list_active().await.unwrap();
        let by_id: HashMap<PlotId, &Plot> = plots.iter().map(|p| (p.id, p)).collect();
        assert_eq!(by_id[&first.id].images, first.images);
        assert_eq!(by_id[&second.id].images, second.images);
    }

    #[tokio::test]
    async fn test_list_active_beyond_parameter_limit() {
        let registry = setup_test_registry().await;
        sqlx::query(
            "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 33000)
             INSERT INTO plots (title, dimensions, location, price, owner_name, phone_number, whatsapp_number, posted_at)
             SELECT 'Plot ' || i, '30x40', 'Whitefield', '₹10 Lakhs', 'Owner', '7780270405', '7780270405',
                    '2024-01-01T00:00:00.000000Z'
             FROM n",
        )
        .execute(&registry.pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO plot_images (plot_id, position, image_url)
             VALUES (1, 0, 'https://images.example.com/first.jpg'),
                    (33000, 0, 'https://images.example.com/last.jpg')",
        )
        .execute(&registry.pool)
        .await
        .unwrap();

        let plots = registry.list_active().await.unwrap();
        assert_eq!(plots.len(), 33000);

        let by_id: HashMap<PlotId, &Plot> = plots.iter().map(|p| (p.id, p)).collect();
        assert_eq!(by_id[&1].images, vec!["https://images.example.com/first.jpg".to_string()]);
        assert_eq!(by_id[&33000].images, vec!["https://images.example.com/last.jpg".to_string()]);
        assert!(by_id[&16500].images.is_empty());

        let found = registry.search(Some("whitefield")).await.unwrap();
        assert_eq!(found.len(), 33000);
    }
}
