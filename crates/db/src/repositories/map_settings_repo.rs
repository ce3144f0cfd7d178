//! Repository for the `map_settings` table.

use lotmap_core::map_settings::{MapSettingsChanges, NewMapSettings};
use lotmap_core::types::DbId;
use sqlx::PgPool;

use crate::models::map_settings::MapSettingsRow;
use crate::repositories::LotRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, owner_id, name, slug, description, background_image, is_public, created_at, updated_at";

/// Provides CRUD operations for map settings.
pub struct MapSettingsRepo;

impl MapSettingsRepo {
    /// Insert new map settings, returning the created row.
    ///
    /// A slug collision fails with a unique violation on
    /// `uq_map_settings_slug`.
    pub async fn create(
        pool: &PgPool,
        input: &NewMapSettings,
    ) -> Result<MapSettingsRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO map_settings (owner_id, name, slug, description, background_image, is_public)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MapSettingsRow>(&query)
            .bind(input.owner_id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(&input.background_image)
            .bind(input.is_public)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MapSettingsRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM map_settings WHERE id = $1");
        sqlx::query_as::<_, MapSettingsRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<MapSettingsRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM map_settings WHERE slug = $1");
        sqlx::query_as::<_, MapSettingsRow>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Every map, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<MapSettingsRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM map_settings ORDER BY id ASC");
        sqlx::query_as::<_, MapSettingsRow>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<MapSettingsRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM map_settings WHERE owner_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, MapSettingsRow>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Update map settings. Only non-`None` fields in `input` are applied;
    /// `owner_id` is never written. `description` and `background_image`
    /// can be set to NULL through `Some(None)`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &MapSettingsChanges,
    ) -> Result<Option<MapSettingsRow>, sqlx::Error> {
        let query = format!(
            "UPDATE map_settings SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = CASE WHEN $7 THEN $4 ELSE description END,
                background_image = CASE WHEN $8 THEN $5 ELSE background_image END,
                is_public = COALESCE($6, is_public),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MapSettingsRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.description.as_ref().and_then(|d| d.as_deref()))
            .bind(input.background_image.as_ref().and_then(|b| b.as_deref()))
            .bind(input.is_public)
            .bind(input.description.is_some())
            .bind(input.background_image.is_some())
            .fetch_optional(pool)
            .await
    }

    /// Delete a map and its lots in one transaction, lots first.
    ///
    /// Returns `true` if the map row was removed.
    pub async fn delete_cascade(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lots_deleted = LotRepo::delete_by_map(&mut *tx, id).await?;
        let result = sqlx::query("DELETE FROM map_settings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(map_id = id, lots_deleted, "Cascade delete committed");
        Ok(result.rows_affected() > 0)
    }
}
