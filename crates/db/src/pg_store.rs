//! [`LotStore`] backed by PostgreSQL.

use async_trait::async_trait;
use lotmap_core::error::CoreError;
use lotmap_core::filter::LotFilter;
use lotmap_core::lot::{Lot, LotChanges, NewLot};
use lotmap_core::map_settings::{MapSettings, MapSettingsChanges, NewMapSettings};
use lotmap_core::store::LotStore;
use lotmap_core::types::DbId;

use crate::repositories::{LotRepo, MapSettingsRepo};
use crate::DbPool;

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Convert a database error, logging the detail and keeping it out of the
/// client-facing message.
fn internal(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database error");
    CoreError::Internal("Database error".into())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION))
}

/// Map a map-settings write error, turning a slug collision into
/// `DuplicateSlug`.
fn slug_write_error(err: sqlx::Error, slug: &str) -> CoreError {
    if is_unique_violation(&err) {
        CoreError::DuplicateSlug(slug.to_string())
    } else {
        internal(err)
    }
}

fn lots_from_rows(rows: Vec<crate::models::lot::LotRow>) -> Result<Vec<Lot>, CoreError> {
    rows.into_iter().map(Lot::try_from).collect()
}

#[async_trait]
impl LotStore for PgStore {
    async fn get_lots(&self, map_id: Option<DbId>) -> Result<Vec<Lot>, CoreError> {
        lots_from_rows(LotRepo::list(&self.pool, map_id).await.map_err(internal)?)
    }

    async fn get_lot(&self, id: DbId) -> Result<Option<Lot>, CoreError> {
        LotRepo::find_by_id(&self.pool, id)
            .await
            .map_err(internal)?
            .map(Lot::try_from)
            .transpose()
    }

    async fn search_lots(&self, query: &str) -> Result<Vec<Lot>, CoreError> {
        lots_from_rows(LotRepo::search(&self.pool, query).await.map_err(internal)?)
    }

    async fn filter_lots(&self, filter: &LotFilter) -> Result<Vec<Lot>, CoreError> {
        filter.validate()?;
        lots_from_rows(LotRepo::filter(&self.pool, filter).await.map_err(internal)?)
    }

    async fn create_lot(&self, lot: NewLot) -> Result<Lot, CoreError> {
        if MapSettingsRepo::find_by_id(&self.pool, lot.map_id)
            .await
            .map_err(internal)?
            .is_none()
        {
            return Err(CoreError::NotFound {
                entity: "MapSettings",
                id: lot.map_id,
            });
        }
        let row = LotRepo::create(&self.pool, &lot).await.map_err(internal)?;
        tracing::debug!(lot_id = row.id, map_id = row.map_id, "Lot created");
        Lot::try_from(row)
    }

    async fn update_lot(&self, id: DbId, changes: LotChanges) -> Result<Lot, CoreError> {
        let row = LotRepo::update(&self.pool, id, &changes)
            .await
            .map_err(internal)?
            .ok_or(CoreError::NotFound { entity: "Lot", id })?;
        Lot::try_from(row)
    }

    async fn delete_lot(&self, id: DbId) -> Result<bool, CoreError> {
        LotRepo::delete(&self.pool, id).await.map_err(internal)
    }

    async fn get_map_settings(
        &self,
        slug: Option<&str>,
    ) -> Result<Vec<MapSettings>, CoreError> {
        let rows = match slug {
            Some(slug) => MapSettingsRepo::find_by_slug(&self.pool, slug)
                .await
                .map(|row| row.into_iter().collect()),
            None => MapSettingsRepo::list(&self.pool).await,
        }
        .map_err(internal)?;
        Ok(rows.into_iter().map(MapSettings::from).collect())
    }

    async fn get_map_settings_by_id(&self, id: DbId) -> Result<Option<MapSettings>, CoreError> {
        let row = MapSettingsRepo::find_by_id(&self.pool, id)
            .await
            .map_err(internal)?;
        Ok(row.map(MapSettings::from))
    }

    async fn get_map_settings_by_owner(
        &self,
        owner_id: DbId,
    ) -> Result<Vec<MapSettings>, CoreError> {
        let rows = MapSettingsRepo::list_by_owner(&self.pool, owner_id)
            .await
            .map_err(internal)?;
        Ok(rows.into_iter().map(MapSettings::from).collect())
    }

    async fn create_map_settings(&self, new: NewMapSettings) -> Result<MapSettings, CoreError> {
        let row = MapSettingsRepo::create(&self.pool, &new)
            .await
            .map_err(|e| slug_write_error(e, &new.slug))?;
        tracing::info!(map_id = row.id, slug = %row.slug, "Map settings created");
        Ok(row.into())
    }

    async fn update_map_settings(
        &self,
        id: DbId,
        changes: MapSettingsChanges,
    ) -> Result<MapSettings, CoreError> {
        let row = MapSettingsRepo::update(&self.pool, id, &changes)
            .await
            .map_err(|e| slug_write_error(e, changes.slug.as_deref().unwrap_or_default()))?
            .ok_or(CoreError::NotFound {
                entity: "MapSettings",
                id,
            })?;
        Ok(row.into())
    }

    async fn delete_map_settings(&self, id: DbId) -> Result<bool, CoreError> {
        let deleted = MapSettingsRepo::delete_cascade(&self.pool, id)
            .await
            .map_err(internal)?;
        if deleted {
            tracing::info!(map_id = id, "Map settings deleted");
        }
        Ok(deleted)
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(internal)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
