//! Data-access contract for lots and map settings.
//!
//! Handlers and the editor only ever talk to `Arc<dyn LotStore>`. The
//! PostgreSQL implementation lives in the `db` crate; [`MemoryStore`] backs
//! tests and local development.
//!
//! Writes are last-write-wins: there is no row versioning.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::filter::{matches_search, LotFilter};
use crate::lot::{Lot, LotChanges, NewLot};
use crate::map_settings::{MapSettings, MapSettingsChanges, NewMapSettings};
use crate::types::DbId;

#[async_trait]
pub trait LotStore: Send + Sync {
    /// All lots, optionally scoped to one map, in insertion order.
    async fn get_lots(&self, map_id: Option<DbId>) -> Result<Vec<Lot>, CoreError>;

    async fn get_lot(&self, id: DbId) -> Result<Option<Lot>, CoreError>;

    /// Case-insensitive substring search over number and description.
    async fn search_lots(&self, query: &str) -> Result<Vec<Lot>, CoreError>;

    /// Lots matching every supplied criterion (inclusive bounds).
    async fn filter_lots(&self, filter: &LotFilter) -> Result<Vec<Lot>, CoreError>;

    /// Insert a lot. Fails with `NotFound` when the map does not exist.
    async fn create_lot(&self, lot: NewLot) -> Result<Lot, CoreError>;

    async fn update_lot(&self, id: DbId, changes: LotChanges) -> Result<Lot, CoreError>;

    /// Returns `true` if a row was deleted.
    async fn delete_lot(&self, id: DbId) -> Result<bool, CoreError>;

    /// The map with `slug` (zero or one entries), or every map oldest first
    /// when no slug is given.
    async fn get_map_settings(&self, slug: Option<&str>) -> Result<Vec<MapSettings>, CoreError>;

    async fn get_map_settings_by_id(&self, id: DbId) -> Result<Option<MapSettings>, CoreError>;

    async fn get_map_settings_by_owner(&self, owner_id: DbId) -> Result<Vec<MapSettings>, CoreError>;

    /// Insert map settings. Fails with `DuplicateSlug` on a slug collision.
    async fn create_map_settings(&self, new: NewMapSettings) -> Result<MapSettings, CoreError>;

    async fn update_map_settings(
        &self,
        id: DbId,
        changes: MapSettingsChanges,
    ) -> Result<MapSettings, CoreError>;

    /// Delete a map and all of its lots, lots first. Returns `true` if the
    /// map existed.
    async fn delete_map_settings(&self, id: DbId) -> Result<bool, CoreError>;

    async fn health_check(&self) -> Result<(), CoreError>;

    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Tables {
    next_lot_id: DbId,
    next_map_id: DbId,
    lots: BTreeMap<DbId, Lot>,
    maps: BTreeMap<DbId, MapSettings>,
}

impl Tables {
    fn slug_taken(&self, slug: &str, except: Option<DbId>) -> bool {
        self.maps
            .values()
            .any(|m| m.slug == slug && Some(m.id) != except)
    }
}

/// Process-local store. Ids are assigned sequentially from 1, so
/// iteration order of the id-keyed tables equals insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LotStore for MemoryStore {
    async fn get_lots(&self, map_id: Option<DbId>) -> Result<Vec<Lot>, CoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .lots
            .values()
            .filter(|l| map_id.is_none_or(|id| l.map_id == id))
            .cloned()
            .collect())
    }

    async fn get_lot(&self, id: DbId) -> Result<Option<Lot>, CoreError> {
        Ok(self.tables.read().await.lots.get(&id).cloned())
    }

    async fn search_lots(&self, query: &str) -> Result<Vec<Lot>, CoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .lots
            .values()
            .filter(|l| matches_search(l, query))
            .cloned()
            .collect())
    }

    async fn filter_lots(&self, filter: &LotFilter) -> Result<Vec<Lot>, CoreError> {
        filter.validate()?;
        Ok(filter.apply(self.tables.read().await.lots.values()))
    }

    async fn create_lot(&self, lot: NewLot) -> Result<Lot, CoreError> {
        let mut tables = self.tables.write().await;
        if !tables.maps.contains_key(&lot.map_id) {
            return Err(CoreError::NotFound {
                entity: "MapSettings",
                id: lot.map_id,
            });
        }
        tables.next_lot_id += 1;
        let id = tables.next_lot_id;
        let lot = Lot::from_new(id, lot, chrono::Utc::now());
        tables.lots.insert(id, lot.clone());
        tracing::debug!(lot_id = id, map_id = lot.map_id, "Lot created");
        Ok(lot)
    }

    async fn update_lot(&self, id: DbId, changes: LotChanges) -> Result<Lot, CoreError> {
        let mut tables = self.tables.write().await;
        let lot = tables
            .lots
            .get_mut(&id)
            .ok_or(CoreError::NotFound { entity: "Lot", id })?;
        lot.apply(changes, chrono::Utc::now());
        tracing::debug!(lot_id = id, "Lot updated");
        Ok(lot.clone())
    }

    async fn delete_lot(&self, id: DbId) -> Result<bool, CoreError> {
        let removed = self.tables.write().await.lots.remove(&id).is_some();
        if removed {
            tracing::debug!(lot_id = id, "Lot deleted");
        }
        Ok(removed)
    }

    async fn get_map_settings(
        &self,
        slug: Option<&str>,
    ) -> Result<Vec<MapSettings>, CoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .maps
            .values()
            .filter(|m| slug.is_none_or(|s| m.slug == s))
            .cloned()
            .collect())
    }

    async fn get_map_settings_by_id(&self, id: DbId) -> Result<Option<MapSettings>, CoreError> {
        Ok(self.tables.read().await.maps.get(&id).cloned())
    }

    async fn get_map_settings_by_owner(
        &self,
        owner_id: DbId,
    ) -> Result<Vec<MapSettings>, CoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .maps
            .values()
            .filter(|m| m.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create_map_settings(&self, new: NewMapSettings) -> Result<MapSettings, CoreError> {
        let mut tables = self.tables.write().await;
        if tables.slug_taken(&new.slug, None) {
            return Err(CoreError::DuplicateSlug(new.slug));
        }
        tables.next_map_id += 1;
        let id = tables.next_map_id;
        let settings = MapSettings::from_new(id, new, chrono::Utc::now());
        tables.maps.insert(id, settings.clone());
        tracing::info!(map_id = id, slug = %settings.slug, "Map settings created");
        Ok(settings)
    }

    async fn update_map_settings(
        &self,
        id: DbId,
        changes: MapSettingsChanges,
    ) -> Result<MapSettings, CoreError> {
        let mut tables = self.tables.write().await;
        if let Some(slug) = &changes.slug {
            if tables.slug_taken(slug, Some(id)) {
                return Err(CoreError::DuplicateSlug(slug.clone()));
            }
        }
        let settings = tables.maps.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "MapSettings",
            id,
        })?;
        settings.apply(changes, chrono::Utc::now());
        Ok(settings.clone())
    }

    async fn delete_map_settings(&self, id: DbId) -> Result<bool, CoreError> {
        let mut tables = self.tables.write().await;
        if !tables.maps.contains_key(&id) {
            return Ok(false);
        }
        let before = tables.lots.len();
        tables.lots.retain(|_, lot| lot.map_id != id);
        let lots_deleted = before - tables.lots.len();
        tables.maps.remove(&id);
        tracing::info!(map_id = id, lots_deleted, "Map settings deleted");
        Ok(true)
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
