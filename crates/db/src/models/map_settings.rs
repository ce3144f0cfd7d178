//! Row model for the `map_settings` table.

use lotmap_core::map_settings::MapSettings;
use lotmap_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `map_settings` table.
#[derive(Debug, Clone, FromRow)]
pub struct MapSettingsRow {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub background_image: Option<String>,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<MapSettingsRow> for MapSettings {
    fn from(row: MapSettingsRow) -> Self {
        MapSettings {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            background_image: row.background_image,
            is_public: row.is_public,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
