//! Row model for the `lots` table.
//!
//! Geometry is stored flat (`x`, `y`, `width`, `height`, nullable `outline`)
//! and re-validated on the way out, so a hand-edited row with a malformed
//! outline surfaces as an internal error instead of a broken map.

use lotmap_core::error::CoreError;
use lotmap_core::geometry::{Geometry, GeometryFields};
use lotmap_core::lot::Lot;
use lotmap_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `lots` table.
#[derive(Debug, Clone, FromRow)]
pub struct LotRow {
    pub id: DbId,
    pub map_id: DbId,
    pub number: String,
    pub status: String,
    pub price: i64,
    pub square_feet: i64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub description: String,
    pub amenities: Vec<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub outline: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<LotRow> for Lot {
    type Error = CoreError;

    fn try_from(row: LotRow) -> Result<Self, Self::Error> {
        let geometry = Geometry::try_from(GeometryFields {
            x: row.x,
            y: row.y,
            width: row.width,
            height: row.height,
            outline: row.outline,
        })
        .map_err(|e| CoreError::Internal(format!("Lot {} has invalid stored geometry: {e}", row.id)))?;
        let status = row
            .status
            .parse()
            .map_err(|e| CoreError::Internal(format!("Lot {} has invalid stored status: {e}", row.id)))?;

        Ok(Lot {
            id: row.id,
            map_id: row.map_id,
            number: row.number,
            status,
            price: row.price,
            square_feet: row.square_feet,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            description: row.description,
            amenities: row.amenities,
            geometry,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
