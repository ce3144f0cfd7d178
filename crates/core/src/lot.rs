//! Lot entity, its status, and the create/update payloads.
//!
//! Wire DTOs ([`CreateLot`], [`UpdateLot`]) are loosely shaped request
//! bodies. They are validated into [`NewLot`] / [`LotChanges`] before any
//! store sees them, so the data-access layer only ever handles well-formed
//! geometry and non-negative numbers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::geometry::{Geometry, GeometryFields};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Sales status of a lot. Drives the colour used when painting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotStatus {
    #[default]
    Available,
    Pending,
    Sold,
}

impl LotStatus {
    pub const ALL: [LotStatus; 3] = [LotStatus::Available, LotStatus::Pending, LotStatus::Sold];

    pub fn as_str(self) -> &'static str {
        match self {
            LotStatus::Available => "available",
            LotStatus::Pending => "pending",
            LotStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for LotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LotStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(LotStatus::Available),
            "pending" => Ok(LotStatus::Pending),
            "sold" => Ok(LotStatus::Sold),
            other => Err(CoreError::Validation(format!(
                "Unknown lot status '{other}' (expected available, pending or sold)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// One parcel drawn on a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: DbId,
    pub map_id: DbId,
    pub number: String,
    pub status: LotStatus,
    pub price: i64,
    pub square_feet: i64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub description: String,
    pub amenities: Vec<String>,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Lot {
    /// Build the persisted record for `new` with store-assigned fields.
    pub fn from_new(id: DbId, new: NewLot, now: Timestamp) -> Self {
        Lot {
            id,
            map_id: new.map_id,
            number: new.number,
            status: new.status,
            price: new.price,
            square_feet: new.square_feet,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            description: new.description,
            amenities: new.amenities,
            geometry: new.geometry,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply validated changes in place. Absent fields are left untouched.
    pub fn apply(&mut self, changes: LotChanges, now: Timestamp) {
        let LotChanges {
            number,
            status,
            price,
            square_feet,
            bedrooms,
            bathrooms,
            description,
            amenities,
            geometry,
        } = changes;

        if let Some(v) = number {
            self.number = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
        if let Some(v) = price {
            self.price = v;
        }
        if let Some(v) = square_feet {
            self.square_feet = v;
        }
        if let Some(v) = bedrooms {
            self.bedrooms = v;
        }
        if let Some(v) = bathrooms {
            self.bathrooms = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = amenities {
            self.amenities = v;
        }
        if let Some(v) = geometry {
            self.geometry = v;
        }
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Request body for creating a lot.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLot {
    pub map_id: DbId,
    #[validate(length(min = 1, max = 50))]
    pub number: String,
    /// Defaults to `available` if omitted.
    pub status: Option<LotStatus>,
    #[validate(range(min = 0))]
    pub price: Option<i64>,
    #[validate(range(min = 0))]
    pub square_feet: Option<i64>,
    #[validate(range(min = 0))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0))]
    pub bathrooms: Option<i32>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
    #[serde(flatten)]
    pub geometry: GeometryFields,
}

impl CreateLot {
    /// Check field ranges and geometry, applying defaults for omitted fields.
    pub fn into_new_lot(mut self) -> Result<NewLot, CoreError> {
        self.number = self.number.trim().to_string();
        self.validate()?;
        let geometry = Geometry::try_from(self.geometry)?;
        Ok(NewLot {
            map_id: self.map_id,
            number: self.number,
            status: self.status.unwrap_or_default(),
            price: self.price.unwrap_or(0),
            square_feet: self.square_feet.unwrap_or(0),
            bedrooms: self.bedrooms.unwrap_or(0),
            bathrooms: self.bathrooms.unwrap_or(0),
            description: self.description.unwrap_or_default(),
            amenities: normalize_amenities(self.amenities.unwrap_or_default()),
            geometry,
        })
    }
}

/// Request body for patching a lot. All fields are optional.
///
/// Geometry is replaced as a whole: either all of `x`, `y`, `width`,
/// `height` are supplied (plus `outline` for polygons) or none of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLot {
    #[validate(length(min = 1, max = 50))]
    pub number: Option<String>,
    pub status: Option<LotStatus>,
    #[validate(range(min = 0))]
    pub price: Option<i64>,
    #[validate(range(min = 0))]
    pub square_feet: Option<i64>,
    #[validate(range(min = 0))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0))]
    pub bathrooms: Option<i32>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub outline: Option<String>,
}

impl UpdateLot {
    pub fn into_changes(mut self) -> Result<LotChanges, CoreError> {
        self.number = self.number.map(|n| n.trim().to_string());
        self.validate()?;

        let geometry = match (self.x, self.y, self.width, self.height) {
            (Some(x), Some(y), Some(width), Some(height)) => Some(Geometry::try_from(
                GeometryFields {
                    x,
                    y,
                    width,
                    height,
                    outline: self.outline,
                },
            )?),
            (None, None, None, None) if self.outline.is_none() => None,
            _ => {
                return Err(CoreError::Validation(
                    "Geometry updates must supply x, y, width and height together".into(),
                ))
            }
        };

        Ok(LotChanges {
            number: self.number,
            status: self.status,
            price: self.price,
            square_feet: self.square_feet,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            description: self.description,
            amenities: self.amenities.map(normalize_amenities),
            geometry,
        })
    }
}

// ---------------------------------------------------------------------------
// Validated payloads
// ---------------------------------------------------------------------------

/// A fully validated lot ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLot {
    pub map_id: DbId,
    pub number: String,
    pub status: LotStatus,
    pub price: i64,
    pub square_feet: i64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub description: String,
    pub amenities: Vec<String>,
    pub geometry: Geometry,
}

/// Validated partial update of a lot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LotChanges {
    pub number: Option<String>,
    pub status: Option<LotStatus>,
    pub price: Option<i64>,
    pub square_feet: Option<i64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub geometry: Option<Geometry>,
}

/// Trim amenity labels and drop blanks and exact duplicates, keeping order.
fn normalize_amenities(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for a in raw {
        let a = a.trim();
        if !a.is_empty() && !out.iter().any(|existing| existing == a) {
            out.push(a.to_string());
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::geometry::BoundingBox;

    fn rect_create(map_id: DbId) -> CreateLot {
        serde_json::from_value(serde_json::json!({
            "mapId": map_id,
            "number": "12",
            "x": 10, "y": 10, "width": 140, "height": 110
        }))
        .unwrap()
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("SOLD".parse::<LotStatus>().unwrap(), LotStatus::Sold);
        assert_eq!(" pending ".parse::<LotStatus>().unwrap(), LotStatus::Pending);
        assert_matches!("reserved".parse::<LotStatus>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn create_applies_defaults() {
        let new = rect_create(3).into_new_lot().unwrap();
        assert_eq!(new.status, LotStatus::Available);
        assert_eq!(new.price, 0);
        assert!(new.amenities.is_empty());
        assert_eq!(
            new.geometry,
            Geometry::Rectangle(BoundingBox::new(10.0, 10.0, 140.0, 110.0))
        );
    }

    #[test]
    fn create_rejects_negative_price() {
        let mut dto = rect_create(1);
        dto.price = Some(-5);
        assert_matches!(dto.into_new_lot(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn create_rejects_blank_number() {
        let mut dto = rect_create(1);
        dto.number = String::new();
        assert_matches!(dto.into_new_lot(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn create_rejects_two_point_outline() {
        let dto: CreateLot = serde_json::from_value(serde_json::json!({
            "mapId": 1, "number": "4",
            "x": 0, "y": 0, "width": 50, "height": 0,
            "outline": "M 0 0 L 50 0 Z"
        }))
        .unwrap();
        assert_matches!(dto.into_new_lot(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_number_is_rejected_after_trimming() {
        let mut dto = rect_create(1);
        dto.number = "   ".into();
        assert_matches!(dto.into_new_lot(), Err(CoreError::Validation(_)));

        let dto = UpdateLot {
            number: Some(" \t ".into()),
            ..Default::default()
        };
        assert_matches!(dto.into_changes(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn number_is_stored_trimmed() {
        let mut dto = rect_create(1);
        dto.number = "  A-12 ".into();
        assert_eq!(dto.into_new_lot().unwrap().number, "A-12");
    }

    #[test]
    fn amenities_are_trimmed_and_deduplicated() {
        let mut dto = rect_create(1);
        dto.amenities = Some(vec![
            " Pool ".into(),
            "".into(),
            "Pool".into(),
            "Corner lot".into(),
        ]);
        let new = dto.into_new_lot().unwrap();
        assert_eq!(new.amenities, vec!["Pool", "Corner lot"]);
    }

    #[test]
    fn update_requires_complete_geometry() {
        let dto = UpdateLot {
            x: Some(1.0),
            y: Some(2.0),
            ..Default::default()
        };
        assert_matches!(dto.into_changes(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn update_without_geometry_leaves_it_alone() {
        let dto = UpdateLot {
            status: Some(LotStatus::Sold),
            price: Some(250_000),
            ..Default::default()
        };
        let changes = dto.into_changes().unwrap();
        assert!(changes.geometry.is_none());
        assert_eq!(changes.status, Some(LotStatus::Sold));
    }

    #[test]
    fn lot_json_is_flat_camel_case() {
        let now = chrono::Utc::now();
        let lot = Lot::from_new(9, rect_create(2).into_new_lot().unwrap(), now);
        let json = serde_json::to_value(&lot).unwrap();
        assert_eq!(json["mapId"], 2);
        assert_eq!(json["squareFeet"], 0);
        assert_eq!(json["width"], 140.0);
        assert!(json.get("outline").is_none());
        assert_eq!(json["status"], "available");
    }

    #[test]
    fn apply_changes_bumps_updated_at() {
        let created = chrono::Utc::now();
        let mut lot = Lot::from_new(1, rect_create(2).into_new_lot().unwrap(), created);
        let later = created + chrono::Duration::seconds(5);
        lot.apply(
            LotChanges {
                price: Some(199_999),
                ..Default::default()
            },
            later,
        );
        assert_eq!(lot.price, 199_999);
        assert_eq!(lot.updated_at, later);
        assert_eq!(lot.created_at, created);
    }
}
