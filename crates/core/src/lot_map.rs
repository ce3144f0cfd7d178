//! In-memory lot map aggregate: one [`MapSettings`] and its ordered lots.
//!
//! Order is insertion order, which is also paint order: later lots are drawn
//! on top, so hit testing walks the list back to front.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::filter::{matches_search, LotFilter};
use crate::geometry::{
    bounding_box_of, distinct_point_count, HitTestMode, Point, MIN_POLYGON_POINTS,
};
use crate::lot::{Lot, LotStatus};
use crate::map_settings::MapSettings;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq)]
pub struct LotMap {
    settings: MapSettings,
    lots: Vec<Lot>,
}

impl LotMap {
    /// Build the aggregate, rejecting lots that belong to another map or
    /// break geometry invariants.
    pub fn new(settings: MapSettings, lots: Vec<Lot>) -> Result<Self, CoreError> {
        let map = LotMap { settings, lots };
        map.check_invariants()?;
        Ok(map)
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    pub fn id(&self) -> DbId {
        self.settings.id
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn lot(&self, id: DbId) -> Option<&Lot> {
        self.lots.iter().find(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Replace the settings row, keeping the id binding intact.
    pub fn set_settings(&mut self, settings: MapSettings) -> Result<(), CoreError> {
        if settings.id != self.settings.id {
            return Err(CoreError::Validation(format!(
                "Settings for map {} cannot replace map {}",
                settings.id, self.settings.id
            )));
        }
        self.settings = settings;
        Ok(())
    }

    /// Append a persisted lot. Lots are unique by id within the map.
    pub fn insert_lot(&mut self, lot: Lot) -> Result<(), CoreError> {
        self.check_lot(&lot)?;
        if self.lot(lot.id).is_some() {
            return Err(CoreError::Validation(format!(
                "Lot {} is already on map {}",
                lot.id,
                self.id()
            )));
        }
        self.lots.push(lot);
        Ok(())
    }

    /// Swap in an updated copy of an existing lot, keeping its position.
    pub fn replace_lot(&mut self, lot: Lot) -> Result<(), CoreError> {
        self.check_lot(&lot)?;
        let slot = self
            .lots
            .iter_mut()
            .find(|l| l.id == lot.id)
            .ok_or(CoreError::NotFound {
                entity: "Lot",
                id: lot.id,
            })?;
        *slot = lot;
        Ok(())
    }

    pub fn remove_lot(&mut self, id: DbId) -> Option<Lot> {
        let index = self.lots.iter().position(|l| l.id == id)?;
        Some(self.lots.remove(index))
    }

    /// Topmost lot containing `point` (logical coordinates).
    pub fn lot_at(&self, point: Point, mode: HitTestMode) -> Option<&Lot> {
        self.lots
            .iter()
            .rev()
            .find(|lot| lot.geometry.contains(point, mode))
    }

    pub fn filter(&self, filter: &LotFilter) -> Vec<Lot> {
        filter.apply(&self.lots)
    }

    pub fn search(&self, query: &str) -> Vec<Lot> {
        self.lots
            .iter()
            .filter(|lot| matches_search(lot, query))
            .cloned()
            .collect()
    }

    /// Number of lots per status, with zero entries for unused statuses.
    pub fn status_counts(&self) -> HashMap<LotStatus, usize> {
        let mut counts: HashMap<LotStatus, usize> =
            LotStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for lot in &self.lots {
            *counts.entry(lot.status).or_default() += 1;
        }
        counts
    }

    /// Display number for the next drawn lot: one past the highest numeric
    /// lot number on the map. Numbers with no successor in `u64` are skipped.
    pub fn next_lot_number(&self) -> String {
        self.lots
            .iter()
            .filter_map(|l| l.number.trim().parse::<u64>().ok())
            .filter_map(|n| n.checked_add(1))
            .max()
            .unwrap_or(1)
            .to_string()
    }

    /// Re-check every aggregate invariant.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        let mut seen = Vec::with_capacity(self.lots.len());
        for lot in &self.lots {
            self.check_lot(lot)?;
            if seen.contains(&lot.id) {
                return Err(CoreError::Validation(format!(
                    "Lot {} appears more than once on map {}",
                    lot.id,
                    self.id()
                )));
            }
            seen.push(lot.id);
        }
        Ok(())
    }

    fn check_lot(&self, lot: &Lot) -> Result<(), CoreError> {
        if lot.map_id != self.settings.id {
            return Err(CoreError::Validation(format!(
                "Lot {} belongs to map {}, not map {}",
                lot.id,
                lot.map_id,
                self.settings.id
            )));
        }
        let bounds = lot.geometry.bounds();
        if bounds.width < 0.0 || bounds.height < 0.0 {
            return Err(CoreError::Validation(format!(
                "Lot {} has a negative bounding box",
                lot.id
            )));
        }
        if let Some(outline) = lot.geometry.outline() {
            let consistent = bounding_box_of(outline).is_some_and(|e| e.approx_eq(&bounds));
            if !consistent {
                return Err(CoreError::Validation(format!(
                    "Lot {} bounding box does not match its outline",
                    lot.id
                )));
            }
            if distinct_point_count(outline) < MIN_POLYGON_POINTS {
                return Err(CoreError::Validation(format!(
                    "Lot {} outline has fewer than 3 distinct points",
                    lot.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::geometry::{BoundingBox, Geometry};

    fn settings(id: DbId) -> MapSettings {
        let now = chrono::Utc::now();
        MapSettings {
            id,
            owner_id: 1,
            name: "Test Map".into(),
            slug: format!("test-map-{id}"),
            description: None,
            background_image: None,
            is_public: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn lot(id: DbId, map_id: DbId, geometry: Geometry) -> Lot {
        let now = chrono::Utc::now();
        Lot {
            id,
            map_id,
            number: id.to_string(),
            status: LotStatus::Available,
            price: 100_000,
            square_feet: 1_200,
            bedrooms: 3,
            bathrooms: 2,
            description: String::new(),
            amenities: vec![],
            geometry,
            created_at: now,
            updated_at: now,
        }
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Geometry {
        Geometry::Rectangle(BoundingBox::new(x, y, w, h))
    }

    #[test]
    fn rejects_lot_from_other_map() {
        let result = LotMap::new(settings(1), vec![lot(1, 2, rect(0.0, 0.0, 5.0, 5.0))]);
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_polygon_with_stale_bounds() {
        let mut bad = lot(
            1,
            1,
            Geometry::polygon(vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
            ])
            .unwrap(),
        );
        if let Geometry::Polygon { bounds, .. } = &mut bad.geometry {
            bounds.width = 99.0;
        }
        assert_matches!(LotMap::new(settings(1), vec![bad]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn duplicate_lot_ids_are_rejected() {
        let mut map = LotMap::new(settings(1), vec![lot(1, 1, rect(0.0, 0.0, 5.0, 5.0))]).unwrap();
        let result = map.insert_lot(lot(1, 1, rect(10.0, 0.0, 5.0, 5.0)));
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn topmost_lot_wins_hit_test() {
        let map = LotMap::new(
            settings(1),
            vec![
                lot(1, 1, rect(0.0, 0.0, 100.0, 100.0)),
                lot(2, 1, rect(50.0, 50.0, 100.0, 100.0)),
            ],
        )
        .unwrap();
        let hit = map.lot_at(Point::new(75.0, 75.0), HitTestMode::Outline);
        assert_eq!(hit.map(|l| l.id), Some(2));
        let hit = map.lot_at(Point::new(10.0, 10.0), HitTestMode::Outline);
        assert_eq!(hit.map(|l| l.id), Some(1));
        assert!(map.lot_at(Point::new(500.0, 500.0), HitTestMode::Outline).is_none());
    }

    #[test]
    fn replace_keeps_position_and_remove_drops() {
        let mut map = LotMap::new(
            settings(1),
            vec![
                lot(1, 1, rect(0.0, 0.0, 5.0, 5.0)),
                lot(2, 1, rect(10.0, 0.0, 5.0, 5.0)),
            ],
        )
        .unwrap();
        let mut updated = map.lot(1).cloned().unwrap();
        updated.status = LotStatus::Sold;
        map.replace_lot(updated).unwrap();
        assert_eq!(map.lots()[0].status, LotStatus::Sold);

        assert!(map.remove_lot(1).is_some());
        assert!(map.remove_lot(1).is_none());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn replacing_unknown_lot_is_not_found() {
        let mut map = LotMap::new(settings(1), vec![]).unwrap();
        let result = map.replace_lot(lot(5, 1, rect(0.0, 0.0, 1.0, 1.0)));
        assert_matches!(result, Err(CoreError::NotFound { entity: "Lot", id: 5 }));
    }

    #[test]
    fn next_number_skips_past_highest_numeric() {
        let mut a = lot(1, 1, rect(0.0, 0.0, 5.0, 5.0));
        a.number = "7".into();
        let mut b = lot(2, 1, rect(10.0, 0.0, 5.0, 5.0));
        b.number = "Clubhouse".into();
        let map = LotMap::new(settings(1), vec![a, b]).unwrap();
        assert_eq!(map.next_lot_number(), "8");
        assert_eq!(LotMap::new(settings(2), vec![]).unwrap().next_lot_number(), "1");
    }

    #[test]
    fn next_number_ignores_numbers_without_successor() {
        let mut huge = lot(1, 1, rect(0.0, 0.0, 5.0, 5.0));
        huge.number = u64::MAX.to_string();
        let map = LotMap::new(settings(1), vec![huge.clone()]).unwrap();
        assert_eq!(map.next_lot_number(), "1");

        let mut b = lot(2, 1, rect(10.0, 0.0, 5.0, 5.0));
        b.number = "41".into();
        let map = LotMap::new(settings(1), vec![huge, b]).unwrap();
        assert_eq!(map.next_lot_number(), "42");
    }

    #[test]
    fn status_counts_include_zeroes() {
        let mut sold = lot(2, 1, rect(10.0, 0.0, 5.0, 5.0));
        sold.status = LotStatus::Sold;
        let map = LotMap::new(settings(1), vec![lot(1, 1, rect(0.0, 0.0, 5.0, 5.0)), sold]).unwrap();
        let counts = map.status_counts();
        assert_eq!(counts[&LotStatus::Available], 1);
        assert_eq!(counts[&LotStatus::Pending], 0);
        assert_eq!(counts[&LotStatus::Sold], 1);
    }
}
