//! Lot filtering and text search.
//!
//! These predicates define the semantics every store must reproduce, so the
//! PostgreSQL queries in the `db` crate mirror them clause for clause.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lot::{Lot, LotStatus};
use crate::types::DbId;

/// Filter criteria. Every bound is inclusive; `None` imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotFilter {
    pub map_id: Option<DbId>,
    pub status: Option<LotStatus>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_sqft: Option<i64>,
    pub max_sqft: Option<i64>,
}

impl LotFilter {
    /// Reject inverted ranges so they are reported instead of silently
    /// matching nothing.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_range("price", self.min_price, self.max_price)?;
        check_range("square footage", self.min_sqft, self.max_sqft)
    }

    pub fn matches(&self, lot: &Lot) -> bool {
        self.map_id.is_none_or(|id| lot.map_id == id)
            && self.status.is_none_or(|s| lot.status == s)
            && self.min_price.is_none_or(|min| lot.price >= min)
            && self.max_price.is_none_or(|max| lot.price <= max)
            && self.min_sqft.is_none_or(|min| lot.square_feet >= min)
            && self.max_sqft.is_none_or(|max| lot.square_feet <= max)
    }

    /// Lots matching the filter, in input order.
    pub fn apply<'a, I>(&self, lots: I) -> Vec<Lot>
    where
        I: IntoIterator<Item = &'a Lot>,
    {
        lots.into_iter()
            .filter(|lot| self.matches(lot))
            .cloned()
            .collect()
    }
}

fn check_range(label: &str, min: Option<i64>, max: Option<i64>) -> Result<(), CoreError> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(CoreError::Validation(format!(
                "Minimum {label} {min} is greater than maximum {max}"
            )));
        }
    }
    Ok(())
}

/// Case-insensitive substring match against the lot number and description.
///
/// A blank query matches every lot.
pub fn matches_search(lot: &Lot, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    lot.number.to_lowercase().contains(&needle) || lot.description.to_lowercase().contains(&needle)
}
