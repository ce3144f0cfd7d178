//! Shared query parameter types for API handlers.
//!
//! Filter criteria deserialize straight into
//! [`lotmap_core::filter::LotFilter`]; the structs here cover the rest.

use lotmap_core::render::StrokeMode;
use lotmap_core::types::DbId;
use serde::Deserialize;

/// `GET /lots?mapId=`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotListParams {
    pub map_id: Option<DbId>,
}

/// `GET /lots/search?q=`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// `GET /map-settings?slug=`
#[derive(Debug, Deserialize)]
pub struct MapSettingsParams {
    pub slug: Option<String>,
}

/// `GET /viewer/{slug}?stroke=`
#[derive(Debug, Default, Deserialize)]
pub struct ViewerParams {
    #[serde(default)]
    pub stroke: StrokeMode,
}
