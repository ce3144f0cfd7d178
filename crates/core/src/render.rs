//! Paint rules shared by the editor canvas and the public viewer.
//!
//! The output is a flat display list in logical coordinates plus the view
//! transform to apply to the whole layer. Zoom never changes lot geometry;
//! it only changes the transform and, in [`StrokeMode::Constant`], the
//! stroke width.

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point};
use crate::lot::{Lot, LotStatus};
use crate::lot_map::LotMap;
use crate::types::DbId;
use crate::view::ViewState;

/// Fill opacity used for every lot.
pub const FILL_OPACITY: f64 = 0.35;

/// Stroke width at 100% zoom.
pub const BASE_STROKE_WIDTH: f64 = 2.0;

/// Stroke width of the selected lot at 100% zoom.
pub const SELECTED_STROKE_WIDTH: f64 = 4.0;

/// Fill and stroke colour pair for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusColors {
    pub fill: &'static str,
    pub stroke: &'static str,
}

pub fn status_colors(status: LotStatus) -> StatusColors {
    match status {
        LotStatus::Available => StatusColors {
            fill: "#22c55e",
            stroke: "#15803d",
        },
        LotStatus::Pending => StatusColors {
            fill: "#f59e0b",
            stroke: "#b45309",
        },
        LotStatus::Sold => StatusColors {
            fill: "#ef4444",
            stroke: "#b91c1c",
        },
    }
}

/// How strokes react to zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeMode {
    /// Strokes are scaled with the layer, thinning out when zoomed out.
    #[default]
    ScaleWithZoom,
    /// Strokes are compensated so they keep the same on-screen width.
    Constant,
}

/// Width to emit for a stroke of `base` screen pixels at `scale`.
pub fn stroke_width(base: f64, scale: f64, mode: StrokeMode) -> f64 {
    match mode {
        StrokeMode::ScaleWithZoom => base,
        StrokeMode::Constant => base / scale,
    }
}

/// Label anchor: the centre of the bounding box.
pub fn label_position(bounds: &BoundingBox) -> Point {
    bounds.center()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ShapePaint {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Path {
        d: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Everything needed to paint one lot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotPaint {
    pub lot_id: DbId,
    pub status: LotStatus,
    pub shape: ShapePaint,
    pub fill: &'static str,
    pub fill_opacity: f64,
    pub stroke: &'static str,
    pub stroke_width: f64,
    pub selected: bool,
    pub label: Label,
}

pub fn paint_lot(lot: &Lot, selected: bool, view: &ViewState, mode: StrokeMode) -> LotPaint {
    let bounds = lot.geometry.bounds();
    let shape = match lot.geometry.outline_path() {
        Some(d) => ShapePaint::Path { d },
        None => ShapePaint::Rect {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        },
    };
    let colors = status_colors(lot.status);
    let base = if selected {
        SELECTED_STROKE_WIDTH
    } else {
        BASE_STROKE_WIDTH
    };
    let anchor = label_position(&bounds);

    LotPaint {
        lot_id: lot.id,
        status: lot.status,
        shape,
        fill: colors.fill,
        fill_opacity: FILL_OPACITY,
        stroke: colors.stroke,
        stroke_width: stroke_width(base, view.scale(), mode),
        selected,
        label: Label {
            text: lot.number.clone(),
            x: anchor.x,
            y: anchor.y,
        },
    }
}

/// A whole map ready to paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub map_id: DbId,
    pub name: String,
    pub slug: String,
    pub background_image: Option<String>,
    /// CSS transform for the lot layer (pan then scale, origin top-left).
    pub transform: String,
    pub scale: f64,
    pub lots: Vec<LotPaint>,
}

/// Paint `map` in insertion order so later lots sit on top.
pub fn render_scene(
    map: &LotMap,
    view: &ViewState,
    selected: Option<DbId>,
    mode: StrokeMode,
) -> Scene {
    let settings = map.settings();
    Scene {
        map_id: settings.id,
        name: settings.name.clone(),
        slug: settings.slug.clone(),
        background_image: settings.background_image.clone(),
        transform: view.css_transform(),
        scale: view.scale(),
        lots: map
            .lots()
            .iter()
            .map(|lot| paint_lot(lot, selected == Some(lot.id), view, mode))
            .collect(),
    }
}
