//! Screen ⇄ logical coordinate transform for the editor and viewer.
//!
//! The view is a pan offset in screen pixels plus a uniform scale. Lot
//! geometry never depends on it; only pointer input and painting do.

use serde::Serialize;

use crate::geometry::Point;

/// Smallest allowed zoom scale.
pub const MIN_SCALE: f64 = 0.5;

/// Largest allowed zoom scale.
pub const MAX_SCALE: f64 = 2.0;

/// Zoom-in / zoom-out increment.
pub const SCALE_STEP: f64 = 0.1;

/// Scale of a freshly mounted view.
pub const DEFAULT_SCALE: f64 = 1.0;

/// `(screen - pan) / scale`.
pub fn to_logical(screen: Point, pan: Point, scale: f64) -> Point {
    Point::new((screen.x - pan.x) / scale, (screen.y - pan.y) / scale)
}

/// `logical * scale + pan`.
pub fn to_screen(logical: Point, pan: Point, scale: f64) -> Point {
    Point::new(logical.x * scale + pan.x, logical.y * scale + pan.y)
}

/// Clamp into `[MIN_SCALE, MAX_SCALE]`. NaN falls back to the default scale.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return DEFAULT_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Snap to the 0.1 grid so repeated steps do not accumulate float drift.
fn snap_to_step(scale: f64) -> f64 {
    (scale / SCALE_STEP).round() * SCALE_STEP
}

/// Ephemeral pan/zoom state owned by one editor or viewer session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub pan: Point,
    scale: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            pan: Point::default(),
            scale: DEFAULT_SCALE,
        }
    }
}

impl ViewState {
    pub fn new(pan: Point, scale: f64) -> Self {
        Self {
            pan,
            scale: clamp_scale(scale),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = clamp_scale(scale);
    }

    pub fn zoom_in(&mut self) {
        self.scale = clamp_scale(snap_to_step(self.scale + SCALE_STEP));
    }

    pub fn zoom_out(&mut self) {
        self.scale = clamp_scale(snap_to_step(self.scale - SCALE_STEP));
    }

    /// Integer percentage for zoom readouts (`1.0` → `100`).
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    /// Shift the pan offset by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_logical(&self, screen: Point) -> Point {
        to_logical(screen, self.pan, self.scale)
    }

    pub fn to_screen(&self, logical: Point) -> Point {
        to_screen(logical, self.pan, self.scale)
    }

    /// CSS transform string applied to the lot layer.
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.pan.x, self.pan.y, self.scale
        )
    }
}
