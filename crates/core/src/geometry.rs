//! Lot geometry: points, bounding boxes, outline paths and hit testing.
//!
//! All coordinates are logical map coordinates (unpanned, unscaled). Outlines
//! are persisted as a small subset of the SVG path language
//! (`M x y L x y ... Z`), which [`to_svg_path`] writes and
//! [`parse_svg_path`] reads back.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Tolerance used when comparing a supplied bounding box with the extent
/// of its outline.
pub const BOUNDS_EPSILON: f64 = 1e-6;

/// Minimum number of distinct vertices for a polygon lot.
pub const MIN_POLYGON_POINTS: usize = 3;

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D point in logical or screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Bounding box
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle `{x, y, width, height}` with the origin at the
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalised box spanned by two opposite corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edge-inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.max_x() && p.y >= self.y && p.y <= self.max_y()
    }

    /// Whether two boxes describe the same rectangle within [`BOUNDS_EPSILON`].
    pub fn approx_eq(&self, other: &BoundingBox) -> bool {
        (self.x - other.x).abs() <= BOUNDS_EPSILON
            && (self.y - other.y).abs() <= BOUNDS_EPSILON
            && (self.width - other.width).abs() <= BOUNDS_EPSILON
            && (self.height - other.height).abs() <= BOUNDS_EPSILON
    }

    fn validate(&self) -> Result<(), CoreError> {
        let all_finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(CoreError::Validation(
                "Bounding box coordinates must be finite numbers".into(),
            ));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(CoreError::Validation(format!(
                "Bounding box dimensions must be non-negative (width {}, height {})",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Minimal axis-aligned box enclosing `points`.
///
/// Returns `None` for an empty slice.
pub fn bounding_box_of(points: &[Point]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Serialize a closed outline as `M x0 y0 L x1 y1 ... Z`.
///
/// An empty slice yields an empty string.
pub fn to_svg_path(points: &[Point]) -> String {
    let mut out = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        let _ = write!(out, "{cmd} {} {}", fmt_coord(p.x), fmt_coord(p.y));
    }
    if !points.is_empty() {
        out.push_str(" Z");
    }
    out
}

/// Shortest decimal form: `50` rather than `50.0`, `-0` printed as `0`.
fn fmt_coord(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else {
        format!("{v}")
    }
}

/// Parse an outline written in the `M`/`L`/`Z` path subset.
///
/// Upper-case commands are absolute, lower-case are relative to the current
/// point. Extra coordinate pairs after a moveto are implicit linetos.
/// Separators may be whitespace or commas. A trailing vertex equal to the
/// first one is dropped since `Z` already closes the ring.
pub fn parse_svg_path(path: &str) -> Result<Vec<Point>, CoreError> {
    let tokens = tokenize_path(path)?;
    let mut points: Vec<Point> = Vec::new();
    let mut current = Point::default();
    let mut command: Option<char> = None;
    let mut closed = false;
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i] {
            PathToken::Command(c) => {
                if closed {
                    return Err(CoreError::Validation(
                        "Outline path must contain a single closed ring".into(),
                    ));
                }
                match c {
                    'Z' | 'z' => {
                        closed = true;
                        command = None;
                    }
                    'M' | 'm' | 'L' | 'l' => {
                        if points.is_empty() && !matches!(c, 'M' | 'm') {
                            return Err(CoreError::Validation(
                                "Outline path must start with a moveto (M) command".into(),
                            ));
                        }
                        if !points.is_empty() && matches!(c, 'M' | 'm') {
                            return Err(CoreError::Validation(
                                "Outline path must not contain more than one subpath".into(),
                            ));
                        }
                        command = Some(c);
                    }
                    other => {
                        return Err(CoreError::Validation(format!(
                            "Unsupported outline path command '{other}'"
                        )));
                    }
                }
                i += 1;
            }
            PathToken::Number(_) => {
                let Some(c) = command else {
                    return Err(CoreError::Validation(
                        "Outline path has coordinates without a command".into(),
                    ));
                };
                let (x, y) = match (tokens.get(i), tokens.get(i + 1)) {
                    (Some(PathToken::Number(x)), Some(PathToken::Number(y))) => (*x, *y),
                    _ => {
                        return Err(CoreError::Validation(
                            "Outline path coordinates must come in x y pairs".into(),
                        ))
                    }
                };
                let relative = c.is_ascii_lowercase() && !points.is_empty();
                current = if relative {
                    Point::new(current.x + x, current.y + y)
                } else {
                    Point::new(x, y)
                };
                points.push(current);
                // Pairs following a moveto are implicit linetos.
                command = Some(if c.is_ascii_lowercase() { 'l' } else { 'L' });
                i += 2;
            }
        }
    }

    if points.is_empty() {
        return Err(CoreError::Validation("Outline path is empty".into()));
    }
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    Ok(points)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PathToken {
    Command(char),
    Number(f64),
}

fn tokenize_path(path: &str) -> Result<Vec<PathToken>, CoreError> {
    let mut tokens = Vec::new();
    let mut number = String::new();

    let flush = |number: &mut String, tokens: &mut Vec<PathToken>| -> Result<(), CoreError> {
        if number.is_empty() {
            return Ok(());
        }
        let value: f64 = number.parse().map_err(|_| {
            CoreError::Validation(format!("Invalid number '{number}' in outline path"))
        })?;
        if !value.is_finite() {
            return Err(CoreError::Validation(format!(
                "Non-finite number '{number}' in outline path"
            )));
        }
        tokens.push(PathToken::Number(value));
        number.clear();
        Ok(())
    };

    for ch in path.chars() {
        if ch.is_whitespace() || ch == ',' {
            flush(&mut number, &mut tokens)?;
        } else if ch.is_ascii_alphabetic() && ch != 'e' && ch != 'E' {
            flush(&mut number, &mut tokens)?;
            tokens.push(PathToken::Command(ch));
        } else {
            number.push(ch);
        }
    }
    flush(&mut number, &mut tokens)?;
    Ok(tokens)
}

/// Number of distinct vertices in `points` (exact comparison).
pub fn distinct_point_count(points: &[Point]) -> usize {
    let mut seen: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if !seen.contains(p) {
            seen.push(*p);
        }
    }
    seen.len()
}

/// Even-odd ray casting. Points lying on an edge count as inside.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < MIN_POLYGON_POINTS {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if on_segment(point, a, b) {
            return true;
        }
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn on_segment(p: Point, a: Point, b: Point) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross.abs() > BOUNDS_EPSILON {
        return false;
    }
    p.x >= a.x.min(b.x) - BOUNDS_EPSILON
        && p.x <= a.x.max(b.x) + BOUNDS_EPSILON
        && p.y >= a.y.min(b.y) - BOUNDS_EPSILON
        && p.y <= a.y.max(b.y) + BOUNDS_EPSILON
}

/// Unsigned polygon area (shoelace formula).
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < MIN_POLYGON_POINTS {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        twice_area += a.x * b.y - b.x * a.y;
    }
    twice_area.abs() / 2.0
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// How selection decides whether a point is inside a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTestMode {
    /// Axis-aligned bounding box for every lot. Polygon corners outside the
    /// outline but inside the box still select the lot.
    BoundingBox,
    /// Bounding box for rectangles, ray casting against the outline for
    /// polygon lots.
    #[default]
    Outline,
}

/// Shape of a lot in logical map coordinates.
///
/// On the wire both variants are flat objects: `{x, y, width, height}` for
/// rectangles and `{x, y, width, height, outline}` for polygons, where
/// `outline` is the SVG path string and `(x, y, width, height)` is its extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeometryFields", into = "GeometryFields")]
pub enum Geometry {
    Rectangle(BoundingBox),
    Polygon {
        bounds: BoundingBox,
        outline: Vec<Point>,
    },
}

impl Geometry {
    /// Validated rectangle geometry.
    pub fn rectangle(bounds: BoundingBox) -> Result<Self, CoreError> {
        bounds.validate()?;
        Ok(Geometry::Rectangle(bounds))
    }

    /// Validated polygon geometry; the bounding box is derived from `outline`.
    pub fn polygon(outline: Vec<Point>) -> Result<Self, CoreError> {
        if !outline.iter().all(|p| p.is_finite()) {
            return Err(CoreError::Validation(
                "Outline coordinates must be finite numbers".into(),
            ));
        }
        let distinct = distinct_point_count(&outline);
        if distinct < MIN_POLYGON_POINTS {
            return Err(CoreError::Validation(format!(
                "Outline needs at least {MIN_POLYGON_POINTS} distinct points, got {distinct}"
            )));
        }
        let bounds = bounding_box_of(&outline)
            .ok_or_else(|| CoreError::Validation("Outline is empty".into()))?;
        Ok(Geometry::Polygon { bounds, outline })
    }

    pub fn bounds(&self) -> BoundingBox {
        match self {
            Geometry::Rectangle(b) => *b,
            Geometry::Polygon { bounds, .. } => *bounds,
        }
    }

    pub fn outline(&self) -> Option<&[Point]> {
        match self {
            Geometry::Rectangle(_) => None,
            Geometry::Polygon { outline, .. } => Some(outline),
        }
    }

    /// Serialized outline, `None` for rectangles.
    pub fn outline_path(&self) -> Option<String> {
        self.outline().map(to_svg_path)
    }

    pub fn contains(&self, point: Point, mode: HitTestMode) -> bool {
        match (self, mode) {
            (Geometry::Polygon { bounds, outline }, HitTestMode::Outline) => {
                bounds.contains(point) && point_in_polygon(point, outline)
            }
            _ => self.bounds().contains(point),
        }
    }

    /// Area in square logical units.
    pub fn area(&self) -> f64 {
        match self {
            Geometry::Rectangle(b) => b.width * b.height,
            Geometry::Polygon { outline, .. } => polygon_area(outline),
        }
    }
}

/// Flat wire representation of [`Geometry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryFields {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<String>,
}

impl TryFrom<GeometryFields> for Geometry {
    type Error = CoreError;

    fn try_from(fields: GeometryFields) -> Result<Self, Self::Error> {
        let supplied = BoundingBox::new(fields.x, fields.y, fields.width, fields.height);
        match fields.outline {
            None => Geometry::rectangle(supplied),
            Some(path) => {
                let geometry = Geometry::polygon(parse_svg_path(&path)?)?;
                if !geometry.bounds().approx_eq(&supplied) {
                    return Err(CoreError::Validation(
                        "Bounding box does not match the extent of the outline".into(),
                    ));
                }
                Ok(geometry)
            }
        }
    }
}

impl From<Geometry> for GeometryFields {
    fn from(geometry: Geometry) -> Self {
        let bounds = geometry.bounds();
        GeometryFields {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            outline: geometry.outline_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
