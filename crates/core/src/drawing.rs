//! Drawing-tool state machine for the lot map editor.
//!
//! The session turns screen-space pointer events into logical-space shapes.
//! It never fails: an unfinished or degenerate shape (too small a rectangle,
//! fewer than three path vertices) is dropped without an event, so callers
//! treat "no event" as "nothing to persist".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geometry::{distinct_point_count, BoundingBox, Geometry, HitTestMode, Point};
use crate::lot_map::LotMap;
use crate::types::DbId;
use crate::view::ViewState;

/// A rectangle must exceed this size on both axes (logical units) to be
/// committed. Guards against accidental clicks.
pub const MIN_RECT_SIZE: f64 = 10.0;

// ---------------------------------------------------------------------------
// Tools and configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Rect,
    Path,
    Pan,
    Move,
    Delete,
}

impl Tool {
    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Rect => "rect",
            Tool::Path => "path",
            Tool::Pan => "pan",
            Tool::Move => "move",
            Tool::Delete => "delete",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(Tool::Select),
            "rect" => Ok(Tool::Rect),
            "path" => Ok(Tool::Path),
            "pan" => Ok(Tool::Pan),
            "move" => Ok(Tool::Move),
            "delete" => Ok(Tool::Delete),
            other => Err(CoreError::Validation(format!("Unknown tool '{other}'"))),
        }
    }
}

/// When a path being drawn is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCompletion {
    /// Clicks add vertices; [`DrawingSession::finish_path`] (double-click or
    /// Enter) commits.
    #[default]
    Explicit,
    /// Releasing the pointer commits as soon as three vertices exist. This is
    /// the legacy gesture and only produces triangles.
    OnRelease,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawingConfig {
    pub min_rect_size: f64,
    pub hit_test: HitTestMode,
    pub path_completion: PathCompletion,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            min_rect_size: MIN_RECT_SIZE,
            hit_test: HitTestMode::default(),
            path_completion: PathCompletion::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// State and events
// ---------------------------------------------------------------------------

/// In-progress interaction. Points are logical unless noted.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawState {
    Idle,
    DrawingRect { start: Point, current: Point },
    DrawingPath { points: Vec<Point> },
    Selecting,
    /// Dragging the view; `last` is in screen coordinates.
    Panning { last: Point },
}

/// Something the host has to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    /// A finished shape ready to be persisted as a new lot.
    ShapeCommitted(Geometry),
    Selected(DbId),
    SelectionCleared,
    DeleteRequested(DbId),
    /// Screen-space pan delta to apply to the view.
    Panned { dx: f64, dy: f64 },
}

/// Rubber-band preview of the shape being drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Rect(BoundingBox),
    Polyline(Vec<Point>),
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Ephemeral drawing state for one mounted editor.
#[derive(Debug, Clone)]
pub struct DrawingSession {
    tool: Tool,
    state: DrawState,
    selected: Option<DbId>,
    config: DrawingConfig,
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::new(DrawingConfig::default())
    }
}

impl DrawingSession {
    pub fn new(config: DrawingConfig) -> Self {
        Self {
            tool: Tool::Select,
            state: DrawState::Selecting,
            selected: None,
            config,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn selected(&self) -> Option<DbId> {
        self.selected
    }

    pub fn config(&self) -> &DrawingConfig {
        &self.config
    }

    /// Switch tools. Any unfinished shape and the selection are discarded.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.selected = None;
        self.reset_state();
    }

    /// Abandon the shape in progress without committing it.
    pub fn cancel(&mut self) {
        self.reset_state();
    }

    /// Forget the selection if it points at `id` (e.g. after a delete).
    pub fn forget(&mut self, id: DbId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    fn reset_state(&mut self) {
        self.state = match self.tool {
            Tool::Select => DrawState::Selecting,
            _ => DrawState::Idle,
        };
    }

    pub fn pointer_down(
        &mut self,
        screen: Point,
        view: &ViewState,
        map: &LotMap,
    ) -> Option<DrawEvent> {
        let p = view.to_logical(screen);
        match self.tool {
            Tool::Rect => {
                if self.state == DrawState::Idle {
                    self.state = DrawState::DrawingRect {
                        start: p,
                        current: p,
                    };
                }
                None
            }
            Tool::Path => {
                if let DrawState::DrawingPath { points } = &mut self.state {
                    if points.last() != Some(&p) {
                        points.push(p);
                    }
                } else {
                    self.state = DrawState::DrawingPath { points: vec![p] };
                }
                None
            }
            Tool::Select => {
                self.state = DrawState::Selecting;
                match map.lot_at(p, self.config.hit_test) {
                    Some(lot) => {
                        self.selected = Some(lot.id);
                        Some(DrawEvent::Selected(lot.id))
                    }
                    None => self
                        .selected
                        .take()
                        .map(|_| DrawEvent::SelectionCleared),
                }
            }
            Tool::Delete => map
                .lot_at(p, self.config.hit_test)
                .map(|lot| DrawEvent::DeleteRequested(lot.id)),
            Tool::Pan => {
                self.state = DrawState::Panning { last: screen };
                None
            }
            Tool::Move => None,
        }
    }

    pub fn pointer_move(&mut self, screen: Point, view: &ViewState) -> Option<DrawEvent> {
        match &mut self.state {
            DrawState::DrawingRect { current, .. } => {
                *current = view.to_logical(screen);
                None
            }
            DrawState::Panning { last } => {
                let (dx, dy) = (screen.x - last.x, screen.y - last.y);
                *last = screen;
                Some(DrawEvent::Panned { dx, dy })
            }
            _ => None,
        }
    }

    pub fn pointer_up(&mut self, screen: Point, view: &ViewState) -> Option<DrawEvent> {
        match std::mem::replace(&mut self.state, DrawState::Idle) {
            DrawState::DrawingRect { start, .. } => self.commit_rect(start, view.to_logical(screen)),
            DrawState::DrawingPath { points }
                if self.config.path_completion == PathCompletion::OnRelease
                    && distinct_point_count(&points) >= 3 =>
            {
                Geometry::polygon(points).ok().map(DrawEvent::ShapeCommitted)
            }
            DrawState::Panning { .. } => None,
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Commit the path being drawn, or drop it when it has fewer than three
    /// distinct vertices. No-op outside of path drawing.
    pub fn finish_path(&mut self) -> Option<DrawEvent> {
        match std::mem::replace(&mut self.state, DrawState::Idle) {
            DrawState::DrawingPath { points } => {
                Geometry::polygon(points).ok().map(DrawEvent::ShapeCommitted)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    fn commit_rect(&self, start: Point, end: Point) -> Option<DrawEvent> {
        let min = self.config.min_rect_size;
        if (end.x - start.x).abs() <= min || (end.y - start.y).abs() <= min {
            return None;
        }
        Geometry::rectangle(BoundingBox::from_corners(start, end))
            .ok()
            .map(DrawEvent::ShapeCommitted)
    }

    /// Shape to paint under the cursor while drawing.
    pub fn preview(&self) -> Option<Preview> {
        match &self.state {
            DrawState::DrawingRect { start, current } => {
                Some(Preview::Rect(BoundingBox::from_corners(*start, *current)))
            }
            DrawState::DrawingPath { points } => Some(Preview::Polyline(points.clone())),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::to_svg_path;
    use crate::lot::{Lot, LotStatus};
    use crate::map_settings::MapSettings;

    fn empty_map() -> LotMap {
        let now = chrono::Utc::now();
        let settings = MapSettings {
            id: 1,
            owner_id: 1,
            name: "Map".into(),
            slug: "map".into(),
            description: None,
            background_image: None,
            is_public: false,
            created_at: now,
            updated_at: now,
        };
        LotMap::new(settings, vec![]).unwrap()
    }

    fn map_with(geometries: Vec<Geometry>) -> LotMap {
        let mut map = empty_map();
        let now = chrono::Utc::now();
        for (i, geometry) in geometries.into_iter().enumerate() {
            map.insert_lot(Lot {
                id: i as DbId + 1,
                map_id: 1,
                number: (i + 1).to_string(),
                status: LotStatus::Available,
                price: 0,
                square_feet: 0,
                bedrooms: 0,
                bathrooms: 0,
                description: String::new(),
                amenities: vec![],
                geometry,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
        }
        map
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn session(tool: Tool) -> DrawingSession {
        let mut s = DrawingSession::default();
        s.set_tool(tool);
        s
    }

    fn session_with(tool: Tool, config: DrawingConfig) -> DrawingSession {
        let mut s = DrawingSession::new(config);
        s.set_tool(tool);
        s
    }

    // -- Rectangle ----------------------------------------------------------

    #[test]
    fn rect_drag_commits_bounding_box() {
        let (view, map) = (ViewState::default(), empty_map());
        let mut s = session(Tool::Rect);
        assert!(s.pointer_down(p(10.0, 10.0), &view, &map).is_none());
        assert!(s.pointer_move(p(80.0, 60.0), &view).is_none());
        let event = s.pointer_up(p(150.0, 120.0), &view);
        assert_eq!(
            event,
            Some(DrawEvent::ShapeCommitted(Geometry::Rectangle(
                BoundingBox::new(10.0, 10.0, 140.0, 110.0)
            )))
        );
        assert_eq!(s.state(), &DrawState::Idle);
    }

    #[test]
    fn rect_drag_up_and_left_normalises() {
        let (view, map) = (ViewState::default(), empty_map());
        let mut s = session(Tool::Rect);
        s.pointer_down(p(150.0, 120.0), &view, &map);
        let event = s.pointer_up(p(10.0, 10.0), &view);
        assert_eq!(
            event,
            Some(DrawEvent::ShapeCommitted(Geometry::Rectangle(
                BoundingBox::new(10.0, 10.0, 140.0, 110.0)
            )))
        );
    }

    #[test]
    fn small_rect_is_discarded() {
        let (view, map) = (ViewState::default(), empty_map());
        for end in [p(20.0, 200.0), p(200.0, 20.0), p(15.0, 15.0)] {
            let mut s = session(Tool::Rect);
            s.pointer_down(p(10.0, 10.0), &view, &map);
            assert!(s.pointer_up(end, &view).is_none(), "end {end:?}");
            assert_eq!(s.state(), &DrawState::Idle);
        }
    }

    #[test]
    fn rect_is_measured_in_logical_units() {
        let map = empty_map();
        // At 2x zoom a 30px drag is only 15 logical units.
        let view = ViewState::new(p(100.0, 100.0), 2.0);
        let mut s = session(Tool::Rect);
        s.pointer_down(p(100.0, 100.0), &view, &map);
        let event = s.pointer_up(p(130.0, 130.0), &view);
        assert_eq!(
            event,
            Some(DrawEvent::ShapeCommitted(Geometry::Rectangle(
                BoundingBox::new(0.0, 0.0, 15.0, 15.0)
            )))
        );
    }

    #[test]
    fn rect_preview_follows_pointer() {
        let (view, map) = (ViewState::default(), empty_map());
        let mut s = session(Tool::Rect);
        s.pointer_down(p(0.0, 0.0), &view, &map);
        s.pointer_move(p(40.0, 30.0), &view);
        assert_eq!(
            s.preview(),
            Some(Preview::Rect(BoundingBox::new(0.0, 0.0, 40.0, 30.0)))
        );
    }

    // -- Path ---------------------------------------------------------------

    #[test]
    fn path_commits_on_finish() {
        let (view, map) = (ViewState::default(), empty_map());
        let mut s = session(Tool::Path);
        for pt in [p(0.0, 0.0), p(50.0, 0.0), p(50.0, 50.0)] {
            s.pointer_down(pt, &view, &map);
            assert!(s.pointer_up(pt, &view).is_none());
        }
        let Some(DrawEvent::ShapeCommitted(geometry)) = s.finish_path() else {
            panic!("expected a committed polygon");
        };
        assert_eq!(geometry.bounds(), BoundingBox::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(
            to_svg_path(geometry.outline().unwrap()),
            "M 0 0 L 50 0 L 50 50 Z"
        );
        assert_eq!(s.state(), &DrawState::Idle);
    }

    #[test]
    fn two_point_path_is_discarded() {
        let (view, map) = (ViewState::default(), empty_map());
        let mut s = session(Tool::Path);
        s.pointer_down(p(0.0, 0.0), &view, &map);
        s.pointer_down(p(50.0, 0.0), &view, &map);
        assert!(s.finish_path().is_none());
        assert_eq!(s.state(), &DrawState::Idle);
    }

    #[test]
    fn double_click_does_not_duplicate_vertex() {
        let (view, map) = (ViewState::default(), empty_map());
        let mut s = session(Tool::Path);
        s.pointer_down(p(0.0, 0.0), &view, &map);
        s.pointer_down(p(10.0, 0.0), &view, &map);
        s.pointer_down(p(10.0, 0.0), &view, &map);
        assert_eq!(
            s.preview(),
            Some(Preview::Polyline(vec![p(0.0, 0.0), p(10.0, 0.0)]))
        );
    }

    #[test]
    fn release_mode_commits_at_third_vertex() {
        let config = DrawingConfig {
            path_completion: PathCompletion::OnRelease,
            ..Default::default()
        };
        let (view, map) = (ViewState::default(), empty_map());
        let mut s = session_with(Tool::Path, config);
        s.pointer_down(p(0.0, 0.0), &view, &map);
        assert!(s.pointer_up(p(0.0, 0.0), &view).is_none());
        s.pointer_down(p(50.0, 0.0), &view, &map);
        assert!(s.pointer_up(p(50.0, 0.0), &view).is_none());
        s.pointer_down(p(50.0, 50.0), &view, &map);
        let event = s.pointer_up(p(50.0, 50.0), &view);
        assert!(matches!(event, Some(DrawEvent::ShapeCommitted(Geometry::Polygon { .. }))));
    }

    #[test]
    fn switching_tools_abandons_path() {
        let (view, map) = (ViewState::default(), empty_map());
        let mut s = session(Tool::Path);
        s.pointer_down(p(0.0, 0.0), &view, &map);
        s.pointer_down(p(50.0, 0.0), &view, &map);
        s.pointer_down(p(50.0, 50.0), &view, &map);
        s.set_tool(Tool::Rect);
        assert_eq!(s.state(), &DrawState::Idle);
        assert!(s.finish_path().is_none());
    }

    #[test]
    fn cancel_discards_rect() {
        let (view, map) = (ViewState::default(), empty_map());
        let mut s = session(Tool::Rect);
        s.pointer_down(p(0.0, 0.0), &view, &map);
        s.cancel();
        assert!(s.pointer_up(p(100.0, 100.0), &view).is_none());
    }

    // -- Select / delete ----------------------------------------------------

    #[test]
    fn select_reports_topmost_and_clears_on_miss() {
        let view = ViewState::default();
        let map = map_with(vec![
            Geometry::Rectangle(BoundingBox::new(0.0, 0.0, 100.0, 100.0)),
            Geometry::Rectangle(BoundingBox::new(50.0, 50.0, 100.0, 100.0)),
        ]);
        let mut s = session(Tool::Select);
        assert_eq!(
            s.pointer_down(p(60.0, 60.0), &view, &map),
            Some(DrawEvent::Selected(2))
        );
        assert_eq!(s.selected(), Some(2));
        assert_eq!(
            s.pointer_down(p(500.0, 500.0), &view, &map),
            Some(DrawEvent::SelectionCleared)
        );
        assert_eq!(s.pointer_down(p(500.0, 500.0), &view, &map), None);
    }

    #[test]
    fn select_uses_configured_hit_test() {
        let view = ViewState::default();
        let triangle = Geometry::polygon(vec![p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0)]).unwrap();
        let map = map_with(vec![triangle]);
        let corner = p(10.0, 90.0);

        let mut outline = session(Tool::Select);
        assert_eq!(outline.pointer_down(corner, &view, &map), None);

        let config = DrawingConfig {
            hit_test: HitTestMode::BoundingBox,
            ..Default::default()
        };
        let mut boxed = session_with(Tool::Select, config);
        assert_eq!(
            boxed.pointer_down(corner, &view, &map),
            Some(DrawEvent::Selected(1))
        );
    }

    #[test]
    fn select_converts_screen_to_logical() {
        let map = map_with(vec![Geometry::Rectangle(BoundingBox::new(0.0, 0.0, 10.0, 10.0))]);
        let view = ViewState::new(p(200.0, 200.0), 2.0);
        let mut s = session(Tool::Select);
        // Screen (210, 210) is logical (5, 5).
        assert_eq!(
            s.pointer_down(p(210.0, 210.0), &view, &map),
            Some(DrawEvent::Selected(1))
        );
        // Screen (5, 5) is far outside.
        assert_eq!(
            s.pointer_down(p(5.0, 5.0), &view, &map),
            Some(DrawEvent::SelectionCleared)
        );
    }

    #[test]
    fn tool_change_clears_selection() {
        let view = ViewState::default();
        let map = map_with(vec![Geometry::Rectangle(BoundingBox::new(0.0, 0.0, 10.0, 10.0))]);
        let mut s = session(Tool::Select);
        s.pointer_down(p(5.0, 5.0), &view, &map);
        s.set_tool(Tool::Select);
        assert_eq!(s.selected(), None);
        assert_eq!(s.state(), &DrawState::Selecting);
    }

    #[test]
    fn delete_tool_requests_hit_lot() {
        let view = ViewState::default();
        let map = map_with(vec![Geometry::Rectangle(BoundingBox::new(0.0, 0.0, 10.0, 10.0))]);
        let mut s = session(Tool::Delete);
        assert_eq!(
            s.pointer_down(p(5.0, 5.0), &view, &map),
            Some(DrawEvent::DeleteRequested(1))
        );
        assert_eq!(s.pointer_down(p(50.0, 5.0), &view, &map), None);
    }

    // -- Pan / move ---------------------------------------------------------

    #[test]
    fn pan_reports_screen_deltas() {
        let (view, map) = (ViewState::default(), empty_map());
        let mut s = session(Tool::Pan);
        s.pointer_down(p(100.0, 100.0), &view, &map);
        assert_eq!(
            s.pointer_move(p(110.0, 95.0), &view),
            Some(DrawEvent::Panned { dx: 10.0, dy: -5.0 })
        );
        assert_eq!(
            s.pointer_move(p(120.0, 95.0), &view),
            Some(DrawEvent::Panned { dx: 10.0, dy: 0.0 })
        );
        s.pointer_up(p(120.0, 95.0), &view);
        assert_eq!(s.pointer_move(p(130.0, 95.0), &view), None);
    }

    #[test]
    fn move_tool_is_inert() {
        let view = ViewState::default();
        let map = map_with(vec![Geometry::Rectangle(BoundingBox::new(0.0, 0.0, 10.0, 10.0))]);
        let mut s = session(Tool::Move);
        assert_eq!(s.pointer_down(p(5.0, 5.0), &view, &map), None);
        assert_eq!(s.pointer_up(p(50.0, 50.0), &view), None);
    }

    #[test]
    fn tool_names_round_trip() {
        for tool in [Tool::Select, Tool::Rect, Tool::Path, Tool::Pan, Tool::Move, Tool::Delete] {
            assert_eq!(tool.as_str().parse::<Tool>().unwrap(), tool);
        }
        assert!("lasso".parse::<Tool>().is_err());
    }
}
