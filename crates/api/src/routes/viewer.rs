//! Route definitions for the public viewer.

use axum::routing::get;
use axum::Router;

use crate::handlers::viewer;
use crate::state::AppState;

/// Routes mounted at `/viewer`.
///
/// ```text
/// GET    /{slug}          -> get_scene
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{slug}", get(viewer::get_scene))
}
