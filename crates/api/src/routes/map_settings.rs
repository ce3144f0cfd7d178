//! Route definitions for the `/map-settings` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::map_settings;
use crate::state::AppState;

/// Routes mounted at `/map-settings`.
///
/// ```text
/// GET    /                -> get (?slug=)
/// POST   /                -> create
/// GET    /mine            -> mine
/// GET    /{id}            -> get_by_id
/// PATCH  /{id}            -> update
/// DELETE /{id}            -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(map_settings::get).post(map_settings::create))
        .route("/mine", get(map_settings::mine))
        .route(
            "/{id}",
            get(map_settings::get_by_id)
                .patch(map_settings::update)
                .delete(map_settings::delete),
        )
}
