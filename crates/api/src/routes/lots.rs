//! Route definitions for the `/lots` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::lots;
use crate::state::AppState;

/// Routes mounted at `/lots`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /search          -> search
/// GET    /filter          -> filter
/// GET    /{id}            -> get_by_id
/// PATCH  /{id}            -> update
/// DELETE /{id}            -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(lots::list).post(lots::create))
        .route("/search", get(lots::search))
        .route("/filter", get(lots::filter))
        .route(
            "/{id}",
            get(lots::get_by_id)
                .patch(lots::update)
                .delete(lots::delete),
        )
}
