pub mod health;
pub mod lots;
pub mod map_settings;
pub mod viewer;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /lots                       list (?mapId=), create
/// /lots/search                search (?q=)
/// /lots/filter                filter (?status&minPrice&maxPrice&minSqft&maxSqft&mapId)
/// /lots/{id}                  get, update (PATCH), delete
///
/// /map-settings               get (?slug=), create
/// /map-settings/mine          maps owned by the caller
/// /map-settings/{id}          get, update (PATCH), delete (cascades to lots)
///
/// /viewer/{slug}              render scene for a published map
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/lots", lots::router())
        .nest("/map-settings", map_settings::router())
        .nest("/viewer", viewer::router())
}
