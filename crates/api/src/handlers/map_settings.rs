//! Handlers for the `/map-settings` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lotmap_core::error::CoreError;
use lotmap_core::map_settings::{CreateMapSettings, MapSettings, UpdateMapSettings};
use lotmap_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::handlers::{find_map, find_owned_map};
use crate::middleware::auth::AuthUser;
use crate::query::MapSettingsParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/map-settings?slug=
///
/// With a slug, returns that map or 404. Without one, returns the oldest
/// map, or `null` when none exist.
pub async fn get(
    State(state): State<AppState>,
    Query(params): Query<MapSettingsParams>,
) -> AppResult<Json<Option<MapSettings>>> {
    let settings = state
        .store
        .get_map_settings(params.slug.as_deref())
        .await?
        .into_iter()
        .next();
    match (settings, params.slug) {
        (None, Some(slug)) => Err(AppError::Core(CoreError::SlugNotFound {
            entity: "MapSettings",
            slug,
        })),
        (settings, _) => Ok(Json(settings)),
    }
}

/// GET /api/map-settings/mine
pub async fn mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<MapSettings>>>> {
    let maps = state.store.get_map_settings_by_owner(user.user_id).await?;
    Ok(Json(DataResponse { data: maps }))
}

/// GET /api/map-settings/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MapSettings>> {
    Ok(Json(find_map(&state, id).await?))
}

/// POST /api/map-settings
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateMapSettings>,
) -> AppResult<(StatusCode, Json<MapSettings>)> {
    let new = input.into_new(user.user_id)?;
    let settings = state.store.create_map_settings(new).await?;
    tracing::info!(map_id = settings.id, slug = %settings.slug, user_id = user.user_id, "Map created");
    Ok((StatusCode::CREATED, Json(settings)))
}

/// PATCH /api/map-settings/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMapSettings>,
) -> AppResult<Json<MapSettings>> {
    let changes = input.into_changes()?;
    find_owned_map(&state, id, &user).await?;

    let settings = state.store.update_map_settings(id, changes).await?;
    Ok(Json(settings))
}

/// DELETE /api/map-settings/{id}
///
/// Removes the map's lots first, then the settings row.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned_map(&state, id, &user).await?;

    if state.store.delete_map_settings(id).await? {
        tracing::info!(map_id = id, user_id = user.user_id, "Map deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "MapSettings",
            id,
        }))
    }
}
