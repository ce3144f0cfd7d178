//! Handlers for the `/lots` resource.
//!
//! Reads are public. Writes require a token whose subject owns the lot's map.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lotmap_core::error::CoreError;
use lotmap_core::filter::LotFilter;
use lotmap_core::lot::{CreateLot, Lot, UpdateLot};
use lotmap_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::handlers::find_owned_map;
use crate::middleware::auth::AuthUser;
use crate::query::{LotListParams, SearchParams};
use crate::response::DataResponse;
use crate::state::AppState;

async fn find_lot(state: &AppState, id: DbId) -> AppResult<Lot> {
    state
        .store
        .get_lot(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Lot", id }))
}

/// GET /api/lots?mapId=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<LotListParams>,
) -> AppResult<Json<DataResponse<Vec<Lot>>>> {
    let lots = state.store.get_lots(params.map_id).await?;
    Ok(Json(DataResponse { data: lots }))
}

/// GET /api/lots/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Lot>> {
    Ok(Json(find_lot(&state, id).await?))
}

/// GET /api/lots/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<Lot>>>> {
    let q = params
        .q
        .ok_or_else(|| AppError::BadRequest("Query parameter 'q' is required".into()))?;
    let lots = state.store.search_lots(&q).await?;
    Ok(Json(DataResponse { data: lots }))
}

/// GET /api/lots/filter?status=&minPrice=&maxPrice=&minSqft=&maxSqft=&mapId=
pub async fn filter(
    State(state): State<AppState>,
    Query(filter): Query<LotFilter>,
) -> AppResult<Json<DataResponse<Vec<Lot>>>> {
    let lots = state.store.filter_lots(&filter).await?;
    Ok(Json(DataResponse { data: lots }))
}

/// POST /api/lots
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateLot>,
) -> AppResult<(StatusCode, Json<Lot>)> {
    let new = input.into_new_lot()?;
    find_owned_map(&state, new.map_id, &user).await?;

    let lot = state.store.create_lot(new).await?;
    tracing::info!(lot_id = lot.id, map_id = lot.map_id, user_id = user.user_id, "Lot created");
    Ok((StatusCode::CREATED, Json(lot)))
}

/// PATCH /api/lots/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLot>,
) -> AppResult<Json<Lot>> {
    let changes = input.into_changes()?;
    let existing = find_lot(&state, id).await?;
    find_owned_map(&state, existing.map_id, &user).await?;

    let lot = state.store.update_lot(id, changes).await?;
    Ok(Json(lot))
}

/// DELETE /api/lots/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_lot(&state, id).await?;
    find_owned_map(&state, existing.map_id, &user).await?;

    if state.store.delete_lot(id).await? {
        tracing::info!(lot_id = id, user_id = user.user_id, "Lot deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Lot", id }))
    }
}
