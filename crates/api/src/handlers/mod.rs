pub mod lots;
pub mod map_settings;
pub mod viewer;

use lotmap_core::error::CoreError;
use lotmap_core::map_settings::MapSettings;
use lotmap_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Load map settings by id, failing with 404 when absent.
pub(crate) async fn find_map(state: &AppState, map_id: DbId) -> AppResult<MapSettings> {
    state
        .store
        .get_map_settings_by_id(map_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MapSettings",
            id: map_id,
        }))
}

/// Load map settings and require that `user` owns them.
pub(crate) async fn find_owned_map(
    state: &AppState,
    map_id: DbId,
    user: &AuthUser,
) -> AppResult<MapSettings> {
    let map = find_map(state, map_id).await?;
    map.ensure_owner(user.user_id)?;
    Ok(map)
}
