//! Public viewer: a published map rendered as a paint-ready scene.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use lotmap_core::error::CoreError;
use lotmap_core::lot::LotStatus;
use lotmap_core::lot_map::LotMap;
use lotmap_core::render::{render_scene, Scene};
use lotmap_core::view::ViewState;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::ViewerParams;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerResponse {
    #[serde(flatten)]
    pub scene: Scene,
    /// Lot count per status, for the legend.
    pub status_counts: HashMap<LotStatus, usize>,
}

/// GET /api/viewer/{slug}?stroke=
///
/// Private maps answer 404 to everyone but their owner.
pub async fn get_scene(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ViewerParams>,
    user: Option<AuthUser>,
) -> AppResult<Json<ViewerResponse>> {
    let not_found = || {
        AppError::Core(CoreError::SlugNotFound {
            entity: "MapSettings",
            slug: slug.clone(),
        })
    };

    let settings = state
        .store
        .get_map_settings(Some(&slug))
        .await?
        .into_iter()
        .next()
        .ok_or_else(not_found)?;

    let visible = settings.is_public
        || user.as_ref().is_some_and(|u| settings.is_owned_by(u.user_id));
    if !visible {
        return Err(not_found());
    }

    let lots = state.store.get_lots(Some(settings.id)).await?;
    let map = LotMap::new(settings, lots)?;

    Ok(Json(ViewerResponse {
        scene: render_scene(&map, &ViewState::default(), None, params.stroke),
        status_counts: map.status_counts(),
    }))
}
