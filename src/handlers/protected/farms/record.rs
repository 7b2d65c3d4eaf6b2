use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Extension, Path, State},
    Json,
};

use super::{farm_id, farm_not_found};
use crate::app::AppState;
use crate::auth::CurrentUser;
use crate::database::models::{FarmOut, FarmUpdate, Message};
use crate::error::ApiError;

/// GET /farms/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<FarmOut>, ApiError> {
    let Path(id) = id?;
    let id = farm_id(id)?;

    let mut session = state.store().begin().await?;
    let farm = session.get(id).await?.ok_or_else(farm_not_found)?;

    tracing::debug!(farm_id = id, user_id = user.id, "read farm");
    Ok(Json(FarmOut::from(farm)))
}

/// PUT /farms/:id - apply only the fields present in the body
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<FarmUpdate>, JsonRejection>,
) -> Result<Json<FarmOut>, ApiError> {
    let Path(id) = id?;
    let id = farm_id(id)?;
    let Json(patch) = payload?;

    let mut session = state.store().begin().await?;
    let mut farm = session.get(id).await?.ok_or_else(farm_not_found)?;

    farm.apply(&patch);
    let farm = session.update(&farm).await?;
    session.commit().await?;

    tracing::info!(farm_id = id, user_id = user.id, "updated farm");
    Ok(Json(FarmOut::from(farm)))
}

/// DELETE /farms/:id - owner or superuser only
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Message>, ApiError> {
    let Path(id) = id?;
    let id = farm_id(id)?;

    let mut session = state.store().begin().await?;
    let farm = session.get(id).await?.ok_or_else(farm_not_found)?;

    if !user.is_superuser && !farm.is_owned_by(user.id) {
        tracing::warn!(farm_id = id, user_id = user.id, "farm delete refused");
        return Err(ApiError::permission_denied());
    }

    session.delete(id).await?;
    session.commit().await?;

    tracing::info!(farm_id = id, user_id = user.id, "deleted farm");
    Ok(Json(Message::new("Farm deleted successfully")))
}
