use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Query, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::CurrentUser;
use crate::database::models::{FarmCreate, FarmOut, FarmsOut};
use crate::error::ApiError;

pub const DEFAULT_SKIP: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Rows to skip, default 0
    pub skip: Option<i64>,
    /// Page size, default 100
    pub limit: Option<i64>,
}

impl ListQuery {
    /// Resolve defaults and reject negative values
    pub fn window(&self) -> Result<(i64, i64), ApiError> {
        let skip = self.skip.unwrap_or(DEFAULT_SKIP);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);

        if skip < 0 {
            return Err(ApiError::invalid_field("skip", "must be greater than or equal to 0"));
        }
        if limit < 0 {
            return Err(ApiError::invalid_field("limit", "must be greater than or equal to 0"));
        }
        Ok((skip, limit))
    }
}

/// GET /farms - page through all farms.
///
/// Superusers and regular users see the same rows; `count` is the size of the
/// whole table, not of the returned page.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<FarmsOut>, ApiError> {
    let Query(query) = query?;
    let (skip, limit) = query.window()?;

    let mut session = state.store().begin().await?;
    let count = session.count().await?;
    let farms = session.select_page(skip, limit).await?;

    tracing::debug!(user_id = user.id, skip, limit, count, "listed farms");

    Ok(Json(FarmsOut {
        data: farms.into_iter().map(FarmOut::from).collect(),
        count,
    }))
}

/// POST /farms - create a farm owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<FarmCreate>, JsonRejection>,
) -> Result<Json<FarmOut>, ApiError> {
    let Json(payload) = payload?;

    let mut session = state.store().begin().await?;
    let farm = session.insert(&payload, Some(user.id)).await?;
    session.commit().await?;

    tracing::info!(farm_id = farm.id, user_id = user.id, "created farm");
    Ok(Json(FarmOut::from(farm)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_defaults() {
        assert_eq!(ListQuery::default().window().unwrap(), (0, 100));
    }

    #[test]
    fn window_keeps_explicit_values() {
        let query = ListQuery { skip: Some(20), limit: Some(0) };
        assert_eq!(query.window().unwrap(), (20, 0));
    }

    #[test]
    fn window_rejects_negatives() {
        let err = ListQuery { skip: Some(-1), limit: None }.window().unwrap_err();
        assert_eq!(err.to_json()["field_errors"]["skip"], "must be greater than or equal to 0");

        let err = ListQuery { skip: None, limit: Some(-5) }.window().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
