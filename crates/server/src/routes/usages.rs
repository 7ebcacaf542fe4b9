use axum::{
    extract::{rejection::{JsonRejection, PathRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use service::domain::{parse_date_bound, UsageFilter, UsageInput, UsageView};
use service::errors::ServiceError;
use service::usage_service;

use crate::errors::JsonApiError;
use crate::routes::location;
use crate::state::ServerState;

/// Raw list filters. Dates stay strings until parsed so a bad value gets a
/// field-specific message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub substance_type_id: Option<i32>,
    pub category_id: Option<i32>,
}

impl UsageQuery {
    fn into_filter(self) -> Result<UsageFilter, ServiceError> {
        let bound = |field: &str, raw: Option<String>| -> Result<_, ServiceError> {
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => parse_date_bound(field, s).map(Some),
            }
        };
        Ok(UsageFilter {
            start_date: bound("startDate", self.start_date)?,
            end_date: bound("endDate", self.end_date)?,
            substance_type_id: self.substance_type_id,
            category_id: self.category_id,
        })
    }
}

pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<UsageQuery>, QueryRejection>,
) -> Result<Json<Vec<UsageView>>, JsonApiError> {
    let Query(q) = query?;
    let filter = q.into_filter()?;
    Ok(Json(usage_service::list_usages(&state.db, &filter).await?))
}

pub async fn get_one(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<UsageView>, JsonApiError> {
    let Path(id) = id?;
    Ok(Json(usage_service::get_usage(&state.db, id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<UsageInput>, JsonRejection>,
) -> Result<impl IntoResponse, JsonApiError> {
    let Json(input) = body?;
    let created = usage_service::create_usage(&state.db, &input).await?;
    Ok((StatusCode::CREATED, location(format!("/usages/{}", created.id)), Json(created)))
}

pub async fn update(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<UsageInput>, JsonRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = id?;
    let Json(input) = body?;
    usage_service::update_usage(&state.db, id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = id?;
    usage_service::delete_usage(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_bounds_are_ignored() {
        let q = UsageQuery { start_date: Some("".into()), end_date: None, ..Default::default() };
        assert_eq!(q.into_filter().unwrap(), UsageFilter::default());
    }

    #[test]
    fn bad_bound_names_the_field() {
        let q = UsageQuery { end_date: Some("yesterday".into()), ..Default::default() };
        let err = q.into_filter().unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m.contains("endDate")));
    }
}
