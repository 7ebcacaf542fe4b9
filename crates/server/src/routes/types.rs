use axum::{
    extract::{rejection::{JsonRejection, PathRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use service::domain::{TypeInput, TypeView};
use service::type_service;

use crate::errors::JsonApiError;
use crate::routes::location;
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeQuery {
    pub category_id: Option<i32>,
}

/// Types ordered by category then name, optionally for one category.
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<TypeQuery>, QueryRejection>,
) -> Result<Json<Vec<TypeView>>, JsonApiError> {
    let Query(q) = query?;
    Ok(Json(type_service::list_types(&state.db, q.category_id).await?))
}

pub async fn get_one(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<TypeView>, JsonApiError> {
    let Path(id) = id?;
    Ok(Json(type_service::get_type(&state.db, id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<TypeInput>, JsonRejection>,
) -> Result<impl IntoResponse, JsonApiError> {
    let Json(input) = body?;
    let created = type_service::create_type(&state.db, &input).await?;
    Ok((StatusCode::CREATED, location(format!("/types/{}", created.id)), Json(created)))
}

pub async fn update(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<TypeInput>, JsonRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = id?;
    let Json(input) = body?;
    type_service::update_type(&state.db, id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = id?;
    type_service::delete_type(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
