use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service::category_service;
use service::domain::{CategoryInput, CategoryView};

use crate::errors::JsonApiError;
use crate::routes::location;
use crate::state::ServerState;

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<CategoryView>>, JsonApiError> {
    Ok(Json(category_service::list_categories(&state.db).await?))
}

pub async fn get_one(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<CategoryView>, JsonApiError> {
    let Path(id) = id?;
    Ok(Json(category_service::get_category(&state.db, id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<CategoryInput>, JsonRejection>,
) -> Result<impl IntoResponse, JsonApiError> {
    let Json(input) = body?;
    let created = category_service::create_category(&state.db, &input.name).await?;
    Ok((StatusCode::CREATED, location(format!("/categories/{}", created.id)), Json(created)))
}

pub async fn update(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<CategoryInput>, JsonRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = id?;
    let Json(input) = body?;
    category_service::update_category(&state.db, id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = id?;
    category_service::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
