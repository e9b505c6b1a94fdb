/*
 * Responsibility
 * - /models 系 CRUD handler
 * - Path/Json を extractor で受け、validation → ModelDirectory 呼び出し
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::v1::{
        dto::models::{ListModelsResponse, ModelResponse},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    services::models::{CreateModelRequest, UpdateModelRequest},
    state::AppState,
};

pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<ListModelsResponse>, AppError> {
    let models = state.models.list().await?;
    Ok(Json(ListModelsResponse { models }))
}

pub async fn create_model(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateModelRequest>,
) -> Result<Json<ModelResponse>, AppError> {
    req.validate().map_err(AppError::invalid_request)?;

    let model = state.models.create(req).await?;
    tracing::info!(model_id = %model.model_id, username = %ctx.username, "create model");

    Ok(Json(ModelResponse { model }))
}

pub async fn get_model(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
) -> Result<Json<ModelResponse>, AppError> {
    let model = state.models.get(&model_id).await?;
    Ok(Json(ModelResponse { model }))
}

pub async fn update_model(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(model_id): Path<String>,
    Json(req): Json<UpdateModelRequest>,
) -> Result<Json<ModelResponse>, AppError> {
    req.validate().map_err(AppError::invalid_request)?;

    let model = state.models.update(&model_id, req).await?;
    tracing::info!(model_id = %model.model_id, username = %ctx.username, "update model");

    Ok(Json(ModelResponse { model }))
}

pub async fn delete_model(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(model_id): Path<String>,
) -> Result<Json<ModelResponse>, AppError> {
    let model = state.models.delete(&model_id).await?;
    tracing::info!(model_id = %model.model_id, username = %ctx.username, "delete model");

    Ok(Json(ModelResponse { model }))
}
