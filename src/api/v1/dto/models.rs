/*
 * Responsibility
 * - /models の response DTO (record を model / models でくるむ)
 */
use serde::Serialize;

use crate::services::models::Model;

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub model: Model,
}

#[derive(Debug, Serialize)]
pub struct ListModelsResponse {
    pub models: Vec<Model>,
}
