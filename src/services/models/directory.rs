use async_trait::async_trait;
use thiserror::Error;

use crate::services::models::types::{CreateModelRequest, Model, UpdateModelRequest};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model '{0}' was not found")]
    NotFound(String),
    #[error("model '{0}' already exists")]
    AlreadyExists(String),
}

/// Storage boundary for model records, keyed by model id. Requests arrive already validated.
#[async_trait]
pub trait ModelDirectory: Send + Sync {
    async fn create(&self, req: CreateModelRequest) -> Result<Model, ModelError>;

    async fn list(&self) -> Result<Vec<Model>, ModelError>;

    async fn get(&self, model_id: &str) -> Result<Model, ModelError>;

    async fn update(&self, model_id: &str, req: UpdateModelRequest) -> Result<Model, ModelError>;

    /// Removes the record and returns it in `Deleting` state.
    async fn delete(&self, model_id: &str) -> Result<Model, ModelError>;
}
