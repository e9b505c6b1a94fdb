use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::services::models::directory::{ModelDirectory, ModelError};
use crate::services::models::types::{CreateModelRequest, Model, ModelStatus, UpdateModelRequest};

/// Process-local model directory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryModelDirectory {
    models: RwLock<HashMap<String, Model>>,
}

impl InMemoryModelDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModelDirectory for InMemoryModelDirectory {
    async fn create(&self, req: CreateModelRequest) -> Result<Model, ModelError> {
        let mut models = self.models.write().await;
        if models.contains_key(&req.model_id) {
            return Err(ModelError::AlreadyExists(req.model_id));
        }

        let model = req.into_model();
        models.insert(model.model_id.clone(), model.clone());
        tracing::info!(model_id = %model.model_id, "model registered");
        Ok(model)
    }

    async fn list(&self) -> Result<Vec<Model>, ModelError> {
        let models = self.models.read().await;
        let mut out: Vec<Model> = models.values().cloned().collect();
        out.sort_by(|a, b| a.model_id.cmp(&b.model_id));
        Ok(out)
    }

    async fn get(&self, model_id: &str) -> Result<Model, ModelError> {
        self.models
            .read()
            .await
            .get(model_id)
            .cloned()
            .ok_or_else(|| ModelError::NotFound(model_id.to_string()))
    }

    async fn update(&self, model_id: &str, req: UpdateModelRequest) -> Result<Model, ModelError> {
        let mut models = self.models.write().await;
        let model = models
            .get_mut(model_id)
            .ok_or_else(|| ModelError::NotFound(model_id.to_string()))?;
        req.apply(model);
        Ok(model.clone())
    }

    async fn delete(&self, model_id: &str) -> Result<Model, ModelError> {
        let mut model = self
            .models
            .write()
            .await
            .remove(model_id)
            .ok_or_else(|| ModelError::NotFound(model_id.to_string()))?;
        model.status = ModelStatus::Deleting;
        tracing::info!(model_id = %model.model_id, "model removed");
        Ok(model)
    }
}
