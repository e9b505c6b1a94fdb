/*
 * Responsibility
 * - Model レコードと create/update の request 型
 * - validation (形式チェック) は validate() に持たせる
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Textgen,
    Embedding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelStatus {
    Creating,
    InService,
    Updating,
    Deleting,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub model_id: String,
    pub model_name: String,
    pub model_type: ModelType,
    #[serde(default)]
    pub streaming: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
    pub status: ModelStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModelRequest {
    pub model_id: String,
    pub model_name: String,
    pub model_type: ModelType,
    #[serde(default)]
    pub streaming: bool,
    pub model_url: Option<String>,
}

impl CreateModelRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.model_id.trim().is_empty() {
            return Err("modelId is required");
        }
        if self.model_name.trim().is_empty() {
            return Err("modelName is required");
        }
        Ok(())
    }

    pub fn into_model(self) -> Model {
        Model {
            model_id: self.model_id,
            model_name: self.model_name,
            model_type: self.model_type,
            streaming: self.streaming,
            model_url: self.model_url,
            status: ModelStatus::Creating,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModelRequest {
    pub model_name: Option<String>,
    pub streaming: Option<bool>,
    // Tri-state:
    // - None: field missing (do not update)
    // - Some(None): null (clear)
    // - Some(Some(v)): set value
    #[serde(default, deserialize_with = "double_option")]
    pub model_url: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl UpdateModelRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.model_name
            && name.trim().is_empty()
        {
            return Err("modelName must not be empty");
        }
        Ok(())
    }

    /// Apply the present fields and mark the record as `Updating`.
    pub fn apply(self, model: &mut Model) {
        if let Some(name) = self.model_name {
            model.model_name = name;
        }
        if let Some(streaming) = self.streaming {
            model.streaming = streaming;
        }
        if let Some(url) = self.model_url {
            model.model_url = url;
        }
        model.status = ModelStatus::Updating;
    }
}
