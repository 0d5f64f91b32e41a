use serde::{Deserialize, Serialize};

use crate::types::Usage;

/// Body of `POST .../embeddings`. Embeddings have no streaming form, so
/// there is no `stream` flag to guard.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EmbeddingRequest {
    pub input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EmbeddingData {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub data: Vec<EmbeddingData>,
    #[serde(default)]
    pub usage: Usage,
}
