use serde::{Deserialize, Serialize};

pub const TITAN_IMAGE_V2: &str = "amazon.titan-image-generator-v2:0";
pub const STABLE_IMAGE_CORE: &str = "stability.stable-image-core-v1:0";
pub const CLAUDE_3_SONNET: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
pub const GPT5_IMAGE_MINI: &str = "openai/gpt-5-image-mini";
pub const NEMOTRON_NANO: &str = "nvidia/nemotron-3-nano-30b-a3b:free";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub category: ModelCategory,
    pub description: String,
}

impl ModelInfo {
    pub fn new(
        id: &str,
        name: &str,
        provider: &str,
        category: ModelCategory,
        description: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            provider: provider.to_string(),
            category,
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    Text,
    Image,
}
