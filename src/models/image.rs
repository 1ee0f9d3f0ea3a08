use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::common::{STABLE_IMAGE_CORE, TITAN_IMAGE_V2};

pub const DEFAULT_DIMENSION: u32 = 1024;
pub const DEFAULT_ASPECT_RATIO: &str = "1:1";

/// Image models reachable through the Bedrock gateway.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BedrockImageModel {
    #[default]
    TitanV2,
    StableCore,
}

impl BedrockImageModel {
    pub fn model_id(&self) -> &'static str {
        match self {
            BedrockImageModel::TitanV2 => TITAN_IMAGE_V2,
            BedrockImageModel::StableCore => STABLE_IMAGE_CORE,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BedrockImageModel::TitanV2 => "Amazon Titan V2",
            BedrockImageModel::StableCore => "Stable Image Core",
        }
    }
}

impl fmt::Display for BedrockImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for BedrockImageModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "titan" | "titan-v2" | TITAN_IMAGE_V2 => Ok(BedrockImageModel::TitanV2),
            "stable" | "stable-core" | STABLE_IMAGE_CORE => Ok(BedrockImageModel::StableCore),
            other => Err(format!(
                "Unknown image model '{}'. Expected 'titan' or 'stable'.",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub model: BedrockImageModel,
    /// Titan only.
    pub width: Option<u32>,
    /// Titan only.
    pub height: Option<u32>,
    /// Stable only, e.g. `"16:9"`.
    pub aspect_ratio: Option<String>,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>, model: BedrockImageModel) -> Self {
        Self {
            prompt: prompt.into(),
            model,
            width: None,
            height: None,
            aspect_ratio: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub model: String,
    /// Seed sent with the request, when the model takes one.
    pub seed: Option<u32>,
}

/// Style qualifier prefixed to chat image prompts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ImageStyle {
    #[default]
    None,
    Cinematic,
    Anime,
    Photorealistic,
    DigitalArt,
}

impl ImageStyle {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            ImageStyle::None => None,
            ImageStyle::Cinematic => Some("Cinematic"),
            ImageStyle::Anime => Some("Anime"),
            ImageStyle::Photorealistic => Some("Photorealistic"),
            ImageStyle::DigitalArt => Some("Digital Art"),
        }
    }
}

impl FromStr for ImageStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "none" => Ok(ImageStyle::None),
            "cinematic" => Ok(ImageStyle::Cinematic),
            "anime" => Ok(ImageStyle::Anime),
            "photorealistic" => Ok(ImageStyle::Photorealistic),
            "digitalart" => Ok(ImageStyle::DigitalArt),
            _ => Err(format!(
                "Unknown style '{}'. Expected none, cinematic, anime, photorealistic or digital-art.",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatImageRequest {
    pub prompt: String,
    pub style: ImageStyle,
}

impl ChatImageRequest {
    pub fn new(prompt: impl Into<String>, style: ImageStyle) -> Self {
        Self {
            prompt: prompt.into(),
            style,
        }
    }

    /// The natural-language turn sent to the chat model.
    pub fn to_prompt(&self) -> String {
        match self.style.label() {
            Some(style) => format!("Generate an image of: {} style. {}", style, self.prompt),
            None => format!("Generate an image of: {}", self.prompt),
        }
    }
}
