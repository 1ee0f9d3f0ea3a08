use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Instruction used to turn a rough idea into an image-generation prompt.
pub const ENHANCE_PROMPT_INSTRUCTION: &str = "Improve this prompt for image generation \
(Stable Diffusion/Titan). Make it detailed, descriptive, visual and in English. \
Return ONLY the improved prompt without quotes or extra text.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextEditRequest {
    pub text: String,
    pub instruction: String,
}

impl TextEditRequest {
    pub fn new(text: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            instruction: instruction.into(),
        }
    }

    /// Single user turn for instruction-following models on the gateway.
    pub fn to_gateway_message(&self) -> String {
        format!(
            "Instruction: {}\n\nText to process:\n{}\n\nEdited output:",
            self.instruction, self.text
        )
    }

    /// User turn for chat models that also get a system role.
    pub fn to_chat_message(&self) -> String {
        format!(
            "Original text:\n{}\n\nInstruction: {}\n\nReturn only the edited text.",
            self.text, self.instruction
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditMode {
    Summarize,
    ImproveWording,
    ChangeTone,
    Custom(String),
}

impl EditMode {
    pub fn instruction(&self) -> String {
        match self {
            EditMode::Summarize => "Apply: Summarize".to_string(),
            EditMode::ImproveWording => "Apply: Improve wording".to_string(),
            EditMode::ChangeTone => "Apply: Change tone".to_string(),
            EditMode::Custom(instruction) => instruction.clone(),
        }
    }
}

impl FromStr for EditMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "summarize" => Ok(EditMode::Summarize),
            "improve" | "improve-wording" => Ok(EditMode::ImproveWording),
            "tone" | "change-tone" => Ok(EditMode::ChangeTone),
            _ => Err(format!(
                "Unknown edit mode '{}'. Expected summarize, improve or tone.",
                s
            )),
        }
    }
}
