use crate::{
    error::{MugenError, Result},
    logger,
    models::{ModelCategory, ModelInfo, TextEditRequest, CLAUDE_3_SONNET, ENHANCE_PROMPT_INSTRUCTION},
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{invoke_json, ModelInvoker};

pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
pub const MAX_TOKENS: u32 = 2000;

pub fn sonnet_payload(request: &TextEditRequest) -> Value {
    json!({
        "anthropic_version": ANTHROPIC_VERSION,
        "max_tokens": MAX_TOKENS,
        "messages": [
            {
                "role": "user",
                "content": request.to_gateway_message()
            }
        ]
    })
}

/// First text segment of the first message.
fn first_text(response: &Value) -> Result<String> {
    response
        .pointer("/content/0/text")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| {
            MugenError::ResponseError(format!(
                "Claude response has no content[0].text: {}",
                response
            ))
        })
}

/// Models sometimes wrap the prompt in quotes despite being told not to.
fn clean_prompt(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}

#[derive(Clone)]
pub struct TextClient {
    invoker: Arc<dyn ModelInvoker>,
}

impl TextClient {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self { invoker }
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![ModelInfo::new(
            CLAUDE_3_SONNET,
            "Claude 3 Sonnet",
            "Anthropic",
            ModelCategory::Text,
            "Instruction-following editor and prompt enhancer",
        )]
    }

    pub async fn edit(&self, request: &TextEditRequest) -> Result<String> {
        let _timer = logger::timer("Claude 3 Sonnet edit");

        let payload = sonnet_payload(request);
        let response = invoke_json(self.invoker.as_ref(), CLAUDE_3_SONNET, &payload).await?;
        first_text(&response)
    }

    /// Rewrite a rough idea into a detailed English image prompt.
    pub async fn enhance_prompt(&self, idea: &str) -> Result<String> {
        let request = TextEditRequest::new(idea, ENHANCE_PROMPT_INSTRUCTION);
        let enhanced = self.edit(&request).await?;
        Ok(clean_prompt(&enhanced))
    }
}
