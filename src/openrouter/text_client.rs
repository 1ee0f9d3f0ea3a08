use crate::{
    error::{MugenError, Result},
    logger,
    models::{ChatMessage, ModelCategory, ModelInfo, TextEditRequest, NEMOTRON_NANO},
};
use serde_json::Value;

use super::ChatClient;

pub const EDITOR_ROLE: &str = "You are an expert, creative editor.";

#[derive(Clone)]
pub struct ChatTextClient {
    chat: ChatClient,
}

impl ChatTextClient {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![ModelInfo::new(
            NEMOTRON_NANO,
            "Nvidia Nemotron 3 Nano",
            "Nvidia via OpenRouter",
            ModelCategory::Text,
            "Free-tier chat model used as a text editor",
        )]
    }

    pub fn messages(request: &TextEditRequest) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(EDITOR_ROLE),
            ChatMessage::user(request.to_chat_message()),
        ]
    }

    pub async fn edit(&self, request: &TextEditRequest) -> Result<String> {
        let _timer = logger::timer("Nemotron edit");

        let response = self
            .chat
            .complete(NEMOTRON_NANO, Self::messages(request))
            .await?;

        response
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| {
                MugenError::ResponseError(format!(
                    "Chat response has no choices[0].message.content: {}",
                    response
                ))
            })
    }
}
