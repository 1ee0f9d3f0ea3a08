use crate::{
    error::Result,
    logger,
    models::{ChatImageRequest, ChatMessage, ModelCategory, ModelInfo, GPT5_IMAGE_MINI},
    normalize::{extract_chat_image, Extraction, ImageFetcher},
};
use std::sync::Arc;

use super::ChatClient;

#[derive(Clone)]
pub struct ChatImageClient {
    chat: ChatClient,
    fetcher: Arc<dyn ImageFetcher>,
}

impl ChatImageClient {
    pub fn new(chat: ChatClient, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self { chat, fetcher }
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![ModelInfo::new(
            GPT5_IMAGE_MINI,
            "GPT-5 Image Mini",
            "OpenAI via OpenRouter",
            ModelCategory::Image,
            "Multimodal chat model returning images in the message",
        )]
    }

    /// Transport failures are errors. A reply without a usable image is not:
    /// it comes back as [`Extraction::Unrecognized`] with the raw JSON.
    pub async fn generate(&self, request: &ChatImageRequest) -> Result<Extraction> {
        let _timer = logger::timer("GPT-5 Image Mini generation");

        let messages = vec![ChatMessage::user(request.to_prompt())];
        let response = self.chat.complete(GPT5_IMAGE_MINI, messages).await?;

        let extraction = extract_chat_image(&response, self.fetcher.as_ref()).await;
        if let Extraction::Unrecognized { warnings, .. } = &extraction {
            log::warn!(
                "Model replied but no image was found ({} fetch warnings)",
                warnings.len()
            );
        }
        Ok(extraction)
    }
}
