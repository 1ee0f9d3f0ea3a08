use crate::{
    error::Result,
    logger,
    models::{
        BedrockImageModel, GeneratedImage, ImageGenerationRequest, ModelCategory, ModelInfo,
        DEFAULT_ASPECT_RATIO, DEFAULT_DIMENSION, STABLE_IMAGE_CORE, TITAN_IMAGE_V2,
    },
    normalize,
};
use rand::Rng;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{invoke_json, ModelInvoker};

/// Largest seed Titan accepts.
pub const MAX_SEED: u32 = 2_147_483_647;

/// A fresh seed per call, so the same prompt gives a different picture.
pub fn random_seed() -> u32 {
    rand::thread_rng().gen_range(0..=MAX_SEED)
}

pub fn titan_payload(request: &ImageGenerationRequest, seed: u32) -> Value {
    json!({
        "taskType": "TEXT_IMAGE",
        "textToImageParams": {
            "text": request.prompt
        },
        "imageGenerationConfig": {
            "numberOfImages": 1,
            "quality": "standard",
            "width": request.width.unwrap_or(DEFAULT_DIMENSION),
            "height": request.height.unwrap_or(DEFAULT_DIMENSION),
            "cfgScale": 8.0,
            "seed": seed
        }
    })
}

pub fn stable_payload(request: &ImageGenerationRequest) -> Value {
    json!({
        "prompt": request.prompt,
        "aspect_ratio": request.aspect_ratio.as_deref().unwrap_or(DEFAULT_ASPECT_RATIO),
        "output_format": "png"
    })
}

#[derive(Clone)]
pub struct ImageClient {
    invoker: Arc<dyn ModelInvoker>,
}

impl ImageClient {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self { invoker }
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![
            ModelInfo::new(
                TITAN_IMAGE_V2,
                "Amazon Titan Image Generator V2",
                "Amazon",
                ModelCategory::Image,
                "Width/height based text-to-image, random seed per call",
            ),
            ModelInfo::new(
                STABLE_IMAGE_CORE,
                "Stable Image Core",
                "Stability AI",
                ModelCategory::Image,
                "Aspect-ratio based text-to-image, PNG output",
            ),
        ]
    }

    pub async fn generate(&self, request: &ImageGenerationRequest) -> Result<GeneratedImage> {
        let _timer = logger::timer(&format!("{} generation", request.model.display_name()));

        match request.model {
            BedrockImageModel::TitanV2 => self.generate_titan(request).await,
            BedrockImageModel::StableCore => self.generate_stable(request).await,
        }
    }

    async fn generate_titan(&self, request: &ImageGenerationRequest) -> Result<GeneratedImage> {
        let seed = random_seed();
        log::debug!("Titan seed: {}", seed);

        let model_id = request.model.model_id();
        let payload = titan_payload(request, seed);
        let response = invoke_json(self.invoker.as_ref(), model_id, &payload).await?;
        let bytes = normalize::titan_image(&response)?.decode_image()?;

        Ok(GeneratedImage {
            bytes,
            model: model_id.to_string(),
            seed: Some(seed),
        })
    }

    async fn generate_stable(&self, request: &ImageGenerationRequest) -> Result<GeneratedImage> {
        let model_id = request.model.model_id();
        let payload = stable_payload(request);
        let response = invoke_json(self.invoker.as_ref(), model_id, &payload).await?;
        let bytes = normalize::stable_image(&response)?.decode_image()?;

        Ok(GeneratedImage {
            bytes,
            model: model_id.to_string(),
            seed: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bedrock::testing::RecordingInvoker;
    use crate::error::MugenError;
    use crate::normalize::{dimensions, png_fixture};
    use base64::{engine::general_purpose::STANDARD, Engine};

    fn titan_reply(bytes: &[u8]) -> Value {
        json!({"images": [STANDARD.encode(bytes)], "error": null})
    }

    #[test]
    fn titan_payload_shape() {
        let request = ImageGenerationRequest::new("a lighthouse", BedrockImageModel::TitanV2)
            .with_dimensions(512, 768);
        let payload = titan_payload(&request, 7);

        assert_eq!(payload["taskType"], "TEXT_IMAGE");
        assert_eq!(payload["textToImageParams"]["text"], "a lighthouse");
        let config = &payload["imageGenerationConfig"];
        assert_eq!(config["numberOfImages"], 1);
        assert_eq!(config["quality"], "standard");
        assert_eq!(config["width"], 512);
        assert_eq!(config["height"], 768);
        assert_eq!(config["cfgScale"], 8.0);
        assert_eq!(config["seed"], 7);
    }

    #[test]
    fn titan_payload_defaults_to_square() {
        let request = ImageGenerationRequest::new("x", BedrockImageModel::TitanV2);
        let payload = titan_payload(&request, 0);
        assert_eq!(payload["imageGenerationConfig"]["width"], 1024);
        assert_eq!(payload["imageGenerationConfig"]["height"], 1024);
    }

    #[test]
    fn stable_payload_uses_aspect_ratio() {
        let request = ImageGenerationRequest::new("a fox", BedrockImageModel::StableCore)
            .with_aspect_ratio("16:9");
        let payload = stable_payload(&request);
        assert_eq!(payload["prompt"], "a fox");
        assert_eq!(payload["aspect_ratio"], "16:9");
        assert_eq!(payload["output_format"], "png");
        assert!(payload.get("width").is_none());

        let default = stable_payload(&ImageGenerationRequest::new("a fox", BedrockImageModel::StableCore));
        assert_eq!(default["aspect_ratio"], "1:1");
    }

    #[test]
    fn seeds_stay_in_range() {
        for _ in 0..1000 {
            assert!(random_seed() <= MAX_SEED);
        }
    }

    #[tokio::test]
    async fn same_prompt_twice_uses_different_seeds() {
        let invoker = Arc::new(
            RecordingInvoker::new()
                .reply(titan_reply(&png_fixture(1, 1)))
                .reply(titan_reply(&png_fixture(2, 1))),
        );
        let client = ImageClient::new(invoker.clone());
        let request = ImageGenerationRequest::new("same prompt", BedrockImageModel::TitanV2);

        let first = client.generate(&request).await.unwrap();
        let second = client.generate(&request).await.unwrap();

        let calls = invoker.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, TITAN_IMAGE_V2);
        let seed_a = calls[0].1["imageGenerationConfig"]["seed"].as_u64().unwrap();
        let seed_b = calls[1].1["imageGenerationConfig"]["seed"].as_u64().unwrap();
        assert_ne!(seed_a, seed_b);
        assert_eq!(first.seed, Some(seed_a as u32));
        assert_eq!(first.model, TITAN_IMAGE_V2);
        assert_eq!(dimensions(&first.bytes), (1, 1));
        assert_eq!(dimensions(&second.bytes), (2, 1));
    }

    #[tokio::test]
    async fn titan_without_images_propagates() {
        let invoker = Arc::new(RecordingInvoker::new().reply(json!({"error": "blocked"})));
        let client = ImageClient::new(invoker);
        let request = ImageGenerationRequest::new("x", BedrockImageModel::TitanV2);
        let err = client.generate(&request).await.unwrap_err();
        assert!(err.to_string().contains("blocked"));
    }

    #[tokio::test]
    async fn stable_reads_either_field() {
        let invoker = Arc::new(
            RecordingInvoker::new()
                .reply(json!({"image": STANDARD.encode(png_fixture(3, 1))}))
                .reply(json!({"images": [STANDARD.encode(png_fixture(4, 1))]})),
        );
        let client = ImageClient::new(invoker.clone());
        let request = ImageGenerationRequest::new("a fox", BedrockImageModel::StableCore);

        assert_eq!(dimensions(&client.generate(&request).await.unwrap().bytes), (3, 1));
        assert_eq!(dimensions(&client.generate(&request).await.unwrap().bytes), (4, 1));
        assert!(invoker.calls().iter().all(|(model, _)| model == STABLE_IMAGE_CORE));
    }

    #[tokio::test]
    async fn stable_unknown_shape_names_keys() {
        let invoker = Arc::new(RecordingInvoker::new().reply(json!({"artifacts": []})));
        let client = ImageClient::new(invoker);
        let request = ImageGenerationRequest::new("a fox", BedrockImageModel::StableCore);
        match client.generate(&request).await {
            Err(MugenError::UnrecognizedFormat { keys }) => assert_eq!(keys, vec!["artifacts"]),
            other => panic!("unexpected result: {:?}", other.map(|i| i.model)),
        }
    }

    #[tokio::test]
    async fn malformed_base64_is_a_decode_error() {
        let invoker = Arc::new(RecordingInvoker::new().reply(json!({"image": "%%%"})));
        let client = ImageClient::new(invoker);
        let request = ImageGenerationRequest::new("a fox", BedrockImageModel::StableCore);
        assert!(matches!(
            client.generate(&request).await,
            Err(MugenError::DecodeError(_))
        ));
    }

    #[tokio::test]
    async fn base64_that_is_not_an_image_is_a_decode_error() {
        let invoker = Arc::new(
            RecordingInvoker::new().reply(json!({"images": [STANDARD.encode(b"<html>blocked</html>")]})),
        );
        let client = ImageClient::new(invoker);
        let request = ImageGenerationRequest::new("x", BedrockImageModel::TitanV2);
        assert!(matches!(
            client.generate(&request).await,
            Err(MugenError::DecodeError(_))
        ));
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let invoker = Arc::new(
            RecordingInvoker::new().fail(MugenError::AwsServiceError("AccessDenied - nope".into())),
        );
        let client = ImageClient::new(invoker);
        let request = ImageGenerationRequest::new("x", BedrockImageModel::TitanV2);
        assert!(matches!(
            client.generate(&request).await,
            Err(MugenError::AwsServiceError(_))
        ));
    }
}
