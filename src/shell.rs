//! The interactive boundary.
//!
//! Each action catches every error from the layers below and turns it into an
//! [`Outcome`] for the user. A failed action never touches the session.

use std::fmt;
use std::path::Path;

use crate::{
    bedrock::BedrockClient,
    error::MugenError,
    models::{
        BedrockImageModel, ChatImageRequest, EditMode, ImageGenerationRequest, ImageStyle,
        TextEditRequest,
    },
    normalize::Extraction,
    openrouter::OpenRouterClient,
    session::{Artifact, Session},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    /// Nothing broke, but the user has something to look at or fix.
    Warning(String),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Success(m) | Outcome::Warning(m) | Outcome::Failure(m) => m,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(m) => write!(f, "{}", m),
            Outcome::Warning(m) => write!(f, "Warning: {}", m),
            Outcome::Failure(m) => write!(f, "Error: {}", m),
        }
    }
}

fn not_initialized(backend: &str) -> Outcome {
    Outcome::Failure(MugenError::ClientNotInitialized(backend.to_string()).to_string())
}

pub struct Workbench {
    bedrock: Option<BedrockClient>,
    openrouter: Option<OpenRouterClient>,
    session: Session,
}

impl Workbench {
    pub fn new(bedrock: Option<BedrockClient>, openrouter: Option<OpenRouterClient>) -> Self {
        Self {
            bedrock,
            openrouter,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.session.set_prompt(prompt);
    }

    /// Rewrite the current prompt with the gateway text model.
    pub async fn enhance_prompt(&mut self) -> Outcome {
        let Some(client) = &self.bedrock else {
            return not_initialized("AWS");
        };
        if self.session.prompt().trim().is_empty() {
            return Outcome::Warning("Write something to improve first.".into());
        }

        match client.text().enhance_prompt(self.session.prompt()).await {
            Ok(enhanced) => {
                self.session.set_prompt(enhanced.clone());
                Outcome::Success(enhanced)
            }
            Err(e) => Outcome::Failure(format!("Could not improve the prompt: {}", e)),
        }
    }

    /// Generate an image from the current prompt on the gateway.
    pub async fn generate(&mut self, request: ImageGenerationRequest) -> Outcome {
        let Some(client) = &self.bedrock else {
            return not_initialized("AWS");
        };
        if request.prompt.trim().is_empty() {
            return Outcome::Warning("Write a prompt first.".into());
        }

        match client.image().generate(&request).await {
            Ok(image) => {
                let size = image.bytes.len();
                self.session.store(Artifact::new(image.bytes, request.prompt.clone()));
                Outcome::Success(format!(
                    "Image generated with {} ({} bytes)",
                    request.model, size
                ))
            }
            Err(e) => Outcome::Failure(format!("Generation failed: {}", e)),
        }
    }

    /// Shortcut for [`Workbench::generate`] using the session prompt.
    pub async fn generate_current(&mut self, model: BedrockImageModel) -> Outcome {
        let request = ImageGenerationRequest::new(self.session.prompt(), model);
        self.generate(request).await
    }

    pub async fn edit_text(&self, text: &str, instruction: &str) -> Outcome {
        let Some(client) = &self.bedrock else {
            return not_initialized("AWS");
        };
        if text.trim().is_empty() {
            return Outcome::Warning("Enter some text.".into());
        }

        match client.text().edit(&TextEditRequest::new(text, instruction)).await {
            Ok(edited) => Outcome::Success(edited),
            Err(e) => Outcome::Failure(format!("Text edit failed: {}", e)),
        }
    }

    /// Generate an image through the router. An unknown reply shape is a
    /// warning carrying the raw JSON, not an error.
    pub async fn generate_chat_image(&mut self, prompt: &str, style: ImageStyle) -> Outcome {
        let Some(client) = &self.openrouter else {
            return not_initialized("OpenRouter");
        };
        if prompt.trim().is_empty() {
            return Outcome::Warning("Write a prompt first.".into());
        }

        let request = ChatImageRequest::new(prompt, style);
        match client.image().generate(&request).await {
            Ok(Extraction::Image(payload)) => match payload.decode_image() {
                Ok(bytes) => {
                    let size = bytes.len();
                    self.session.store(Artifact::new(bytes, prompt));
                    Outcome::Success(format!("Image generated with GPT-5 Image Mini ({} bytes)", size))
                }
                Err(e) => Outcome::Failure(format!("Could not decode the image: {}", e)),
            },
            Ok(Extraction::Unrecognized { raw, warnings }) => {
                let pretty = serde_json::to_string_pretty(&raw).unwrap_or_else(|_| raw.to_string());
                let mut message =
                    String::from("The model replied, but no image was found in the expected format.");
                for warning in &warnings {
                    message.push_str(&format!("\n  - {}", warning));
                }
                message.push_str(&format!("\nReceived structure:\n{}", pretty));
                Outcome::Warning(message)
            }
            Err(e) => Outcome::Failure(format!("Generation failed: {}", e)),
        }
    }

    pub async fn edit_text_chat(&self, text: &str, mode: &EditMode) -> Outcome {
        let Some(client) = &self.openrouter else {
            return not_initialized("OpenRouter");
        };
        if text.trim().is_empty() {
            return Outcome::Warning("Enter some text.".into());
        }

        let request = TextEditRequest::new(text, mode.instruction());
        match client.text().edit(&request).await {
            Ok(edited) => Outcome::Success(edited),
            Err(e) => Outcome::Failure(format!("Text edit failed: {}", e)),
        }
    }

    pub fn clear(&mut self) -> Outcome {
        match self.session.clear() {
            Some(_) => Outcome::Success("Image cleared.".into()),
            None => Outcome::Warning("Nothing to clear.".into()),
        }
    }

    pub fn save(&self, target: Option<&Path>) -> Outcome {
        match self.session.save(target) {
            Ok(path) => Outcome::Success(format!("Saved: {}", path.display())),
            Err(e) => Outcome::Failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bedrock::{testing::RecordingInvoker, CredentialSource};
    use crate::normalize::{dimensions, png_fixture};
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde_json::json;
    use std::sync::Arc;

    fn bench_with(invoker: RecordingInvoker) -> Workbench {
        let client =
            BedrockClient::with_invoker(Arc::new(invoker), "us-west-2", CredentialSource::Explicit);
        Workbench::new(Some(client), None)
    }

    #[tokio::test]
    async fn missing_clients_are_configuration_failures() {
        let mut bench = Workbench::new(None, None);
        bench.set_prompt("a cat");

        let outcome = bench.generate_current(BedrockImageModel::TitanV2).await;
        assert_eq!(
            outcome,
            Outcome::Failure("AWS client not initialized. Check your credentials.".into())
        );
        assert!(matches!(bench.enhance_prompt().await, Outcome::Failure(_)));
        assert!(matches!(bench.edit_text("t", "i").await, Outcome::Failure(_)));
        assert!(bench
            .generate_chat_image("a cat", ImageStyle::None)
            .await
            .message()
            .contains("OpenRouter client not initialized"));
        assert!(matches!(
            bench.edit_text_chat("t", &EditMode::Summarize).await,
            Outcome::Failure(_)
        ));
        assert!(bench.session().artifact().is_none());
    }

    #[tokio::test]
    async fn empty_prompt_is_a_warning() {
        let mut bench = bench_with(RecordingInvoker::new());
        assert!(matches!(
            bench.generate_current(BedrockImageModel::StableCore).await,
            Outcome::Warning(_)
        ));
        assert!(matches!(bench.enhance_prompt().await, Outcome::Warning(_)));
    }

    #[tokio::test]
    async fn successful_generation_stores_artifact() {
        let mut bench = bench_with(
            RecordingInvoker::new().reply(json!({"images": [STANDARD.encode(png_fixture(2, 2))]})),
        );
        bench.set_prompt("a lighthouse");

        let outcome = bench.generate_current(BedrockImageModel::TitanV2).await;

        assert!(outcome.is_success(), "{outcome}");
        let artifact = bench.session().artifact().unwrap();
        assert_eq!(dimensions(&artifact.bytes), (2, 2));
        assert_eq!(artifact.prompt, "a lighthouse");
    }

    #[tokio::test]
    async fn failed_generation_keeps_previous_artifact() {
        let mut bench = bench_with(
            RecordingInvoker::new()
                .reply(json!({"image": STANDARD.encode(png_fixture(5, 1))}))
                .reply(json!({"unexpected": true}))
                .reply(json!({"image": STANDARD.encode(b"<html>not an image</html>")})),
        );
        bench.set_prompt("a fox");

        assert!(bench.generate_current(BedrockImageModel::StableCore).await.is_success());
        let outcome = bench.generate_current(BedrockImageModel::StableCore).await;

        match outcome {
            Outcome::Failure(message) => assert!(message.contains("unexpected")),
            other => panic!("expected failure, got {other:?}"),
        }
        match bench.generate_current(BedrockImageModel::StableCore).await {
            Outcome::Failure(message) => assert!(message.contains("Failed to decode image")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(dimensions(&bench.session().artifact().unwrap().bytes), (5, 1));
    }

    #[tokio::test]
    async fn enhance_replaces_session_prompt() {
        let mut bench = bench_with(RecordingInvoker::new().reply(json!({
            "content": [{"type": "text", "text": "A misty harbor at dawn, oil painting"}]
        })));
        bench.set_prompt("puerto con niebla");

        let outcome = bench.enhance_prompt().await;

        assert_eq!(outcome, Outcome::Success("A misty harbor at dawn, oil painting".into()));
        assert_eq!(bench.session().prompt(), "A misty harbor at dawn, oil painting");
    }

    #[tokio::test]
    async fn failed_enhance_keeps_prompt() {
        let mut bench = bench_with(
            RecordingInvoker::new().fail(MugenError::AwsError("timeout".into())),
        );
        bench.set_prompt("original");

        assert!(matches!(bench.enhance_prompt().await, Outcome::Failure(_)));
        assert_eq!(bench.session().prompt(), "original");
    }

    #[test]
    fn clear_and_save_report_state() {
        let mut bench = Workbench::new(None, None);
        assert!(matches!(bench.clear(), Outcome::Warning(_)));
        assert!(matches!(bench.save(None), Outcome::Failure(_)));
    }
}
