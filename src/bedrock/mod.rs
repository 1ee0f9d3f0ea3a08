pub mod image_client;
pub mod text_client;

use crate::{
    config::{BedrockConfig, DEFAULT_REGION},
    error::{MugenError, Result},
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::{
    config::{Credentials, Region},
    error::ProvideErrorMetadata,
    primitives::Blob,
    Client,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub use image_client::ImageClient;
pub use text_client::TextClient;

/// Sends one JSON body to a gateway model and returns the raw response body.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

#[async_trait]
impl ModelInvoker for Client {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let response = self
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| {
                log::error!("Bedrock invocation of {} failed: {:?}", model_id, e);

                if let Some(service_error) = e.as_service_error() {
                    MugenError::AwsServiceError(format!(
                        "{} - {}",
                        service_error.code().unwrap_or("unknown"),
                        service_error.message().unwrap_or("no message")
                    ))
                } else {
                    MugenError::AwsError(format!("AWS SDK error: {}", e))
                }
            })?;

        Ok(response.body.into_inner())
    }
}

/// Serialize `payload`, invoke `model_id` and parse the reply as JSON.
pub(crate) async fn invoke_json(
    invoker: &dyn ModelInvoker,
    model_id: &str,
    payload: &Value,
) -> Result<Value> {
    let request_json = serde_json::to_vec(payload)?;

    log::info!("Invoking model: {}", model_id);

    let response_bytes = invoker.invoke(model_id, request_json).await?;
    serde_json::from_slice(&response_bytes).map_err(|e| MugenError::ResponseError(e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Keys typed in by the user.
    Explicit,
    /// Keys found in the process environment.
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Explicit => f.write_str("explicit credentials"),
            CredentialSource::Environment => f.write_str("environment credentials"),
        }
    }
}

#[derive(Clone)]
pub struct ResolvedCredentials {
    pub source: CredentialSource,
    pub region: String,
    access_key: String,
    secret_key: String,
    session_token: Option<String>,
}

impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("source", &self.source)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// Pick the credential set to use. Explicit keys win; the environment is the
/// fallback; with neither there is nothing to build a client from.
pub fn resolve_credentials(
    explicit: &BedrockConfig,
    environment: &BedrockConfig,
) -> Option<ResolvedCredentials> {
    let region = explicit
        .region
        .clone()
        .or_else(|| environment.region.clone())
        .unwrap_or_else(|| DEFAULT_REGION.to_string());

    let (source, config) = if explicit.has_credentials() {
        (CredentialSource::Explicit, explicit)
    } else if environment.has_credentials() {
        (CredentialSource::Environment, environment)
    } else {
        return None;
    };

    Some(ResolvedCredentials {
        source,
        region,
        access_key: config.access_key.clone()?,
        secret_key: config.secret_key.clone()?,
        session_token: config.session_token.clone(),
    })
}

/// Authenticated handle to the Bedrock runtime for one credential set.
#[derive(Clone)]
pub struct BedrockClient {
    image_client: ImageClient,
    text_client: TextClient,
    region: String,
    source: CredentialSource,
}

impl BedrockClient {
    /// Build a client from explicit input, falling back to the environment.
    /// No request is made here; bad keys surface on the first invocation.
    pub async fn resolve(explicit: &BedrockConfig) -> Option<Self> {
        Self::resolve_with(explicit, &BedrockConfig::from_env()).await
    }

    pub async fn resolve_with(explicit: &BedrockConfig, environment: &BedrockConfig) -> Option<Self> {
        let resolved = match resolve_credentials(explicit, environment) {
            Some(resolved) => resolved,
            None => {
                log::warn!("No AWS credentials supplied or found in the environment");
                return None;
            }
        };

        log::info!("Using {} in {}", resolved.source, resolved.region);
        Some(Self::from_credentials(resolved).await)
    }

    pub async fn from_credentials(resolved: ResolvedCredentials) -> Self {
        let credentials = Credentials::new(
            resolved.access_key,
            resolved.secret_key,
            resolved.session_token,
            None,
            "mugen",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(resolved.region.clone()))
            .load()
            .await;

        let client = Client::new(&aws_config);
        Self::with_invoker(Arc::new(client), resolved.region, resolved.source)
    }

    /// Wire a client around any invoker. Tests use an in-memory one.
    pub fn with_invoker(
        invoker: Arc<dyn ModelInvoker>,
        region: impl Into<String>,
        source: CredentialSource,
    ) -> Self {
        Self {
            image_client: ImageClient::new(invoker.clone()),
            text_client: TextClient::new(invoker),
            region: region.into(),
            source,
        }
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}
