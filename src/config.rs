use std::env;
use std::fmt;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const SUPPORTED_REGIONS: &[&str] = &["us-west-2", "us-east-1"];
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Empty form fields count as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_var(name: &str) -> Option<String> {
    non_empty(env::var(name).ok())
}

/// Load `.env` from the working directory or a parent. Values in the file
/// override variables already set in the process. Returns how many were set.
#[allow(deprecated)]
pub fn load_env_file() -> usize {
    match dotenv::dotenv_iter() {
        Ok(entries) => apply_env_entries(entries),
        Err(_) => 0,
    }
}

fn apply_env_entries<I>(entries: I) -> usize
where
    I: IntoIterator<Item = dotenv::Result<(String, String)>>,
{
    let mut applied = 0;
    for entry in entries {
        match entry {
            Ok((key, value)) => {
                env::set_var(key, value);
                applied += 1;
            }
            Err(e) => log::warn!("Skipping malformed .env entry: {}", e),
        }
    }
    applied
}

#[derive(Clone, Default)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
}

impl fmt::Debug for BedrockConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BedrockConfig")
            .field("region", &self.region)
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the standard AWS variables. Used as the fallback when no explicit
    /// credentials were entered.
    pub fn from_env() -> Self {
        BedrockConfig {
            region: env_var("AWS_REGION").or_else(|| env_var("AWS_DEFAULT_REGION")),
            access_key: env_var("AWS_ACCESS_KEY_ID"),
            secret_key: env_var("AWS_SECRET_ACCESS_KEY"),
            session_token: env_var("AWS_SESSION_TOKEN"),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = non_empty(Some(region.into()));
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = non_empty(Some(access_key.into()));
        self.secret_key = non_empty(Some(secret_key.into()));
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = non_empty(Some(token.into()));
        self
    }

    /// Both halves of the key pair are present.
    pub fn has_credentials(&self) -> bool {
        self.access_key.is_some() && self.secret_key.is_some()
    }

    pub fn region_or_default(&self) -> String {
        self.region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }
}

#[derive(Clone)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        OpenRouterConfig {
            api_key: None,
            base_url: OPENROUTER_BASE_URL.to_string(),
        }
    }
}

impl fmt::Debug for OpenRouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenRouterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_values(env_var("OPENROUTER_API_KEY"), env_var("OPENROUTER_BASE_URL"))
    }

    fn from_values(api_key: Option<String>, base_url: Option<String>) -> Self {
        let config = OpenRouterConfig {
            api_key: non_empty(api_key),
            ..Self::default()
        };
        match base_url {
            Some(base_url) => config.with_base_url(base_url),
            None => config,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = non_empty(Some(api_key.into()));
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub bedrock: BedrockConfig,
    pub openrouter: OpenRouterConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the Bedrock region and the whole OpenRouter side. Bedrock
    /// environment credentials stay a separate fallback so explicit input
    /// always takes precedence.
    pub fn from_env() -> Self {
        Config {
            bedrock: BedrockConfig::new().with_region(
                env_var("AWS_REGION")
                    .or_else(|| env_var("AWS_DEFAULT_REGION"))
                    .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            ),
            openrouter: OpenRouterConfig::from_env(),
        }
    }

    pub fn with_bedrock(mut self, config: BedrockConfig) -> Self {
        self.bedrock = config;
        self
    }

    pub fn with_openrouter(mut self, config: OpenRouterConfig) -> Self {
        self.openrouter = config;
        self
    }
}
