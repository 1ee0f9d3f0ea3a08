use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, StatusCode};

use crate::error::{MugenError, Result};

/// Downloads an image referenced by URL in a model response.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("Fetching image from {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(MugenError::Api {
                status: status.as_u16(),
                message: format!("fetching {} failed", url),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Fetch `url` and re-encode the body as standard base64.
pub async fn fetch_as_base64(fetcher: &dyn ImageFetcher, url: &str) -> Result<String> {
    let bytes = fetcher.fetch(url).await?;
    Ok(STANDARD.encode(bytes))
}
