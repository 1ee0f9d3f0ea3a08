use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::fetch::{fetch_as_base64, ImageFetcher};
use super::{Extraction, ImagePayload, ImageSource};

static MARKDOWN_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[.*?\]\((https?://.*?)\)").expect("valid markdown image pattern"));

static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(https?://[^\s)]+)").expect("valid url pattern"));

const URL_TRIM: &[char] = &[')', '.', ',', ';', '"', '\''];

fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Message text, whether sent as a plain string or as a list of text parts.
fn message_text(message: &Value) -> Option<String> {
    match message.get("content")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(parts) => {
            let text: Vec<&str> = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect();
            (!text.is_empty()).then(|| text.join("\n"))
        }
        _ => None,
    }
}

/// Find an image URL in free text. A Markdown image link wins over any bare
/// URL, regardless of position.
pub fn find_content_url(content: &str) -> Option<ImageSource> {
    if let Some(url) = MARKDOWN_IMAGE
        .captures(content)
        .and_then(|captures| captures.get(1))
    {
        let url = url.as_str().trim_matches(URL_TRIM);
        return Some(ImageSource::MarkdownLink(url.to_string()));
    }

    BARE_URL
        .captures(content)
        .and_then(|captures| captures.get(1))
        .map(|url| ImageSource::BareUrl(url.as_str().trim_matches(URL_TRIM).to_string()))
}

/// Run the aggregator strategies in order: `message.images[0]`, then URLs in
/// the message text. Fetch failures are downgraded to warnings so the next
/// strategy still runs.
pub async fn extract_chat_image(response: &Value, fetcher: &dyn ImageFetcher) -> Extraction {
    let mut warnings = Vec::new();
    let message = response.pointer("/choices/0/message");

    if let Some(image) = message.and_then(|m| m.pointer("/images/0")) {
        if image.get("type").and_then(Value::as_str) == Some("image_url") {
            let url = image
                .pointer("/image_url/url")
                .and_then(Value::as_str)
                .unwrap_or_default();

            if url.starts_with("data:") {
                match url.split_once(',') {
                    Some((_, payload)) if !payload.is_empty() => {
                        return Extraction::Image(ImagePayload::new(
                            payload,
                            ImageSource::InlineDataUri,
                        ));
                    }
                    _ => warnings.push("data URI in message.images carries no payload".to_string()),
                }
            } else if is_http(url) {
                match fetch_as_base64(fetcher, url).await {
                    Ok(base64) => {
                        return Extraction::Image(ImagePayload::new(
                            base64,
                            ImageSource::RemoteUrl(url.to_string()),
                        ));
                    }
                    Err(e) => {
                        log::warn!("Could not fetch image from message.images: {}", e);
                        warnings.push(format!("fetch of {} failed: {}", url, e));
                    }
                }
            } else {
                warnings.push(format!("unsupported image url scheme: {:?}", url));
            }
        } else {
            log::debug!("message.images[0] has an unknown type tag, skipping");
        }
    }

    if let Some(content) = message.and_then(message_text) {
        if let Some(source) = find_content_url(&content) {
            let url = source.url().unwrap_or_default().to_string();
            match fetch_as_base64(fetcher, &url).await {
                Ok(base64) => return Extraction::Image(ImagePayload::new(base64, source)),
                Err(e) => {
                    log::warn!("Could not fetch image linked in message text: {}", e);
                    warnings.push(format!("fetch of {} failed: {}", url, e));
                }
            }
        }
    }

    Extraction::Unrecognized {
        raw: response.clone(),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MugenError, Result};
    use async_trait::async_trait;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves fixed bytes for every URL except those listed as failing.
    struct StubFetcher {
        body: Vec<u8>,
        failing: Vec<String>,
        requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(body: &[u8]) -> Self {
            Self {
                body: body.to_vec(),
                failing: Vec::new(),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(mut self, url: &str) -> Self {
            self.failing.push(url.to_string());
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.requested.lock().unwrap().push(url.to_string());
            if self.failing.iter().any(|u| u == url) {
                return Err(MugenError::Api {
                    status: 404,
                    message: "not found".into(),
                });
            }
            Ok(self.body.clone())
        }
    }

    fn with_images(url: &str) -> Value {
        json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "",
                    "images": [{"type": "image_url", "image_url": {"url": url}}]
                }
            }]
        })
    }

    fn with_content(content: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[tokio::test]
    async fn data_uri_payload_is_returned_without_fetching() {
        let fetcher = StubFetcher::new(b"unused");
        let extraction = extract_chat_image(&with_images("data:image/png;base64,AAAA"), &fetcher).await;

        match extraction {
            Extraction::Image(payload) => {
                assert_eq!(payload.base64, "AAAA");
                assert_eq!(payload.source, ImageSource::InlineDataUri);
                assert_eq!(payload.decode().unwrap(), vec![0, 0, 0]);
            }
            other => panic!("expected image, got {other:?}"),
        }
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn http_image_url_is_fetched_and_reencoded() {
        let fetcher = StubFetcher::new(b"\x89PNG fake");
        let extraction = extract_chat_image(&with_images("http://example/x.png"), &fetcher).await;

        assert_eq!(fetcher.requested(), vec!["http://example/x.png".to_string()]);
        match extraction {
            Extraction::Image(payload) => {
                assert_eq!(payload.base64, STANDARD.encode(b"\x89PNG fake"));
                assert_eq!(payload.decode().unwrap(), b"\x89PNG fake");
                assert_eq!(
                    payload.source,
                    ImageSource::RemoteUrl("http://example/x.png".into())
                );
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn markdown_link_beats_bare_url() {
        let fetcher = StubFetcher::new(b"img");
        let response = with_content("See https://docs.example/readme first. Here it is ![a](http://x/y.png)");
        let extraction = extract_chat_image(&response, &fetcher).await;

        assert_eq!(fetcher.requested(), vec!["http://x/y.png".to_string()]);
        match extraction {
            Extraction::Image(payload) => {
                assert_eq!(payload.source, ImageSource::MarkdownLink("http://x/y.png".into()));
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bare_url_is_trimmed_and_fetched() {
        let fetcher = StubFetcher::new(b"img");
        let response = with_content("Your image: (https://cdn.example/out.png).");
        let extraction = extract_chat_image(&response, &fetcher).await;

        assert_eq!(fetcher.requested(), vec!["https://cdn.example/out.png".to_string()]);
        assert!(extraction.is_image());
    }

    #[tokio::test]
    async fn failed_image_fetch_falls_through_to_content() {
        let fetcher = StubFetcher::new(b"from-content").failing_on("https://broken/a.png");
        let mut response = with_images("https://broken/a.png");
        response["choices"][0]["message"]["content"] = json!("Backup: ![b](https://ok/b.png)");

        let extraction = extract_chat_image(&response, &fetcher).await;

        assert_eq!(
            fetcher.requested(),
            vec!["https://broken/a.png".to_string(), "https://ok/b.png".to_string()]
        );
        match extraction {
            Extraction::Image(payload) => assert_eq!(payload.decode().unwrap(), b"from-content"),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn nothing_usable_keeps_raw_response() {
        let fetcher = StubFetcher::new(b"unused");
        let response = with_content("I cannot draw that, sorry.");
        let extraction = extract_chat_image(&response, &fetcher).await;

        match extraction {
            Extraction::Unrecognized { raw, warnings } => {
                assert_eq!(raw, response);
                assert!(warnings.is_empty());
            }
            other => panic!("expected unrecognized, got {other:?}"),
        }
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_is_reported_in_warnings() {
        let fetcher = StubFetcher::new(b"unused").failing_on("https://gone/x.png");
        let extraction = extract_chat_image(&with_content("https://gone/x.png"), &fetcher).await;

        match extraction {
            Extraction::Unrecognized { warnings, .. } => {
                assert_eq!(warnings.len(), 1);
                assert!(warnings[0].contains("https://gone/x.png"));
            }
            other => panic!("expected unrecognized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_type_tag_is_skipped() {
        let fetcher = StubFetcher::new(b"unused");
        let response = json!({
            "choices": [{"message": {"images": [{"type": "file", "file": {"id": "f1"}}]}}]
        });
        assert!(!extract_chat_image(&response, &fetcher).await.is_image());
    }

    #[tokio::test]
    async fn content_parts_are_scanned() {
        let fetcher = StubFetcher::new(b"img");
        let response = json!({
            "choices": [{"message": {"content": [
                {"type": "text", "text": "Done."},
                {"type": "text", "text": "![out](https://cdn.example/p.png)"}
            ]}}]
        });
        assert!(extract_chat_image(&response, &fetcher).await.is_image());
        assert_eq!(fetcher.requested(), vec!["https://cdn.example/p.png".to_string()]);
    }

    #[test]
    fn content_url_detection() {
        assert_eq!(
            find_content_url("![a](http://x/y.png) and http://z/w.png"),
            Some(ImageSource::MarkdownLink("http://x/y.png".into()))
        );
        assert_eq!(
            find_content_url("try 'https://z/w.png';"),
            Some(ImageSource::BareUrl("https://z/w.png".into()))
        );
        assert_eq!(find_content_url("no links here"), None);
    }
}
