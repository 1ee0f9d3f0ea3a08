//! Extraction of a generated image from loosely specified vendor responses.
//!
//! Every strategy checks for presence before reading a field. Gateway shapes
//! are strict and fail with a descriptive error; the aggregator shape falls
//! through to heuristics and finally to [`Extraction::Unrecognized`], which
//! keeps the raw response for display.

pub mod bedrock;
pub mod chat;
pub mod fetch;

pub use bedrock::{stable_image, titan_image};
pub use chat::{extract_chat_image, find_content_url};
pub use fetch::{HttpFetcher, ImageFetcher};

use base64::{engine::general_purpose::STANDARD, Engine};
use image::ImageFormat;
use serde_json::Value;
use std::io::Cursor;

use crate::error::{MugenError, Result};

/// Where in the response the image was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Titan `images[0]`.
    TitanImages,
    /// Stable `image`.
    StableImage,
    /// Stable `images[0]`.
    StableImages,
    /// `message.images[0]` carrying a `data:` URI.
    InlineDataUri,
    /// `message.images[0]` carrying an http(s) URL that was fetched.
    RemoteUrl(String),
    /// Markdown image link found in the message text.
    MarkdownLink(String),
    /// Any other URL found in the message text.
    BareUrl(String),
}

impl ImageSource {
    /// The URL the image was downloaded from, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            ImageSource::RemoteUrl(url)
            | ImageSource::MarkdownLink(url)
            | ImageSource::BareUrl(url) => Some(url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub base64: String,
    pub source: ImageSource,
}

impl ImagePayload {
    pub fn new(base64: impl Into<String>, source: ImageSource) -> Self {
        Self {
            base64: base64.into(),
            source,
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(self.base64.trim())?)
    }

    /// Decode the base64 text and check it really is an image, returning PNG bytes.
    pub fn decode_image(&self) -> Result<Vec<u8>> {
        to_png(&self.decode()?)
    }
}

/// Re-encode any raster format `image` understands as PNG. Anything else,
/// such as an HTML page served with status 200, is a decode error.
pub fn to_png(bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| MugenError::DecodeError(format!("Failed to decode image: {e}")))?;

    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png)
        .map_err(|e| MugenError::DecodeError(format!("Failed to encode PNG: {e}")))?;
    Ok(png.into_inner())
}

/// A small solid PNG for tests; `width` tells fixtures apart.
#[cfg(test)]
pub(crate) fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let mut png = Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut png, ImageFormat::Png)
        .unwrap();
    png.into_inner()
}

#[cfg(test)]
pub(crate) fn dimensions(bytes: &[u8]) -> (u32, u32) {
    use image::GenericImageView;
    image::load_from_memory(bytes).unwrap().dimensions()
}

#[derive(Debug, Clone)]
pub enum Extraction {
    Image(ImagePayload),
    /// No strategy matched. `raw` is the untouched response.
    Unrecognized { raw: Value, warnings: Vec<String> },
}

impl Extraction {
    pub fn is_image(&self) -> bool {
        matches!(self, Extraction::Image(_))
    }
}

pub fn top_level_keys(value: &Value) -> Vec<String> {
    value
        .as_object()
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_decode_tolerates_surrounding_whitespace() {
        let payload = ImagePayload::new(" AAAA\n", ImageSource::InlineDataUri);
        assert_eq!(payload.decode().unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn payload_decode_rejects_garbage() {
        let payload = ImagePayload::new("not base64!!", ImageSource::StableImage);
        assert!(payload.decode().is_err());
    }

    #[test]
    fn jpeg_is_reencoded_as_png() {
        let mut jpeg = Cursor::new(Vec::new());
        image::DynamicImage::new_rgb8(3, 2)
            .write_to(&mut jpeg, ImageFormat::Jpeg)
            .unwrap();
        let payload = ImagePayload::new(STANDARD.encode(jpeg.into_inner()), ImageSource::StableImage);

        let png = payload.decode_image().unwrap();

        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
        assert_eq!(dimensions(&png), (3, 2));
    }

    #[test]
    fn non_image_bytes_are_a_decode_error() {
        let payload = ImagePayload::new(
            STANDARD.encode(b"<html>Usage policy</html>"),
            ImageSource::BareUrl("http://x/policies".into()),
        );
        assert!(payload.decode().is_ok());
        assert!(matches!(payload.decode_image(), Err(MugenError::DecodeError(_))));
    }

    #[test]
    fn keys_of_non_object_are_empty() {
        assert!(top_level_keys(&json!(["a"])).is_empty());
        assert_eq!(top_level_keys(&json!({"seeds": [1]})), vec!["seeds".to_string()]);
    }
}
