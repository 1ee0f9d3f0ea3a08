use serde_json::Value;

use super::{top_level_keys, ImagePayload, ImageSource};
use crate::error::{MugenError, Result};

/// Titan always answers with `images[0]`; anything else is an error.
pub fn titan_image(response: &Value) -> Result<ImagePayload> {
    if let Some(image) = response
        .get("images")
        .and_then(|images| images.get(0))
        .and_then(Value::as_str)
    {
        return Ok(ImagePayload::new(image, ImageSource::TitanImages));
    }

    match response.get("error").and_then(Value::as_str) {
        Some(error) => Err(MugenError::ResponseError(format!(
            "Titan returned an error: {}",
            error
        ))),
        None => Err(MugenError::ResponseError(
            "Titan response has no images[0] field".into(),
        )),
    }
}

/// Stable answers with `image` or `images[0]` depending on the release.
pub fn stable_image(response: &Value) -> Result<ImagePayload> {
    if let Some(image) = response.get("image").and_then(Value::as_str) {
        return Ok(ImagePayload::new(image, ImageSource::StableImage));
    }

    if let Some(image) = response
        .get("images")
        .and_then(|images| images.get(0))
        .and_then(Value::as_str)
    {
        return Ok(ImagePayload::new(image, ImageSource::StableImages));
    }

    Err(MugenError::UnrecognizedFormat {
        keys: top_level_keys(response),
    })
}
