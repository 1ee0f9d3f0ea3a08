use thiserror::Error;

#[derive(Debug, Error)]
pub enum MugenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No client handle could be built for the requested backend.
    #[error("{0} client not initialized. Check your credentials.")]
    ClientNotInitialized(String),

    /// The session holds no generated image.
    #[error("No image to save yet")]
    NoArtifact,

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    /// The vendor answered with a shape none of the known fields match.
    #[error("Unrecognized response format, received keys: {keys:?}")]
    UnrecognizedFormat { keys: Vec<String> },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("AWS error: {0}")]
    AwsError(String),

    #[error("AWS service error: {0}")]
    AwsServiceError(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for MugenError {
    fn from(e: serde_json::Error) -> Self {
        MugenError::SerializationError(e.to_string())
    }
}

impl From<base64::DecodeError> for MugenError {
    fn from(e: base64::DecodeError) -> Self {
        MugenError::DecodeError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MugenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_format_lists_keys() {
        let err = MugenError::UnrecognizedFormat {
            keys: vec!["artifacts".into(), "seeds".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("artifacts"));
        assert!(msg.contains("seeds"));
    }

    #[test]
    fn missing_client_reads_as_configuration_problem() {
        let err = MugenError::ClientNotInitialized("AWS".into());
        assert_eq!(err.to_string(), "AWS client not initialized. Check your credentials.");
    }
}
