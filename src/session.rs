//! Per-session state handed explicitly to every shell action.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::error::{MugenError, Result};

#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(bytes: Vec<u8>, prompt: impl Into<String>) -> Self {
        Self {
            bytes,
            prompt: prompt.into(),
            created_at: Utc::now(),
        }
    }

    /// File name offered for download, stamped with the generation time.
    pub fn download_name(&self) -> String {
        format!("mugen_art_{}.png", self.created_at.timestamp())
    }
}

/// Holds the prompt being worked on and at most one generated image.
#[derive(Debug, Default)]
pub struct Session {
    current_prompt: String,
    artifact: Option<Artifact>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(&self) -> &str {
        &self.current_prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.current_prompt = prompt.into();
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// Replace whatever artifact was there before.
    pub fn store(&mut self, artifact: Artifact) {
        if self.artifact.is_some() {
            log::debug!("Replacing previous artifact");
        }
        self.artifact = Some(artifact);
    }

    pub fn clear(&mut self) -> Option<Artifact> {
        self.artifact.take()
    }

    /// Write the current artifact to `target`, or into `dir` under its
    /// download name when `target` is a directory or absent.
    pub fn save(&self, target: Option<&Path>) -> Result<PathBuf> {
        let artifact = self
            .artifact
            .as_ref()
            .ok_or(MugenError::NoArtifact)?;

        let path = match target {
            Some(path) if path.is_dir() => path.join(artifact.download_name()),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(artifact.download_name()),
        };

        std::fs::write(&path, &artifact.bytes)?;
        log::info!("Saved {} bytes to {}", artifact.bytes.len(), path.display());
        Ok(path)
    }
}
