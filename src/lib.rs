//! Bring-your-own-key access to image and text models on AWS Bedrock and
//! OpenRouter.
//!
//! Clients are built from user-supplied credentials, and every vendor reply
//! goes through [`normalize`] before anything reaches the caller. The
//! [`shell::Workbench`] ties both backends to one [`session::Session`].

pub mod bedrock;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod normalize;
pub mod openrouter;
pub mod session;
pub mod shell;

pub use bedrock::{BedrockClient, CredentialSource, ImageClient, ModelInvoker, TextClient};
pub use config::{BedrockConfig, Config, OpenRouterConfig};
pub use error::{MugenError, Result};
pub use models::*;
pub use normalize::{Extraction, ImageFetcher, ImagePayload, ImageSource};
pub use openrouter::{ChatClient, ChatImageClient, ChatTextClient, OpenRouterClient};
pub use session::{Artifact, Session};
pub use shell::{Outcome, Workbench};
