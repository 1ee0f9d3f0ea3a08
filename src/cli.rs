//! CLI argument parsing with clap, plus the REPL line grammar.

use std::fmt;
use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use mugen::config::SUPPORTED_REGIONS;
use mugen::logger::{LogLevel, LoggerConfig};
use mugen::{BedrockConfig, BedrockImageModel, Config, EditMode, ImageStyle, OpenRouterConfig};

/// Generate images and edit text with your own AWS Bedrock and OpenRouter keys.
#[derive(Parser, Debug)]
#[command(name = "mugen", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Also append log lines to this file.
    #[arg(long)]
    pub log_file: Option<String>,

    /// Write log lines as JSON.
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn logger_config(&self) -> LoggerConfig {
        let level = if self.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        };
        let mut config = LoggerConfig::new()
            .with_level(level)
            .with_json_output(self.log_json)
            .with_colors(!self.log_json);
        if let Some(path) = &self.log_file {
            config = config.with_file_output(path);
        }
        config
    }
}

/// Keys typed on the command line. They win over anything in the environment.
#[derive(Args, Default)]
pub struct CredentialArgs {
    #[arg(long)]
    pub aws_access_key: Option<String>,

    #[arg(long)]
    pub aws_secret_key: Option<String>,

    #[arg(long)]
    pub aws_session_token: Option<String>,

    /// Bedrock region (us-west-2 when unset).
    #[arg(long, value_parser = PossibleValuesParser::new(SUPPORTED_REGIONS.iter().copied()))]
    pub region: Option<String>,

    #[arg(long)]
    pub openrouter_key: Option<String>,

    #[arg(long)]
    pub openrouter_base_url: Option<String>,
}

impl fmt::Debug for CredentialArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("CredentialArgs")
            .field("aws_access_key", &redacted(&self.aws_access_key))
            .field("aws_secret_key", &redacted(&self.aws_secret_key))
            .field("aws_session_token", &redacted(&self.aws_session_token))
            .field("region", &self.region)
            .field("openrouter_key", &redacted(&self.openrouter_key))
            .field("openrouter_base_url", &self.openrouter_base_url)
            .finish()
    }
}

impl CredentialArgs {
    /// Layer the flags over `base`.
    ///
    /// AWS keys only count as a pair; a lone access key is ignored so the
    /// environment fallback still applies.
    pub fn apply(&self, base: Config) -> Config {
        let mut bedrock: BedrockConfig = base.bedrock;
        if let Some(region) = &self.region {
            bedrock = bedrock.with_region(region.clone());
        }
        if let (Some(access), Some(secret)) = (&self.aws_access_key, &self.aws_secret_key) {
            bedrock = bedrock.with_credentials(access.clone(), secret.clone());
            if let Some(token) = &self.aws_session_token {
                bedrock = bedrock.with_session_token(token.clone());
            }
        }

        let mut openrouter: OpenRouterConfig = base.openrouter;
        if let Some(key) = &self.openrouter_key {
            openrouter = openrouter.with_api_key(key.clone());
        }
        if let Some(url) = &self.openrouter_base_url {
            openrouter = openrouter.with_base_url(url.clone());
        }

        Config::new().with_bedrock(bedrock).with_openrouter(openrouter)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the models each backend exposes.
    Models,

    /// Generate an image on Bedrock.
    Image {
        prompt: String,

        /// titan or stable.
        #[arg(short, long, default_value = "titan")]
        model: BedrockImageModel,

        /// Rewrite the prompt with Claude before generating.
        #[arg(short, long)]
        enhance: bool,

        /// Titan only.
        #[arg(long)]
        width: Option<u32>,

        /// Titan only.
        #[arg(long)]
        height: Option<u32>,

        /// Stable only (e.g., 1:1, 16:9).
        #[arg(short, long)]
        aspect_ratio: Option<String>,

        /// Output file or directory (mugen_art_<timestamp>.png if not specified).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Turn a rough idea into a detailed English image prompt.
    Enhance { prompt: String },

    /// Edit text with Claude on Bedrock.
    Edit {
        text: String,

        #[arg(short, long)]
        instruction: String,
    },

    /// Generate an image through OpenRouter.
    ChatImage {
        prompt: String,

        /// none, cinematic, anime, photorealistic, digital-art.
        #[arg(short, long, default_value = "none")]
        style: ImageStyle,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Edit text with the free OpenRouter model.
    ChatEdit {
        text: String,

        /// summarize, improve, tone.
        #[arg(short, long, default_value = "summarize", conflicts_with = "instruction")]
        mode: EditMode,

        /// Free-form instruction instead of a preset mode.
        #[arg(short, long)]
        instruction: Option<String>,
    },

    /// Interactive session keeping one prompt and one image.
    Repl,
}

impl Command {
    /// The mode to send for `chat-edit`, preferring a custom instruction.
    pub fn chat_edit_mode(mode: &EditMode, instruction: Option<&str>) -> EditMode {
        match instruction {
            Some(text) => EditMode::Custom(text.to_string()),
            None => mode.clone(),
        }
    }
}

pub const REPL_HELP: &str = "\
Commands:
  prompt <text>          set the working prompt
  show                   print the prompt and whether an image is held
  enhance                rewrite the prompt with Claude
  generate [titan|stable]
  chat-image [style]     generate through OpenRouter
  edit <instruction>     edit the prompt text with Claude
  chat-edit <mode>       summarize | improve | tone
  save [path]            write the current image
  clear                  drop the current image
  models
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Prompt(String),
    Show,
    Enhance,
    Generate(BedrockImageModel),
    ChatImage(ImageStyle),
    Edit(String),
    ChatEdit(EditMode),
    Save(Option<PathBuf>),
    Clear,
    Models,
    Help,
    Quit,
    Empty,
}

pub fn parse_repl_line(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let argument = (!rest.is_empty()).then_some(rest);

    match word.to_ascii_lowercase().as_str() {
        "" => Ok(ReplCommand::Empty),
        "prompt" => match argument {
            Some(text) => Ok(ReplCommand::Prompt(text.to_string())),
            None => Err("Usage: prompt <text>".into()),
        },
        "show" => Ok(ReplCommand::Show),
        "enhance" => Ok(ReplCommand::Enhance),
        "generate" | "gen" => argument
            .map_or(Ok(BedrockImageModel::default()), |model| model.parse())
            .map(ReplCommand::Generate),
        "chat-image" => argument
            .map_or(Ok(ImageStyle::None), |style| style.parse())
            .map(ReplCommand::ChatImage),
        "edit" => match argument {
            Some(instruction) => Ok(ReplCommand::Edit(instruction.to_string())),
            None => Err("Usage: edit <instruction>".into()),
        },
        "chat-edit" => argument
            .ok_or_else(|| "Usage: chat-edit <summarize|improve|tone>".to_string())?
            .parse()
            .map(ReplCommand::ChatEdit),
        "save" => Ok(ReplCommand::Save(argument.map(PathBuf::from))),
        "clear" => Ok(ReplCommand::Clear),
        "models" => Ok(ReplCommand::Models),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
        other => Err(format!("Unknown command '{}'. Type 'help'.", other)),
    }
}
