//! Mugen - bring-your-own-key image and text generation.

mod cli;

use std::process;

use clap::Parser;
use mugen::{
    config, logger, BedrockClient, Config, ImageClient, ImageGenerationRequest, ModelInfo,
    OpenRouterClient, Outcome, TextClient, Workbench,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::cli::{parse_repl_line, Cli, Command, ReplCommand, REPL_HELP};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_config(cli.logger_config()) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    match config::load_env_file() {
        0 => log::debug!("No .env values loaded, using the process environment"),
        count => log::debug!("Loaded {} variables from .env", count),
    }

    let outcome = run(cli).await;
    report(&outcome);
    if matches!(outcome, Outcome::Failure(_)) {
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Outcome {
    let config = cli.credentials.apply(Config::from_env());
    logger::log_config_info(&config);

    if let Command::Models = cli.command {
        print_models();
        return Outcome::Success(String::new());
    }

    let bedrock = BedrockClient::resolve(&config.bedrock).await;
    let openrouter = OpenRouterClient::resolve(&config.openrouter);
    let mut bench = Workbench::new(bedrock, openrouter);

    match cli.command {
        Command::Models => Outcome::Success(String::new()),
        Command::Image {
            prompt,
            model,
            enhance,
            width,
            height,
            aspect_ratio,
            output,
        } => {
            bench.set_prompt(prompt);
            if enhance {
                let enhanced = bench.enhance_prompt().await;
                if !enhanced.is_success() {
                    return enhanced;
                }
                eprintln!("Enhanced prompt: {}", enhanced.message());
            }

            let mut request = ImageGenerationRequest::new(bench.session().prompt(), model);
            request.width = width;
            request.height = height;
            request.aspect_ratio = aspect_ratio;

            let generated = bench.generate(request).await;
            if !generated.is_success() {
                return generated;
            }
            report(&generated);
            bench.save(output.as_deref())
        }
        Command::Enhance { prompt } => {
            bench.set_prompt(prompt);
            bench.enhance_prompt().await
        }
        Command::Edit { text, instruction } => bench.edit_text(&text, &instruction).await,
        Command::ChatImage {
            prompt,
            style,
            output,
        } => {
            let generated = bench.generate_chat_image(&prompt, style).await;
            if !generated.is_success() {
                return generated;
            }
            report(&generated);
            bench.save(output.as_deref())
        }
        Command::ChatEdit {
            text,
            mode,
            instruction,
        } => {
            let mode = Command::chat_edit_mode(&mode, instruction.as_deref());
            bench.edit_text_chat(&text, &mode).await
        }
        Command::Repl => repl(&mut bench).await,
    }
}

/// Results on stdout, everything else on stderr.
fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Success(message) if message.is_empty() => {}
        Outcome::Success(message) => println!("{}", message),
        other => eprintln!("{}", other),
    }
}

fn print_models() {
    let mut models: Vec<ModelInfo> = ImageClient::supported_models();
    models.extend(TextClient::supported_models());
    models.extend(OpenRouterClient::supported_models());

    for model in models {
        println!(
            "{:<44} {:<32} {:<12} {:?}",
            model.id, model.name, model.provider, model.category
        );
    }
}

async fn repl(bench: &mut Workbench) -> Outcome {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("mugen shell. Type 'help' for commands.");
    loop {
        let _ = stdout.write_all(b"mugen> ").await;
        let _ = stdout.flush().await;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Outcome::Failure(format!("Could not read input: {}", e)),
        };

        let command = match parse_repl_line(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        let outcome = match command {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => break,
            ReplCommand::Help => Outcome::Success(REPL_HELP.to_string()),
            ReplCommand::Models => {
                print_models();
                continue;
            }
            ReplCommand::Prompt(text) => {
                bench.set_prompt(text);
                Outcome::Success("Prompt set.".into())
            }
            ReplCommand::Show => {
                let session = bench.session();
                let image = match session.artifact() {
                    Some(artifact) => format!(
                        "{} bytes, offered as {}",
                        artifact.bytes.len(),
                        artifact.download_name()
                    ),
                    None => "none".to_string(),
                };
                Outcome::Success(format!("Prompt: {}\nImage: {}", session.prompt(), image))
            }
            ReplCommand::Enhance => bench.enhance_prompt().await,
            ReplCommand::Generate(model) => bench.generate_current(model).await,
            ReplCommand::ChatImage(style) => {
                let prompt = bench.session().prompt().to_string();
                bench.generate_chat_image(&prompt, style).await
            }
            ReplCommand::Edit(instruction) => {
                let text = bench.session().prompt().to_string();
                bench.edit_text(&text, &instruction).await
            }
            ReplCommand::ChatEdit(mode) => {
                let text = bench.session().prompt().to_string();
                bench.edit_text_chat(&text, &mode).await
            }
            ReplCommand::Save(path) => bench.save(path.as_deref()),
            ReplCommand::Clear => bench.clear(),
        };
        report(&outcome);
    }

    Outcome::Success(String::new())
}
