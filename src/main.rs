//! textenhance - a terminal text enhancer.
//!
//! Type some text, pick an action (fix grammar, adjust tone, expand) and the
//! text is sent to an enhancement endpoint. Failures degrade to a local
//! placeholder instead of an error screen.

mod action;
mod client;
mod config;
mod controller;
mod protocol;
mod tui;

use action::Action;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::HttpEnhancer;
use controller::{Controller, Invocation, SkipReason};
use std::io::Read;
use std::process::Command as ProcessCommand;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "textenhance")]
#[command(author, version, about = "A terminal text enhancer")]
#[command(long_about = "Improve text with an LLM-backed enhancement endpoint.\n\nRun without arguments for the interactive UI, or use --pipe for scripting.")]
struct Cli {
    /// Initial text (TUI) or the text to enhance (--pipe)
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    /// No TUI, enhance once and print the result (for scripting)
    #[arg(long, requires = "action")]
    pipe: bool,

    /// Action to run in --pipe mode
    #[arg(short = 'a', long, value_enum, requires = "pipe")]
    action: Option<Action>,

    /// Override the endpoint base URL from config
    #[arg(short = 'e', long, value_name = "URL")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available actions and their prompts
    Actions,
    /// Open configuration file in $EDITOR
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Actions) => handle_actions(),
        Some(Commands::Config) => handle_config(),
        None => {
            let config = config::Config::load()?.with_base_url(cli.endpoint);
            match (cli.pipe, cli.action) {
                (true, Some(action)) => handle_pipe(config, action, cli.text).await,
                _ => handle_tui(config, cli.text).await,
            }
        }
    }
}

fn default_filter() -> EnvFilter {
    EnvFilter::from_default_env()
        .add_directive("textenhance=info".parse().expect("static directive"))
        .add_directive("reqwest=warn".parse().expect("static directive"))
}

/// Log to stderr; used when the terminal is not owned by the UI.
fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Log to a file while the TUI owns the terminal.
fn init_file_logging() -> Result<()> {
    let path = config::Config::log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Build the controller for the configured endpoint.
fn build_controller(config: &config::Config) -> Result<Controller> {
    let enhancer = HttpEnhancer::new(&config.endpoint)?;
    info!("Using enhancement endpoint {}", enhancer.url());
    Ok(Controller::new(Arc::new(enhancer)))
}

/// Interactive mode.
async fn handle_tui(config: config::Config, text: Option<String>) -> Result<()> {
    init_file_logging()?;
    let controller = build_controller(&config)?;
    tui::run_tui(controller, text, &config.ui).await
}

/// Non-interactive mode: one enhancement, result on stdout.
async fn handle_pipe(config: config::Config, action: Action, text: Option<String>) -> Result<()> {
    init_stderr_logging();

    let text = match text {
        Some(text) => text,
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            buf
        }
        None => String::new(),
    };

    let controller = build_controller(&config)?;
    controller.set_draft(text);

    match controller.invoke(action).await {
        Invocation::Completed(_) => {
            if let Some(result) = controller.result() {
                println!("{}", result);
            }
            Ok(())
        }
        Invocation::Skipped(SkipReason::EmptyDraft) => {
            eprintln!("Nothing to enhance: provide TEXT or pipe it on stdin");
            std::process::exit(1);
        }
        Invocation::Skipped(SkipReason::Busy) => {
            eprintln!("Another enhancement is already running");
            std::process::exit(1);
        }
    }
}

/// Handle the actions subcommand.
fn handle_actions() -> Result<()> {
    println!("Available Actions");
    println!("=================\n");

    for action in Action::ALL {
        let name = clap::ValueEnum::to_possible_value(&action)
            .map(|v| v.get_name().to_string())
            .unwrap_or_default();
        println!(
            "  {} (Ctrl+{})\n    --action {}\n    prompt: {}\n",
            action.label(),
            action.hotkey().to_ascii_uppercase(),
            name,
            action.prompt()
        );
    }

    println!("Usage:");
    println!("  textenhance                                   # interactive");
    println!("  textenhance --pipe -a fix-grammar \"I has a apple.\"");
    println!("  echo \"ok\" | textenhance --pipe -a expand");

    Ok(())
}

/// Handle the config command.
fn handle_config() -> Result<()> {
    let config_path = config::Config::config_path()?;

    // Create default config if it doesn't exist
    if !config_path.exists() {
        let default_config = config::Config::default();
        default_config.save()?;
        println!("Created default config at {}", config_path.display());
    }

    // Open in editor
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = ProcessCommand::new(&editor)
        .arg(&config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        eprintln!("Editor exited with non-zero status");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_pipe_mode() {
        let cli = Cli::try_parse_from([
            "textenhance",
            "--pipe",
            "--action",
            "fix-grammar",
            "I has a apple.",
        ])
        .unwrap();
        assert!(cli.pipe);
        assert_eq!(cli.action, Some(Action::FixGrammar));
        assert_eq!(cli.text.as_deref(), Some("I has a apple."));
    }

    #[test]
    fn test_cli_pipe_requires_action() {
        assert!(Cli::try_parse_from(["textenhance", "--pipe", "hello"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_action() {
        assert!(Cli::try_parse_from(["textenhance", "--pipe", "-a", "summarize"]).is_err());
    }

    #[test]
    fn test_cli_action_requires_pipe() {
        assert!(Cli::try_parse_from(["textenhance", "-a", "expand", "ok"]).is_err());
    }

    #[test]
    fn test_cli_subcommands() {
        let cli = Cli::try_parse_from(["textenhance", "actions"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Actions)));
        let cli = Cli::try_parse_from(["textenhance", "-e", "http://x:1", "draft"]).unwrap();
        assert_eq!(cli.endpoint.as_deref(), Some("http://x:1"));
        assert!(cli.command.is_none());
    }
}
