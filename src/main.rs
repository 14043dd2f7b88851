//! Toolgen CLI.
//!
//! Usage:
//!   toolgen ask "<prompt>"   Run one generation against the configured model
//!   toolgen init             Write a default config file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use toolgen::config::{self, GeneratorConfig};
use toolgen::{GenerateError, Generator, OpenAiClient, ToolRegistry};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "toolgen")]
#[command(version)]
#[command(about = "Tool-calling text generation for chat-completion models")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file.
    #[arg(long)]
    config: Option<String>,

    /// Log level (debug, info, warn, error). Overrides the config file.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask the model a question.
    Ask {
        /// The user prompt.
        prompt: String,

        /// System prompt (defaults to the configured one).
        #[arg(long)]
        system: Option<String>,

        /// Model identifier (defaults to the configured one).
        #[arg(long)]
        model: Option<String>,

        /// Sampling temperature (defaults to the configured one).
        #[arg(long)]
        temperature: Option<f32>,
    },

    /// Write a default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(config::resolve_path)
        .unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Initialize logging
    let log_level = cli.log_level.as_deref().unwrap_or(&cfg.log_level);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ask {
            prompt,
            system,
            model,
            temperature,
        } => cmd_ask(cfg, &prompt, system, model, temperature).await,
        Commands::Init { force } => cmd_init(&config_path, force),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_ask(
    cfg: GeneratorConfig,
    prompt: &str,
    system: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
) -> Result<()> {
    let Some(api_key) = cfg.resolved_api_key() else {
        bail!(
            "No API key configured. Set `api_key` in the config file or {}.",
            config::API_KEY_ENV
        );
    };

    let mut client = OpenAiClient::new(&cfg.api_url, &api_key);
    if cfg.max_tokens > 0 {
        client = client.with_max_tokens(cfg.max_tokens);
    }

    let mut options = cfg.generator_options();
    if let Some(t) = temperature {
        options.temperature = t;
    }
    let model = model.unwrap_or_else(|| cfg.model.clone());
    let system = system.unwrap_or_else(|| cfg.system_prompt.clone());

    let generator = Generator::new(client, model).with_options(options);
    let tools = ToolRegistry::new();

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling generation");
            ctrl_c_cancel.cancel();
        }
    });

    println!(
        "{} Asking '{}' ...",
        ">>>".green().bold(),
        generator.model()
    );

    match generator.generate(&tools, &system, prompt, &cancel).await {
        Ok(generation) => {
            info!(
                "Generation finished after {} round-trips ({} tokens)",
                generation.roundtrips, generation.usage.total_tokens
            );
            println!();
            println!("{}", generation.text);
            println!();
            println!(
                "  {} {}",
                "Round-trips:".bold(),
                generation.roundtrips.to_string().dimmed()
            );
            Ok(())
        }
        Err(GenerateError::Cancelled) => {
            println!("\n{} Cancelled.", "<<<".red().bold());
            Ok(())
        }
        Err(e) => Err(e).context("Generation failed"),
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    config::save_config(&GeneratorConfig::default(), config_path)?;
    println!(
        "{} Wrote default config to {}",
        ">>>".green().bold(),
        config_path.display()
    );
    Ok(())
}
