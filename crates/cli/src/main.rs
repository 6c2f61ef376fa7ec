//! Lectern CLI
//!
//! Main entry point for the lectern command-line tool.
//! Answers questions over a library of course-material page images, either
//! one-shot from the terminal or as an HTTP service.

mod commands;
mod server;

use clap::{Parser, Subcommand};
use commands::{
    AnswerCommand, ClassifyCommand, HealthCommand, SearchCommand, ServeCommand, SmartCommand,
    ThinkCommand,
};
use lectern_core::{
    config::AppConfig,
    logging::{self, LogFormat},
    AppResult,
};
use std::path::PathBuf;

/// Lectern - question answering over course material images
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(about = "Question answering over course material images", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "LECTERN_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "LECTERN_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "LECTERN_LOG_JSON")]
    log_json: bool,

    /// Generation provider (ollama, gemini)
    #[arg(short, long, global = true, env = "LECTERN_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "LECTERN_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank document pages by similarity to a question
    Search(SearchCommand),

    /// Answer a question from one page or the best matching pages
    Answer(AnswerCommand),

    /// Show how a question would be routed
    Classify(ClassifyCommand),

    /// Tree of Thoughts reasoning
    Think(ThinkCommand),

    /// Pick a strategy automatically and answer
    Smart(SmartCommand),

    /// Load the index and report readiness
    Health(HealthCommand),

    /// Start the HTTP API
    Serve(ServeCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Workspace and config file decide which YAML is read, so resolve them first
    let config = AppConfig::load_with(cli.workspace.clone(), cli.config.clone())?.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    let log_format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init_logging_as(log_format, config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Lectern starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Search(_) => "search",
        Commands::Answer(_) => "answer",
        Commands::Classify(_) => "classify",
        Commands::Think(_) => "think",
        Commands::Smart(_) => "smart",
        Commands::Health(_) => "health",
        Commands::Serve(_) => "serve",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Answer(cmd) => cmd.execute(&config).await,
        Commands::Classify(cmd) => cmd.execute(),
        Commands::Think(cmd) => cmd.execute(&config).await,
        Commands::Smart(cmd) => cmd.execute(&config).await,
        Commands::Health(cmd) => cmd.execute(&config),
        Commands::Serve(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
