//! MedRAG CLI
//!
//! Main entry point for the `medrag` command-line tool.
//! Runs the vector search server and exercises the retrieval channels.

mod commands;

use clap::{Parser, Subcommand};
use commands::{InspectCommand, LexicalCommand, RetrieveCommand, ServeCommand, VectorCommand};
use medrag_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// MedRAG - hybrid retrieval backend for medical question answering
#[derive(Parser, Debug)]
#[command(name = "medrag")]
#[command(about = "Hybrid vector and lexical retrieval for medical RAG", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "MEDRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the vector search server
    Serve(ServeCommand),

    /// Load the index artifacts and report what they contain
    Inspect(InspectCommand),

    /// Query the lexical engine
    Lexical(LexicalCommand),

    /// Send a query batch to a running vector server
    Vector(VectorCommand),

    /// Hybrid retrieval over both channels
    Retrieve(RetrieveCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // --config wins over MEDRAG_CONFIG; everything else comes from the environment
    let config_path = cli.config.clone();
    let config = AppConfig::load_with(|key| match key {
        "MEDRAG_CONFIG" => config_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
        _ => std::env::var(key).ok(),
    })?;

    let config = config.with_overrides(cli.log_level, cli.verbose, cli.no_color);
    config.validate()?;

    logging::init_logging(config.logging.level.as_deref(), config.logging.no_color)?;

    tracing::debug!("Config file: {:?}", config.config_file);

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Inspect(_) => "inspect",
        Commands::Lexical(_) => "lexical",
        Commands::Vector(_) => "vector",
        Commands::Retrieve(_) => "retrieve",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(config).await,
        Commands::Inspect(cmd) => cmd.execute(&config).await,
        Commands::Lexical(cmd) => cmd.execute(&config).await,
        Commands::Vector(cmd) => cmd.execute(&config).await,
        Commands::Retrieve(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::debug!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
