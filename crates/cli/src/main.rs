//! Companion CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Initialize the data directory, config, and persona
//! - `status`   — Show resolved configuration
//! - `doctor`   — Diagnose setup problems
//! - `memory`   — Inspect and edit per-user memories
//! - `persona`  — Show the template or render a prompt

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "companion",
    about = "Companion — per-user conversational context engine",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory, config, and persona template
    Onboard,

    /// Show resolved configuration and paths
    Status,

    /// Diagnose setup problems
    Doctor,

    /// Inspect and edit memories
    Memory {
        #[command(subcommand)]
        command: MemoryCommands,
    },

    /// Inspect the persona template
    Persona {
        #[command(subcommand)]
        command: PersonaCommands,
    },
}

#[derive(Subcommand)]
enum MemoryCommands {
    /// List users that have memories
    Users,

    /// Show a user's most relevant memories
    List {
        owner: String,

        /// How many memories to show
        #[arg(short, long, default_value_t = companion_core::memory::DEFAULT_RECALL_LIMIT)]
        limit: usize,
    },

    /// Remember something about a user
    Add {
        owner: String,
        content: String,

        /// Importance between 0.0 and 1.0
        #[arg(short, long, default_value_t = companion_core::memory::DEFAULT_IMPORTANCE)]
        importance: f32,
    },

    /// Write a user's memories to a JSON file
    Export { owner: String, output: String },
}

#[derive(Subcommand)]
enum PersonaCommands {
    /// Print the active persona template
    Show,

    /// Render the prompt a message would produce
    Render { owner: String, message: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Memory { command } => match command {
            MemoryCommands::Users => commands::memory::users().await?,
            MemoryCommands::List { owner, limit } => commands::memory::list(&owner, limit).await?,
            MemoryCommands::Add {
                owner,
                content,
                importance,
            } => commands::memory::add(&owner, &content, importance).await?,
            MemoryCommands::Export { owner, output } => {
                commands::memory::export(&owner, &output).await?
            }
        },
        Commands::Persona { command } => match command {
            PersonaCommands::Show => commands::persona::show().await?,
            PersonaCommands::Render { owner, message } => {
                commands::persona::render(&owner, &message).await?
            }
        },
    }

    Ok(())
}
