use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docmodel_models::ModelKind;

mod cmd;

#[derive(Parser)]
#[command(name = "docmodel", about = "Document model engine and workstream projector")]
#[command(version)]
struct Cli {
    /// TOML file overriding the projector's event filter
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or extend the projection table for DRIVE_ID
    Migrate,

    /// Drop the projection table for DRIVE_ID
    Down,

    /// Project a JSONL file of document events
    Project {
        /// One document event per line
        #[arg(long)]
        events: PathBuf,

        /// Run migrations before projecting
        #[arg(long)]
        migrate: bool,
    },

    /// Dispatch one action against a persisted document
    Apply {
        /// payment-terms, workstream or rfp
        #[arg(long)]
        model: ModelKind,

        /// Path to the .phdm document
        #[arg(long)]
        document: PathBuf,

        /// Action envelope as JSON, or @path to read it from a file
        #[arg(long)]
        action: String,
    },

    /// Create an empty document
    New {
        #[arg(long)]
        model: ModelKind,

        /// Directory to write the document into
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        slug: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => cmd::projector::migrate(cli.config.as_deref()).await,
        Commands::Down => cmd::projector::down(cli.config.as_deref()).await,
        Commands::Project { events, migrate } => {
            cmd::projector::project(cli.config.as_deref(), &events, migrate).await
        }
        Commands::Apply {
            model,
            document,
            action,
        } => cmd::document::apply(model, &document, &action),
        Commands::New {
            model,
            dir,
            name,
            slug,
        } => cmd::document::create(model, &dir, name, slug),
    }
}
