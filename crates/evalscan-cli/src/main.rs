//! evalscan CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::InputArgs;

#[derive(Parser)]
#[command(
    name = "evalscan",
    version,
    about = "Course-evaluation extraction and Likert scoring"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract structured records from an evaluation corpus
    Extract {
        #[command(flatten)]
        inputs: InputArgs,

        /// Record document to write
        #[arg(long)]
        output: Option<PathBuf>,

        /// Max concurrent scanning workers
        #[arg(long)]
        parallelism: Option<usize>,
    },

    /// Score a record document
    Score {
        /// Record document produced by `extract`
        #[arg(long)]
        records: PathBuf,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check the corpus and vocabularies for common problems
    Validate {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Create a starter evalscan.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("evalscan=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            inputs,
            output,
            parallelism,
        } => commands::extract::execute(inputs, output, parallelism).await,
        Commands::Score {
            records,
            output,
            format,
            config,
        } => commands::score::execute(records, output, format, config),
        Commands::Validate { inputs } => commands::validate::execute(inputs),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
