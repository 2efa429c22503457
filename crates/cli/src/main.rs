//! MissionRAG CLI entry point.
//!
//! Commands:
//! - `evaluate`: Answer and score a test question set, write a JSON report
//! - `ask`: Interactive question answering over the mission documents
//! - `score`: Score pre-generated answers, write a JSON report
//! - `backends`: List the vector stores and collections on disk

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "missionrag",
    about = "MissionRAG: NASA mission document question answering and evaluation",
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
    /// Run batch evaluation over a test question file
    Evaluate(EvaluateArgs),

    /// Ask questions interactively
    Ask(AskArgs),

    /// Score answers generated elsewhere
    Score(ScoreArgs),

    /// List available vector stores
    Backends {
        /// Directory to scan for store directories
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where the documents come from and how many to retrieve.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// OpenAI API key [default: from config or environment]
    #[arg(long)]
    pub openai_key: Option<String>,

    /// Vector store directory [default: ./chroma_db_openai]
    #[arg(long)]
    pub chroma_dir: Option<PathBuf>,

    /// Chroma server URL; takes precedence over --chroma-dir
    #[arg(long)]
    pub chroma_url: Option<String>,

    /// Collection name [default: nasa_space_missions_text]
    #[arg(long)]
    pub collection_name: Option<String>,

    /// Number of documents to retrieve [default: 3]
    #[arg(long)]
    pub n_results: Option<usize>,

    /// LLM model to use [default: gpt-3.5-turbo]
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Test questions file (JSON or TXT)
    #[arg(long, default_value = "test_questions.json")]
    pub test_file: PathBuf,

    /// Output file for results
    #[arg(long, default_value = "evaluation_results.json")]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Only retrieve documents for this mission (e.g. apollo_13)
    #[arg(long)]
    pub mission: Option<String>,

    /// Score every answer
    #[arg(long)]
    pub score: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// OpenAI API key [default: from config or environment]
    #[arg(long)]
    pub openai_key: Option<String>,

    /// JSON array of {question, answer, contexts} records
    #[arg(long, default_value = "answers.json")]
    pub input: PathBuf,

    /// Output file for results
    #[arg(long, default_value = "score_results.json")]
    pub output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Evaluate(args) => commands::evaluate::run(args).await?,
        Commands::Ask(args) => commands::ask::run(args).await?,
        Commands::Score(args) => commands::score::run(args).await?,
        Commands::Backends { root, json } => commands::backends::run(root, json).await?,
    }

    Ok(())
}
