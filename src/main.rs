//! # docchat CLI
//!
//! Search a document collection and chat about it through a remote
//! retrieval and generation service.
//!
//! ## Usage
//!
//! ```bash
//! docchat --config ./config/docchat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docchat files` | List the folders and files that can scope a search |
//! | `docchat search "<query>"` | Rank documents and print the hits |
//! | `docchat ask "<question>"` | Answer one question from the top hits |
//! | `docchat chat` | Interactive conversation |
//! | `docchat reload` | Ask the service to reindex its documents |
//! | `docchat upload <path>...` | Add documents |
//! | `docchat download <filename>` | Save a document locally |

use anyhow::Result;
use clap::{Parser, Subcommand};
use docchat::config::resolve_config;
use docchat::session::Session;
use docchat::{chat, files, search};
use docchat_core::AlgorithmId;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Search and chat with your documents.
#[derive(Parser)]
#[command(
    name = "docchat",
    about = "Search and chat with your documents",
    version,
    long_about = "docchat talks to a document search service that ranks documents with \
    semantic, BM25, TF-IDF, or hybrid scoring, and answers questions from the top hits \
    while keeping a short conversation history."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/docchat.toml` if it exists, built-in defaults otherwise.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Service base URL, overriding `[service].base_url`.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the folders and files known to the service.
    Files,

    /// Rank documents for a query.
    Search {
        /// The search query string.
        query: String,

        /// Ranking algorithm: `semantic`, `bm25`, `tfidf`, or `hybrid`.
        #[arg(long, short)]
        algorithm: Option<AlgorithmId>,

        /// Restrict to a folder or file. Repeat for several.
        #[arg(long = "filter", short = 'f')]
        filters: Vec<String>,

        /// Write decoded hit images into this directory.
        #[arg(long)]
        images_dir: Option<PathBuf>,
    },

    /// Ask a single question.
    Ask {
        question: String,

        /// Ranking algorithm used to find context.
        #[arg(long, short)]
        algorithm: Option<AlgorithmId>,

        /// Restrict to a folder or file. Repeat for several.
        #[arg(long = "filter", short = 'f')]
        filters: Vec<String>,
    },

    /// Start an interactive conversation.
    Chat {
        /// Initial ranking algorithm.
        #[arg(long, short)]
        algorithm: Option<AlgorithmId>,
    },

    /// Ask the service to reindex its document folder.
    Reload,

    /// Upload documents, one request per file.
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Download a document by its service file name.
    Download {
        filename: String,

        /// Directory to save into.
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Apply per-command algorithm and filter flags to a fresh session.
fn scope(session: &mut Session, algorithm: Option<AlgorithmId>, filters: &[String]) {
    if let Some(algorithm) = algorithm {
        session.set_algorithm(algorithm);
    }
    for token in filters {
        if !session.filters().active().contains(token) {
            session.toggle_filter(token);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = resolve_config(cli.config.as_deref(), cli.base_url.as_deref())?;
    let mut session = Session::from_config(&cfg)?;

    match cli.command {
        Commands::Files => {
            files::run_files(&mut session).await?;
        }
        Commands::Search {
            query,
            algorithm,
            filters,
            images_dir,
        } => {
            scope(&mut session, algorithm, &filters);
            search::run_search(&session, &query, images_dir.as_deref()).await?;
        }
        Commands::Ask {
            question,
            algorithm,
            filters,
        } => {
            scope(&mut session, algorithm, &filters);
            chat::run_ask(&session, &question).await?;
        }
        Commands::Chat { algorithm } => {
            scope(&mut session, algorithm, &[]);
            chat::run_chat(&mut session).await?;
        }
        Commands::Reload => {
            files::run_reload(&session).await?;
        }
        Commands::Upload { paths } => {
            files::run_upload(&session, &paths).await?;
        }
        Commands::Download { filename, output } => {
            files::run_download(&session, &filename, &output).await?;
        }
    }

    Ok(())
}
