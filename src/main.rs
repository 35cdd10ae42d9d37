//! # doc-chat CLI (`docchat`)
//!
//! Talks to a document-intelligence API: manage uploaded documents, ask
//! questions, and inspect the sources cited in each answer.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docchat docs list` | List uploaded documents |
//! | `docchat docs upload <path>` | Upload a PDF, CSV, XLS, XLSX, or DOCX file |
//! | `docchat docs delete <id>` | Delete one document (asks first) |
//! | `docchat docs clear` | Delete every document (asks first) |
//! | `docchat ask "<question>"` | Ask one question and print the cited answer |
//! | `docchat chat` | Interactive chat with `/cite N` source inspection |
//! | `docchat completions <shell>` | Print a shell completion script |
//!
//! ## Examples
//!
//! ```bash
//! docchat --api-url http://localhost:8000/api docs list
//! docchat ask "What did the budget increase to?" --source 1
//! docchat ask "What did the budget increase to?" --source 1 --full
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use doc_chat::client::HttpApi;
use doc_chat::render::Style;
use doc_chat::{chat, config, documents, logging};

/// doc-chat: ask questions about your documents and see where the answers
/// came from.
#[derive(Parser)]
#[command(
    name = "docchat",
    about = "Chat with your documents, with inline source citations",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/docchat.toml`. When the default file does not
    /// exist, built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/docchat.toml")]
    config: PathBuf,

    /// API base URL, overriding the config file and `DOCCHAT_API_URL`.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage uploaded documents.
    Docs {
        #[command(subcommand)]
        action: DocsAction,
    },

    /// Ask a single question.
    ///
    /// Prints the answer with `[n]` citation markers and the numbered
    /// source list.
    Ask {
        /// The question to ask.
        question: String,

        /// Open citation `N` and show its excerpt.
        #[arg(long, value_name = "N")]
        source: Option<usize>,

        /// With `--source`, show the full excerpt instead of the relevant part.
        #[arg(long, requires = "source")]
        full: bool,
    },

    /// Start an interactive chat session.
    Chat,

    /// Print a shell completion script to stdout.
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum DocsAction {
    /// List uploaded documents.
    List,
    /// Upload a document.
    Upload {
        /// File to upload (.pdf, .csv, .xls, .xlsx, .docx).
        path: PathBuf,
    },
    /// Delete a document by id.
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Delete all documents.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "docchat", &mut std::io::stdout());
        return Ok(());
    }

    let mut cfg = config::load_or_minimal(&cli.config)?;
    if let Some(url) = cli.api_url {
        cfg.api.base_url = url;
        cfg.validate()?;
    }
    logging::init_logging(&cfg.logging, cli.verbose)?;

    let api = HttpApi::from_config(&cfg.api)?;
    let style = Style::new(cfg.display.color.enabled());
    tracing::debug!(base_url = api.base_url(), "using API");

    match cli.command {
        Commands::Docs { action } => match action {
            DocsAction::List => documents::run_list(&api).await?,
            DocsAction::Upload { path } => documents::run_upload(&api, &cfg, &path).await?,
            DocsAction::Delete { id, yes } => documents::run_delete(&api, id, yes).await?,
            DocsAction::Clear { yes } => documents::run_clear(&api, yes).await?,
        },
        Commands::Ask {
            question,
            source,
            full,
        } => chat::run_ask(&api, &question, source, full, style).await?,
        Commands::Chat => chat::run_chat(&api, style).await?,
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
