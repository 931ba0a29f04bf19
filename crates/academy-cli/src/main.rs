//! academy CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "academy", version, about = "E-learning progress and certification tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and curriculum files
    Init,

    /// Validate a curriculum TOML file
    Validate {
        /// Curriculum file (defaults to the configured one)
        #[arg(long)]
        curriculum: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show levels, chapters, and subject progress
    Status {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Record that a subject's lesson was watched
    Watch {
        #[arg(long)]
        level: String,

        #[arg(long)]
        chapter: String,

        #[arg(long)]
        subject: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Record a graded quiz attempt for a subject
    Quiz {
        #[arg(long)]
        level: String,

        #[arg(long)]
        chapter: String,

        #[arg(long)]
        subject: String,

        /// Graded score percentage, 0..=100
        #[arg(long)]
        score: i64,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Reconcile the local cache with the server record store
    Sync {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List certificates issued to the current user
    Certificates {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("academy=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { curriculum, config } => {
            commands::validate::execute(curriculum, config)
        }
        Commands::Status { config } => commands::status::execute(config),
        Commands::Watch {
            level,
            chapter,
            subject,
            config,
        } => commands::watch::execute(level, chapter, subject, config).await,
        Commands::Quiz {
            level,
            chapter,
            subject,
            score,
            config,
        } => commands::quiz::execute(level, chapter, subject, score, config).await,
        Commands::Sync { config } => commands::sync::execute(config).await,
        Commands::Certificates { config } => commands::certificates::execute(config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
