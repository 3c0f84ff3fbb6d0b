//! reminisce CLI — the caregiver-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

const DEFAULT_STATE: &str = "./reminisce-state.json";

#[derive(Parser)]
#[command(name = "reminisce", version, about = "Memory reinforcement for dementia care")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example patient profile
    Init,

    /// Validate a patient profile TOML file
    Validate {
        /// Path to the profile file
        #[arg(long)]
        profile: PathBuf,
    },

    /// Import a patient profile into the state file
    Import {
        /// Path to the profile file
        #[arg(long)]
        profile: PathBuf,

        /// State file path
        #[arg(long, default_value = DEFAULT_STATE)]
        state: PathBuf,
    },

    /// List items due for review
    Due {
        /// State file path
        #[arg(long, default_value = DEFAULT_STATE)]
        state: PathBuf,

        /// Patient name or id
        #[arg(long)]
        patient: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Generate a quiz session
    Generate {
        /// State file path
        #[arg(long, default_value = DEFAULT_STATE)]
        state: PathBuf,

        /// Patient name or id
        #[arg(long)]
        patient: String,

        /// Number of questions
        #[arg(short, long, default_value = "7")]
        n: usize,

        /// Include sensitive knowledge items
        #[arg(long)]
        include_sensitive: bool,

        /// Echo acceptable answers back (caregiver review)
        #[arg(long)]
        reveal_answers: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Submit answers for a session
    Submit {
        /// State file path
        #[arg(long, default_value = DEFAULT_STATE)]
        state: PathBuf,

        /// Session id
        #[arg(long)]
        session: String,

        /// Answers as JSON, or @path to a JSON file
        #[arg(long)]
        answers: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show a patient's progress report
    Report {
        /// State file path
        #[arg(long, default_value = DEFAULT_STATE)]
        state: PathBuf,

        /// Patient name or id
        #[arg(long)]
        patient: String,

        /// Trailing window in days
        #[arg(long, default_value = "30")]
        days: i64,

        /// Output format: markdown, json
        #[arg(long, default_value = "markdown")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reminisce=info".parse().unwrap()),
        )
        // stdout carries command output (including --format json); logs
        // must not interleave with it.
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { profile } => commands::validate::execute(profile),
        Commands::Import { profile, state } => commands::import::execute(profile, state),
        Commands::Due {
            state,
            patient,
            format,
        } => commands::due::execute(state, patient, format),
        Commands::Generate {
            state,
            patient,
            n,
            include_sensitive,
            reveal_answers,
            config,
            format,
        } => {
            commands::generate::execute(
                state,
                patient,
                n,
                include_sensitive,
                reveal_answers,
                config,
                format,
            )
            .await
        }
        Commands::Submit {
            state,
            session,
            answers,
            format,
        } => commands::submit::execute(state, session, answers, format),
        Commands::Report {
            state,
            patient,
            days,
            format,
        } => commands::report::execute(state, patient, days, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
