//! Tripkit - Command-line entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tripkit_engine::infrastructure::clock::SystemClock;
use tripkit_engine::infrastructure::settings::log_filter_from_env;
use tripkit_engine::{EngineSettings, Runner};

/// Apply actions and events to a trip, or check a script
#[derive(Parser, Debug)]
#[command(name = "tripkit")]
#[command(about = "Run trip actions and events through the rules engine", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply one action and print the resulting ActionResult
    ApplyAction {
        /// Script JSON
        #[arg(long, value_name = "FILE")]
        script: PathBuf,
        /// Trip context JSON
        #[arg(long, value_name = "FILE")]
        context: PathBuf,
        /// Action JSON (`name`, `params`, optional `scheduleAt`)
        #[arg(long, value_name = "FILE")]
        action: PathBuf,
        /// Apply time (ISO-8601); defaults to now
        #[arg(long, value_name = "TIME", value_parser = parse_at)]
        at: Option<DateTime<Utc>>,
    },
    /// Apply one external event and print the resulting ActionResult
    ApplyEvent {
        /// Script JSON
        #[arg(long, value_name = "FILE")]
        script: PathBuf,
        /// Trip context JSON
        #[arg(long, value_name = "FILE")]
        context: PathBuf,
        /// Event JSON (`type` plus its fields)
        #[arg(long, value_name = "FILE")]
        event: PathBuf,
        /// Apply time (ISO-8601); defaults to now
        #[arg(long, value_name = "TIME", value_parser = parse_at)]
        at: Option<DateTime<Utc>>,
    },
    /// Print static warnings for every trigger in a script
    Check {
        /// Script JSON
        #[arg(long, value_name = "FILE")]
        script: PathBuf,
    },
}

fn parse_at(s: &str) -> Result<DateTime<Utc>, String> {
    tripkit_domain::common::parse_datetime(s).map_err(|e| format!("invalid time \"{s}\": {e}"))
}

fn main() -> anyhow::Result<()> {
    // Load environment from repo root so `.env` works from any crate directory.
    load_dotenv_from_repo_root();

    let args = Args::parse();

    // Initialize logging before settings so their overrides are logged
    let filter = match log_filter_from_env() {
        Some(directive) => tracing_subscriber::EnvFilter::new(directive),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "tripkit_engine=info".into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = EngineSettings::from_env();

    let runner = Runner::new(settings, Arc::new(SystemClock::new()));

    match args.command {
        Command::ApplyAction {
            script,
            context,
            action,
            at,
        } => {
            let result = runner
                .apply_action_file(&script, &context, &action, at)
                .with_context(|| format!("applying action from {}", action.display()))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::ApplyEvent {
            script,
            context,
            event,
            at,
        } => {
            let result = runner
                .apply_event_file(&script, &context, &event, at)
                .with_context(|| format!("applying event from {}", event.display()))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Check { script } => {
            let warnings = runner
                .check_file(&script)
                .with_context(|| format!("checking {}", script.display()))?;
            for warning in &warnings {
                println!("{warning}");
            }
            if !warnings.is_empty() {
                anyhow::bail!("{} warning(s) in {}", warnings.len(), script.display());
            }
        }
    }

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
