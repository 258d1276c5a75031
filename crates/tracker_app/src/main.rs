mod app;
mod config;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::DateTime;
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use tracker_core::Phase;
use tracker_logging::{tracker_error, LogDestination};

const DEFAULT_LOG_FILE: &str = "tracker.log";

/// Uploads a video and follows its analysis until a report is ready.
#[derive(Parser, Debug)]
#[command(name = "upload-tracker", version, about)]
pub struct Cli {
    /// RON config file (defaults to ./upload-tracker.ron when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL for the progress, result and upload endpoints.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Also log to the terminal; repeat for debug and trace output.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Track a job that was already submitted.
    Track {
        #[arg(long)]
        job_id: String,
        /// Submission timestamp (RFC 3339); enables the result lookup.
        #[arg(long, value_parser = parse_submitted_at)]
        submitted_at: Option<String>,
    },
    /// Upload a video, then track the job it creates.
    Upload {
        #[arg(long)]
        user_id: String,
        file: PathBuf,
    },
}

/// Keeps the timestamp as typed; the backend matches on the exact text.
fn parse_submitted_at(value: &str) -> Result<String, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|_| value.to_string())
        .map_err(|err| format!("expected an RFC 3339 timestamp: {err}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (destination, level) = match cli.verbose {
        0 => (LogDestination::File(cli.log_file.clone()), LevelFilter::Info),
        1 => (LogDestination::Both(cli.log_file.clone()), LevelFilter::Debug),
        _ => (LogDestination::Both(cli.log_file.clone()), LevelFilter::Trace),
    };
    tracker_logging::initialize(destination, level);

    match app::run(cli).await {
        Ok(Phase::TimedOut | Phase::InputError | Phase::SubmissionFailed) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracker_error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
