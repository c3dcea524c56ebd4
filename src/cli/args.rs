//! Command line argument parsing for the Sentiscope CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::PersistPolicy;

/// Sentiscope - comment sentiment training and serving
#[derive(Parser, Debug, Clone)]
#[command(name = "sentiscope")]
#[command(about = "Train and serve a three-class comment sentiment classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SentiscopeArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SentiscopeArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a model from a labeled CSV corpus
    Train(TrainArgs),

    /// Serve predictions over HTTP
    Serve(ServeArgs),

    /// Score comments with a trained model
    Predict(PredictArgs),

    /// Evaluate a trained model on a labeled CSV corpus
    Evaluate(EvaluateArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// CSV file with clean_comment and category columns
    #[arg(short, long, value_name = "CSV", env = "SENTISCOPE_DATA")]
    pub data: PathBuf,

    /// Directory the artifact is written to
    #[arg(short, long, value_name = "DIR", env = "SENTISCOPE_MODELS_DIR", default_value = "models")]
    pub models_dir: PathBuf,

    /// Training config file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Persist models that fail the quality gate ("always") or not ("require-gate")
    #[arg(long, value_parser = parse_persist_policy)]
    pub persist_policy: Option<PersistPolicy>,

    /// Seed for the train/test split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Grid search worker threads
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Arguments for serving
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Directory holding the artifact
    #[arg(short, long, value_name = "DIR", env = "SENTISCOPE_MODELS_DIR", default_value = "models")]
    pub models_dir: PathBuf,

    /// Address to bind
    #[arg(long, env = "SENTISCOPE_HOST")]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long, env = "SENTISCOPE_PORT")]
    pub port: Option<u16>,

    /// Scoring worker threads
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Server config file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for offline prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Directory holding the artifact
    #[arg(short, long, value_name = "DIR", env = "SENTISCOPE_MODELS_DIR", default_value = "models")]
    pub models_dir: PathBuf,

    /// Comments to score
    #[arg(value_name = "TEXT", required = true, num_args = 1..)]
    pub texts: Vec<String>,
}

/// Arguments for evaluating an existing artifact
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// Directory holding the artifact
    #[arg(short, long, value_name = "DIR", env = "SENTISCOPE_MODELS_DIR", default_value = "models")]
    pub models_dir: PathBuf,

    /// CSV file with clean_comment and category columns
    #[arg(short, long, value_name = "CSV")]
    pub data: PathBuf,

    /// Training config file (JSON) providing the quality gate
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn parse_persist_policy(s: &str) -> Result<PersistPolicy, String> {
    s.parse().map_err(|e: crate::error::SentiscopeError| e.to_string())
}
