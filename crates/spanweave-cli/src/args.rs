// NOTE: Flat command layout
//
// Five verbs, each taking the export path first. They share one loading path
// and differ only in which view of the reconstructed sessions they print.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{ExportFormat, LogLevel, Method, OutputFormat};

#[derive(Parser)]
#[command(name = "spanweave")]
#[command(about = "Reconstruct agent sessions from trace span exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: $SPANWEAVE_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (default: from config, else plain)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Fail on the first malformed record instead of skipping it
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Group spans into sessions and print their trees")]
    Reconstruct {
        /// OpenInference span export (NDJSON or JSON array)
        input: PathBuf,

        #[arg(long, value_enum, default_value = "both")]
        method: Method,

        /// Idle seconds that start a new time window or segment
        #[arg(long)]
        gap_threshold: Option<u64>,

        /// Sessions shown per method in plain output
        #[arg(long)]
        trace_limit: Option<usize>,

        /// Split trace and session groups at idle gaps
        #[arg(long)]
        segment: bool,
    },

    #[command(about = "Analyze message duplication and growth across turns")]
    Compare {
        input: PathBuf,

        /// Only this session number
        #[arg(long)]
        session: Option<usize>,

        /// Print missing and new messages
        #[arg(long)]
        detailed: bool,
    },

    #[command(about = "Summarize session coverage, span kinds and names")]
    Analyze { input: PathBuf },

    #[command(about = "Find spans by content or session id")]
    Query {
        input: PathBuf,

        /// Case-insensitive text in input or output values
        #[arg(long, conflicts_with = "session_id", required_unless_present = "session_id")]
        search: Option<String>,

        /// Exact session id (or trace id for untagged spans)
        #[arg(long)]
        session_id: Option<String>,

        /// Also write matching sessions as JSON
        #[arg(long)]
        export: Option<PathBuf>,
    },

    #[command(about = "Write reconstructed sessions to a file")]
    Export {
        input: PathBuf,

        #[arg(long, short)]
        output: PathBuf,

        #[arg(long = "as", value_enum, default_value = "json")]
        export_format: ExportFormat,

        /// Split sessions at idle gaps of this many seconds
        #[arg(long)]
        gap_threshold: Option<u64>,
    },
}
