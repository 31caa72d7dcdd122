//! Command-line interface of the enrichment console, built on clap.

use clap::{Parser, Subcommand, ValueEnum};

use crate::export::ExportFormat;
use crate::store::JobStatus;

/// skuforge — SKU enrichment console.
#[derive(Debug, Parser)]
#[command(name = "skuforge", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enables verbose (debug-level) output.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Runs the scripted end-to-end walkthrough of the console.
    Demo,

    /// Shows per-status job counts and the budget.
    Status,

    /// Lists jobs, newest first, optionally filtered by status.
    Jobs {
        /// Only show jobs in this status.
        #[arg(long)]
        filter: Option<StatusArg>,
    },

    /// Creates an enrichment job and watches it run for a few seconds.
    Create {
        /// Raw product description to enrich.
        input: String,

        /// How long to watch the simulated run, in seconds.
        #[arg(long, default_value_t = 5)]
        watch_secs: u64,
    },

    /// Exports the first publish-ready job in the given format.
    Export {
        /// Target marketplace feed format.
        format: FormatArg,

        /// Ask the agent to clear open validation blockers first.
        #[arg(long, default_value_t = false)]
        fix: bool,
    },
}

/// Job status as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Running,
    Completed,
    Failed,
    NeedsReview,
    Blocked,
    ReadyToPublish,
}

impl From<StatusArg> for JobStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Running => JobStatus::Running,
            StatusArg::Completed => JobStatus::Completed,
            StatusArg::Failed => JobStatus::Failed,
            StatusArg::NeedsReview => JobStatus::NeedsReview,
            StatusArg::Blocked => JobStatus::Blocked,
            StatusArg::ReadyToPublish => JobStatus::ReadyToPublish,
        }
    }
}

/// Export format as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    OzonXml,
    YandexYml,
    WildberriesCsv,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::OzonXml => ExportFormat::OzonXml,
            FormatArg::YandexYml => ExportFormat::YandexYml,
            FormatArg::WildberriesCsv => ExportFormat::WildberriesCsv,
        }
    }
}
