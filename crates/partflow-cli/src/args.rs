//! CLI argument definitions using clap
//!
//! - partflow --config <pipeline.yaml>
//! - partflow --query <expr> [--raw] [--output-raw]

use clap::Parser;
use std::path::PathBuf;

/// Run newline-delimited payloads through a partflow pipeline
#[derive(Parser, Debug)]
#[command(name = "partflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration (YAML)
    #[arg(long, required_unless_present = "query", conflicts_with = "query")]
    pub config: Option<PathBuf>,

    /// Single jq query, instead of a config file
    #[arg(long)]
    pub query: Option<String>,

    /// With --query: treat each line as a string, do not parse it
    #[arg(long, requires = "query")]
    pub raw: bool,

    /// With --query: write string results without quotes. Newlines inside a
    /// string are written as is, so one result may span several lines.
    #[arg(long, requires = "query")]
    pub output_raw: bool,

    /// Parts per batch
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: u64,

    /// Read payloads from this file instead of stdin
    #[arg(long)]
    pub input: Option<PathBuf>,
}
