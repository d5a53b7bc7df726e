//! partflow CLI entry point
//!
//! Builds a pipeline from `--config` or `--query`, then streams
//! newline-delimited payloads from `--input` (or stdin) to stdout.

mod args;
mod stream;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use partflow_core::PipelineRunner;
use partflow_processors::{JqConfig, PipelineConfig, ProcessorConfig};
use std::fs::File;
use std::io::{self, BufReader};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        tracing::error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match (&cli.config, &cli.query) {
        (Some(path), _) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        (None, Some(query)) => PipelineConfig {
            processors: vec![ProcessorConfig::Jq(JqConfig {
                query: query.clone(),
                raw: cli.raw,
                output_raw: cli.output_raw,
            })],
        },
        (None, None) => anyhow::bail!("either --config or --query is required"),
    };
    let runner: PipelineRunner = config.build()?;
    let batch_size = usize::try_from(cli.batch_size).context("--batch-size")?;

    tracing::info!(
        pipeline = runner.pipeline_id(),
        batch_size,
        version = partflow_core::PARTFLOW_VERSION,
        "partflow starting"
    );

    let stdout = io::stdout();
    let summary = match &cli.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            stream::run(&runner, BufReader::new(file), stdout.lock(), batch_size)?
        }
        None => stream::run(&runner, io::stdin().lock(), stdout.lock(), batch_size)?,
    };

    tracing::info!(
        batches = summary.batches,
        parts = summary.parts,
        flagged = summary.flagged,
        "partflow finished"
    );
    Ok(())
}
