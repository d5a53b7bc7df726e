//! Line-oriented driver: read payloads, batch them, run, write results.
use anyhow::{Context, Result};
use partflow_core::{Batch, ExecutionContext, Part, PipelineRunner};
use std::io::{BufRead, Write};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub batches: usize,
    pub parts: usize,
    pub flagged: usize,
}

pub fn run<R: BufRead, W: Write>(
    runner: &PipelineRunner,
    reader: R,
    mut writer: W,
    batch_size: usize,
) -> Result<Summary> {
    let mut summary = Summary::default();
    let mut pending = Vec::with_capacity(batch_size);
    let mut line_no = 0usize;

    for line in reader.lines() {
        let line = line.context("reading input")?;
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        pending.push((line_no, Part::new(line)));
        if pending.len() == batch_size {
            flush(runner, &mut pending, &mut writer, &mut summary)?;
        }
    }
    if !pending.is_empty() {
        flush(runner, &mut pending, &mut writer, &mut summary)?;
    }

    writer.flush().context("flushing output")?;
    Ok(summary)
}

fn flush<W: Write>(
    runner: &PipelineRunner,
    pending: &mut Vec<(usize, Part)>,
    writer: &mut W,
    summary: &mut Summary,
) -> Result<()> {
    let (lines, parts): (Vec<usize>, Vec<Part>) = pending.drain(..).unzip();
    let batch = Batch::new(parts)?;
    let ctx = ExecutionContext::new(runner.pipeline_id());
    let outcome = runner.run(batch, &ctx);

    if let Some(response) = &outcome.response {
        tracing::warn!(status = %response.status, message = %response.message, "batch ended early");
    }

    for (line, part) in lines.iter().zip(outcome.batch.iter()) {
        if let Some(error) = part.error() {
            tracing::warn!(line, error, "part left unchanged");
            summary.flagged += 1;
        }
        if part.payload().contains(&b'\n') {
            tracing::warn!(line, "output spans several lines");
        }
        writer.write_all(part.payload()).context("writing output")?;
        writer.write_all(b"\n").context("writing output")?;
    }

    summary.batches += 1;
    summary.parts += lines.len();
    Ok(())
}
