//! Pipeline Runner: chains processors and records a report per step
use crate::context::ExecutionContext;
use crate::data_model::{Batch, ProcessorReport, Response};
use crate::processor::Processor;
use std::time::Instant;

/// Result of running one batch through the pipeline.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub batch: Batch,
    pub response: Option<Response>,
    pub reports: Vec<ProcessorReport>,
}

pub struct PipelineRunner {
    processors: Vec<Box<dyn Processor>>,
    pipeline_id: String,
}

impl PipelineRunner {
    pub fn new(processors: Vec<Box<dyn Processor>>) -> Self {
        let pipeline_id = processors
            .iter()
            .map(|p| p.id())
            .collect::<Vec<_>>()
            .join("→");

        Self {
            processors,
            pipeline_id,
        }
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Run `batch` through every processor in order.
    ///
    /// Stops at the first processor that returns a `Response`; the batch it
    /// returned alongside is the outcome batch.
    pub fn run(&self, batch: Batch, ctx: &ExecutionContext) -> RunOutcome {
        let mut current = batch;
        let mut reports = Vec::with_capacity(self.processors.len());

        for processor in &self.processors {
            let start = Instant::now();
            let in_hash = hash_batch(&current);

            let (next, response) = processor.process(current, ctx);

            let out_hash = hash_batch(&next);
            let latency_ms = start.elapsed().as_millis() as u64;
            let flagged = next.flagged();

            tracing::debug!(
                processor = processor.id(),
                trace_id = %ctx.trace_id,
                latency_ms,
                flagged,
                "processor finished"
            );

            reports.push(ProcessorReport {
                id: processor.id().to_string(),
                in_hash,
                out_hash,
                deterministic: processor.deterministic(),
                latency_ms,
                flagged,
                finished_at: chrono::Utc::now(),
            });

            if let Some(response) = response {
                tracing::warn!(
                    processor = processor.id(),
                    trace_id = %ctx.trace_id,
                    status = %response.status,
                    "processor returned a response, stopping pipeline"
                );
                return RunOutcome {
                    batch: next,
                    response: Some(response),
                    reports,
                };
            }

            current = next;
        }

        RunOutcome {
            batch: current,
            response: None,
            reports,
        }
    }
}

/// blake3 over length-prefixed payloads, so part boundaries change the hash.
fn hash_batch(batch: &Batch) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in batch {
        hasher.update(&(part.payload().len() as u64).to_le_bytes());
        hasher.update(part.payload());
    }
    format!("blake3:{}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_respects_part_boundaries() {
        let joined = Batch::from_payloads(["ab"]).unwrap();
        let split = Batch::from_payloads(["a", "b"]).unwrap();
        assert_ne!(hash_batch(&joined), hash_batch(&split));
        assert!(hash_batch(&joined).starts_with("blake3:"));
    }

    #[test]
    fn test_hash_ignores_metadata() {
        let plain = Batch::from_payloads(["x"]).unwrap();
        let tagged = Batch::new(vec![crate::Part::new("x").with_metadata("k", "v")]).unwrap();
        assert_eq!(hash_batch(&plain), hash_batch(&tagged));
    }
}
