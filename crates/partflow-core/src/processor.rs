//! Processor Trait: the single contract every pipeline stage implements
use crate::context::ExecutionContext;
use crate::data_model::{Batch, Response};

/// One stage of a pipeline.
///
/// `process` owns the batch for the duration of the call and must return a
/// batch with the same number of parts in the same order. Per-part failures
/// are recorded on the part (`Part::set_error`) rather than failing the call.
pub trait Processor: Send + Sync {
    /// Stable id (ex: "jq.v1")
    fn id(&self) -> &str;

    /// Whether equal input batches always give equal output batches
    fn deterministic(&self) -> bool {
        true
    }

    fn process(&self, batch: Batch, ctx: &ExecutionContext) -> (Batch, Option<Response>);
}
