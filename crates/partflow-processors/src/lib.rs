//! Partflow Processors: batch processors built on `partflow-core`
//!
//! # Processing Flow
//!
//! ```text
//! Part bytes → codec::decode → Query::first → codec::encode → Part bytes
//!                  ↓                 ↓
//!            DecodeError        EvalError     (part flagged, payload kept)
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod jq;
pub mod query;

pub use config::{PipelineConfig, ProcessorConfig};
pub use error::{CompileError, ConstructionError, DecodeError, EvalError, TransformError};
pub use jq::{JqConfig, JqProcessor};
pub use query::{Query, Results};
