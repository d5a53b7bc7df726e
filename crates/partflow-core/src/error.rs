//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("BATCH/empty batch")]
    EmptyBatch,
}
