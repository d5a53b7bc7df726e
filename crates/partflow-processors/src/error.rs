//! Processor error types
use thiserror::Error;

/// Payload bytes are not valid JSON.
#[derive(Error, Debug)]
#[error("DECODE/{0}")]
pub struct DecodeError(#[from] pub serde_json::Error);

/// Query text failed to compile.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("COMPILE/{message} at position {position}")]
pub struct CompileError {
    pub message: String,
    /// Byte offset into the query text.
    pub position: usize,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("EVAL/{0}")]
    Engine(String),

    #[error("EVAL/query produced no result")]
    NoResult,
}

/// Why a single part was left untouched.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("EVAL/engine panicked: {0}")]
    Panicked(String),
}

/// Fatal: the processor or pipeline could not be built.
#[derive(Error, Debug)]
pub enum ConstructionError {
    #[error("CONSTRUCT/{0}")]
    Compile(#[from] CompileError),

    #[error("CONSTRUCT/CONFIG/{0}")]
    Config(String),

    #[error("CONSTRUCT/IO/{0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for ConstructionError {
    fn from(err: serde_yaml::Error) -> Self {
        ConstructionError::Config(err.to_string())
    }
}
