//! Execution Context: state shared by every processor of one pipeline run
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub pipeline: String,
    pub trace_id: String,
    pub metadata: HashMap<String, Value>,
}

impl ExecutionContext {
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
            trace_id: uuid::Uuid::new_v4().to_string(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_ids_are_unique() {
        let a = ExecutionContext::new("p");
        let b = ExecutionContext::new("p");
        assert_ne!(a.trace_id, b.trace_id);
        assert!(uuid::Uuid::parse_str(&a.trace_id).is_ok());
    }

    #[test]
    fn test_metadata_builder() {
        let ctx = ExecutionContext::new("p").with_metadata("tenant", Value::from("acme"));
        assert_eq!(ctx.metadata["tenant"], Value::from("acme"));
    }
}
