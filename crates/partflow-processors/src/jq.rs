//! jq processor: replaces each part's payload with the first result of a
//! compiled query over its decoded JSON value.
use crate::codec;
use crate::error::{ConstructionError, TransformError};
use crate::query::Query;
use partflow_core::{Batch, ExecutionContext, Processor, Response};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JqConfig {
    /// jq expression, compiled once at construction
    pub query: String,

    /// Feed the payload to the query as a JSON string instead of parsing it
    #[serde(default)]
    pub raw: bool,

    /// Write string results without quotes
    #[serde(default)]
    pub output_raw: bool,
}

impl JqConfig {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            raw: false,
            output_raw: false,
        }
    }
}

#[derive(Debug)]
pub struct JqProcessor {
    query: Query,
    config: JqConfig,
}

impl JqProcessor {
    pub fn new(config: JqConfig) -> Result<Self, ConstructionError> {
        let query = Query::compile(&config.query)?;
        tracing::debug!(
            query = %config.query,
            raw = config.raw,
            output_raw = config.output_raw,
            "compiled jq query"
        );
        Ok(Self { query, config })
    }

    pub fn config(&self) -> &JqConfig {
        &self.config
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// New payload for one part, or why it stays as it is.
    pub fn transform(&self, payload: &[u8]) -> Result<Vec<u8>, TransformError> {
        let value = if self.config.raw {
            codec::decode_raw(payload)
        } else {
            codec::decode(payload)?
        };

        let result = self.query.first(&value)?;

        Ok(if self.config.output_raw {
            codec::encode_raw(&result)
        } else {
            codec::encode(&result)
        })
    }

    /// `transform`, with an engine panic turned into a per-part error so the
    /// rest of the batch still gets processed. Allocation failure still aborts.
    fn transform_isolated(&self, payload: &[u8]) -> Result<Vec<u8>, TransformError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.transform(payload)))
            .unwrap_or_else(|cause| Err(TransformError::Panicked(panic_message(cause.as_ref()))))
    }
}

impl Processor for JqProcessor {
    fn id(&self) -> &str {
        "jq.v1"
    }

    fn process(&self, mut batch: Batch, ctx: &ExecutionContext) -> (Batch, Option<Response>) {
        for (index, part) in batch.parts_mut().iter_mut().enumerate() {
            match self.transform_isolated(part.payload()) {
                Ok(payload) => part.set_payload(payload),
                Err(err) => {
                    tracing::debug!(
                        index,
                        trace_id = %ctx.trace_id,
                        error = %err,
                        "jq left part unchanged"
                    );
                    part.set_error(err.to_string());
                }
            }
        }
        (batch, None)
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(s) = cause.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;

    #[test]
    fn test_config_defaults() {
        let config: JqConfig = serde_json::from_str(r#"{"query": "."}"#).unwrap();
        assert_eq!(config, JqConfig::new("."));
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let result: Result<JqConfig, _> = serde_json::from_str(r#"{"query": ".", "rawr": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_query_fails_construction() {
        let err = JqProcessor::new(JqConfig::new(".foo |")).unwrap_err();
        assert!(matches!(err, ConstructionError::Compile(_)));
    }

    #[test]
    fn test_raw_in_raw_out() {
        let processor = JqProcessor::new(JqConfig {
            query: "ascii_upcase".into(),
            raw: true,
            output_raw: true,
        })
        .unwrap();
        assert_eq!(processor.transform(b"hello").unwrap(), b"HELLO");
    }

    #[test]
    fn test_engine_panic_becomes_part_error() {
        let processor = JqProcessor::new(JqConfig::new(".s * .n")).unwrap();
        let err = processor
            .transform_isolated(br#"{"s":"ab","n":4611686018427387904}"#)
            .unwrap_err();
        assert!(matches!(err, TransformError::Panicked(_)));
        assert!(err.to_string().contains("capacity overflow"), "{}", err);
    }

    #[test]
    fn test_transform_errors_are_typed() {
        let processor = JqProcessor::new(JqConfig::new(".[]")).unwrap();
        assert!(matches!(processor.transform(b"{"), Err(TransformError::Decode(_))));
        assert!(matches!(
            processor.transform(b"[]"),
            Err(TransformError::Eval(EvalError::NoResult))
        ));
    }
}
