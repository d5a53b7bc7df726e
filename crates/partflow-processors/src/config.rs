//! Pipeline configuration loaded from YAML
//!
//! ```yaml
//! processors:
//!   - jq:
//!       query: ".foo.bar"
//!       output_raw: true
//! ```
use crate::error::ConstructionError;
use crate::jq::{JqConfig, JqProcessor};
use partflow_core::{PipelineRunner, Processor};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorConfig {
    Jq(JqConfig),
}

impl ProcessorConfig {
    pub fn build(&self) -> Result<Box<dyn Processor>, ConstructionError> {
        match self {
            ProcessorConfig::Jq(config) => Ok(Box::new(JqProcessor::new(config.clone())?)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub processors: Vec<ProcessorConfig>,
}

impl PipelineConfig {
    /// Load pipeline from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, ConstructionError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConstructionError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Compile every processor; the first failure aborts.
    pub fn build(&self) -> Result<PipelineRunner, ConstructionError> {
        if self.processors.is_empty() {
            return Err(ConstructionError::Config(
                "pipeline needs at least one processor".to_string(),
            ));
        }
        let processors = self
            .processors
            .iter()
            .map(ProcessorConfig::build)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PipelineRunner::new(processors))
    }
}
