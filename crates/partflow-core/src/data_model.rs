//! Data Model: Part, Batch, Response, ProcessorReport
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A single message part: payload bytes, string metadata and an optional
/// error annotation left by a processor.
///
/// The payload sits behind an `Arc`, so cloning a part never copies bytes.
/// Replacing the payload swaps in a fresh allocation and leaves every other
/// clone untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    payload: Arc<[u8]>,
    metadata: BTreeMap<String, String>,
    error: Option<String>,
}

impl Part {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Arc::from(payload.into()),
            metadata: BTreeMap::new(),
            error: None,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Replace the payload, keeping metadata and error annotation.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Arc::from(payload.into());
        self
    }

    pub fn set_payload(&mut self, payload: impl Into<Vec<u8>>) {
        self.payload = Arc::from(payload.into());
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.metadata
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// True when both parts point at the same payload allocation.
    pub fn shares_payload(&self, other: &Part) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

/// An ordered, non-empty sequence of parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    parts: Vec<Part>,
}

impl Batch {
    pub fn new(parts: Vec<Part>) -> Result<Self, CoreError> {
        if parts.is_empty() {
            return Err(CoreError::EmptyBatch);
        }
        Ok(Self { parts })
    }

    pub fn from_payloads<I, P>(payloads: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<u8>>,
    {
        Self::new(payloads.into_iter().map(Part::new).collect())
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always false: `Batch::new` rejects an empty part list.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut [Part] {
        &mut self.parts
    }

    pub fn get(&self, index: usize) -> Option<&Part> {
        self.parts.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Part> {
        self.parts.iter()
    }

    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }

    /// Number of parts carrying an error annotation.
    pub fn flagged(&self) -> usize {
        self.parts.iter().filter(|p| p.error.is_some()).count()
    }
}

impl IntoIterator for Batch {
    type Item = Part;
    type IntoIter = std::vec::IntoIter<Part>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Part;
    type IntoIter = std::slice::Iter<'a, Part>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

/// Early reply that ends the run of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: String,
    pub message: String,
}

impl Response {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorReport {
    pub id: String,
    pub in_hash: String,
    pub out_hash: String,
    pub deterministic: bool,
    pub latency_ms: u64,
    /// Parts flagged with an error after this processor ran
    pub flagged: usize,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(Batch::new(vec![]), Err(CoreError::EmptyBatch)));
    }

    #[test]
    fn test_clone_shares_payload() {
        let part = Part::new(b"{}".to_vec());
        let copy = part.clone();
        assert!(part.shares_payload(&copy));

        let replaced = copy.with_payload(b"[]".to_vec());
        assert!(!part.shares_payload(&replaced));
        assert_eq!(part.payload(), b"{}");
        assert_eq!(replaced.payload(), b"[]");
    }

    #[test]
    fn test_with_payload_keeps_metadata() {
        let part = Part::new("a").with_metadata("source", "kafka");
        let part = part.with_payload("b");
        assert_eq!(part.metadata().get("source").map(String::as_str), Some("kafka"));
    }

    #[test]
    fn test_flagged_count() {
        let mut batch = Batch::from_payloads(["1", "2", "3"]).unwrap();
        batch.parts_mut()[1].set_error("bad");
        assert_eq!(batch.flagged(), 1);
        assert_eq!(batch.get(1).and_then(Part::error), Some("bad"));
    }
}
