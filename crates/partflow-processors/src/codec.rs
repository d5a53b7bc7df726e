//! Value codec: payload bytes ⇄ `serde_json::Value`
//!
//! Encoding is canonical: compact, object keys sorted, and floats that hold
//! an integral value below 2^53 written as integers.
use crate::error::DecodeError;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Number, Value};

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Wrap the payload as a JSON string without parsing it.
pub fn decode_raw(bytes: &[u8]) -> Value {
    Value::String(String::from_utf8_lossy(bytes).into_owned())
}

pub fn encode(value: &Value) -> Vec<u8> {
    // Keys are always strings and the sink is memory, so this cannot fail.
    serde_json::to_vec(&Canonical(value)).unwrap_or_default()
}

/// Strings as their bare UTF-8 contents, anything else as `encode`.
pub fn encode_raw(value: &Value) -> Vec<u8> {
    match value {
        Value::String(s) => s.as_bytes().to_vec(),
        other => encode(other),
    }
}

struct Canonical<'a>(&'a Value);

impl Serialize for Canonical<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Number(n) => serialize_number(n, serializer),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&Canonical(item))?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let mut obj = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries {
                    obj.serialize_entry(key, &Canonical(item))?;
                }
                obj.end()
            }
            other => other.serialize(serializer),
        }
    }
}

fn serialize_number<S: Serializer>(n: &Number, serializer: S) -> Result<S::Ok, S::Error> {
    if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
        if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER {
            return serializer.serialize_i64(f as i64);
        }
    }
    n.serialize(serializer)
}
