//! Structural fingerprints for canonical schemas
//!
//! Two schemas with equal fingerprints are interchangeable for emission.
//! The canonical text sorts object keys at every level, so property order
//! never changes the result; array order always does.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::schema::Schema;

/// SHA256 over the sorted-key JSON text of a schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a schema tree
    pub fn of(schema: &Schema) -> Self {
        Self::from_json(&schema.to_value())
    }

    /// Fingerprint a JSON value (keys sorted before hashing)
    pub fn from_json(value: &Value) -> Self {
        let hash = Sha256::digest(canonical_text(value).as_bytes());
        Self(format!("{:x}", hash))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compact JSON text with lexicographically sorted keys at every object level
pub fn canonical_text(value: &Value) -> String {
    sorted(value).to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::with_capacity(map.len());
            for key in keys {
                out.insert(key.clone(), sorted(&map[key]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
