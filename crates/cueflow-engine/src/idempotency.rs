//! Idempotency keys.
//!
//! A key fingerprints `{nodeId, type, data}`: volatile top-level data keys
//! are dropped, object keys are sorted at every depth, and the canonical
//! JSON is hashed with SHA-256. Keys are the first 16 hex characters.

use cueflow_config::StepData;
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};

/// Data keys that never participate in a key.
pub const VOLATILE_KEYS: [&str; 3] = ["timestamp", "executionId", "_internal"];

const KEY_LEN: usize = 16;

/// Compute the idempotency key for a step.
pub fn idempotency_key(node_id: &str, node_type: &str, data: &StepData) -> String {
  let stable: Map<String, Value> = data
    .iter()
    .filter(|(key, _)| !VOLATILE_KEYS.contains(&key.as_str()))
    .map(|(key, value)| (key.clone(), value.clone()))
    .collect();

  let payload = canonical(json!({
    "nodeId": node_id,
    "type": node_type,
    "data": Value::Object(stable),
  }));

  let digest = Sha256::digest(payload.to_string().as_bytes());
  let mut key = format!("{:x}", digest);
  key.truncate(KEY_LEN);
  key
}

/// Rebuild objects with keys inserted in sorted order.
fn canonical(value: Value) -> Value {
  match value {
    Value::Object(map) => {
      let mut entries: Vec<(String, Value)> = map.into_iter().collect();
      entries.sort_by(|a, b| a.0.cmp(&b.0));
      Value::Object(
        entries
          .into_iter()
          .map(|(key, value)| (key, canonical(value)))
          .collect(),
      )
    }
    Value::Array(items) => Value::Array(items.into_iter().map(canonical).collect()),
    other => other,
  }
}
