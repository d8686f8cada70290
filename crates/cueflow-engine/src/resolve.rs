use cueflow_config::{StepData, SymbolicRef};
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::ExecutionError;

/// Replace top-level symbolic references in `data` with context values.
///
/// Nested values are copied as they are.
pub fn resolve_references(
  node_id: &str,
  data: &StepData,
  context: &ExecutionContext,
) -> Result<StepData, ExecutionError> {
  let mut resolved = StepData::new();

  for (key, value) in data {
    let Value::String(s) = value else {
      resolved.insert(key.clone(), value.clone());
      continue;
    };

    let fail = |message: String| ExecutionError::Resolution {
      node_id: node_id.to_string(),
      reference: s.clone(),
      message,
    };

    let reference = match SymbolicRef::parse(s) {
      Ok(Some(reference)) => reference,
      Ok(None) => {
        resolved.insert(key.clone(), value.clone());
        continue;
      }
      Err(e) => return Err(fail(e.to_string())),
    };

    if !context.contains_node(&reference.node_id) {
      return Err(fail(format!(
        "source node not in context: {}",
        reference.node_id
      )));
    }

    let value = context
      .get(&reference.node_id, &reference.field)
      .ok_or_else(|| {
        fail(format!(
          "output '{}' not exported by node {}",
          reference.field, reference.node_id
        ))
      })?;
    resolved.insert(key.clone(), value.clone());
  }

  Ok(resolved)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn data(value: Value) -> StepData {
    value.as_object().cloned().unwrap()
  }

  fn context() -> ExecutionContext {
    let mut context = ExecutionContext::new();
    context.export(
      "n1",
      &data(json!({ "id": "{ABC}", "name": "Foo" })),
      &["objectId".to_string(), "name".to_string()],
    );
    context
  }

  #[test]
  fn test_resolves_top_level_references() {
    let resolved = resolve_references(
      "n2",
      &data(json!({
        "objectId": "$from:n1:$output:objectId",
        "filePath": "a.wav",
        "nested": { "x": "$from:n1:$output:name" },
        "count": 3
      })),
      &context(),
    )
    .unwrap();

    assert_eq!(resolved["objectId"], "{ABC}");
    assert_eq!(resolved["filePath"], "a.wav");
    assert_eq!(resolved["nested"]["x"], "$from:n1:$output:name");
    assert_eq!(resolved["count"], 3);
  }

  #[test]
  fn test_resolution_failures() {
    let context = context();

    for reference in [
      "$from:n0:$output:objectId",
      "$from:n1:$output:path",
      "$from:n1:objectId",
    ] {
      let err = resolve_references("n2", &data(json!({ "x": reference })), &context).unwrap_err();
      assert_eq!(err.code(), "RESOLUTION_FAILED");
      assert_eq!(err.node_id(), "n2");
    }
  }
}
