use cueflow_config::StepData;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared inputs and outputs of a step type.
#[derive(Debug, Clone, PartialEq)]
pub struct StepContract {
  pub type_name: String,
  pub label: String,
  pub description: String,
  pub category: String,
  /// Fields that must be present (literally or as a symbolic reference).
  pub required: Vec<String>,
  /// Fields that may be omitted, with the value used when they are.
  pub optional: StepData,
  /// Fields exported into the execution context after a successful run.
  pub outputs: Vec<String>,
  /// Input fields naming files that must exist on the local filesystem.
  pub path_inputs: Vec<String>,
}

impl StepContract {
  pub fn new(type_name: impl Into<String>) -> Self {
    let type_name = type_name.into();
    Self {
      label: type_name.clone(),
      type_name,
      description: String::new(),
      category: "general".to_string(),
      required: Vec::new(),
      optional: StepData::new(),
      outputs: Vec::new(),
      path_inputs: Vec::new(),
    }
  }

  pub fn label(mut self, label: impl Into<String>) -> Self {
    self.label = label.into();
    self
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  pub fn category(mut self, category: impl Into<String>) -> Self {
    self.category = category.into();
    self
  }

  pub fn required<I, S>(mut self, fields: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    push_unique(&mut self.required, fields);
    self
  }

  pub fn optional(mut self, field: impl Into<String>, default: Value) -> Self {
    self.optional.insert(field.into(), default);
    self
  }

  pub fn outputs<I, S>(mut self, fields: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    push_unique(&mut self.outputs, fields);
    self
  }

  pub fn path_inputs<I, S>(mut self, fields: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    push_unique(&mut self.path_inputs, fields);
    self
  }

  /// Whether this type declares the given output.
  pub fn produces(&self, field: &str) -> bool {
    self.outputs.iter().any(|o| o == field)
  }

  /// The part of the contract compiled steps carry with them.
  pub fn snapshot(&self) -> ContractSnapshot {
    ContractSnapshot {
      required: self.required.clone(),
      outputs: self.outputs.clone(),
    }
  }
}

fn push_unique<I, S>(target: &mut Vec<String>, fields: I)
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  for field in fields {
    let field = field.into();
    if !target.contains(&field) {
      target.push(field);
    }
  }
}

/// Required inputs and declared outputs, frozen at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContractSnapshot {
  pub required: Vec<String>,
  pub outputs: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_builder_deduplicates_fields() {
    let contract = StepContract::new("audioImport")
      .required(["objectId", "filePath", "objectId"])
      .outputs(["saved"])
      .optional("language", json!("SFX"));

    assert_eq!(contract.required, vec!["objectId", "filePath"]);
    assert_eq!(contract.optional["language"], "SFX");
    assert_eq!(contract.label, "audioImport");
    assert!(contract.produces("saved"));
    assert!(!contract.produces("objectId"));
  }

  #[test]
  fn test_snapshot() {
    let contract = StepContract::new("createSound")
      .required(["name"])
      .outputs(["objectId", "name", "path"]);

    assert_eq!(
      contract.snapshot(),
      ContractSnapshot {
        required: vec!["name".to_string()],
        outputs: vec!["objectId".to_string(), "name".to_string(), "path".to_string()],
      }
    );
  }
}
