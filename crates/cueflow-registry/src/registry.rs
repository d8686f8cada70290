use std::collections::HashMap;
use std::sync::Arc;

use cueflow_config::{StepData, SymbolicRef, is_blank};
use serde::Serialize;

use crate::contract::StepContract;
use crate::error::RegistryError;
use crate::handler::StepHandler;

/// A contract paired with the handler that runs it.
#[derive(Clone)]
pub struct RegisteredStep {
  pub contract: StepContract,
  pub handler: Arc<dyn StepHandler>,
}

impl std::fmt::Debug for RegisteredStep {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RegisteredStep")
      .field("contract", &self.contract)
      .finish_non_exhaustive()
  }
}

/// Assembles a [`StepRegistry`].
#[derive(Debug, Default)]
pub struct StepRegistryBuilder {
  steps: HashMap<String, RegisteredStep>,
}

impl StepRegistryBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a step type.
  pub fn register(
    mut self,
    contract: StepContract,
    handler: Arc<dyn StepHandler>,
  ) -> Result<Self, RegistryError> {
    validate_contract(&contract)?;

    if self.steps.contains_key(&contract.type_name) {
      return Err(RegistryError::DuplicateType {
        type_name: contract.type_name,
      });
    }

    self.steps.insert(
      contract.type_name.clone(),
      RegisteredStep { contract, handler },
    );
    Ok(self)
  }

  pub fn build(self) -> StepRegistry {
    StepRegistry { steps: self.steps }
  }
}

fn validate_contract(contract: &StepContract) -> Result<(), RegistryError> {
  let invalid = |message: String| RegistryError::InvalidContract {
    type_name: contract.type_name.clone(),
    message,
  };

  if contract.type_name.trim().is_empty() {
    return Err(invalid("type name must not be empty".to_string()));
  }

  if let Some(field) = contract
    .required
    .iter()
    .find(|f| contract.optional.contains_key(*f))
  {
    return Err(invalid(format!(
      "field '{}' is declared both required and optional",
      field
    )));
  }

  if let Some(field) = contract
    .path_inputs
    .iter()
    .find(|f| !contract.required.contains(*f) && !contract.optional.contains_key(*f))
  {
    return Err(invalid(format!(
      "path input '{}' is not a declared input",
      field
    )));
  }

  if let Some(field) = contract
    .outputs
    .iter()
    .find(|f| !SymbolicRef::is_valid_segment(f))
  {
    return Err(invalid(format!(
      "output '{}' cannot be named by a reference",
      field
    )));
  }

  Ok(())
}

/// Immutable catalog of step types.
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
  steps: HashMap<String, RegisteredStep>,
}

impl StepRegistry {
  pub fn builder() -> StepRegistryBuilder {
    StepRegistryBuilder::new()
  }

  pub fn get(&self, type_name: &str) -> Option<&RegisteredStep> {
    self.steps.get(type_name)
  }

  pub fn contract(&self, type_name: &str) -> Option<&StepContract> {
    self.steps.get(type_name).map(|s| &s.contract)
  }

  pub fn handler(&self, type_name: &str) -> Option<Arc<dyn StepHandler>> {
    self.steps.get(type_name).map(|s| s.handler.clone())
  }

  pub fn contains(&self, type_name: &str) -> bool {
    self.steps.contains_key(type_name)
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  /// Registered type names, sorted.
  pub fn types(&self) -> Vec<&str> {
    let mut types: Vec<&str> = self.steps.keys().map(|k| k.as_str()).collect();
    types.sort_unstable();
    types
  }

  /// Contracts in a category, sorted by type name.
  pub fn by_category(&self, category: &str) -> Vec<&StepContract> {
    let mut contracts: Vec<&StepContract> = self
      .steps
      .values()
      .map(|s| &s.contract)
      .filter(|c| c.category == category)
      .collect();
    contracts.sort_by(|a, b| a.type_name.cmp(&b.type_name));
    contracts
  }

  /// Palette entries for every registered type, sorted by type name.
  pub fn describe(&self) -> Vec<NodeTypeInfo> {
    self
      .types()
      .into_iter()
      .filter_map(|t| self.contract(t))
      .map(NodeTypeInfo::from)
      .collect()
  }

  /// Check node data against the contract of its type.
  pub fn validate_node_data(&self, type_name: &str, data: &StepData) -> NodeValidation {
    let Some(contract) = self.contract(type_name) else {
      return NodeValidation {
        valid: false,
        missing: Vec::new(),
        errors: vec![format!("unknown node type: {}", type_name)],
      };
    };

    let missing: Vec<String> = contract
      .required
      .iter()
      .filter(|field| data.get(*field).is_none_or(is_blank))
      .cloned()
      .collect();

    let errors = missing
      .iter()
      .map(|field| format!("missing required field: {}", field))
      .collect();

    NodeValidation {
      valid: missing.is_empty(),
      missing,
      errors,
    }
  }
}

/// Outcome of [`StepRegistry::validate_node_data`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeValidation {
  pub valid: bool,
  pub missing: Vec<String>,
  pub errors: Vec<String>,
}

/// Inputs section of a palette entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInputs {
  pub required: Vec<String>,
  pub optional: StepData,
}

/// A registered type as shown in the editor's node palette.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeTypeInfo {
  #[serde(rename = "type")]
  pub type_name: String,
  pub label: String,
  pub description: String,
  pub category: String,
  pub inputs: NodeInputs,
  pub outputs: Vec<String>,
}

impl From<&StepContract> for NodeTypeInfo {
  fn from(contract: &StepContract) -> Self {
    Self {
      type_name: contract.type_name.clone(),
      label: contract.label.clone(),
      description: contract.description.clone(),
      category: contract.category.clone(),
      inputs: NodeInputs {
        required: contract.required.clone(),
        optional: contract.optional.clone(),
      },
      outputs: contract.outputs.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::result::StepResult;
  use async_trait::async_trait;
  use cueflow_bus::{CommandBus, MemoryBus};
  use serde_json::json;

  struct EchoHandler;

  #[async_trait]
  impl StepHandler for EchoHandler {
    async fn run(&self, data: &StepData, _bus: &dyn CommandBus) -> StepResult {
      StepResult::success(data.clone())
    }
  }

  fn echo() -> Arc<dyn StepHandler> {
    Arc::new(EchoHandler)
  }

  fn test_registry() -> StepRegistry {
    StepRegistry::builder()
      .register(
        StepContract::new("createX")
          .category("objects")
          .required(["name"])
          .outputs(["objectId"]),
        echo(),
      )
      .unwrap()
      .register(
        StepContract::new("importFile")
          .category("audio")
          .required(["objectId", "filePath"])
          .optional("language", json!("SFX"))
          .path_inputs(["filePath"]),
        echo(),
      )
      .unwrap()
      .build()
  }

  #[test]
  fn test_lookup() {
    let registry = test_registry();

    assert_eq!(registry.len(), 2);
    assert!(registry.contains("createX"));
    assert!(registry.handler("importFile").is_some());
    assert!(registry.contract("missing").is_none());
    assert_eq!(registry.types(), vec!["createX", "importFile"]);
  }

  #[test]
  fn test_duplicate_type_rejected() {
    let err = StepRegistry::builder()
      .register(StepContract::new("createX"), echo())
      .unwrap()
      .register(StepContract::new("createX"), echo())
      .unwrap_err();

    assert_eq!(
      err,
      RegistryError::DuplicateType {
        type_name: "createX".to_string()
      }
    );
  }

  #[test]
  fn test_inconsistent_contracts_rejected() {
    let both = StepContract::new("x")
      .required(["a"])
      .optional("a", json!(1));
    assert!(matches!(
      StepRegistry::builder().register(both, echo()),
      Err(RegistryError::InvalidContract { .. })
    ));

    let stray_path = StepContract::new("y").path_inputs(["file"]);
    assert!(matches!(
      StepRegistry::builder().register(stray_path, echo()),
      Err(RegistryError::InvalidContract { .. })
    ));

    assert!(matches!(
      StepRegistry::builder().register(StepContract::new(" "), echo()),
      Err(RegistryError::InvalidContract { .. })
    ));

    let bad_output = StepContract::new("z").outputs(["object:id"]);
    assert!(matches!(
      StepRegistry::builder().register(bad_output, echo()),
      Err(RegistryError::InvalidContract { .. })
    ));
  }

  #[test]
  fn test_validate_node_data() {
    let registry = test_registry();

    let mut data = StepData::new();
    data.insert("filePath".to_string(), json!("a.wav"));
    data.insert("objectId".to_string(), json!(""));

    let validation = registry.validate_node_data("importFile", &data);
    assert!(!validation.valid);
    assert_eq!(validation.missing, vec!["objectId"]);
    assert_eq!(validation.errors, vec!["missing required field: objectId"]);

    data.insert("objectId".to_string(), json!("$from:n1:$output:objectId"));
    assert!(registry.validate_node_data("importFile", &data).valid);
  }

  #[test]
  fn test_validate_unknown_type() {
    let validation = test_registry().validate_node_data("nope", &StepData::new());
    assert!(!validation.valid);
    assert!(validation.missing.is_empty());
    assert_eq!(validation.errors, vec!["unknown node type: nope"]);
  }

  #[test]
  fn test_describe_and_categories() {
    let registry = test_registry();

    let palette = serde_json::to_value(registry.describe()).unwrap();
    assert_eq!(
      palette[1],
      json!({
        "type": "importFile",
        "label": "importFile",
        "description": "",
        "category": "audio",
        "inputs": { "required": ["objectId", "filePath"], "optional": { "language": "SFX" } },
        "outputs": []
      })
    );

    let objects = registry.by_category("objects");
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].type_name, "createX");
  }

  #[tokio::test]
  async fn test_handler_dispatch() {
    let registry = test_registry();
    let bus = MemoryBus::new();

    let mut data = StepData::new();
    data.insert("name".to_string(), json!("Foo"));

    let handler = registry.handler("createX").unwrap();
    let result = handler.run(&data, &bus).await;
    assert!(result.ok);
    assert_eq!(result.data.unwrap()["name"], "Foo");
  }
}
