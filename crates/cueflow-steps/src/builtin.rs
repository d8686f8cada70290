use std::sync::Arc;

use cueflow_registry::{RegistryError, StepContract, StepRegistry};
use serde_json::json;

use crate::audio::AudioImport;
use crate::objects::{CreateSound, SetProperty, SetReference};
use crate::project::{ProjectSave, QueryWaql};

/// Parent used by `createSound` when the node names none.
pub const DEFAULT_PARENT_PATH: &str = "\\Actor-Mixer Hierarchy\\Default Work Unit";

/// Registry holding every built-in step type.
pub fn builtin_registry() -> Result<StepRegistry, RegistryError> {
  let registry = StepRegistry::builder()
    .register(
      StepContract::new("createSound")
        .label("Create Sound")
        .description("Create a Sound object in the Actor-Mixer hierarchy")
        .category("wwise.objects")
        .required(["name"])
        .optional("parentPath", json!(DEFAULT_PARENT_PATH))
        .outputs(["objectId", "name", "path"]),
      Arc::new(CreateSound),
    )?
    .register(
      StepContract::new("audioImport")
        .label("Audio Import")
        .description("Import an audio file into an existing Sound")
        .category("wwise.audio")
        .required(["objectId", "filePath"])
        .optional("language", json!("SFX"))
        .path_inputs(["filePath"]),
      Arc::new(AudioImport),
    )?
    .register(
      StepContract::new("setReference")
        .label("Set Output Bus")
        .description("Set the OutputBus reference of an object")
        .category("wwise.properties")
        .required(["objectId", "valuePath"])
        .optional("reference", json!("OutputBus")),
      Arc::new(SetReference),
    )?
    .register(
      StepContract::new("projectSave")
        .label("Save Project")
        .description("Save the open project")
        .category("wwise.project")
        .outputs(["saved"]),
      Arc::new(ProjectSave),
    )?
    .register(
      StepContract::new("queryWAQL")
        .label("Query WAQL")
        .description("Run a WAQL query and return the matching objects")
        .category("wwise.query")
        .required(["waql"])
        .optional("returns", json!(["id", "name", "type"]))
        .outputs(["results"]),
      Arc::new(QueryWaql),
    )?
    .register(
      StepContract::new("setProperty")
        .label("Set Property")
        .description("Set a property such as volume or pitch on an object")
        .category("wwise.properties")
        .required(["objectId", "property", "value"]),
      Arc::new(SetProperty),
    )?
    .build();

  Ok(registry)
}

#[cfg(test)]
mod tests {
  use super::*;
  use cueflow_bus::MemoryBus;
  use cueflow_config::StepData;

  #[test]
  fn test_builtin_types() {
    let registry = builtin_registry().unwrap();

    assert_eq!(
      registry.types(),
      vec![
        "audioImport",
        "createSound",
        "projectSave",
        "queryWAQL",
        "setProperty",
        "setReference"
      ]
    );
    assert_eq!(registry.by_category("wwise.properties").len(), 2);
    assert!(registry.contract("createSound").unwrap().produces("objectId"));
    assert_eq!(
      registry.contract("audioImport").unwrap().path_inputs,
      vec!["filePath"]
    );
  }

  #[tokio::test]
  async fn test_handlers_are_wired_to_their_types() {
    let registry = builtin_registry().unwrap();
    let bus = MemoryBus::new();

    let result = registry
      .handler("projectSave")
      .unwrap()
      .run(&StepData::new(), &bus)
      .await;

    assert!(result.ok);
    assert_eq!(bus.save_count(), 1);
  }
}
