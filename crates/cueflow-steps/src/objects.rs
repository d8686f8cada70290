use async_trait::async_trait;
use cueflow_bus::{Command, CommandBus, CommandError, uri};
use cueflow_config::StepData;
use cueflow_registry::{StepHandler, StepResult};
use serde_json::{Value, json};
use tracing::debug;

use crate::builtin::DEFAULT_PARENT_PATH;
use crate::input::{required_str, str_or};
use crate::{INVALID_INPUT, UNSUPPORTED_REFERENCE};

/// Creates a Sound object, renaming on conflict.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateSound;

#[async_trait]
impl StepHandler for CreateSound {
  async fn run(&self, data: &StepData, bus: &dyn CommandBus) -> StepResult {
    let name = match required_str(data, "name") {
      Ok(name) => name,
      Err(failure) => return failure,
    };
    let parent = str_or(data, "parentPath", DEFAULT_PARENT_PATH);

    debug!(name = %name, parent = %parent, "create_sound");
    let reply = match bus
      .call(Command::new(
        uri::OBJECT_CREATE,
        json!({
          "parent": parent,
          "type": "Sound",
          "name": name,
          "onNameConflict": "rename",
        }),
      ))
      .await
    {
      Ok(reply) => reply,
      Err(e) => return e.into(),
    };

    let Some(id) = reply.get("id").and_then(|v| v.as_str()) else {
      return CommandError::InvalidResponse {
        uri: uri::OBJECT_CREATE.to_string(),
        message: "reply has no object id".to_string(),
      }
      .into();
    };
    // The tool may have renamed the object.
    let created_name = reply.get("name").and_then(|v| v.as_str()).unwrap_or(name);

    let mut out = StepData::new();
    out.insert("objectId".to_string(), json!(id));
    out.insert("id".to_string(), json!(id));
    out.insert("name".to_string(), json!(created_name));
    out.insert(
      "path".to_string(),
      json!(format!("{}\\{}", parent.trim_end_matches('\\'), created_name)),
    );
    StepResult::success(out)
  }
}

/// Points an object's `OutputBus` reference at a bus path.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetReference;

#[async_trait]
impl StepHandler for SetReference {
  async fn run(&self, data: &StepData, bus: &dyn CommandBus) -> StepResult {
    let (object_id, value_path) =
      match (required_str(data, "objectId"), required_str(data, "valuePath")) {
        (Ok(id), Ok(path)) => (id, path),
        (Err(failure), _) | (_, Err(failure)) => return failure,
      };
    let reference = str_or(data, "reference", "OutputBus");
    if reference != "OutputBus" {
      return StepResult::failure(
        UNSUPPORTED_REFERENCE,
        format!("reference '{}' is not supported, only OutputBus", reference),
      );
    }

    debug!(object_id = %object_id, reference = %reference, "set_reference");
    match bus
      .call(Command::new(
        uri::OBJECT_SET_REFERENCE,
        json!({ "object": object_id, "reference": reference, "value": value_path }),
      ))
      .await
    {
      Ok(_) => {
        let mut out = StepData::new();
        out.insert("object".to_string(), json!(object_id));
        out.insert("bus".to_string(), json!(value_path));
        StepResult::success(out)
      }
      Err(e) => e.into(),
    }
  }
}

/// Sets a single property on an object.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetProperty;

#[async_trait]
impl StepHandler for SetProperty {
  async fn run(&self, data: &StepData, bus: &dyn CommandBus) -> StepResult {
    let (object_id, property) =
      match (required_str(data, "objectId"), required_str(data, "property")) {
        (Ok(id), Ok(property)) => (id, property),
        (Err(failure), _) | (_, Err(failure)) => return failure,
      };
    let value = match data.get("value") {
      Some(Value::Null) | None => {
        return StepResult::failure(INVALID_INPUT, "'value' is required");
      }
      Some(value) => value.clone(),
    };

    debug!(object_id = %object_id, property = %property, "set_property");
    match bus
      .call(Command::new(
        uri::OBJECT_SET_PROPERTY,
        json!({ "object": object_id, "property": property, "value": value }),
      ))
      .await
    {
      Ok(_) => {
        let mut out = StepData::new();
        out.insert("object".to_string(), json!(object_id));
        out.insert("property".to_string(), json!(property));
        out.insert("value".to_string(), value);
        StepResult::success(out)
      }
      Err(e) => e.into(),
    }
  }
}
