use async_trait::async_trait;
use cueflow_bus::{Command, CommandBus, uri};
use cueflow_config::StepData;
use cueflow_registry::{StepHandler, StepResult};
use serde_json::{Value, json};
use tracing::debug;

use crate::INVALID_INPUT;
use crate::input::{reply_data, required_str};

/// Saves the open project.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectSave;

#[async_trait]
impl StepHandler for ProjectSave {
  async fn run(&self, _data: &StepData, bus: &dyn CommandBus) -> StepResult {
    debug!("project_save");
    match bus.call(Command::new(uri::PROJECT_SAVE, json!({}))).await {
      Ok(_) => {
        let mut out = StepData::new();
        out.insert("saved".to_string(), json!(true));
        StepResult::success(out)
      }
      Err(e) => e.into(),
    }
  }
}

/// Runs a WAQL query and exports the matching rows as `results`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWaql;

#[async_trait]
impl StepHandler for QueryWaql {
  async fn run(&self, data: &StepData, bus: &dyn CommandBus) -> StepResult {
    let waql = match required_str(data, "waql") {
      Ok(waql) => waql,
      Err(failure) => return failure,
    };
    let returns = match data.get("returns") {
      None | Some(Value::Null) => json!(["id", "name", "type"]),
      Some(Value::Array(fields)) if fields.iter().all(Value::is_string) => {
        Value::Array(fields.clone())
      }
      Some(other) => {
        return StepResult::failure(
          INVALID_INPUT,
          format!("'returns' must be a list of field names, got {}", other),
        );
      }
    };

    debug!(waql = %waql, "query_waql");
    let command =
      Command::new(uri::OBJECT_GET, json!({ "waql": waql })).with_options(json!({ "return": returns }));

    match bus.call(command).await {
      Ok(reply) => {
        let mut reply = reply_data(reply);
        let rows = reply.remove("return").unwrap_or_else(|| json!([]));
        let mut out = StepData::new();
        out.insert("results".to_string(), rows);
        StepResult::success(out)
      }
      Err(e) => e.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::objects::CreateSound;
  use cueflow_bus::MemoryBus;

  fn data(value: Value) -> StepData {
    value.as_object().cloned().unwrap()
  }

  #[tokio::test]
  async fn test_project_save() {
    let bus = MemoryBus::new();

    let result = ProjectSave.run(&StepData::new(), &bus).await;
    assert_eq!(result.data.unwrap()["saved"], true);
    assert_eq!(bus.save_count(), 1);
  }

  #[tokio::test]
  async fn test_query_returns_rows() {
    let bus = MemoryBus::new();
    CreateSound.run(&data(json!({ "name": "Foo" })), &bus).await;
    CreateSound.run(&data(json!({ "name": "Bar" })), &bus).await;

    let result = QueryWaql
      .run(
        &data(json!({ "waql": r#"$ from type Sound where name = "Foo""#, "returns": ["name"] })),
        &bus,
      )
      .await;

    assert_eq!(result.data.unwrap()["results"], json!([{ "name": "Foo" }]));
  }

  #[tokio::test]
  async fn test_query_default_fields_and_bad_returns() {
    let bus = MemoryBus::new();
    QueryWaql.run(&data(json!({ "waql": "$ from type Sound" })), &bus).await;
    assert_eq!(bus.calls()[0].options["return"], json!(["id", "name", "type"]));

    let result = QueryWaql
      .run(&data(json!({ "waql": "$", "returns": "name" })), &bus)
      .await;
    assert_eq!(result.code.as_deref(), Some(INVALID_INPUT));
  }
}
