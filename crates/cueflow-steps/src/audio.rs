use async_trait::async_trait;
use cueflow_bus::{Command, CommandBus, uri};
use cueflow_config::StepData;
use cueflow_registry::{StepHandler, StepResult};
use serde_json::json;
use tracing::debug;

use crate::input::{required_str, str_or};

/// Imports an audio file into an existing object.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioImport;

#[async_trait]
impl StepHandler for AudioImport {
  async fn run(&self, data: &StepData, bus: &dyn CommandBus) -> StepResult {
    let (object_id, file_path) =
      match (required_str(data, "objectId"), required_str(data, "filePath")) {
        (Ok(id), Ok(path)) => (id, path),
        (Err(failure), _) | (_, Err(failure)) => return failure,
      };
    let language = str_or(data, "language", "SFX");

    debug!(object_id = %object_id, file_path = %file_path, language = %language, "audio_import");
    let command = Command::new(
      uri::AUDIO_IMPORT,
      json!({
        "importOperation": "useExisting",
        "default": { "importLanguage": language, "originalsSubFolder": "" },
        "imports": [{ "audioFile": file_path, "objectPath": format!("id:{}", object_id) }],
      }),
    );

    match bus.call(command).await {
      Ok(_) => {
        let mut out = StepData::new();
        out.insert("object".to_string(), json!(object_id));
        out.insert("file".to_string(), json!(file_path));
        StepResult::success(out)
      }
      Err(e) => e.into(),
    }
  }
}
