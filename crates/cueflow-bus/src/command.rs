use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CommandError;

/// Command URIs understood by the authoring tool.
pub mod uri {
  pub const OBJECT_CREATE: &str = "ak.wwise.core.object.create";
  pub const OBJECT_GET: &str = "ak.wwise.core.object.get";
  pub const OBJECT_SET_REFERENCE: &str = "ak.wwise.core.object.setReference";
  pub const OBJECT_SET_PROPERTY: &str = "ak.wwise.core.object.setProperty";
  pub const AUDIO_IMPORT: &str = "ak.wwise.core.audio.import";
  pub const PROJECT_SAVE: &str = "ak.wwise.core.project.save";
}

/// A single request against the authoring tool's command API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
  pub uri: String,
  #[serde(default)]
  pub args: Value,
  #[serde(default)]
  pub options: Value,
}

impl Command {
  pub fn new(uri: impl Into<String>, args: Value) -> Self {
    Self {
      uri: uri.into(),
      args,
      options: Value::Object(Default::default()),
    }
  }

  pub fn with_options(mut self, options: Value) -> Self {
    self.options = options;
    self
  }
}

/// Capability for executing commands against the authoring tool.
///
/// A call is one logical operation: it either returns the tool's reply or
/// fails. Implementations own their timeout policy.
#[async_trait]
pub trait CommandBus: Send + Sync {
  async fn call(&self, command: Command) -> Result<Value, CommandError>;
}
