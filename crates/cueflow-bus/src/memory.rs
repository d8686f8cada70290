//! In-memory simulated project.
//!
//! [`MemoryBus`] answers the same command URIs as the authoring tool against
//! a project held in memory. Every call is recorded, and individual URIs can
//! be made to fail, which makes it the double of choice for engine tests and
//! the backend for `--offline` runs.
//!
//! Object queries understand a small WAQL subset:
//!
//! ```text
//! $ [from type <Type>[, <Type>...]] [where name = "<exact>" | where name : "<substring>"]
//! ```
//!
//! Any other query is rejected.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};

use crate::command::{Command, CommandBus, uri};
use crate::error::CommandError;

/// An object in the simulated project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryObject {
  pub id: String,
  pub name: String,
  #[serde(rename = "type")]
  pub object_type: String,
  pub path: String,
  pub parent: String,
  pub sources: Vec<String>,
  pub references: BTreeMap<String, Value>,
  pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Default)]
struct Project {
  objects: BTreeMap<String, MemoryObject>,
  saves: usize,
}

/// Command bus backed by an in-memory project.
#[derive(Debug, Default)]
pub struct MemoryBus {
  project: Mutex<Project>,
  calls: Mutex<Vec<Command>>,
  failures: Mutex<HashMap<String, String>>,
}

impl MemoryBus {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make every call to `uri` fail with the given message.
  pub fn fail_on(&self, uri: impl Into<String>, message: impl Into<String>) {
    let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
    failures.insert(uri.into(), message.into());
  }

  /// All commands received so far, in order.
  pub fn calls(&self) -> Vec<Command> {
    self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
  }

  /// Number of commands received for a URI.
  pub fn call_count(&self, uri: &str) -> usize {
    self
      .calls
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .iter()
      .filter(|c| c.uri == uri)
      .count()
  }

  /// Look up an object by ID.
  pub fn object(&self, id: &str) -> Option<MemoryObject> {
    let project = self.project.lock().unwrap_or_else(|e| e.into_inner());
    project.objects.get(id).cloned()
  }

  /// Look up an object by name.
  pub fn find_by_name(&self, name: &str) -> Option<MemoryObject> {
    let project = self.project.lock().unwrap_or_else(|e| e.into_inner());
    project.objects.values().find(|o| o.name == name).cloned()
  }

  /// Number of times the project was saved.
  pub fn save_count(&self) -> usize {
    self.project.lock().unwrap_or_else(|e| e.into_inner()).saves
  }

  fn dispatch(&self, command: &Command) -> Result<Value, CommandError> {
    let mut project = self.project.lock().unwrap_or_else(|e| e.into_inner());
    let args = &command.args;

    match command.uri.as_str() {
      uri::OBJECT_CREATE => {
        let name = required_str(command, "name")?;
        let parent = required_str(command, "parent")?;
        let object_type = args
          .get("type")
          .and_then(|t| t.as_str())
          .unwrap_or("Sound")
          .to_string();
        let conflict = args
          .get("onNameConflict")
          .and_then(|c| c.as_str())
          .unwrap_or("fail");

        let name = unique_name(&project, &parent, &name, conflict).ok_or_else(|| {
          CommandError::Rejected {
            uri: command.uri.clone(),
            message: format!("an object named '{}' already exists under '{}'", name, parent),
          }
        })?;

        let id = format!("{{{}}}", uuid::Uuid::new_v4().to_string().to_uppercase());
        let object = MemoryObject {
          id: id.clone(),
          path: format!("{}\\{}", parent, name),
          name: name.clone(),
          object_type,
          parent,
          sources: Vec::new(),
          references: BTreeMap::new(),
          properties: BTreeMap::new(),
        };
        project.objects.insert(id.clone(), object);

        Ok(json!({ "id": id, "name": name }))
      }

      uri::AUDIO_IMPORT => {
        let imports = args
          .get("imports")
          .and_then(|i| i.as_array())
          .ok_or_else(|| rejected(command, "missing 'imports'"))?;

        let mut imported = Vec::new();
        for entry in imports {
          let file = entry
            .get("audioFile")
            .and_then(|f| f.as_str())
            .ok_or_else(|| rejected(command, "import entry without 'audioFile'"))?;
          let target = entry
            .get("objectPath")
            .and_then(|p| p.as_str())
            .ok_or_else(|| rejected(command, "import entry without 'objectPath'"))?;
          let id = target.strip_prefix("id:").unwrap_or(target);

          let object = project
            .objects
            .get_mut(id)
            .ok_or_else(|| rejected(command, &format!("object not found: {}", id)))?;
          object.sources.push(file.to_string());
          imported.push(json!({ "id": object.id, "name": object.name }));
        }

        Ok(json!({ "objects": imported }))
      }

      uri::OBJECT_SET_REFERENCE => {
        let id = required_str(command, "object")?;
        let reference = required_str(command, "reference")?;
        let value = args.get("value").cloned().unwrap_or(Value::Null);

        let object = project
          .objects
          .get_mut(&id)
          .ok_or_else(|| rejected(command, &format!("object not found: {}", id)))?;
        object.references.insert(reference, value);

        Ok(json!({}))
      }

      uri::OBJECT_SET_PROPERTY => {
        let id = required_str(command, "object")?;
        let property = required_str(command, "property")?;
        let value = args.get("value").cloned().unwrap_or(Value::Null);

        let object = project
          .objects
          .get_mut(&id)
          .ok_or_else(|| rejected(command, &format!("object not found: {}", id)))?;
        object.properties.insert(property, value);

        Ok(json!({}))
      }

      uri::OBJECT_GET => {
        let fields: Vec<String> = command
          .options
          .get("return")
          .and_then(|r| r.as_array())
          .map(|r| {
            r.iter()
              .filter_map(|f| f.as_str().map(|s| s.to_string()))
              .collect()
          })
          .unwrap_or_else(|| vec!["id".to_string(), "name".to_string()]);

        let query = required_str(command, "waql")?;
        let filter = ObjectFilter::parse(&query)
          .ok_or_else(|| rejected(command, &format!("unsupported WAQL query: {}", query)))?;

        let rows: Vec<Value> = project
          .objects
          .values()
          .filter(|object| filter.matches(object))
          .map(|object| project_fields(object, &fields))
          .collect();

        Ok(json!({ "return": rows }))
      }

      uri::PROJECT_SAVE => {
        project.saves += 1;
        Ok(json!({}))
      }

      other => Err(rejected(command, &format!("unknown command '{}'", other))),
    }
  }
}

#[async_trait]
impl CommandBus for MemoryBus {
  async fn call(&self, command: Command) -> Result<Value, CommandError> {
    self
      .calls
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .push(command.clone());

    let injected = self
      .failures
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .get(&command.uri)
      .cloned();
    if let Some(message) = injected {
      return Err(CommandError::Rejected {
        uri: command.uri,
        message,
      });
    }

    self.dispatch(&command)
  }
}

fn rejected(command: &Command, message: &str) -> CommandError {
  CommandError::Rejected {
    uri: command.uri.clone(),
    message: message.to_string(),
  }
}

fn required_str(command: &Command, key: &str) -> Result<String, CommandError> {
  command
    .args
    .get(key)
    .and_then(|v| v.as_str())
    .filter(|s| !s.is_empty())
    .map(|s| s.to_string())
    .ok_or_else(|| rejected(command, &format!("missing argument '{}'", key)))
}

/// Pick a name for a new object according to the conflict strategy.
fn unique_name(project: &Project, parent: &str, name: &str, conflict: &str) -> Option<String> {
  let taken = |candidate: &str| {
    project
      .objects
      .values()
      .any(|o| o.parent == parent && o.name == candidate)
  };

  if !taken(name) {
    return Some(name.to_string());
  }

  match conflict {
    "rename" => (1..)
      .map(|n| format!("{}_{:02}", name, n))
      .find(|candidate| !taken(candidate)),
    _ => None,
  }
}

/// Parsed form of the supported WAQL subset.
#[derive(Debug, Default, PartialEq)]
struct ObjectFilter {
  types: Vec<String>,
  name: Option<NameMatch>,
}

#[derive(Debug, PartialEq)]
enum NameMatch {
  Exact(String),
  Contains(String),
}

impl ObjectFilter {
  fn parse(query: &str) -> Option<Self> {
    let rest = query.trim().strip_prefix('$')?.trim();
    let (source, clause) = match rest.split_once("where") {
      Some((source, clause)) => (source.trim(), Some(clause.trim())),
      None => (rest, None),
    };

    let mut filter = ObjectFilter::default();

    if !source.is_empty() {
      let types = source.strip_prefix("from")?.trim().strip_prefix("type")?;
      filter.types = types
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
      if filter.types.is_empty() {
        return None;
      }
    }

    if let Some(clause) = clause {
      let clause = clause.strip_prefix("name")?.trim();
      filter.name = Some(if let Some(value) = clause.strip_prefix('=') {
        NameMatch::Exact(quoted(value)?)
      } else if let Some(value) = clause.strip_prefix(':') {
        NameMatch::Contains(quoted(value)?)
      } else {
        return None;
      });
    }

    Some(filter)
  }

  fn matches(&self, object: &MemoryObject) -> bool {
    let type_ok = self.types.is_empty() || self.types.iter().any(|t| *t == object.object_type);
    let name_ok = match &self.name {
      None => true,
      Some(NameMatch::Exact(name)) => object.name == *name,
      Some(NameMatch::Contains(part)) => object.name.contains(part.as_str()),
    };
    type_ok && name_ok
  }
}

fn quoted(value: &str) -> Option<String> {
  value
    .trim()
    .strip_prefix('"')?
    .strip_suffix('"')
    .map(|s| s.to_string())
}

fn project_fields(object: &MemoryObject, fields: &[String]) -> Value {
  let mut row = serde_json::Map::new();
  for field in fields {
    let value = match field.as_str() {
      "id" => json!(object.id),
      "name" => json!(object.name),
      "type" => json!(object.object_type),
      "path" => json!(object.path),
      other => object.properties.get(other).cloned().unwrap_or(Value::Null),
    };
    row.insert(field.clone(), value);
  }
  Value::Object(row)
}
