use std::sync::Arc;

use cueflow_compiler::{CompileError, Compiler};
use cueflow_config::{Edge, Node, WorkflowDef};
use cueflow_steps::builtin_registry;
use serde_json::{Value, json};

fn compiler() -> Compiler {
  Compiler::new(Arc::new(builtin_registry().unwrap()))
}

fn node(id: &str, node_type: &str, data: Value) -> Node {
  Node::new(id, node_type, data.as_object().cloned().unwrap_or_default())
}

fn sound_pipeline(file_path: &str) -> WorkflowDef {
  WorkflowDef::new(
    vec![
      node("save", "projectSave", json!({})),
      node("bus", "setReference", json!({ "valuePath": "\\Master-Mixer Hierarchy\\SFX" })),
      node("import", "audioImport", json!({ "filePath": file_path })),
      node("create", "createSound", json!({ "name": "Footstep" })),
    ],
    vec![
      Edge::new("create", "import"),
      Edge::new("import", "bus"),
      Edge::new("create", "bus"),
      Edge::new("bus", "save"),
    ],
  )
}

#[test]
fn test_plan_is_topological_and_complete() {
  let def = sound_pipeline("C:\\audio\\footstep.wav");
  let plan = compiler().compile(&def).unwrap().plan;

  assert_eq!(plan.len(), def.nodes.len());
  assert_eq!(plan.node_ids(), vec!["create", "import", "bus", "save"]);

  for edge in &def.edges {
    let (source, target) = edge.endpoints().unwrap();
    assert!(plan.position(source.as_str().unwrap()) < plan.position(target.as_str().unwrap()));
  }

  assert_eq!(
    plan.get("bus").unwrap().data["objectId"],
    "$from:create:$output:objectId"
  );
  assert_eq!(plan.get("bus").unwrap().data["reference"], "OutputBus");
}

#[test]
fn test_recompilation_is_deterministic() {
  let def = sound_pipeline("a.wav");
  let compiler = compiler();

  let first = serde_json::to_value(compiler.report(&def)).unwrap();
  for _ in 0..10 {
    assert_eq!(serde_json::to_value(compiler.report(&def)).unwrap(), first);
  }
}

#[test]
fn test_report_wire_shape() {
  let report = compiler().compile_value(json!({
    "nodes": [
      { "id": "n1", "type": "createSound", "data": { "name": "Foo" }, "position": { "x": 0, "y": 0 } }
    ],
    "edges": []
  }));

  let report = serde_json::to_value(cueflow_compiler::CompilationReport::from(report)).unwrap();
  assert_eq!(
    report,
    json!({
      "ok": true,
      "plan": [{
        "nodeId": "n1",
        "type": "createSound",
        "data": { "name": "Foo", "parentPath": "\\Actor-Mixer Hierarchy\\Default Work Unit" },
        "spec": { "required": ["name"], "outputs": ["objectId", "name", "path"] }
      }],
      "errors": [],
      "warnings": []
    })
  );
}

#[test]
fn test_missing_input_lists_all_producers() {
  let def = WorkflowDef::new(
    vec![
      node("a", "createSound", json!({ "name": "A" })),
      node("b", "createSound", json!({ "name": "B" })),
      node("set", "setProperty", json!({ "property": "Volume", "value": 0 })),
    ],
    vec![],
  );

  let err = compiler().compile(&def).unwrap_err();
  assert_eq!(err.suggestions(), &["a".to_string(), "b".to_string()]);
}

#[test]
fn test_preflight_flags_missing_file() {
  let dir = tempfile::tempdir().unwrap();
  let missing = dir.path().join("missing.wav");

  let report = compiler().validate(&sound_pipeline(missing.to_str().unwrap()));
  assert!(!report.ok);
  assert_eq!(report.errors.len(), 1);
  assert_eq!(report.errors[0].code, "FILE_NOT_FOUND");
  assert_eq!(report.errors[0].node_id.as_deref(), Some("import"));
  assert_eq!(report.plan.len(), 4);
}

#[test]
fn test_preflight_accepts_existing_file_and_references() {
  let dir = tempfile::tempdir().unwrap();
  let wav = dir.path().join("footstep.wav");
  std::fs::write(&wav, b"RIFF").unwrap();

  let report = compiler().validate(&sound_pipeline(wav.to_str().unwrap()));
  assert!(report.ok, "{:?}", report.errors);

  // A path wired from another step is checked at execution time, not here.
  let def = WorkflowDef::new(
    vec![
      node("create", "createSound", json!({ "name": "Foo" })),
      node("import", "audioImport", json!({ "filePath": "$from:create:$output:path" })),
    ],
    vec![Edge::new("create", "import")],
  );
  assert!(compiler().validate(&def).ok);
}

#[test]
fn test_preflight_passes_compile_errors_through() {
  let def = WorkflowDef::new(vec![node("x", "audioImport", json!({}))], vec![]);

  let report = compiler().validate(&def);
  assert!(!report.ok);
  assert!(report.plan.is_empty());
  assert_eq!(report.errors[0].code, "MISSING_INPUT");
  assert!(matches!(
    compiler().compile(&def),
    Err(CompileError::MissingInput { .. })
  ));
}
