use std::collections::HashMap;
use std::sync::Arc;

use cueflow_config::{Node, SymbolicRef, WorkflowDef, is_blank};
use cueflow_registry::StepRegistry;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::CompileError;
use crate::graph::Graph;
use crate::plan::{CompiledStep, Plan};
use crate::producers::ProducerIndex;
use crate::report::{CompilationReport, Issue};

/// Warning code for an auto-wired field with more than one connected producer.
pub const AMBIGUOUS_WIRING: &str = "AMBIGUOUS_WIRING";

/// A successful compilation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compilation {
  pub plan: Plan,
  pub warnings: Vec<Issue>,
}

/// Compiles workflow graphs against a step registry.
#[derive(Debug, Clone)]
pub struct Compiler {
  registry: Arc<StepRegistry>,
}

impl Compiler {
  pub fn new(registry: Arc<StepRegistry>) -> Self {
    Self { registry }
  }

  pub fn registry(&self) -> &StepRegistry {
    &self.registry
  }

  /// Compile a workflow into an ordered plan.
  #[instrument(skip_all, fields(nodes = def.nodes.len(), edges = def.edges.len()))]
  pub fn compile(&self, def: &WorkflowDef) -> Result<Compilation, CompileError> {
    let nodes = index_nodes(def)?;
    let edges = validate_edges(def, &nodes)?;

    let graph = Graph::new(def.nodes.iter().map(|n| n.id.as_str()), &edges);
    let order = graph
      .topological_order()
      .map_err(|remaining| CompileError::GraphCycle { remaining })?;

    let producers = ProducerIndex::build(&def.nodes, &self.registry);

    let mut steps = Vec::with_capacity(order.len());
    let mut warnings = Vec::new();
    for node_id in &order {
      let node = nodes
        .get(node_id.as_str())
        .ok_or_else(|| CompileError::Failed {
          message: format!("ordered node missing from index: {}", node_id),
        })?;
      steps.push(self.compile_node(node, &graph, &producers, &mut warnings)?);
    }

    info!(
      steps = steps.len(),
      warnings = warnings.len(),
      "workflow_compiled"
    );
    Ok(Compilation {
      plan: Plan::new(steps),
      warnings,
    })
  }

  /// Compile a workflow given as raw JSON.
  pub fn compile_value(&self, value: Value) -> Result<Compilation, CompileError> {
    let def: WorkflowDef = serde_json::from_value(value).map_err(|e| CompileError::Failed {
      message: e.to_string(),
    })?;
    self.compile(&def)
  }

  /// Compile and fold the outcome into a wire report.
  pub fn report(&self, def: &WorkflowDef) -> CompilationReport {
    let result = self.compile(def);
    if let Err(err) = &result {
      warn!(code = err.code(), error = %err, "workflow_compile_failed");
    }
    result.into()
  }

  fn compile_node(
    &self,
    node: &Node,
    graph: &Graph,
    producers: &ProducerIndex,
    warnings: &mut Vec<Issue>,
  ) -> Result<CompiledStep, CompileError> {
    let contract =
      self
        .registry
        .contract(&node.node_type)
        .ok_or_else(|| CompileError::UnknownNodeType {
          node_id: node.id.clone(),
          node_type: node.node_type.clone(),
        })?;

    let mut data = node.data.clone();

    for (field, default) in &contract.optional {
      if data.get(field).is_none_or(is_blank) {
        data.insert(field.clone(), default.clone());
      }
    }

    for field in &contract.required {
      if data.get(field).is_some_and(|v| !is_blank(v)) {
        continue;
      }

      let mut candidates: Vec<&str> = Vec::new();
      for source in graph.upstream(&node.id) {
        if producers.produces(source, field) && !candidates.contains(&source.as_str()) {
          candidates.push(source);
        }
      }

      let Some(source) = candidates.first() else {
        continue;
      };

      if candidates.len() > 1 {
        warn!(
          node_id = %node.id,
          field = %field,
          candidates = ?candidates,
          "ambiguous_wiring"
        );
        warnings.push(Issue::new(
          AMBIGUOUS_WIRING,
          format!(
            "'{}' can be wired from {}; using {}",
            field,
            candidates.join(", "),
            source
          ),
          Some(node.id.clone()),
        ));
      }

      debug!(node_id = %node.id, field = %field, source = %source, "input_auto_wired");
      data.insert(
        field.clone(),
        Value::String(SymbolicRef::new(*source, field.as_str()).to_string()),
      );
    }

    let validation = self.registry.validate_node_data(&node.node_type, &data);
    if !validation.valid {
      let suggestions = producers.suggestions(&validation.missing, &node.id);
      return Err(CompileError::MissingInput {
        node_id: node.id.clone(),
        node_type: node.node_type.clone(),
        missing: validation.missing,
        suggestions,
      });
    }

    for (field, value) in &data {
      if let Some(s) = value.as_str()
        && SymbolicRef::parse(s).is_err()
      {
        return Err(CompileError::InvalidReference {
          node_id: node.id.clone(),
          field: field.clone(),
          value: s.to_string(),
        });
      }
    }

    Ok(CompiledStep {
      node_id: node.id.clone(),
      node_type: node.node_type.clone(),
      data,
      spec: contract.snapshot(),
    })
  }
}

fn index_nodes(def: &WorkflowDef) -> Result<HashMap<&str, &Node>, CompileError> {
  let mut nodes = HashMap::with_capacity(def.nodes.len());
  for node in &def.nodes {
    if !SymbolicRef::is_valid_segment(&node.id) {
      return Err(CompileError::InvalidNodeId {
        node_id: node.id.clone(),
      });
    }
    if nodes.insert(node.id.as_str(), node).is_some() {
      return Err(CompileError::DuplicateNode {
        node_id: node.id.clone(),
      });
    }
  }
  Ok(nodes)
}

fn validate_edges(
  def: &WorkflowDef,
  nodes: &HashMap<&str, &Node>,
) -> Result<Vec<(String, String)>, CompileError> {
  let mut edges = Vec::with_capacity(def.edges.len());
  for (index, edge) in def.edges.iter().enumerate() {
    let (source, target) = edge
      .endpoints()
      .ok_or(CompileError::InvalidEdge { index })?;

    edges.push((
      known_node(source, "source", nodes)?.to_string(),
      known_node(target, "target", nodes)?.to_string(),
    ));
  }
  Ok(edges)
}

fn known_node<'a>(
  value: &'a Value,
  endpoint: &'static str,
  nodes: &HashMap<&str, &Node>,
) -> Result<&'a str, CompileError> {
  match value.as_str() {
    Some(node_id) if nodes.contains_key(node_id) => Ok(node_id),
    Some(node_id) => Err(CompileError::UnknownNode {
      node_id: node_id.to_string(),
      endpoint,
    }),
    None => Err(CompileError::UnknownNode {
      node_id: value.to_string(),
      endpoint,
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use cueflow_bus::CommandBus;
  use cueflow_config::{Edge, StepData};
  use cueflow_registry::{StepContract, StepHandler, StepResult};
  use serde_json::json;

  struct Noop;

  #[async_trait]
  impl StepHandler for Noop {
    async fn run(&self, _data: &StepData, _bus: &dyn CommandBus) -> StepResult {
      StepResult::success(StepData::new())
    }
  }

  fn compiler() -> Compiler {
    let registry = StepRegistry::builder()
      .register(
        StepContract::new("createX")
          .required(["name"])
          .optional("parent", json!("\\Default"))
          .outputs(["objectId"]),
        Arc::new(Noop),
      )
      .unwrap()
      .register(
        StepContract::new("importFile").required(["objectId", "filePath"]),
        Arc::new(Noop),
      )
      .unwrap()
      .build();
    Compiler::new(Arc::new(registry))
  }

  fn node(id: &str, node_type: &str, data: Value) -> Node {
    Node::new(id, node_type, data.as_object().cloned().unwrap_or_default())
  }

  fn create_and_import(edges: Vec<Edge>) -> WorkflowDef {
    WorkflowDef::new(
      vec![
        node("n1", "createX", json!({ "name": "Foo" })),
        node("n2", "importFile", json!({ "filePath": "a.wav" })),
      ],
      edges,
    )
  }

  #[test]
  fn test_auto_wires_from_connected_producer() {
    let compilation = compiler()
      .compile(&create_and_import(vec![Edge::new("n1", "n2")]))
      .unwrap();

    let plan = compilation.plan;
    assert_eq!(plan.node_ids(), vec!["n1", "n2"]);
    assert_eq!(
      plan.steps()[1].data["objectId"],
      "$from:n1:$output:objectId"
    );
    assert_eq!(plan.steps()[0].spec.outputs, vec!["objectId"]);
    assert!(compilation.warnings.is_empty());
  }

  #[test]
  fn test_missing_input_without_edge_suggests_producer() {
    let err = compiler().compile(&create_and_import(vec![])).unwrap_err();

    assert_eq!(
      err,
      CompileError::MissingInput {
        node_id: "n2".to_string(),
        node_type: "importFile".to_string(),
        missing: vec!["objectId".to_string()],
        suggestions: vec!["n1".to_string()],
      }
    );
  }

  #[test]
  fn test_literal_value_is_not_overwritten() {
    let def = WorkflowDef::new(
      vec![
        node("n1", "createX", json!({ "name": "Foo" })),
        node("n2", "importFile", json!({ "filePath": "a.wav", "objectId": "{LITERAL}" })),
      ],
      vec![Edge::new("n1", "n2")],
    );

    let plan = compiler().compile(&def).unwrap().plan;
    assert_eq!(plan.steps()[1].data["objectId"], "{LITERAL}");
  }

  #[test]
  fn test_optional_defaults_filled() {
    let def = WorkflowDef::new(
      vec![
        node("a", "createX", json!({ "name": "A" })),
        node("b", "createX", json!({ "name": "B", "parent": "\\Custom" })),
      ],
      vec![],
    );

    let plan = compiler().compile(&def).unwrap().plan;
    assert_eq!(plan.steps()[0].data["parent"], "\\Default");
    assert_eq!(plan.steps()[1].data["parent"], "\\Custom");
  }

  #[test]
  fn test_first_connected_producer_wins_with_warning() {
    let def = WorkflowDef::new(
      vec![
        node("a", "createX", json!({ "name": "A" })),
        node("b", "createX", json!({ "name": "B" })),
        node("imp", "importFile", json!({ "filePath": "a.wav" })),
      ],
      vec![Edge::new("b", "imp"), Edge::new("a", "imp")],
    );

    let compilation = compiler().compile(&def).unwrap();
    let imp = compilation.plan.get("imp").unwrap();
    assert_eq!(imp.data["objectId"], "$from:b:$output:objectId");
    assert_eq!(compilation.warnings.len(), 1);
    assert_eq!(compilation.warnings[0].code, AMBIGUOUS_WIRING);
    assert_eq!(compilation.warnings[0].node_id.as_deref(), Some("imp"));
  }

  #[test]
  fn test_edge_errors() {
    let compiler = compiler();

    let mut def = create_and_import(vec![Edge {
      source: Some(json!("n1")),
      target: None,
    }]);
    assert_eq!(
      compiler.compile(&def).unwrap_err(),
      CompileError::InvalidEdge { index: 0 }
    );

    def.edges = vec![Edge::new("n1", "n9")];
    let err = compiler.compile(&def).unwrap_err();
    assert_eq!(err.code(), "UNKNOWN_NODE");
    assert_eq!(err.node_id(), Some("n9"));
  }

  #[test]
  fn test_non_string_endpoint_is_unknown_node() {
    let def: WorkflowDef = serde_json::from_value(json!({
      "nodes": [
        { "id": "n1", "type": "createX", "data": { "name": "Foo" } },
        { "id": "n2", "type": "importFile", "data": { "filePath": "a.wav" } }
      ],
      "edges": [{ "source": 1, "target": "n2" }]
    }))
    .unwrap();

    assert_eq!(
      compiler().compile(&def).unwrap_err(),
      CompileError::UnknownNode {
        node_id: "1".to_string(),
        endpoint: "source",
      }
    );

    let report = compiler().compile_value(json!({
      "nodes": [{ "id": "n1", "type": "createX", "data": { "name": "Foo" } }],
      "edges": [{ "source": "n1", "target": 0 }]
    }));
    assert_eq!(report.unwrap_err().code(), "UNKNOWN_NODE");
  }

  #[test]
  fn test_node_id_with_separator_rejected() {
    let def = WorkflowDef::new(
      vec![
        node("a:1", "createX", json!({ "name": "Foo" })),
        node("b", "importFile", json!({ "filePath": "a.wav" })),
      ],
      vec![Edge::new("a:1", "b")],
    );

    assert_eq!(
      compiler().compile(&def).unwrap_err(),
      CompileError::InvalidNodeId {
        node_id: "a:1".to_string()
      }
    );
  }

  #[test]
  fn test_duplicate_node() {
    let def = WorkflowDef::new(
      vec![
        node("n1", "createX", json!({ "name": "A" })),
        node("n1", "createX", json!({ "name": "B" })),
      ],
      vec![],
    );
    assert_eq!(
      compiler().compile(&def).unwrap_err(),
      CompileError::DuplicateNode {
        node_id: "n1".to_string()
      }
    );
  }

  #[test]
  fn test_cycle() {
    let def = create_and_import(vec![Edge::new("n1", "n2"), Edge::new("n2", "n1")]);

    let report: CompilationReport = compiler().compile(&def).into();
    assert!(!report.ok);
    assert!(report.plan.is_empty());
    assert_eq!(report.errors[0].code, "GRAPH_CYCLE");
  }

  #[test]
  fn test_unknown_type() {
    let def = WorkflowDef::new(vec![node("n1", "teleport", json!({}))], vec![]);
    assert_eq!(
      compiler().compile(&def).unwrap_err(),
      CompileError::UnknownNodeType {
        node_id: "n1".to_string(),
        node_type: "teleport".to_string(),
      }
    );
  }

  #[test]
  fn test_malformed_reference() {
    let def = WorkflowDef::new(
      vec![node("n1", "importFile", json!({ "objectId": "$from:n0:objectId", "filePath": "a.wav" }))],
      vec![],
    );
    assert_eq!(compiler().compile(&def).unwrap_err().code(), "INVALID_REFERENCE");
  }

  #[test]
  fn test_compile_value_rejects_bad_shape() {
    let err = compiler()
      .compile_value(json!({ "nodes": [{ "id": "n1" }] }))
      .unwrap_err();
    assert_eq!(err.code(), "COMPILATION_FAILED");
  }
}
