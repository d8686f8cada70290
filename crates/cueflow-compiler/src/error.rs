use thiserror::Error;

/// Errors that fail a compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
  /// An edge is missing its source or target.
  #[error("edge #{index} is missing a source or target")]
  InvalidEdge { index: usize },

  /// An edge endpoint names a node that does not exist.
  #[error("edge {endpoint} node not found: {node_id}")]
  UnknownNode {
    node_id: String,
    endpoint: &'static str,
  },

  /// A node id cannot be named by a symbolic reference.
  #[error("invalid node id '{node_id}': ids must be non-empty and must not contain ':'")]
  InvalidNodeId { node_id: String },

  /// Two nodes share an id.
  #[error("duplicate node id: {node_id}")]
  DuplicateNode { node_id: String },

  /// The graph is not acyclic.
  #[error("graph contains a cycle; nodes involved: {}", .remaining.join(", "))]
  GraphCycle { remaining: Vec<String> },

  /// A node's type is not registered.
  #[error("unknown node type: {node_type}")]
  UnknownNodeType { node_id: String, node_type: String },

  /// A required input field is a string with the reference prefix but the wrong shape.
  #[error("field '{field}' holds a malformed reference: {value}")]
  InvalidReference {
    node_id: String,
    field: String,
    value: String,
  },

  /// Required inputs are absent after auto-wiring.
  #[error("{}", missing_input_message(.node_id, .node_type, .missing, .suggestions))]
  MissingInput {
    node_id: String,
    node_type: String,
    missing: Vec<String>,
    suggestions: Vec<String>,
  },

  /// A path input names a file that does not exist.
  #[error("file not found: {path}")]
  FileNotFound { node_id: String, path: String },

  /// The input could not be compiled at all.
  #[error("compilation failed: {message}")]
  Failed { message: String },
}

fn missing_input_message(
  node_id: &str,
  node_type: &str,
  missing: &[String],
  suggestions: &[String],
) -> String {
  let mut message = format!("missing inputs for {}: {}", node_type, missing.join(", "));
  if !suggestions.is_empty() {
    message.push_str(&format!(
      "; connect {} to one of: {}",
      node_id,
      suggestions.join(", ")
    ));
  }
  message
}

impl CompileError {
  /// Stable wire code.
  pub fn code(&self) -> &'static str {
    match self {
      CompileError::InvalidEdge { .. } => "INVALID_EDGE",
      CompileError::UnknownNode { .. } => "UNKNOWN_NODE",
      CompileError::InvalidNodeId { .. } => "INVALID_NODE_ID",
      CompileError::DuplicateNode { .. } => "DUPLICATE_NODE",
      CompileError::GraphCycle { .. } => "GRAPH_CYCLE",
      CompileError::UnknownNodeType { .. } => "UNKNOWN_NODE_TYPE",
      CompileError::InvalidReference { .. } => "INVALID_REFERENCE",
      CompileError::MissingInput { .. } => "MISSING_INPUT",
      CompileError::FileNotFound { .. } => "FILE_NOT_FOUND",
      CompileError::Failed { .. } => "COMPILATION_FAILED",
    }
  }

  /// The node the error is about, when there is one.
  pub fn node_id(&self) -> Option<&str> {
    match self {
      CompileError::UnknownNode { node_id, .. }
      | CompileError::InvalidNodeId { node_id }
      | CompileError::DuplicateNode { node_id }
      | CompileError::UnknownNodeType { node_id, .. }
      | CompileError::InvalidReference { node_id, .. }
      | CompileError::MissingInput { node_id, .. }
      | CompileError::FileNotFound { node_id, .. } => Some(node_id),
      CompileError::InvalidEdge { .. }
      | CompileError::GraphCycle { .. }
      | CompileError::Failed { .. } => None,
    }
  }

  /// Node ids that would satisfy the error if connected.
  pub fn suggestions(&self) -> &[String] {
    match self {
      CompileError::MissingInput { suggestions, .. } => suggestions,
      _ => &[],
    }
  }
}
