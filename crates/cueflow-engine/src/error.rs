use thiserror::Error;

/// Errors that stop a run before or between handler calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
  /// A symbolic reference could not be resolved against the run context.
  #[error("cannot resolve '{reference}' for node '{node_id}': {message}")]
  Resolution {
    node_id: String,
    reference: String,
    message: String,
  },

  /// A plan step names a type the registry does not know.
  #[error("unsupported node type for '{node_id}': {node_type}")]
  UnknownNodeType { node_id: String, node_type: String },

  /// `resumeFrom` names a node that is not in the plan.
  #[error("resume node not in plan: {node_id}")]
  UnknownResumeNode { node_id: String },
}

impl ExecutionError {
  /// Stable wire code.
  pub fn code(&self) -> &'static str {
    match self {
      ExecutionError::Resolution { .. } => "RESOLUTION_FAILED",
      ExecutionError::UnknownNodeType { .. } => "UNKNOWN_NODE_TYPE",
      ExecutionError::UnknownResumeNode { .. } => "UNKNOWN_RESUME_NODE",
    }
  }

  pub fn node_id(&self) -> &str {
    match self {
      ExecutionError::Resolution { node_id, .. }
      | ExecutionError::UnknownNodeType { node_id, .. }
      | ExecutionError::UnknownResumeNode { node_id } => node_id,
    }
  }
}
