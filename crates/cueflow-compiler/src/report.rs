use serde::{Deserialize, Serialize};

use crate::compiler::Compilation;
use crate::error::CompileError;
use crate::plan::Plan;

/// A compilation error or warning as reported on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
  pub code: String,
  pub message: String,
  pub node_id: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub suggestions: Vec<String>,
}

impl Issue {
  pub fn new(code: impl Into<String>, message: impl Into<String>, node_id: Option<String>) -> Self {
    Self {
      code: code.into(),
      message: message.into(),
      node_id,
      suggestions: Vec::new(),
    }
  }
}

impl From<&CompileError> for Issue {
  fn from(err: &CompileError) -> Self {
    Self {
      code: err.code().to_string(),
      message: err.to_string(),
      node_id: err.node_id().map(str::to_string),
      suggestions: err.suggestions().to_vec(),
    }
  }
}

/// Outcome of a compilation or pre-flight validation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompilationReport {
  pub ok: bool,
  pub plan: Plan,
  pub errors: Vec<Issue>,
  pub warnings: Vec<Issue>,
}

impl CompilationReport {
  pub fn success(compilation: Compilation) -> Self {
    Self {
      ok: true,
      plan: compilation.plan,
      errors: Vec::new(),
      warnings: compilation.warnings,
    }
  }

  /// A failed compilation carries an empty plan.
  pub fn failure(err: &CompileError) -> Self {
    Self {
      ok: false,
      plan: Plan::default(),
      errors: vec![Issue::from(err)],
      warnings: Vec::new(),
    }
  }
}

impl From<Result<Compilation, CompileError>> for CompilationReport {
  fn from(result: Result<Compilation, CompileError>) -> Self {
    match result {
      Ok(compilation) => Self::success(compilation),
      Err(err) => Self::failure(&err),
    }
  }
}
