use serde::{Deserialize, Serialize};

/// Flags controlling one run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionOptions {
  /// Return the plan without invoking any handler.
  pub dry_run: bool,
  /// Skip steps until this node is reached.
  pub resume_from: Option<String>,
  /// Ignore memoized results.
  pub force_rerun: bool,
}

impl ExecutionOptions {
  pub fn dry_run() -> Self {
    Self {
      dry_run: true,
      ..Self::default()
    }
  }

  pub fn resume_from(node_id: impl Into<String>) -> Self {
    Self {
      resume_from: Some(node_id.into()),
      ..Self::default()
    }
  }

  pub fn force_rerun(mut self, force_rerun: bool) -> Self {
    self.force_rerun = force_rerun;
    self
  }
}
