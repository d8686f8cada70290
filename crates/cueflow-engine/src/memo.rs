use std::collections::HashMap;

use cueflow_registry::StepResult;

/// Idempotency key → result of the successful step that produced it.
#[derive(Debug, Clone, Default)]
pub struct IdempotencyMemo {
  results: HashMap<String, StepResult>,
}

impl IdempotencyMemo {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, key: &str) -> Option<&StepResult> {
    self.results.get(key)
  }

  /// Remember a result. Failed results are not kept, so a failing step runs
  /// again on the next attempt.
  pub fn record(&mut self, key: impl Into<String>, result: &StepResult) {
    if result.ok {
      self.results.insert(key.into(), result.clone());
    }
  }

  pub fn len(&self) -> usize {
    self.results.len()
  }

  pub fn is_empty(&self) -> bool {
    self.results.is_empty()
  }

  pub fn clear(&mut self) {
    self.results.clear();
  }
}
