use std::path::Path;

use cueflow_config::{SymbolicRef, WorkflowDef};
use tracing::{info, instrument, warn};

use crate::compiler::Compiler;
use crate::error::CompileError;
use crate::report::{CompilationReport, Issue};

impl Compiler {
  /// Compile, then check that every literal path input names an existing file.
  ///
  /// Fields still holding symbolic references are skipped. When file checks
  /// fail the report keeps the compiled plan alongside the errors.
  #[instrument(skip_all)]
  pub fn validate(&self, def: &WorkflowDef) -> CompilationReport {
    let mut report = self.report(def);
    if !report.ok {
      return report;
    }

    let mut errors = Vec::new();
    for step in &report.plan {
      let Some(contract) = self.registry().contract(&step.node_type) else {
        continue;
      };

      for field in &contract.path_inputs {
        let Some(path) = step.data.get(field).and_then(|v| v.as_str()) else {
          continue;
        };
        if path.is_empty() || SymbolicRef::is_reference(path) || Path::new(path).exists() {
          continue;
        }

        warn!(node_id = %step.node_id, path = %path, "file_not_found");
        errors.push(Issue::from(&CompileError::FileNotFound {
          node_id: step.node_id.clone(),
          path: path.to_string(),
        }));
      }
    }

    if !errors.is_empty() {
      report.ok = false;
      report.errors = errors;
    } else {
      info!(steps = report.plan.len(), "workflow_validated");
    }
    report
  }
}
