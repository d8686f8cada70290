//! Plan execution.
//!
//! The `Engine` walks a compiled plan in order, one step at a time, and
//! stops at the first failure.

use std::sync::Arc;

use chrono::{Local, Utc};
use cueflow_bus::CommandBus;
use cueflow_compiler::{CompileError, CompiledStep, Compilation, Compiler, Issue, Plan};
use cueflow_config::WorkflowDef;
use cueflow_registry::StepRegistry;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::context::ExecutionContext;
use crate::error::ExecutionError;
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::idempotency::idempotency_key;
use crate::memo::IdempotencyMemo;
use crate::options::ExecutionOptions;
use crate::resolve::resolve_references;
use crate::result::{ExecutionReport, StepOutcome};
use crate::template::substitute_templates;

const RESUME_REASON: &str = "resume_from";

/// The execution engine.
///
/// Generic over `N: ExecutionNotifier` to allow different notification
/// strategies. Use `Engine::new()` for an engine that discards events, or
/// `Engine::with_notifier()` to observe them.
pub struct Engine<N: ExecutionNotifier = NoopNotifier> {
  registry: Arc<StepRegistry>,
  bus: Arc<dyn CommandBus>,
  notifier: N,
}

impl Engine<NoopNotifier> {
  pub fn new(registry: Arc<StepRegistry>, bus: Arc<dyn CommandBus>) -> Self {
    Self::with_notifier(registry, bus, NoopNotifier)
  }
}

impl<N: ExecutionNotifier> Engine<N> {
  pub fn with_notifier(registry: Arc<StepRegistry>, bus: Arc<dyn CommandBus>, notifier: N) -> Self {
    Self {
      registry,
      bus,
      notifier,
    }
  }

  pub fn registry(&self) -> &Arc<StepRegistry> {
    &self.registry
  }

  /// Compile a workflow against the engine's registry, then execute it.
  #[instrument(name = "workflow_run", skip_all, fields(nodes = def.nodes.len()))]
  pub async fn run(&self, def: &WorkflowDef, options: &ExecutionOptions) -> ExecutionReport {
    let compilation = Compiler::new(self.registry.clone()).compile(def);
    self.run_compiled(compilation, options).await
  }

  /// Compile a workflow given as raw JSON, then execute it.
  ///
  /// A document that is not a workflow fails like any other compilation.
  #[instrument(name = "workflow_run", skip_all)]
  pub async fn run_value(&self, value: Value, options: &ExecutionOptions) -> ExecutionReport {
    let compilation = Compiler::new(self.registry.clone()).compile_value(value);
    self.run_compiled(compilation, options).await
  }

  async fn run_compiled(
    &self,
    compilation: Result<Compilation, CompileError>,
    options: &ExecutionOptions,
  ) -> ExecutionReport {
    match compilation {
      Ok(compilation) => self.execute(&compilation.plan, options).await,
      Err(err) => {
        warn!(code = err.code(), error = %err, "workflow_compile_failed");
        let execution_id = new_execution_id();
        self.finish(execution_id, Vec::new(), None, vec![Issue::from(&err)])
      }
    }
  }

  /// Execute a plan with a memo scoped to this run.
  pub async fn execute(&self, plan: &Plan, options: &ExecutionOptions) -> ExecutionReport {
    let mut memo = IdempotencyMemo::new();
    self.execute_with_memo(plan, options, &mut memo).await
  }

  /// Execute a plan, replaying and recording results in a caller-owned memo.
  #[instrument(
    name = "plan_execute",
    skip_all,
    fields(steps = plan.len(), dry_run = options.dry_run, force_rerun = options.force_rerun)
  )]
  pub async fn execute_with_memo(
    &self,
    plan: &Plan,
    options: &ExecutionOptions,
    memo: &mut IdempotencyMemo,
  ) -> ExecutionReport {
    let execution_id = new_execution_id();

    if options.dry_run {
      debug!(execution_id = %execution_id, "dry_run");
      return ExecutionReport {
        ok: true,
        dry_run: true,
        plan: Some(plan.clone()),
        results: Vec::new(),
        stopped: false,
        stop_at: None,
        errors: Vec::new(),
        execution_id,
        timestamp: now(),
      };
    }

    if let Some(resume_from) = options.resume_from.as_deref()
      && plan.position(resume_from).is_none()
    {
      let err = ExecutionError::UnknownResumeNode {
        node_id: resume_from.to_string(),
      };
      warn!(execution_id = %execution_id, error = %err, "resume_node_unknown");
      let issue = Issue::new(err.code(), err.to_string(), Some(err.node_id().to_string()));
      return self.finish(execution_id, Vec::new(), None, vec![issue]);
    }

    self.notifier.notify(ExecutionEvent::RunStarted {
      execution_id: execution_id.clone(),
      steps: plan.len(),
    });

    let mut context = ExecutionContext::new();
    let mut results: Vec<StepOutcome> = Vec::with_capacity(plan.len());
    let mut resume_from = options.resume_from.as_deref();

    for step in plan {
      if let Some(target) = resume_from {
        if step.node_id != target {
          self.notifier.notify(ExecutionEvent::StepSkipped {
            execution_id: execution_id.clone(),
            node_id: step.node_id.clone(),
            reason: RESUME_REASON.to_string(),
          });
          results.push(StepOutcome::skipped(&step.node_id, RESUME_REASON));
          continue;
        }
        resume_from = None;
      }

      let outcome = self
        .run_step(step, options, &execution_id, &mut context, memo)
        .await;
      let ok = outcome.ok;
      results.push(outcome);

      if !ok {
        return self.finish(execution_id, results, Some(step.node_id.clone()), Vec::new());
      }
    }

    self.finish(execution_id, results, None, Vec::new())
  }

  async fn run_step(
    &self,
    step: &CompiledStep,
    options: &ExecutionOptions,
    execution_id: &str,
    context: &mut ExecutionContext,
    memo: &mut IdempotencyMemo,
  ) -> StepOutcome {
    let resolved = match resolve_references(&step.node_id, &step.data, context) {
      Ok(resolved) => resolved,
      Err(err) => return self.halt_before_dispatch(execution_id, &err),
    };

    // Keys are computed before placeholders expand so re-runs match.
    let idem_key = idempotency_key(&step.node_id, &step.node_type, &resolved);

    if !options.force_rerun
      && let Some(cached) = memo.get(&idem_key)
    {
      let cached = cached.clone();
      context.export(&step.node_id, &cached.data_or_empty(), &step.spec.outputs);
      self.notifier.notify(ExecutionEvent::StepReplayed {
        execution_id: execution_id.to_string(),
        node_id: step.node_id.clone(),
        idem_key: idem_key.clone(),
      });
      return StepOutcome::replayed(&step.node_id, idem_key, cached);
    }

    let Some(handler) = self.registry.handler(&step.node_type) else {
      let err = ExecutionError::UnknownNodeType {
        node_id: step.node_id.clone(),
        node_type: step.node_type.clone(),
      };
      return self.halt_before_dispatch(execution_id, &err);
    };

    // Upstream values are passed through verbatim, placeholders included.
    let literals = substitute_templates(&step.data, Local::now());
    let data = match resolve_references(&step.node_id, &literals, context) {
      Ok(data) => data,
      Err(err) => return self.halt_before_dispatch(execution_id, &err),
    };

    debug!(
      execution_id = %execution_id,
      node_id = %step.node_id,
      node_type = %step.node_type,
      idem_key = %idem_key,
      "step_dispatch"
    );
    self.notifier.notify(ExecutionEvent::StepStarted {
      execution_id: execution_id.to_string(),
      node_id: step.node_id.clone(),
      idem_key: idem_key.clone(),
    });

    let result = handler.run(&data, self.bus.as_ref()).await;
    memo.record(idem_key.as_str(), &result);

    if result.ok {
      let output = result.data_or_empty();
      context.export(&step.node_id, &output, &step.spec.outputs);
      self.notifier.notify(ExecutionEvent::StepCompleted {
        execution_id: execution_id.to_string(),
        node_id: step.node_id.clone(),
        data: Value::Object(output),
      });
    } else {
      self.notifier.notify(ExecutionEvent::StepFailed {
        execution_id: execution_id.to_string(),
        node_id: step.node_id.clone(),
        code: result.code.clone(),
        error: result.error.clone().unwrap_or_default(),
      });
    }

    StepOutcome::executed(&step.node_id, idem_key, result, data)
  }

  fn halt_before_dispatch(&self, execution_id: &str, err: &ExecutionError) -> StepOutcome {
    self.notifier.notify(ExecutionEvent::StepFailed {
      execution_id: execution_id.to_string(),
      node_id: err.node_id().to_string(),
      code: Some(err.code().to_string()),
      error: err.to_string(),
    });
    StepOutcome::failed(err.node_id(), err.code(), err.to_string())
  }

  fn finish(
    &self,
    execution_id: String,
    results: Vec<StepOutcome>,
    stop_at: Option<String>,
    errors: Vec<Issue>,
  ) -> ExecutionReport {
    let ok = stop_at.is_none() && errors.is_empty();

    if ok {
      self.notifier.notify(ExecutionEvent::RunCompleted {
        execution_id: execution_id.clone(),
      });
    } else {
      self.notifier.notify(ExecutionEvent::RunFailed {
        execution_id: execution_id.clone(),
        stop_at: stop_at.clone(),
      });
    }

    ExecutionReport {
      ok,
      dry_run: false,
      plan: None,
      results,
      stopped: !ok,
      stop_at,
      errors,
      execution_id,
      timestamp: now(),
    }
  }
}

fn new_execution_id() -> String {
  uuid::Uuid::new_v4().to_string()
}

fn now() -> String {
  Utc::now().to_rfc3339()
}
