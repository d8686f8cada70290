//! Execution events and notifiers for observability.
//!
//! Events are emitted during a run so that consumers can follow progress,
//! stream it to an editor, or log it.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Events emitted during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEvent {
  /// The run has started.
  RunStarted { execution_id: String, steps: usize },

  /// A step was skipped without running.
  StepSkipped {
    execution_id: String,
    node_id: String,
    reason: String,
  },

  /// A step was answered from the memo.
  StepReplayed {
    execution_id: String,
    node_id: String,
    idem_key: String,
  },

  /// A step's handler is about to be invoked.
  StepStarted {
    execution_id: String,
    node_id: String,
    idem_key: String,
  },

  /// A step's handler succeeded.
  StepCompleted {
    execution_id: String,
    node_id: String,
    data: serde_json::Value,
  },

  /// A step failed; the run stops here.
  StepFailed {
    execution_id: String,
    node_id: String,
    code: Option<String>,
    error: String,
  },

  /// Every step finished successfully.
  RunCompleted { execution_id: String },

  /// The run stopped early.
  RunFailed {
    execution_id: String,
    stop_at: Option<String>,
  },
}

/// Trait for receiving execution events.
///
/// The engine calls `notify` for each event; implementations decide what to
/// do with them.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(event);
  }
}

/// A notifier that logs every event through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl ExecutionNotifier for TracingNotifier {
  fn notify(&self, event: ExecutionEvent) {
    match event {
      ExecutionEvent::RunStarted {
        execution_id,
        steps,
      } => info!(execution_id = %execution_id, steps, "run_started"),
      ExecutionEvent::StepSkipped {
        execution_id,
        node_id,
        reason,
      } => info!(execution_id = %execution_id, node_id = %node_id, reason = %reason, "step_skipped"),
      ExecutionEvent::StepReplayed {
        execution_id,
        node_id,
        idem_key,
      } => info!(execution_id = %execution_id, node_id = %node_id, idem_key = %idem_key, "step_replayed"),
      ExecutionEvent::StepStarted {
        execution_id,
        node_id,
        idem_key,
      } => info!(execution_id = %execution_id, node_id = %node_id, idem_key = %idem_key, "step_started"),
      ExecutionEvent::StepCompleted {
        execution_id,
        node_id,
        data,
      } => info!(execution_id = %execution_id, node_id = %node_id, output = %data, "step_completed"),
      ExecutionEvent::StepFailed {
        execution_id,
        node_id,
        code,
        error,
      } => error!(
        execution_id = %execution_id,
        node_id = %node_id,
        code = code.as_deref().unwrap_or(""),
        error = %error,
        "step_failed"
      ),
      ExecutionEvent::RunCompleted { execution_id } => {
        info!(execution_id = %execution_id, "run_completed")
      }
      ExecutionEvent::RunFailed {
        execution_id,
        stop_at,
      } => error!(
        execution_id = %execution_id,
        stop_at = stop_at.as_deref().unwrap_or(""),
        "run_failed"
      ),
    }
  }
}
