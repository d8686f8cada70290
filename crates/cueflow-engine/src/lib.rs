//! Cueflow Execution Engine
//!
//! Runs a compiled [`Plan`](cueflow_compiler::Plan) step by step:
//!
//! ```text
//! for each step in plan order
//!   resume gate   -> skipped until resumeFrom is reached
//!   resolve       -> $from references looked up in the run context
//!   key           -> idempotency key over node id, type and data
//!   replay        -> memoized result reused unless forceRerun
//!   dispatch      -> handler invoked with the command bus
//!   halt          -> first failure stops the run
//!   export        -> declared outputs written into the context
//! ```
//!
//! Steps run strictly one after another. The registry and command bus are
//! shared; context, memo and results belong to one run.

mod context;
mod engine;
mod error;
mod events;
mod idempotency;
mod memo;
mod options;
mod resolve;
mod result;
mod template;

pub use context::ExecutionContext;
pub use engine::Engine;
pub use error::ExecutionError;
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier, TracingNotifier};
pub use idempotency::{VOLATILE_KEYS, idempotency_key};
pub use memo::IdempotencyMemo;
pub use options::ExecutionOptions;
pub use resolve::resolve_references;
pub use result::{ExecutionReport, StepOutcome, StepStatus};
pub use template::{TIME_PLACEHOLDER, TIMESTAMP_PLACEHOLDER, substitute_templates};
