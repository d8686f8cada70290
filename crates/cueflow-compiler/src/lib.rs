//! Cueflow Compiler
//!
//! Turns a [`WorkflowDef`](cueflow_config::WorkflowDef) into a [`Plan`]:
//!
//! 1. Index nodes and validate edges
//! 2. Order nodes topologically (Kahn's algorithm, ties by insertion order)
//! 3. Index which nodes produce which output fields
//! 4. Auto-wire missing required inputs from connected producers
//! 5. Validate required inputs and freeze each step's contract
//!
//! Compilation fails fast on the first error. [`Compiler::validate`] adds
//! pre-flight checks on top of a successful compilation.

mod compiler;
mod error;
mod graph;
mod plan;
mod preflight;
mod producers;
mod report;

pub use compiler::{AMBIGUOUS_WIRING, Compilation, Compiler};
pub use error::CompileError;
pub use graph::Graph;
pub use plan::{CompiledStep, Plan};
pub use producers::ProducerIndex;
pub use report::{CompilationReport, Issue};
