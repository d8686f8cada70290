//! Cueflow Config
//!
//! This crate contains the serializable workflow input types for cueflow.
//! A workflow is the graph a user assembles in the node editor: typed nodes
//! carrying free-form data, connected by directed edges.
//!
//! Workflows are loaded from:
//! - JSON files (via CLI with `cueflow run workflow.json`)
//! - Request bodies of whatever transport embeds the engine
//!
//! The compiler takes these types, validates them against the step registry,
//! and turns them into an ordered plan for execution.

mod edge;
mod input;
mod node;
mod reference;
mod workflow;

pub use edge::Edge;
pub use input::{StepData, is_blank};
pub use node::Node;
pub use reference::{REFERENCE_PREFIX, ReferenceError, SymbolicRef};
pub use workflow::WorkflowDef;
