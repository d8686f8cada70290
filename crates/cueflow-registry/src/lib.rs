//! Cueflow Registry
//!
//! The catalog of step types a workflow may use. Each registered type pairs a
//! [`StepContract`] (what the step needs and what it exports) with a
//! [`StepHandler`] (how it runs against the command bus).
//!
//! A [`StepRegistry`] is assembled once through [`StepRegistryBuilder`] and
//! is immutable afterwards, so it can be shared across concurrent runs
//! behind an `Arc` without synchronization.

mod contract;
mod error;
mod handler;
mod registry;
mod result;

pub use contract::{ContractSnapshot, StepContract};
pub use error::RegistryError;
pub use handler::StepHandler;
pub use registry::{
  NodeInputs, NodeTypeInfo, NodeValidation, RegisteredStep, StepRegistry, StepRegistryBuilder,
};
pub use result::StepResult;
