//! Cueflow Steps
//!
//! Built-in step types. Each handler turns one node's resolved data into a
//! command against the authoring tool and normalizes the reply into the
//! fields its contract exports.

mod audio;
mod builtin;
mod input;
mod objects;
mod project;

pub use audio::AudioImport;
pub use builtin::{DEFAULT_PARENT_PATH, builtin_registry};
pub use objects::{CreateSound, SetProperty, SetReference};
pub use project::{ProjectSave, QueryWaql};

/// Error code for step data a handler cannot act on.
pub const INVALID_INPUT: &str = "INVALID_INPUT";

/// Error code for a `setReference` node naming a reference other than `OutputBus`.
pub const UNSUPPORTED_REFERENCE: &str = "UNSUPPORTED_REFERENCE";
