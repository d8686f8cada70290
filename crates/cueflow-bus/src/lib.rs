//! Cueflow Bus
//!
//! The command capability step handlers use to reach the authoring tool.
//! A [`CommandBus`] takes one [`Command`] (a URI plus JSON arguments and
//! options) and returns the tool's JSON reply.
//!
//! Two transports are provided:
//! - [`WaapiBus`] posts commands to the authoring tool's HTTP endpoint
//! - [`MemoryBus`] simulates a project in memory, for offline runs and tests

mod command;
mod error;
mod memory;
mod waapi;

pub use command::{Command, CommandBus, uri};
pub use error::CommandError;
pub use memory::{MemoryBus, MemoryObject};
pub use waapi::{DEFAULT_TIMEOUT_MS, DEFAULT_WAAPI_URL, WaapiBus, WaapiConfig};
