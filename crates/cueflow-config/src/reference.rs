//! Symbolic references between steps.
//!
//! A symbolic reference defers one step's input to another step's output:
//!
//! ```text
//! $from:<nodeId>:$output:<fieldName>
//! ```
//!
//! Exactly four colon-separated segments. Any string that starts with
//! `$from:` but does not have that shape is malformed.

use std::fmt;

use thiserror::Error;

/// Prefix that marks a string value as a symbolic reference.
pub const REFERENCE_PREFIX: &str = "$from:";

const OUTPUT_MARKER: &str = "$output";

const SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed reference '{0}': expected $from:<nodeId>:$output:<field>")]
pub struct ReferenceError(pub String);

/// A parsed `$from:<nodeId>:$output:<field>` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolicRef {
  pub node_id: String,
  pub field: String,
}

impl SymbolicRef {
  pub fn new(node_id: impl Into<String>, field: impl Into<String>) -> Self {
    Self {
      node_id: node_id.into(),
      field: field.into(),
    }
  }

  /// Whether a string claims to be a reference (well-formed or not).
  pub fn is_reference(s: &str) -> bool {
    s.starts_with(REFERENCE_PREFIX)
  }

  /// Whether `s` can stand as a node id or field segment of a reference.
  pub fn is_valid_segment(s: &str) -> bool {
    !s.is_empty() && !s.contains(SEPARATOR)
  }

  /// Parse a string value.
  ///
  /// Returns `Ok(None)` for plain strings and `Err` for strings that start
  /// with the reference prefix but are malformed.
  pub fn parse(s: &str) -> Result<Option<Self>, ReferenceError> {
    if !Self::is_reference(s) {
      return Ok(None);
    }

    let parts: Vec<&str> = s.split(SEPARATOR).collect();
    match parts.as_slice() {
      ["$from", node_id, OUTPUT_MARKER, field]
        if Self::is_valid_segment(node_id) && Self::is_valid_segment(field) =>
      {
        Ok(Some(Self::new(*node_id, *field)))
      }
      _ => Err(ReferenceError(s.to_string())),
    }
  }
}

impl fmt::Display for SymbolicRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}{}:{}:{}",
      REFERENCE_PREFIX, self.node_id, OUTPUT_MARKER, self.field
    )
  }
}
