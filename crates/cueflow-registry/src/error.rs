use thiserror::Error;

/// Errors raised while assembling a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
  /// Two contracts were registered under the same type name.
  #[error("step type already registered: {type_name}")]
  DuplicateType { type_name: String },

  /// A contract is internally inconsistent.
  #[error("invalid contract for '{type_name}': {message}")]
  InvalidContract { type_name: String, message: String },
}
