use thiserror::Error;

/// Errors surfaced by a command bus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
  /// The authoring tool could not be reached (connection refused, timeout).
  #[error("authoring tool unavailable: {message}")]
  Unavailable { message: String },

  /// The authoring tool received the command and refused it.
  #[error("command '{uri}' failed: {message}")]
  Rejected { uri: String, message: String },

  /// The reply could not be decoded.
  #[error("invalid reply to '{uri}': {message}")]
  InvalidResponse { uri: String, message: String },

  /// The transport configuration is unusable.
  #[error("invalid bus configuration: {message}")]
  InvalidConfig { message: String },
}

impl CommandError {
  /// Machine-readable code reported in failed step results.
  pub fn code(&self) -> &'static str {
    match self {
      CommandError::Unavailable { .. } => "WAAPI_UNAVAILABLE",
      CommandError::Rejected { .. } => "WAAPI_CALL_FAILED",
      CommandError::InvalidResponse { .. } => "WAAPI_INVALID_RESPONSE",
      CommandError::InvalidConfig { .. } => "WAAPI_INVALID_CONFIG",
    }
  }
}
