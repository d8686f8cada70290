//! HTTP transport for the authoring tool's command API.
//!
//! Each command is posted as `{"uri", "args", "options"}` to a single
//! endpoint. Successful replies are the command's JSON result; failed replies
//! carry a `message` describing the refusal.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::command::{Command, CommandBus};
use crate::error::CommandError;

pub const DEFAULT_WAAPI_URL: &str = "http://127.0.0.1:8090/waapi";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Configuration for [`WaapiBus`].
#[derive(Debug, Clone, PartialEq)]
pub struct WaapiConfig {
  /// Endpoint commands are posted to.
  pub url: Url,
  /// Per-request timeout.
  pub timeout: Duration,
}

impl WaapiConfig {
  pub fn new(url: &str, timeout_ms: u64) -> Result<Self, CommandError> {
    let url = Url::parse(url).map_err(|e| CommandError::InvalidConfig {
      message: format!("invalid url '{}': {}", url, e),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
      return Err(CommandError::InvalidConfig {
        message: format!("unsupported url scheme '{}'", url.scheme()),
      });
    }

    if timeout_ms == 0 {
      return Err(CommandError::InvalidConfig {
        message: "timeout must be greater than zero".to_string(),
      });
    }

    Ok(Self {
      url,
      timeout: Duration::from_millis(timeout_ms),
    })
  }
}

/// Command bus backed by the authoring tool's HTTP endpoint.
pub struct WaapiBus {
  client: reqwest::Client,
  config: WaapiConfig,
}

impl WaapiBus {
  pub fn new(config: WaapiConfig) -> Result<Self, CommandError> {
    let client = reqwest::Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| CommandError::InvalidConfig {
        message: format!("failed to build http client: {}", e),
      })?;

    Ok(Self { client, config })
  }
}

#[async_trait]
impl CommandBus for WaapiBus {
  async fn call(&self, command: Command) -> Result<Value, CommandError> {
    debug!(uri = %command.uri, url = %self.config.url, "waapi_call");

    let body = json!({
      "uri": command.uri,
      "args": command.args,
      "options": command.options,
    });

    let response = self
      .client
      .post(self.config.url.clone())
      .json(&body)
      .send()
      .await
      .map_err(|e| CommandError::Unavailable {
        message: e.to_string(),
      })?;

    let status = response.status();
    let text = response
      .text()
      .await
      .map_err(|e| CommandError::InvalidResponse {
        uri: command.uri.clone(),
        message: e.to_string(),
      })?;

    if !status.is_success() {
      let message = rejection_message(&text).unwrap_or_else(|| format!("http status {}", status));
      warn!(uri = %command.uri, status = %status, message = %message, "waapi_call_rejected");
      return Err(CommandError::Rejected {
        uri: command.uri,
        message,
      });
    }

    if text.trim().is_empty() {
      return Ok(json!({}));
    }

    serde_json::from_str(&text).map_err(|e| CommandError::InvalidResponse {
      uri: command.uri,
      message: e.to_string(),
    })
  }
}

/// Extract the human-readable message from an error reply body.
fn rejection_message(body: &str) -> Option<String> {
  let value: Value = serde_json::from_str(body).ok()?;
  value
    .get("message")
    .and_then(|m| m.as_str())
    .map(|m| m.to_string())
    .or_else(|| {
      value
        .get("uri")
        .and_then(|u| u.as_str())
        .map(|u| u.to_string())
    })
}
