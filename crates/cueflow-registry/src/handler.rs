use async_trait::async_trait;
use cueflow_bus::CommandBus;
use cueflow_config::StepData;

use crate::result::StepResult;

/// Runs one step type.
///
/// Handlers receive fully resolved step data (symbolic references already
/// replaced by upstream outputs) and the command bus. They report every
/// outcome, including transport failures, through the returned
/// [`StepResult`].
#[async_trait]
pub trait StepHandler: Send + Sync {
  async fn run(&self, data: &StepData, bus: &dyn CommandBus) -> StepResult;
}
