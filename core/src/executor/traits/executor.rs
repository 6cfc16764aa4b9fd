use async_trait::async_trait;

use crate::executor::types::{ExecuteRequest, TaskOutcome};

/// Executes one queue task.
///
/// `Err` means the call itself broke (transport, decode). The queue driver
/// folds it into a `Failed` outcome; it never escapes the run.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    fn name(&self) -> &str;
    async fn execute(&self, request: &ExecuteRequest) -> anyhow::Result<TaskOutcome>;
}
