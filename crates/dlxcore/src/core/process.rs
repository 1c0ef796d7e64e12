//! Process execution utilities with timeout support
//!
//! Provides a helper for running the extraction engine binary with a
//! configurable timeout so a hung process never blocks a request forever.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::extract::EngineError;

/// Run an async Command with a timeout.
///
/// The child is spawned with `kill_on_drop`, so hitting the timeout also
/// kills the process instead of leaving it running in the background.
pub async fn run_with_timeout(cmd: &mut Command, bin: &str, timeout: Duration) -> Result<Output, EngineError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(EngineError::Spawn {
            bin: bin.to_string(),
            source: e,
        }),
        Err(_) => Err(EngineError::Timeout {
            bin: bin.to_string(),
            secs: timeout.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let bin = "videodlx-definitely-not-installed";
        let result = run_with_timeout(&mut Command::new(bin), bin, Duration::from_secs(5)).await;
        assert!(matches!(result, Err(EngineError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_process() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let result = run_with_timeout(&mut cmd, "sleep", Duration::from_millis(100)).await;
        assert!(matches!(result, Err(EngineError::Timeout { .. })));
    }
}
