// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Consumer of standard-output chunks, called once per chunk as it arrives
pub type StdoutSink<'a> = &'a mut (dyn FnMut(&[u8]) + Send);

/// Port for running external commands
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Run `command` with `args`, streaming stdout into `on_stdout`.
    ///
    /// Relative arguments resolve against `current_dir` when one is given.
    /// Fails when the command cannot be launched, exits non-zero, or
    /// writes anything to stderr.
    async fn execute(
        &self,
        command: &str,
        args: &[String],
        current_dir: Option<&Path>,
        on_stdout: StdoutSink<'_>,
    ) -> Result<(), DomainError>;
}

/// Port for resolving video stream metadata
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Resolve the first video stream of `video_path`
    async fn resolve(&self, video_path: &Path) -> Result<VideoStreamInfo, DomainError>;
}

/// Port for reporting overall conversion progress
///
/// Fractions are in `[0, 1]`. Implementations must tolerate values that
/// briefly move backwards.
pub trait ProgressPort: Send + Sync {
    /// Report the current overall fraction
    fn report(&self, fraction: f64);

    /// Called once when the run ends, successfully or not
    fn finish(&self) {}
}
