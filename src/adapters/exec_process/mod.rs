//! Process execution adapter
//!
//! Runs external tools with `tokio::process`, streaming stdout to the caller
//! while stderr is drained on a separate task.

use std::io;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::ports::*;

/// Read buffer size for stdout chunks
const CHUNK_SIZE: usize = 8192;

/// `E2BIG` on unix, `ERROR_FILENAME_EXCED_RANGE` on Windows
fn is_argument_list_too_long(err: &io::Error) -> bool {
    match err.raw_os_error() {
        Some(code) => (cfg!(unix) && code == 7) || (cfg!(windows) && code == 206),
        None => false,
    }
}

fn launch_error(command: &str, args: &[String], err: io::Error) -> DomainError {
    debug!(command, error = %err, "Failed to spawn process");
    if is_argument_list_too_long(&err) {
        DomainError::ArgumentListTooLong {
            command: command.to_string(),
            args: args.len(),
        }
    } else {
        DomainError::CommandNotFound {
            command: command.to_string(),
        }
    }
}

/// `tokio::process` based execution adapter
pub struct ProcessExecAdapter {
    chunk_size: usize,
}

impl ProcessExecAdapter {
    /// Create new process execution adapter
    pub fn new() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
        }
    }
}

impl Default for ProcessExecAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutePort for ProcessExecAdapter {
    async fn execute(
        &self,
        command: &str,
        args: &[String],
        current_dir: Option<&Path>,
        on_stdout: StdoutSink<'_>,
    ) -> Result<(), DomainError> {
        debug!(command, ?args, ?current_dir, "Spawning process");

        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = current_dir {
            cmd.current_dir(dir);
        }
        let mut child = cmd
            .spawn()
            .map_err(|e| launch_error(command, args, e))?;

        // Drain stderr concurrently so a chatty tool cannot block on a full pipe
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                stderr.read_to_end(&mut buf).await?;
                Ok::<_, std::io::Error>(buf)
            })
        });

        if let Some(mut stdout) = child.stdout.take() {
            let mut buf = vec![0u8; self.chunk_size];
            loop {
                let read = stdout.read(&mut buf).await?;
                if read == 0 {
                    break;
                }
                on_stdout(&buf[..read]);
            }
        }

        let status = child.wait().await?;
        let stderr = match stderr_task {
            Some(task) => task
                .await
                .map_err(|e| DomainError::Io(format!("stderr reader failed: {}", e)))??,
            None => Vec::new(),
        };
        let stderr = String::from_utf8_lossy(&stderr).into_owned();

        if !status.success() || !stderr.is_empty() {
            debug!(command, status = ?status.code(), "Process failed");
            return Err(DomainError::CommandFailed {
                command: command.to_string(),
                status: status.code(),
                stderr,
            });
        }

        debug!(command, "Process finished");
        Ok(())
    }
}
