//! Pooled tool execution with cooperative timeout and bounded capture.
//!
//! One execution = lease a home, spawn the tool scoped to it, drain its
//! combined output into a ring buffer while a watcher arms the timeout, and
//! always wait for the process to exit before the home goes back to the
//! pool. Exactly two concurrent activities run per execution — the output
//! reader and the cancellation watcher — synchronized only through a shared
//! cancellation token and the child handle.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::config::ExecutorConfig;
use crate::error::{ExecError, Result};
use crate::pool::HomePool;
use crate::ring::RingBuffer;

/// Runs the configured external tool with bounded concurrency.
///
/// Up to `pool_size` executions proceed in parallel, each against its own
/// pooled home directory; further callers suspend in [`HomePool::acquire`].
pub struct PooledExecutor {
    config: ExecutorConfig,
    pool: HomePool,
}

impl PooledExecutor {
    /// Provision the home pool from `source` and build the executor.
    pub async fn provision(config: ExecutorConfig, source: &Path) -> Self {
        let pool = HomePool::provision(source, config.pool_size).await;
        Self { config, pool }
    }

    /// The underlying home pool.
    pub fn pool(&self) -> &HomePool {
        &self.pool
    }

    /// Run the tool with `args`, capturing combined stdout/stderr.
    ///
    /// The timeout is cooperative: on expiry the subprocess receives one
    /// graceful quit signal and the call keeps waiting for it to exit. A
    /// tool that ignores the signal holds its pooled home until it exits on
    /// its own; there is no hard-kill escalation.
    ///
    /// On a failure exit status the captured output rides along in
    /// [`ExecError::ExitFailure`] for diagnostics. Nothing is retried.
    pub async fn execute<S: AsRef<OsStr>>(
        &self,
        args: &[S],
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        // Held to the end of the call: release always happens after the
        // final process wait, on every path past this point.
        let lease = self.pool.acquire().await?;
        let scope = CancellationToken::new();

        let mut command = Command::new(&self.config.tool);
        command
            .args(args)
            .env(&self.config.home_env, lease.dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &self.config.fixed_env {
            command.env(key, value);
        }

        tracing::debug!(
            tool = %self.config.tool,
            home = %lease.dir().display(),
            ?timeout,
            "Running pooled tool"
        );

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            tool: self.config.tool.clone(),
            source,
        })?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or(ExecError::Pipe { stream: "stdout" })?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or(ExecError::Pipe { stream: "stderr" })?;
        let pid = child.id();

        // Watcher: sends at most one quit request, on deadline expiry or an
        // externally cancelled scope. The exited channel ends it silently
        // once the child has been reaped.
        let (exited_tx, exited_rx) = tokio::sync::oneshot::channel::<()>();
        let watcher = tokio::spawn({
            let scope = scope.clone();
            async move {
                let quit = async {
                    tokio::select! {
                        () = scope.cancelled() => {}
                        () = tokio::time::sleep(timeout) => scope.cancel(),
                    }
                    send_quit(pid);
                };
                tokio::select! {
                    () = quit => {}
                    _ = exited_rx => {}
                }
            }
        });

        // Drain both pipes into the one capture buffer until EOF. A read
        // error cancels the scope (so the quit signal goes out) but never
        // aborts the call; the child is waited on regardless.
        let mut captured = RingBuffer::new(self.config.capture_capacity);
        let mut out_chunk = [0u8; 4096];
        let mut err_chunk = [0u8; 4096];
        let mut out_done = false;
        let mut err_done = false;
        while !out_done || !err_done {
            tokio::select! {
                read = stdout.read(&mut out_chunk), if !out_done => match read {
                    Ok(0) => out_done = true,
                    Ok(n) => captured.write(&out_chunk[..n]),
                    Err(e) => {
                        tracing::error!("Failed reading tool stdout: {}", e);
                        scope.cancel();
                        out_done = true;
                    }
                },
                read = stderr.read(&mut err_chunk), if !err_done => match read {
                    Ok(0) => err_done = true,
                    Ok(n) => captured.write(&err_chunk[..n]),
                    Err(e) => {
                        tracing::error!("Failed reading tool stderr: {}", e);
                        scope.cancel();
                        err_done = true;
                    }
                },
            }
        }

        let status = child.wait().await.map_err(|source| ExecError::Wait {
            tool: self.config.tool.clone(),
            source,
        })?;
        drop(exited_tx);
        let _ = watcher.await;

        if !status.success() {
            tracing::error!(
                tool = %self.config.tool,
                %status,
                "Pooled tool exited with failure"
            );
            return Err(ExecError::ExitFailure {
                tool: self.config.tool.clone(),
                status,
                output: captured.into_vec(),
            });
        }
        Ok(captured.into_vec())
    }

    /// Tear down the pool: wait for in-flight executions, delete all homes.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}

/// Ask the subprocess to shut down gracefully.
#[cfg(unix)]
fn send_quit(pid: Option<u32>) {
    let Some(pid) = pid else { return };
    tracing::debug!(pid, "Sending quit signal to pooled tool");
    let rc = unsafe { libc::kill(pid as i32, libc::SIGQUIT) };
    if rc == -1 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::warn!(pid, "Failed to send quit signal: {}", err);
        }
    }
}

#[cfg(not(unix))]
fn send_quit(pid: Option<u32>) {
    if pid.is_some() {
        tracing::warn!("Quit signal unsupported on this platform, waiting for natural exit");
    }
}
