// src/exec/runner.rs

//! Running one unit's process.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::LaunchError;
use crate::exec::stream::{drain, StreamKind};
use crate::unit::{Status, Unit};

impl Unit {
    /// Run the unit's command to completion.
    ///
    /// The process inherits the ambient environment with the unit's own
    /// variables laid on top. Stdout and stderr are drained concurrently
    /// into the results record; both are read to the end before the process
    /// is waited on, so a chatty child never blocks on a full pipe.
    ///
    /// `on_update` fires after every observable change: once when the unit
    /// starts running, after each appended chunk, and once at the end. The
    /// two stream readers may call it concurrently.
    ///
    /// A process that runs but misses its expectations leaves the unit
    /// `Failed` and still returns `Ok(())`. An error is returned only when
    /// the process cannot be started or its pipes cannot be opened; the unit
    /// is marked `Failed` in that case too.
    pub async fn run(
        &self,
        on_update: &(dyn Fn(&Unit) + Send + Sync),
    ) -> Result<(), LaunchError> {
        self.results().set_status(Status::Running);
        on_update(self);

        let mut cmd = Command::new(self.command());
        cmd.args(self.args())
            .envs(self.environment())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                let err = LaunchError::Spawn {
                    command: self.command().to_string(),
                    args: self.args().to_vec(),
                    source,
                };
                return Err(self.launch_failed(err, on_update));
            }
        };

        let Some(stdout) = child.stdout.take() else {
            return Err(self.launch_failed(self.stream_unavailable("out"), on_update));
        };
        let Some(stderr) = child.stderr.take() else {
            return Err(self.launch_failed(self.stream_unavailable("error"), on_update));
        };

        debug!(unit = %self.name(), pid = ?child.id(), "unit process started");

        tokio::join!(
            drain(self, stdout, StreamKind::Stdout, on_update),
            drain(self, stderr, StreamKind::Stderr, on_update),
        );

        match child.wait().await {
            Ok(status) => {
                // Killed by a signal: no code to compare against.
                let code = status.code().unwrap_or(-1);
                self.results().set_return_code(code);
                debug!(unit = %self.name(), exit_code = code, "unit process exited");
            }
            Err(e) => {
                warn!(unit = %self.name(), error = %e, "waiting on unit process failed");
                let note = format!(
                    "command failed {:?} {:?}: {e}",
                    self.command(),
                    self.args()
                );
                self.results().atomic(|r| {
                    r.set_status(Status::Failed);
                    r.set_return_code(-1);
                    let mut stderr = r.stderr().to_owned();
                    stderr.push_str(&note);
                    r.set_stderr(stderr);
                });
            }
        }

        self.evaluate_success();
        info!(
            unit = %self.name(),
            status = %self.status(),
            exit_code = self.return_code(),
            "unit finished"
        );
        on_update(self);
        Ok(())
    }

    fn stream_unavailable(&self, stream: &'static str) -> LaunchError {
        LaunchError::StreamUnavailable {
            command: self.command().to_string(),
            args: self.args().to_vec(),
            stream,
        }
    }

    fn launch_failed(
        &self,
        err: LaunchError,
        on_update: &(dyn Fn(&Unit) + Send + Sync),
    ) -> LaunchError {
        warn!(unit = %self.name(), error = %err, "could not launch unit");
        let note = err.to_string();
        self.results().atomic(|r| {
            r.set_status(Status::Failed);
            let mut stderr = r.stderr().to_owned();
            stderr.push_str(&note);
            r.set_stderr(stderr);
        });
        on_update(self);
        err
    }
}
