// src/unit/results.rs

//! Mutable outcome of one unit's execution.
//!
//! [`ResultRecord`] is the only lock in the engine. Every field access takes
//! the guard for exactly as long as the access lasts; it is never held across
//! process I/O or a scheduler await.
//!
//! Compound operations are built from the unguarded accessors of
//! [`ResultFields`] inside [`ResultRecord::atomic`], so "read, modify, write
//! back" happens under one acquisition.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::unit::Status;

/// Unguarded field access. Only ever handed out from inside
/// [`ResultRecord::atomic`], while the guard is held.
pub trait ResultFields {
    fn stdout(&self) -> &str;
    fn set_stdout(&mut self, stdout: String);

    fn stderr(&self) -> &str;
    fn set_stderr(&mut self, stderr: String);

    fn return_code(&self) -> i32;
    fn set_return_code(&mut self, code: i32);

    fn status(&self) -> Status;
    fn set_status(&mut self, status: Status);
}

#[derive(Debug, Default)]
struct Results {
    stdout: String,
    stderr: String,
    return_code: i32,
    status: Status,
}

impl ResultFields for Results {
    fn stdout(&self) -> &str {
        &self.stdout
    }

    fn set_stdout(&mut self, stdout: String) {
        self.stdout = stdout;
    }

    fn stderr(&self) -> &str {
        &self.stderr
    }

    fn set_stderr(&mut self, stderr: String) {
        self.stderr = stderr;
    }

    fn return_code(&self) -> i32 {
        self.return_code
    }

    fn set_return_code(&mut self, code: i32) {
        self.return_code = code;
    }

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

/// Consistent copy of a record, taken under a single guard acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSnapshot {
    pub stdout: String,
    pub stderr: String,
    pub return_code: i32,
    pub status: Status,
}

/// Mutex-guarded results of a unit.
#[derive(Debug, Default)]
pub struct ResultRecord {
    inner: Mutex<Results>,
}

impl ResultRecord {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is ignored: every field is valid on its own.
    fn guard(&self) -> MutexGuard<'_, Results> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `op` against the fields with the guard held for its whole body.
    pub fn atomic<R>(&self, op: impl FnOnce(&mut dyn ResultFields) -> R) -> R {
        let mut guard = self.guard();
        op(&mut *guard)
    }

    pub fn stdout(&self) -> String {
        self.guard().stdout.clone()
    }

    pub fn set_stdout(&self, stdout: impl Into<String>) {
        let stdout = stdout.into();
        self.atomic(|r| r.set_stdout(stdout));
    }

    pub fn stderr(&self) -> String {
        self.guard().stderr.clone()
    }

    pub fn set_stderr(&self, stderr: impl Into<String>) {
        let stderr = stderr.into();
        self.atomic(|r| r.set_stderr(stderr));
    }

    pub fn return_code(&self) -> i32 {
        self.guard().return_code
    }

    pub fn set_return_code(&self, code: i32) {
        self.atomic(|r| r.set_return_code(code));
    }

    pub fn status(&self) -> Status {
        self.guard().status
    }

    pub fn set_status(&self, status: Status) {
        self.atomic(|r| r.set_status(status));
    }

    pub fn append_stdout(&self, addendum: &str) {
        self.atomic(|r| {
            let mut out = r.stdout().to_owned();
            out.push_str(addendum);
            r.set_stdout(out);
        });
    }

    pub fn append_stderr(&self, addendum: &str) {
        self.atomic(|r| {
            let mut err = r.stderr().to_owned();
            err.push_str(addendum);
            r.set_stderr(err);
        });
    }

    /// Mark the unit `Succeeded` unless something already recorded `Failed`.
    pub fn succeed_if_not_failed(&self) {
        self.atomic(|r| {
            if r.status() != Status::Failed {
                r.set_status(Status::Succeeded);
            }
        });
    }

    pub fn snapshot(&self) -> ResultSnapshot {
        self.atomic(|r| ResultSnapshot {
            stdout: r.stdout().to_owned(),
            stderr: r.stderr().to_owned(),
            return_code: r.return_code(),
            status: r.status(),
        })
    }
}
