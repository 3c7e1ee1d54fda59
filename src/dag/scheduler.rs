// src/dag/scheduler.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, error, info};

use crate::dag::graph::UnitGraph;
use crate::errors::{Result, UnitdagError};
use crate::exec::UpdateHandler;
use crate::unit::{Status, Unit};

/// Errors handed back by workers, shared by all of them.
#[derive(Debug, Default)]
struct ErrorList {
    errors: Mutex<Vec<UnitdagError>>,
}

impl ErrorList {
    fn push(&self, err: UnitdagError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(err);
    }

    fn take(&self) -> Vec<UnitdagError> {
        std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Spawned workers, keyed back to the unit each one runs.
#[derive(Default)]
struct Workers {
    set: JoinSet<()>,
    names: HashMap<task::Id, String>,
}

impl Workers {
    fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    fn spawn<F>(&mut self, name: &str, worker: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = self.set.spawn(worker);
        self.names.insert(handle.id(), name.to_string());
    }

    /// Wait for any one worker to end. Returns `None` once none are left,
    /// otherwise the unit name and how the worker ended.
    async fn join_next(&mut self) -> Option<(String, std::result::Result<(), JoinError>)> {
        let joined = self.set.join_next_with_id().await?;
        let (id, outcome) = match joined {
            Ok((id, ())) => (id, Ok(())),
            Err(err) => (err.id(), Err(err)),
        };
        let name = self.names.remove(&id).unwrap_or_default();
        Some((name, outcome))
    }
}

impl UnitGraph {
    /// Run every unit whose dependencies allow it, as parallel as the graph
    /// permits, until nothing more can happen.
    ///
    /// Each round the graph is asked for ready units; one tokio task is
    /// spawned per ready unit, and the loop then waits for any single worker
    /// to end before looking again. `on_update` is called from worker tasks
    /// whenever a unit's status or output changes.
    ///
    /// Returns an error for an unknown dependency, for a deadlock (units left
    /// waiting with nothing running and nothing ready), when some unit's
    /// process could not be launched, or when a worker panicked. A unit that
    /// ran and failed is not an error. Every spawned worker has ended by the
    /// time this returns, whatever the outcome.
    pub async fn run_all<F>(&self, on_update: F) -> Result<()>
    where
        F: Fn(&Unit) + Send + Sync + 'static,
    {
        let on_update: UpdateHandler = Arc::new(on_update);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(ErrorList::default());
        let mut workers = Workers::default();

        info!(units = self.len(), "starting run");

        let outcome = loop {
            if self.is_finished() && workers.is_empty() {
                break Ok(());
            }

            let ready = match self.ready_to_run() {
                Ok(ready) => ready,
                Err(err) => {
                    error!(error = %err, "invalid unit graph");
                    break Err(err);
                }
            };

            let running = in_flight.load(Ordering::SeqCst);
            debug!(ready = ready.len(), in_flight = running, "scheduling round");

            if running == 0 && ready.is_empty() && !self.is_finished() {
                let report = self.pending_report();
                error!(pending = %report, "deadlock detected");
                break Err(UnitdagError::Deadlock(report));
            }

            in_flight.fetch_add(ready.len(), Ordering::SeqCst);

            // May launch nothing when work is already in flight.
            for unit in ready {
                // Claim the unit before the worker is scheduled, so the next
                // round cannot see it as `NotRun` and launch it again.
                unit.results().set_status(Status::Running);
                info!(unit = %unit.name(), command = %unit.command(), "launching unit");

                let handler = Arc::clone(&on_update);
                let in_flight = Arc::clone(&in_flight);
                let errors = Arc::clone(&errors);
                let name = unit.name().to_string();

                workers.spawn(&name, async move {
                    if let Err(source) = unit.run(&*handler).await {
                        errors.push(UnitdagError::Launch {
                            unit: unit.name().to_string(),
                            source,
                        });
                    }
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                });
            }

            if let Some((name, ended)) = workers.join_next().await {
                self.settle(&name, ended, &in_flight, &errors);
            }

            if let Some(err) = collected_error(errors.take()) {
                break Err(err);
            }
        };

        // Let stragglers finish before handing control back.
        if !workers.is_empty() {
            debug!(in_flight = in_flight.load(Ordering::SeqCst), "waiting for in-flight units before returning");
        }
        while let Some((name, ended)) = workers.join_next().await {
            self.settle(&name, ended, &in_flight, &errors);
        }
        for err in errors.take() {
            error!(error = %err, "unit could not be run");
        }

        let (succeeded, failed, skipped) = self.tally();
        info!(succeeded, failed, skipped, ok = outcome.is_ok(), "run finished");

        outcome
    }

    /// Account for a worker that ended without reaching its own bookkeeping.
    fn settle(
        &self,
        name: &str,
        ended: std::result::Result<(), JoinError>,
        in_flight: &AtomicUsize,
        errors: &ErrorList,
    ) {
        let Err(source) = ended else {
            return;
        };

        in_flight.fetch_sub(1, Ordering::SeqCst);
        if let Some(unit) = self.get(name) {
            let marked = unit.results().atomic(|r| {
                if r.status().is_terminal() {
                    false
                } else {
                    r.set_status(Status::Failed);
                    true
                }
            });
            if marked {
                debug!(unit = %name, "unit left unfinished by its worker; marked failed");
            }
        }
        errors.push(UnitdagError::Worker {
            unit: name.to_string(),
            source,
        });
    }

    fn tally(&self) -> (usize, usize, usize) {
        self.units().iter().fold((0, 0, 0), |(s, f, d), u| match u.status() {
            Status::Succeeded => (s + 1, f, d),
            Status::Failed => (s, f + 1, d),
            Status::DependenciesNotMet => (s, f, d + 1),
            Status::NotRun | Status::Running => (s, f, d),
        })
    }
}

fn collected_error(mut errors: Vec<UnitdagError>) -> Option<UnitdagError> {
    let last = errors.pop()?;
    for err in &errors {
        error!(error = %err, "unit could not be run");
    }
    error!(error = %last, "unit could not be run");
    Some(UnitdagError::UnitErrors {
        count: errors.len() + 1,
        last: Box::new(last),
    })
}
