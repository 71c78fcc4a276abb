//! Cancellable execution unit backing every simulated entity
//!
//! A [`Worker`] owns one OS thread. The controlling side starts, stops and
//! joins it; the thread side receives a [`StopToken`] which it checks on every
//! loop iteration and uses for interruptible sleeps. Both sides share one
//! mutex-protected lifecycle record and one condition variable.

use log::debug;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::error::{SimError, SimResult};

/// Lifecycle phase of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    /// Constructed, no thread yet
    Idle,
    /// Thread spawned and not asked to stop
    Running,
    /// Stop requested
    Stopping,
}

/// Result of a cancellable wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full duration passed
    Elapsed,
    /// Stop was requested before the duration passed
    Cancelled,
}

impl WaitOutcome {
    pub fn is_cancelled(self) -> bool {
        self == WaitOutcome::Cancelled
    }
}

#[derive(Debug)]
struct Lifecycle {
    phase: WorkerPhase,
    /// Set once the thread has seen the stop request or exited
    acknowledged: bool,
}

#[derive(Debug)]
struct Signal {
    lifecycle: Mutex<Lifecycle>,
    changed: Condvar,
}

impl Signal {
    fn acknowledge(&self, lifecycle: &mut MutexGuard<'_, Lifecycle>) {
        if !lifecycle.acknowledged {
            lifecycle.acknowledged = true;
            self.changed.notify_all();
        }
    }
}

/// Thread-side view of a worker's stop signal
#[derive(Debug, Clone)]
pub struct StopToken {
    signal: Arc<Signal>,
}

impl StopToken {
    /// Loop guard for a worker body
    ///
    /// Returns `false` once stop has been requested. Observing the request
    /// here acknowledges it to the stopping thread.
    pub fn is_running(&self) -> bool {
        let mut lifecycle = self.signal.lifecycle.lock();
        if lifecycle.phase == WorkerPhase::Stopping {
            self.signal.acknowledge(&mut lifecycle);
            return false;
        }
        true
    }

    /// Sleep for `duration`, returning early if stop is requested
    pub fn wait_for(&self, duration: Duration) -> WaitOutcome {
        let deadline = Instant::now().checked_add(duration);
        let mut lifecycle = self.signal.lifecycle.lock();

        while lifecycle.phase != WorkerPhase::Stopping {
            match deadline {
                Some(deadline) => {
                    if self
                        .signal
                        .changed
                        .wait_until(&mut lifecycle, deadline)
                        .timed_out()
                    {
                        break;
                    }
                }
                None => self.signal.changed.wait(&mut lifecycle),
            }
        }

        if lifecycle.phase == WorkerPhase::Stopping {
            self.signal.acknowledge(&mut lifecycle);
            WaitOutcome::Cancelled
        } else {
            WaitOutcome::Elapsed
        }
    }
}

/// Marks the worker as acknowledged when its thread exits, even on panic
struct ExitGuard(Arc<Signal>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let mut lifecycle = self.0.lifecycle.lock();
        self.0.acknowledge(&mut lifecycle);
    }
}

/// A single thread of execution with a start/stop/join lifecycle
#[derive(Debug)]
pub struct Worker {
    name: String,
    signal: Arc<Signal>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signal: Arc::new(Signal {
                lifecycle: Mutex::new(Lifecycle {
                    phase: WorkerPhase::Idle,
                    acknowledged: false,
                }),
                changed: Condvar::new(),
            }),
            handle: None,
        }
    }

    pub fn phase(&self) -> WorkerPhase {
        self.signal.lifecycle.lock().phase
    }

    /// Spawn the worker thread running `body`
    ///
    /// A worker can only be started once; later calls return
    /// [`SimError::AlreadyStarted`].
    pub fn start<F>(&mut self, body: F) -> SimResult<()>
    where
        F: FnOnce(StopToken) + Send + 'static,
    {
        {
            let mut lifecycle = self.signal.lifecycle.lock();
            if lifecycle.phase != WorkerPhase::Idle {
                return Err(SimError::AlreadyStarted(self.name.clone()));
            }
            lifecycle.phase = WorkerPhase::Running;
            lifecycle.acknowledged = false;
        }

        let token = StopToken {
            signal: Arc::clone(&self.signal),
        };
        let guard = ExitGuard(Arc::clone(&self.signal));

        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                let _guard = guard;
                body(token);
            });

        match spawned {
            Ok(handle) => {
                debug!("{} started", self.name);
                self.handle = Some(handle);
                Ok(())
            }
            Err(source) => {
                self.signal.lifecycle.lock().phase = WorkerPhase::Idle;
                Err(SimError::Spawn {
                    entity: self.name.clone(),
                    source,
                })
            }
        }
    }

    /// Request the thread to stop and wait until it has noticed
    ///
    /// Wakes the thread if it is inside [`StopToken::wait_for`]. Does not join.
    /// Calling this more than once, or on a worker that never started, is fine.
    pub fn stop(&self) {
        let mut lifecycle = self.signal.lifecycle.lock();
        match lifecycle.phase {
            WorkerPhase::Idle => {
                lifecycle.phase = WorkerPhase::Stopping;
                lifecycle.acknowledged = true;
                return;
            }
            WorkerPhase::Running => {
                lifecycle.phase = WorkerPhase::Stopping;
                self.signal.changed.notify_all();
            }
            WorkerPhase::Stopping => {}
        }

        while !lifecycle.acknowledged {
            self.signal.changed.wait(&mut lifecycle);
        }
        debug!("{} acknowledged stop", self.name);
    }

    /// Wait for the thread to exit
    ///
    /// Joining a worker that was never started or was already joined does
    /// nothing.
    pub fn join(&mut self) -> SimResult<()> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SimError::WorkerPanicked(self.name.clone())),
            None => Ok(()),
        }
    }

    pub fn is_joined(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
            let _ = self.join();
        }
    }
}
