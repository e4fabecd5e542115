//! Hooks the caller injects into a simulation run: a progress observer
//! receiving per-iteration status, and a stop condition polled once per
//! iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Receives `(active_cell_ratio, iterations)` after every iteration.
pub trait ProgressObserver {
    fn on_iteration(&mut self, active_cell_ratio: f64, iterations: u64);
}

/// Observer that ignores all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_iteration(&mut self, _active_cell_ratio: f64, _iterations: u64) {}
}

/// Observer that emits a `log` record every `every` iterations.
#[derive(Debug, Clone, Copy)]
pub struct LogProgress {
    every: u64,
}

impl LogProgress {
    /// `every` is clamped to at least 1.
    pub fn every(every: u64) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::every(100)
    }
}

impl ProgressObserver for LogProgress {
    fn on_iteration(&mut self, active_cell_ratio: f64, iterations: u64) {
        if iterations % self.every == 0 {
            log::info!("ACR: {active_cell_ratio:.2e}, ITR: {iterations:07}");
        }
    }
}

impl<F: FnMut(f64, u64)> ProgressObserver for F {
    fn on_iteration(&mut self, active_cell_ratio: f64, iterations: u64) {
        self(active_cell_ratio, iterations)
    }
}

/// Decides, before each iteration, whether a run should give up.
///
/// `iterations` is the number of iterations completed so far.
pub trait StopCondition {
    fn should_stop(&self, iterations: u64) -> bool;
}

/// Never stops; the run ends only on convergence.
#[derive(Debug, Default, Clone, Copy)]
pub struct Never;

impl StopCondition for Never {
    fn should_stop(&self, _iterations: u64) -> bool {
        false
    }
}

/// Stops once the engine has completed the given number of iterations.
#[derive(Debug, Clone, Copy)]
pub struct IterationLimit(pub u64);

impl StopCondition for IterationLimit {
    fn should_stop(&self, iterations: u64) -> bool {
        iterations >= self.0
    }
}

/// Stops once a wall-clock deadline has passed.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(pub Instant);

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }
}

impl StopCondition for Deadline {
    fn should_stop(&self, _iterations: u64) -> bool {
        Instant::now() >= self.0
    }
}

/// Shared cancellation flag, settable from another thread or a signal handler.
#[derive(Debug, Default, Clone)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl StopCondition for CancelFlag {
    fn should_stop(&self, _iterations: u64) -> bool {
        self.is_cancelled()
    }
}

impl<F: Fn(u64) -> bool> StopCondition for F {
    fn should_stop(&self, iterations: u64) -> bool {
        self(iterations)
    }
}
