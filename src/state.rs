//! Shared run state and live-tunable reconstruction parameters.
//!
//! The run state replaces sleep-and-recheck pause polling with a
//! mutex+condvar pair: the reconstruction thread blocks on the condvar
//! while paused and wakes on the next transition. Tunable parameters live
//! in an observed-value cell; the worker takes one snapshot per loop
//! iteration instead of reading shared fields mid-frame.

use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::time::Duration;

use crate::config::ReconstructionConfig;

/// Lifecycle phase of the reconstruction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No dataset processed yet.
    Idle,
    /// Actively processing frames.
    Running,
    /// Frame processing suspended; resumable.
    Paused,
    /// Terminal: the run is over and will not restart.
    Done,
}

/// Condvar-backed phase cell shared between the control surface and the
/// reconstruction thread.
pub struct RunState {
    phase: Mutex<RunPhase>,
    changed: Condvar,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        Self {
            phase: Mutex::new(RunPhase::Idle),
            changed: Condvar::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RunPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set(&self, phase: RunPhase) {
        let mut guard = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        *guard = phase;
        self.changed.notify_all();
    }

    /// Mark the run as actively processing. Ignored once Done.
    pub fn start(&self) {
        let mut guard = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        if *guard != RunPhase::Done {
            *guard = RunPhase::Running;
            self.changed.notify_all();
        }
    }

    /// Suspend frame processing. Only meaningful while Running.
    pub fn pause(&self) {
        let mut guard = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        if *guard == RunPhase::Running {
            *guard = RunPhase::Paused;
            self.changed.notify_all();
        }
    }

    /// Resume after a pause.
    pub fn resume(&self) {
        let mut guard = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        if *guard == RunPhase::Paused {
            *guard = RunPhase::Running;
            self.changed.notify_all();
        }
    }

    /// Enter the terminal phase, waking every waiter.
    pub fn finish(&self) {
        self.set(RunPhase::Done);
    }

    /// Block while paused; returns the phase that ended the wait.
    pub fn wait_if_paused(&self) -> RunPhase {
        let mut guard = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        while *guard == RunPhase::Paused {
            guard = self.changed.wait(guard).unwrap_or_else(|e| e.into_inner());
        }
        *guard
    }

    /// Block up to `timeout`, returning early if the run finishes.
    ///
    /// Used for the dataset-directory retry delay so shutdown interrupts
    /// the wait instead of sleeping it out.
    pub fn wait_done_timeout(&self, timeout: Duration) -> RunPhase {
        let guard = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        let (guard, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |phase| *phase != RunPhase::Done)
            .unwrap_or_else(|e| e.into_inner());
        *guard
    }
}

/// Reconstruction parameters adjustable while the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Depth image scale factor (raw units per meter).
    pub depth_scale: f32,
    /// Maximum depth considered valid (meters).
    pub depth_max: f32,
    /// Truncation distance multiplier for integration.
    pub trunc_multiplier: f32,
    /// Frames between snapshot mesh extractions.
    pub mesh_interval: u32,
    /// Whether periodic snapshot meshes are extracted at all. The final
    /// per-dataset mesh is unaffected.
    pub snapshots_enabled: bool,
}

impl From<&ReconstructionConfig> for Tuning {
    fn from(config: &ReconstructionConfig) -> Self {
        Self {
            depth_scale: config.depth_scale,
            depth_max: config.depth_max,
            trunc_multiplier: config.trunc_multiplier,
            mesh_interval: config.mesh_interval,
            snapshots_enabled: true,
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::from(&ReconstructionConfig::default())
    }
}

/// Thread-safe observed-value cell for `Tuning`.
///
/// Writers mutate through `update`; the reconstruction thread calls
/// `snapshot` once per frame and works from the copy.
#[derive(Clone)]
pub struct TuningCell {
    inner: Arc<RwLock<Tuning>>,
}

impl TuningCell {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tuning)),
        }
    }

    /// Copy of the current parameters.
    pub fn snapshot(&self) -> Tuning {
        *self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply a mutation atomically.
    pub fn update(&self, f: impl FnOnce(&mut Tuning)) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}
