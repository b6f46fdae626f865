//! Reconstruction engine boundary.
//!
//! The volumetric fusion, frame-to-model tracking, and mesh extraction all
//! live behind this trait; the pipeline only ever sees poses and meshes.
//! Deployments implement `ReconstructionEngine` over their SLAM library;
//! the bundled `MockEngine` stands in for tests and demos.

pub mod mock;

pub use mock::MockEngine;

use thiserror::Error;

use crate::core::pose::Pose;
use crate::core::types::{RawMesh, RgbdFrame};
use crate::state::Tuning;

/// Engine errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("tracking failed: {0}")]
    Tracking(String),

    #[error("integration failed: {0}")]
    Integration(String),

    #[error("mesh extraction failed: {0}")]
    Extraction(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Black-box dense reconstruction engine.
///
/// The driver calls `reset` once per dataset, then per frame `track`
/// (frames after the first) and `integrate`, and `extract_mesh` whenever a
/// snapshot or final mesh is due. A tracking failure on one frame is
/// recoverable: the driver logs it, keeps the previous pose, and moves on.
pub trait ReconstructionEngine: Send {
    /// Discard model state before a new dataset.
    fn reset(&mut self) -> Result<()>;

    /// Estimate the frame-to-model transform delta for `frame`.
    fn track(&mut self, frame: &RgbdFrame, tuning: &Tuning) -> Result<Pose>;

    /// Fuse `frame` into the volumetric model at `pose`.
    fn integrate(&mut self, frame: &RgbdFrame, pose: &Pose, tuning: &Tuning) -> Result<()>;

    /// Extract the current surface as a triangle mesh.
    ///
    /// The returned mesh may contain vertices no triangle references;
    /// compaction is the caller's job.
    fn extract_mesh(&mut self) -> Result<RawMesh>;
}
