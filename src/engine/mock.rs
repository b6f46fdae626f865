//! Synthetic reconstruction engine for tests and demos.
//!
//! Follows the mock-device pattern used for hardware-free development:
//! deterministic output, scriptable failures, no external dependencies.

use std::collections::HashSet;

use super::{EngineError, ReconstructionEngine, Result};
use crate::core::pose::Pose;
use crate::core::types::{RawMesh, RgbdFrame};
use crate::state::Tuning;

/// Forward motion per tracked frame (meters).
const STEP_X: f32 = 0.01;

/// Deterministic stand-in for a dense SLAM engine.
///
/// Each integrated frame appends one quad to the synthetic surface, and
/// every extracted quad carries one deliberately unreferenced vertex so
/// downstream compaction always has work to do. Tracking failures can be
/// scripted per frame index.
pub struct MockEngine {
    integrated: usize,
    fail_tracking_at: HashSet<usize>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            integrated: 0,
            fail_tracking_at: HashSet::new(),
        }
    }

    /// Engine that fails tracking at the given frame indices.
    pub fn with_tracking_failures(frames: impl IntoIterator<Item = usize>) -> Self {
        Self {
            integrated: 0,
            fail_tracking_at: frames.into_iter().collect(),
        }
    }

    /// Frames integrated since the last reset.
    pub fn integrated_frames(&self) -> usize {
        self.integrated
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconstructionEngine for MockEngine {
    fn reset(&mut self) -> Result<()> {
        self.integrated = 0;
        Ok(())
    }

    fn track(&mut self, frame: &RgbdFrame, _tuning: &Tuning) -> Result<Pose> {
        if self.fail_tracking_at.contains(&frame.index) {
            return Err(EngineError::Tracking(format!(
                "scripted failure at frame {}",
                frame.index
            )));
        }
        Ok(Pose::from_translation(STEP_X, 0.0, 0.0))
    }

    fn integrate(&mut self, _frame: &RgbdFrame, _pose: &Pose, _tuning: &Tuning) -> Result<()> {
        self.integrated += 1;
        Ok(())
    }

    fn extract_mesh(&mut self) -> Result<RawMesh> {
        let quads = self.integrated;
        let mut vertices = Vec::with_capacity(quads * 5);
        let mut triangles = Vec::with_capacity(quads * 2);
        let mut colors = Vec::with_capacity(quads * 5);

        for q in 0..quads {
            let base = (q * 5) as u32;
            let x = q as f32 * STEP_X;

            vertices.push([x, 0.0, 0.0]);
            vertices.push([x + STEP_X, 0.0, 0.0]);
            vertices.push([x + STEP_X, 1.0, 0.0]);
            vertices.push([x, 1.0, 0.0]);
            // Padding vertex no triangle references, mimicking the
            // over-allocated extraction buffer of a real engine.
            vertices.push([f32::MAX, f32::MAX, f32::MAX]);

            triangles.push([base, base + 1, base + 2]);
            triangles.push([base, base + 2, base + 3]);

            let shade = q as f32 / quads.max(1) as f32;
            for _ in 0..5 {
                colors.push([shade, 1.0 - shade, 0.5]);
            }
        }

        Ok(RawMesh {
            vertices,
            triangles,
            colors,
        })
    }
}
