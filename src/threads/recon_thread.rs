//! Reconstruction thread: dataset polling, engine driving, mesh delivery.
//!
//! The outer loop walks numbered scene directories under the dataset root.
//! A missing directory is retried once after a fixed delay (interruptible
//! by shutdown), then the loop terminates; the retry counter resets after
//! every successfully processed dataset. The inner loop tracks and
//! integrates each frame, extracting a snapshot mesh every `mesh_interval`
//! frames and one final mesh per dataset.
//!
//! This thread never touches the network: meshes are compacted here and
//! handed to the delivery queue, so network stalls cannot slow tracking.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::{AppConfig, DatasetConfig};
use crate::core::pose::Pose;
use crate::dataset::{self, DatasetSource, Scene};
use crate::delivery::DeliverySender;
use crate::engine::ReconstructionEngine;
use crate::mesh;
use crate::state::{RunPhase, RunState, TuningCell};

/// Driver-local configuration snapshot.
#[derive(Debug, Clone)]
pub struct ReconThreadConfig {
    /// Delay before re-checking a missing dataset directory.
    pub retry_delay: Duration,
    /// Directory receiving per-scene trajectory logs.
    pub trajectory_dir: PathBuf,
}

impl From<&DatasetConfig> for ReconThreadConfig {
    fn from(config: &DatasetConfig) -> Self {
        Self {
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            trajectory_dir: PathBuf::from(&config.trajectory_dir),
        }
    }
}

impl From<&AppConfig> for ReconThreadConfig {
    fn from(config: &AppConfig) -> Self {
        Self::from(&config.dataset)
    }
}

/// Reconstruction thread handle.
pub struct ReconThread {
    handle: JoinHandle<()>,
}

impl ReconThread {
    /// Spawn the reconstruction thread.
    ///
    /// When the outer loop ends (datasets exhausted or shutdown), the
    /// thread marks the run `Done` and pushes the queue poison pill so
    /// the sender drains and exits.
    pub fn spawn(
        engine: Box<dyn ReconstructionEngine>,
        source: DatasetSource,
        config: ReconThreadConfig,
        tuning: TuningCell,
        run_state: Arc<RunState>,
        queue: DeliverySender,
        running: Arc<AtomicBool>,
    ) -> Self {
        let handle = thread::Builder::new()
            .name("reconstruction".into())
            .spawn(move || {
                run_recon_loop(engine, source, config, tuning, run_state, queue, running);
            })
            .expect("Failed to spawn reconstruction thread");

        Self { handle }
    }

    /// Wait for the thread to finish.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

fn run_recon_loop(
    mut engine: Box<dyn ReconstructionEngine>,
    mut source: DatasetSource,
    config: ReconThreadConfig,
    tuning: TuningCell,
    run_state: Arc<RunState>,
    queue: DeliverySender,
    running: Arc<AtomicBool>,
) {
    log::info!("Reconstruction thread started");
    let mut awaiting_retry = false;

    while running.load(Ordering::Relaxed) && run_state.phase() != RunPhase::Done {
        let scene_dir = source.current_dir();

        if !scene_dir.exists() {
            if awaiting_retry {
                log::info!(
                    "Dataset directory {} still missing, stopping",
                    scene_dir.display()
                );
                break;
            }
            log::warn!(
                "Dataset directory {} not found, retrying in {:?}",
                scene_dir.display(),
                config.retry_delay
            );
            awaiting_retry = true;
            if run_state.wait_done_timeout(config.retry_delay) == RunPhase::Done {
                break;
            }
            continue;
        }

        let scene = match Scene::load(source.current_index(), &scene_dir) {
            Ok(scene) => scene,
            Err(e) => {
                log::error!("Failed to load dataset {}: {}", scene_dir.display(), e);
                break;
            }
        };
        awaiting_retry = false;

        log::info!("Start dataset #{} ({} frames)", scene.index, scene.len());
        run_state.start();

        if let Err(e) = process_scene(
            engine.as_mut(),
            &scene,
            &config,
            &tuning,
            &run_state,
            &queue,
            &running,
        ) {
            log::error!("Dataset #{} aborted: {}", scene.index, e);
        }

        source.advance();
    }

    run_state.finish();
    queue.shutdown();
    log::info!("Reconstruction thread exiting");
}

fn process_scene(
    engine: &mut dyn ReconstructionEngine,
    scene: &Scene,
    config: &ReconThreadConfig,
    tuning: &TuningCell,
    run_state: &RunState,
    queue: &DeliverySender,
    running: &AtomicBool,
) -> dataset::Result<()> {
    if let Err(e) = engine.reset() {
        log::error!("Engine reset failed, dataset skipped: {}", e);
        return Ok(());
    }

    let mut pose = Pose::identity();
    let mut poses: Vec<Pose> = Vec::with_capacity(scene.len());
    let mut last_snapshot: Option<usize> = None;

    for idx in 0..scene.len() {
        if !running.load(Ordering::Relaxed) {
            break;
        }
        if run_state.wait_if_paused() == RunPhase::Done {
            break;
        }

        let params = tuning.snapshot();
        let frame = scene.load_frame(idx)?;

        if idx > 0 {
            match engine.track(&frame, &params) {
                Ok(delta) => pose = pose.compose(&delta),
                // Pose keeps its previous value; reconstruction continues.
                Err(e) => log::warn!("Tracking failed at frame {}: {}", idx, e),
            }
        }
        poses.push(pose);

        if let Err(e) = engine.integrate(&frame, &pose, &params) {
            log::warn!("Integration failed at frame {}: {}", idx, e);
            continue;
        }

        let interval = params.mesh_interval.max(1) as usize;
        let is_last = idx + 1 == scene.len();
        if params.snapshots_enabled && (idx % interval == 0 || is_last) {
            extract_and_enqueue(engine, queue);
            last_snapshot = Some(idx);
        }
    }

    // One final mesh per dataset, skipped when the last frame already
    // produced a snapshot.
    if scene.is_empty() || last_snapshot != Some(scene.len() - 1) {
        extract_and_enqueue(engine, queue);
    }

    write_trajectory(&config.trajectory_dir, scene.index, &poses)?;
    Ok(())
}

fn extract_and_enqueue(engine: &mut dyn ReconstructionEngine, queue: &DeliverySender) {
    match engine.extract_mesh() {
        Ok(raw) => {
            let compacted = mesh::compact(&raw);
            log::debug!(
                "Compacted mesh: {} -> {} vertices, {} triangles",
                raw.vertex_count(),
                compacted.vertex_count(),
                compacted.triangle_count()
            );
            queue.send_mesh(compacted);
        }
        Err(e) => log::error!("Mesh extraction failed: {}", e),
    }
}

/// Write one pose per line: frame index followed by the 16 row-major
/// matrix elements.
fn write_trajectory(dir: &Path, scene_index: usize, poses: &[Pose]) -> dataset::Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("scene_{}.log", scene_index));
    let mut writer = BufWriter::new(File::create(&path)?);

    for (idx, pose) in poses.iter().enumerate() {
        write!(writer, "{}", idx)?;
        for value in &pose.m {
            write!(writer, " {:.6}", value)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;

    log::info!("Saved trajectory ({} poses) to {}", poses.len(), path.display());
    Ok(())
}
