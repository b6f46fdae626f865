//! Dataset directory polling and RGB-D frame loading.
//!
//! Datasets arrive as numbered directories under a common root:
//!
//! ```text
//! <root>/scene_1/depth/*.png   <root>/scene_1/color/*.jpg
//! <root>/scene_2/depth/*.png   <root>/scene_2/color/*.jpg
//! ```
//!
//! Depth and color files are paired by sorted filename order, so the two
//! subdirectories must hold the same number of files. Image contents are
//! passed through undecoded; the reconstruction engine owns pixel formats.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::RgbdFrame;

/// Dataset errors.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("depth/color frame count mismatch: {depth} depth vs {color} color files")]
    PairMismatch { depth: usize, color: usize },
}

pub type Result<T> = std::result::Result<T, DatasetError>;

/// Iterator-like cursor over numbered scene directories.
pub struct DatasetSource {
    root: PathBuf,
    next_index: usize,
}

impl DatasetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            next_index: 1,
        }
    }

    /// Directory the next scene is expected in (it may not exist yet).
    pub fn current_dir(&self) -> PathBuf {
        self.root.join(format!("scene_{}", self.next_index))
    }

    /// Index of the scene `current_dir` points at (1-based).
    pub fn current_index(&self) -> usize {
        self.next_index
    }

    /// Move the cursor to the next scene.
    pub fn advance(&mut self) {
        self.next_index += 1;
    }
}

/// One fully listed scene: paired depth and color file paths.
pub struct Scene {
    /// 1-based dataset index.
    pub index: usize,
    depth_files: Vec<PathBuf>,
    color_files: Vec<PathBuf>,
}

impl Scene {
    /// List a scene directory and pair its frames.
    pub fn load(index: usize, dir: &Path) -> Result<Self> {
        let depth_files = sorted_files(&dir.join("depth"))?;
        let color_files = sorted_files(&dir.join("color"))?;

        if depth_files.len() != color_files.len() {
            return Err(DatasetError::PairMismatch {
                depth: depth_files.len(),
                color: color_files.len(),
            });
        }

        Ok(Self {
            index,
            depth_files,
            color_files,
        })
    }

    /// Number of frame pairs.
    pub fn len(&self) -> usize {
        self.depth_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth_files.is_empty()
    }

    /// Read the frame pair at `index` into memory.
    pub fn load_frame(&self, index: usize) -> Result<RgbdFrame> {
        Ok(RgbdFrame {
            index,
            depth: fs::read(&self.depth_files[index])?,
            color: fs::read(&self.color_files[index])?,
        })
    }
}

/// Regular files in `dir`, sorted by filename.
fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}
