//! Configuration loading for SetuStream.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Main configuration structure.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub reconstruction: ReconstructionConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

/// Dataset polling settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatasetConfig {
    /// Root directory scanned for `scene_N` dataset directories.
    #[serde(default = "default_dataset_root")]
    pub root: String,

    /// Delay before re-checking a missing dataset directory (ms).
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Directory for per-scene trajectory logs.
    #[serde(default = "default_trajectory_dir")]
    pub trajectory_dir: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root: default_dataset_root(),
            retry_delay_ms: default_retry_delay(),
            trajectory_dir: default_trajectory_dir(),
        }
    }
}

/// Outbound mesh stream settings.
#[derive(Clone, Debug, Deserialize)]
pub struct NetworkConfig {
    /// Address of the downstream mesh consumer.
    #[serde(default = "default_server_addr")]
    pub server_addr: String,

    /// Send attempts per frame before dropping it.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the first retry (ms); doubles per retry.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            server_addr: default_server_addr(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
        }
    }
}

/// Reconstruction engine parameters.
///
/// `depth_scale`, `depth_max`, `trunc_multiplier`, and `mesh_interval` seed
/// the live tuning cell; the rest are fixed at engine construction.
#[derive(Clone, Debug, Deserialize)]
pub struct ReconstructionConfig {
    /// Depth image scale factor (raw units per meter).
    #[serde(default = "default_depth_scale")]
    pub depth_scale: f32,

    /// Minimum depth considered valid (meters).
    #[serde(default = "default_depth_min")]
    pub depth_min: f32,

    /// Maximum depth considered valid (meters).
    #[serde(default = "default_depth_max")]
    pub depth_max: f32,

    /// Voxel edge length (meters).
    #[serde(default = "default_voxel_size")]
    pub voxel_size: f32,

    /// Truncation distance multiplier for integration.
    #[serde(default = "default_trunc_multiplier")]
    pub trunc_multiplier: f32,

    /// Estimated voxel block count for the sparse grid.
    #[serde(default = "default_block_count")]
    pub block_count: usize,

    /// Frames between snapshot mesh extractions.
    #[serde(default = "default_mesh_interval")]
    pub mesh_interval: u32,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            depth_scale: default_depth_scale(),
            depth_min: default_depth_min(),
            depth_max: default_depth_max(),
            voxel_size: default_voxel_size(),
            trunc_multiplier: default_trunc_multiplier(),
            block_count: default_block_count(),
            mesh_interval: default_mesh_interval(),
        }
    }
}

fn default_dataset_root() -> String {
    "datasets".to_string()
}

fn default_retry_delay() -> u64 {
    5000
}

fn default_trajectory_dir() -> String {
    "output".to_string()
}

fn default_server_addr() -> String {
    "127.0.0.1:65432".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_depth_scale() -> f32 {
    1000.0
}

fn default_depth_min() -> f32 {
    0.1
}

fn default_depth_max() -> f32 {
    3.0
}

fn default_voxel_size() -> f32 {
    0.0058
}

fn default_trunc_multiplier() -> f32 {
    8.0
}

fn default_block_count() -> usize {
    40000
}

fn default_mesh_interval() -> u32 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.network.server_addr, "127.0.0.1:65432");
        assert_eq!(config.reconstruction.mesh_interval, 50);
        assert_eq!(config.dataset.retry_delay_ms, 5000);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[network]\nserver_addr = \"10.0.0.5:7000\"\n\n[reconstruction]\nmesh_interval = 10"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.network.server_addr, "10.0.0.5:7000");
        assert_eq!(config.network.max_attempts, 3);
        assert_eq!(config.reconstruction.mesh_interval, 10);
        assert_eq!(config.reconstruction.depth_scale, 1000.0);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not toml at all [").unwrap();

        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
