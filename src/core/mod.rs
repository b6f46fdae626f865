//! Core foundation types shared by every layer.

pub mod pose;
pub mod types;

pub use pose::Pose;
pub use types::{CompactMesh, RawMesh, RgbdFrame};
