//! Worker threads for the streaming pipeline.
//!
//! Two threads run alongside the caller:
//! - `ReconThread`: polls dataset directories, drives the reconstruction
//!   engine, compacts and enqueues meshes
//! - `SenderThread`: drains the delivery queue onto the TCP connection
//!
//! The delivery queue is the only resource they share, which is what keeps
//! a stalled network consumer from ever delaying reconstruction.

mod recon_thread;
mod sender_thread;

pub use recon_thread::{ReconThread, ReconThreadConfig};
pub use sender_thread::SenderThread;
