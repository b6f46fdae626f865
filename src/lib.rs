//! SetuStream - mesh streaming bridge for dense RGB-D reconstruction
//!
//! Drives a black-box dense reconstruction engine over polled dataset
//! directories and streams every extracted triangle mesh to a downstream
//! TCP consumer, without ever letting network stalls touch the
//! reconstruction loop.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   threads/                          │  ← Worker threads
//! │        (reconstruction driver, sender)              │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │              delivery / io / dataset                │  ← Infrastructure
//! │      (queue, TCP sender, scene polling)             │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                 mesh / wire / engine                │  ← Core pipeline
//! │    (compaction, frame codec, engine boundary)       │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                 (mesh types, pose)                  │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Data Flow
//!
//! Reconstruction driver → `RawMesh` → `mesh::compact` → `CompactMesh` →
//! `wire::encode` → `WireFrame` → delivery queue → sender thread → socket.
//!
//! The delivery queue is the only resource the two worker threads share;
//! the TCP connection belongs to the sender alone. Shutdown travels as a
//! poison pill through the queue, and both threads are joined before exit.

// Layer 1: Core foundation (no internal deps)
pub mod core;

// Layer 2: Core pipeline (depends on core)
pub mod engine;
pub mod mesh;
pub mod wire;

// Layer 3: Shared state and configuration
pub mod config;
pub mod state;

// Layer 4: Infrastructure (queue, network, datasets)
pub mod dataset;
pub mod delivery;
pub mod io;

// Layer 5: Worker threads (depends on all layers)
pub mod threads;

// Convenience re-exports (flat namespace for common use)

pub use config::{AppConfig, ConfigError, DatasetConfig, NetworkConfig, ReconstructionConfig};
pub use core::pose::Pose;
pub use core::types::{CompactMesh, RawMesh, RgbdFrame};
pub use dataset::{DatasetError, DatasetSource, Scene};
pub use delivery::{create_delivery_queue, DeliveryReceiver, DeliverySender, QueueItem};
pub use engine::{EngineError, MockEngine, ReconstructionEngine};
pub use io::sender::{MeshSender, SendPolicy};
pub use mesh::compact;
pub use state::{RunPhase, RunState, Tuning, TuningCell};
pub use threads::{ReconThread, ReconThreadConfig, SenderThread};
pub use wire::{decode, encode, WireError, WireFrame};
