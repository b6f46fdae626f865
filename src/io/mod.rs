//! Network I/O: the outbound mesh stream.

pub mod sender;

pub use sender::{MeshSender, SendPolicy};
