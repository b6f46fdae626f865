//! Sender thread: delivery queue to TCP stream.

use std::thread::{self, JoinHandle};

use crate::delivery::{DeliveryReceiver, QueueItem};
use crate::io::sender::MeshSender;
use crate::wire;

/// Sender thread handle.
pub struct SenderThread {
    handle: JoinHandle<()>,
}

impl SenderThread {
    /// Spawn the sender thread.
    ///
    /// The thread drains the queue in FIFO order until the poison pill
    /// arrives, encoding meshes that were enqueued unencoded. The TCP
    /// connection is owned exclusively by this thread.
    pub fn spawn(receiver: DeliveryReceiver, sender: MeshSender) -> Self {
        let handle = thread::Builder::new()
            .name("mesh-sender".into())
            .spawn(move || run_sender_loop(receiver, sender))
            .expect("Failed to spawn sender thread");

        Self { handle }
    }

    /// Wait for the thread to finish.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

fn run_sender_loop(receiver: DeliveryReceiver, mut sender: MeshSender) {
    log::info!("Sender thread started");

    while let Some(item) = receiver.recv() {
        let frame = match item {
            QueueItem::Frame(frame) => frame,
            QueueItem::Mesh(mesh) => match wire::encode(&mesh) {
                Ok(frame) => frame,
                Err(e) => {
                    // An upstream mesh defect, not a transient condition:
                    // surfaced per frame, never silently truncated.
                    log::error!("Mesh encoding failed, frame skipped: {}", e);
                    continue;
                }
            },
        };
        sender.send(&frame);
    }

    log::info!(
        "Sender thread exiting ({} frames sent, {} dropped)",
        sender.frames_sent(),
        sender.frames_dropped()
    );
}
