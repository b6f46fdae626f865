//! Delivery queue decoupling mesh production from network transmission.
//!
//! Unbounded FIFO: `send` never blocks the reconstruction thread and never
//! drops, so a slow or stalled network consumer can never delay scene
//! reconstruction (memory is the only limit, by design). `recv` blocks the
//! consumer until an item is available.
//!
//! Shutdown travels through the same channel as data: `shutdown()` pushes a
//! poison pill behind every pending item, and a receiver that observes it
//! re-sends it so each consumer of a shared queue wakes exactly once. The
//! queue is single-producer/single-consumer in this system but safe for
//! single-producer/multi-consumer use.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::core::types::CompactMesh;
use crate::wire::WireFrame;

/// A unit of work for the sender: either a mesh still to be encoded or an
/// already-encoded frame.
#[derive(Debug)]
pub enum QueueItem {
    /// Compacted mesh awaiting encoding on the consumer side.
    Mesh(CompactMesh),
    /// Pre-encoded wire frame.
    Frame(WireFrame),
}

#[derive(Debug)]
enum Envelope {
    Item(QueueItem),
    Shutdown,
}

/// Producer half of the delivery queue.
#[derive(Clone)]
pub struct DeliverySender {
    tx: Sender<Envelope>,
}

impl DeliverySender {
    /// Enqueue a compacted mesh. Never blocks.
    pub fn send_mesh(&self, mesh: CompactMesh) {
        if self.tx.send(Envelope::Item(QueueItem::Mesh(mesh))).is_err() {
            log::trace!("Delivery queue closed, mesh discarded");
        }
    }

    /// Enqueue an already-encoded frame. Never blocks.
    pub fn send_frame(&self, frame: WireFrame) {
        if self.tx.send(Envelope::Item(QueueItem::Frame(frame))).is_err() {
            log::trace!("Delivery queue closed, frame discarded");
        }
    }

    /// Push the poison pill behind all pending items.
    pub fn shutdown(&self) {
        self.tx.send(Envelope::Shutdown).ok();
    }
}

/// Consumer half of the delivery queue.
#[derive(Clone)]
pub struct DeliveryReceiver {
    rx: Receiver<Envelope>,
    // Held to re-propagate the poison pill to sibling consumers.
    tx: Sender<Envelope>,
}

impl DeliveryReceiver {
    /// Block until the next item is available.
    ///
    /// Returns `None` once the poison pill is observed; the pill is
    /// re-sent first so sibling consumers also wake.
    pub fn recv(&self) -> Option<QueueItem> {
        match self.rx.recv() {
            Ok(Envelope::Item(item)) => Some(item),
            Ok(Envelope::Shutdown) => {
                self.tx.send(Envelope::Shutdown).ok();
                None
            }
            Err(_) => None,
        }
    }

    /// Number of items currently queued (poison pill included, if sent).
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Create a connected producer/consumer pair.
pub fn create_delivery_queue() -> (DeliverySender, DeliveryReceiver) {
    let (tx, rx) = unbounded();
    (
        DeliverySender { tx: tx.clone() },
        DeliveryReceiver { rx, tx },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RawMesh;
    use crate::mesh::compact;
    use std::thread;
    use std::time::Duration;

    fn mesh_with_vertices(n: u32) -> CompactMesh {
        let vertices = (0..n).map(|i| [i as f32, 0.0, 0.0]).collect();
        let colors = vec![[1.0, 1.0, 1.0]; n as usize];
        let triangles = (0..n / 3).map(|t| [t * 3, t * 3 + 1, t * 3 + 2]).collect();
        compact(&RawMesh {
            vertices,
            triangles,
            colors,
        })
    }

    #[test]
    fn test_fifo_ordering_across_threads() {
        let (tx, rx) = create_delivery_queue();

        let producer = thread::spawn(move || {
            for n in [3u32, 6, 9] {
                tx.send_mesh(mesh_with_vertices(n));
                thread::sleep(Duration::from_millis(5));
            }
            tx.shutdown();
        });

        let mut counts = Vec::new();
        while let Some(item) = rx.recv() {
            match item {
                QueueItem::Mesh(mesh) => counts.push(mesh.vertex_count()),
                QueueItem::Frame(_) => panic!("expected meshes only"),
            }
        }

        producer.join().unwrap();
        assert_eq!(counts, vec![3, 6, 9]);
    }

    #[test]
    fn test_shutdown_drains_pending_items_first() {
        let (tx, rx) = create_delivery_queue();

        tx.send_mesh(mesh_with_vertices(3));
        tx.send_mesh(mesh_with_vertices(6));
        tx.shutdown();

        assert!(rx.recv().is_some());
        assert!(rx.recv().is_some());
        assert!(rx.recv().is_none());
    }

    #[test]
    fn test_shutdown_wakes_multiple_consumers() {
        let (tx, rx) = create_delivery_queue();
        let rx2 = rx.clone();

        let a = thread::spawn(move || rx.recv().is_none());
        let b = thread::spawn(move || rx2.recv().is_none());

        tx.shutdown();

        assert!(a.join().unwrap());
        assert!(b.join().unwrap());
    }
}
