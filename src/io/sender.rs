//! Outbound TCP mesh sender.
//!
//! Owns the one persistent connection to the downstream mesh consumer.
//! The connection is established eagerly, before any frame is sent, and
//! frames are written back-to-back in FIFO order. This is fire-and-forget
//! streaming: there is no acknowledgment path from the peer.
//!
//! Failure handling is an explicit, tunable policy instead of a blanket
//! catch-and-continue: each frame gets a bounded number of attempts with
//! exponential backoff, reconnecting before every retry, and is dropped
//! with a warning once attempts are exhausted. Transport errors never
//! propagate upstream, so reconstruction keeps its isolation from the
//! network.

use std::io::Write;
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use crate::wire::WireFrame;

/// Per-frame send/retry policy.
#[derive(Debug, Clone)]
pub struct SendPolicy {
    /// Attempts per frame before dropping it. Must be at least 1.
    pub max_attempts: u32,
    /// Backoff before the first retry; doubles on each subsequent retry.
    pub initial_backoff: Duration,
}

impl SendPolicy {
    /// Single attempt, no retry: a failed write drops the frame
    /// immediately.
    pub fn drop_on_failure() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
        }
    }
}

impl Default for SendPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

/// TCP sender for encoded mesh frames.
pub struct MeshSender {
    stream: TcpStream,
    peer: String,
    policy: SendPolicy,
    frames_sent: u64,
    frames_dropped: u64,
}

impl MeshSender {
    /// Connect eagerly to the downstream consumer.
    pub fn connect(peer: &str, policy: SendPolicy) -> std::io::Result<Self> {
        let stream = TcpStream::connect(peer)?;
        stream.set_nodelay(true).ok();
        log::info!("Mesh sender connected to {}", peer);

        Ok(Self {
            stream,
            peer: peer.to_string(),
            policy,
            frames_sent: 0,
            frames_dropped: 0,
        })
    }

    /// Write one frame, applying the retry policy.
    ///
    /// Returns true when the frame went out. A failed write leaves the
    /// frame boundary on the stream unknown, so every retry reconnects
    /// before resending the whole frame.
    pub fn send(&mut self, frame: &WireFrame) -> bool {
        let attempts = self.policy.max_attempts.max(1);
        let mut backoff = self.policy.initial_backoff;

        for attempt in 1..=attempts {
            match self.write_frame(frame) {
                Ok(()) => {
                    self.frames_sent += 1;
                    log::debug!(
                        "Sent frame #{} ({} bytes) to {}",
                        self.frames_sent,
                        frame.len(),
                        self.peer
                    );
                    return true;
                }
                Err(e) => {
                    log::warn!(
                        "Send to {} failed (attempt {}/{}): {}",
                        self.peer,
                        attempt,
                        attempts,
                        e
                    );
                    if attempt < attempts {
                        thread::sleep(backoff);
                        backoff *= 2;
                        self.reconnect();
                    }
                }
            }
        }

        self.frames_dropped += 1;
        log::warn!(
            "Dropping frame after {} attempts ({} dropped so far)",
            attempts,
            self.frames_dropped
        );
        false
    }

    fn write_frame(&mut self, frame: &WireFrame) -> std::io::Result<()> {
        self.stream.write_all(frame.as_bytes())?;
        self.stream.flush()
    }

    fn reconnect(&mut self) {
        match TcpStream::connect(&self.peer) {
            Ok(stream) => {
                stream.set_nodelay(true).ok();
                self.stream = stream;
                log::info!("Reconnected to {}", self.peer);
            }
            Err(e) => log::warn!("Reconnect to {} failed: {}", self.peer, e),
        }
    }

    /// Frames successfully written since connect.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Frames dropped after exhausting the retry policy.
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RawMesh;
    use crate::mesh::compact;
    use crate::wire::encode;
    use std::io::Read;
    use std::net::TcpListener;

    #[test]
    fn test_send_writes_frame_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let mesh = compact(&RawMesh {
            vertices: vec![[0.0; 3]; 3],
            triangles: vec![[0, 1, 2]],
            colors: vec![[1.0, 0.0, 0.0]; 3],
        });
        let frame = encode(&mesh).unwrap();
        let expected = frame.as_bytes().to_vec();

        let mut sender = MeshSender::connect(&addr, SendPolicy::default()).unwrap();
        let (mut peer, _) = listener.accept().unwrap();

        assert!(sender.send(&frame));
        assert_eq!(sender.frames_sent(), 1);
        drop(sender);

        let mut received = Vec::new();
        peer.read_to_end(&mut received).unwrap();
        assert_eq!(received, expected);
    }

    #[test]
    fn test_connect_fails_without_listener() {
        // Port 1 is never listening in the test environment.
        assert!(MeshSender::connect("127.0.0.1:1", SendPolicy::default()).is_err());
    }
}
