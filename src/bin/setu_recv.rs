//! Mesh stream receiver.
//!
//! Debugging counterpart to the SetuStream daemon: listens on the mesh
//! port, reads self-delimiting frames off each connection, decodes them,
//! and logs mesh statistics. Clients are served one at a time.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin setu-recv -- --bind 0.0.0.0:65432
//! ```

use std::io::{self, Read};
use std::net::{TcpListener, TcpStream};

use clap::Parser;

use setu_stream::wire::{self, FRAME_OVERHEAD};

/// Upper bound on a plausible frame, guarding against garbage length
/// fields from a misbehaving peer (1 GiB).
const MAX_FRAME_BYTES: usize = 1 << 30;

#[derive(Parser)]
#[command(name = "setu-recv")]
#[command(about = "Receive and decode a SetuStream mesh stream")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "127.0.0.1:65432")]
    bind: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let listener = match TcpListener::bind(&args.bind) {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind {}: {}", args.bind, e);
            std::process::exit(1);
        }
    };
    log::info!("Listening on {}", args.bind);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let peer = stream
                    .peer_addr()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|_| "unknown".to_string());
                log::info!("Client connected: {}", peer);
                if let Err(e) = handle_client(stream) {
                    log::warn!("Client {} ended with error: {}", peer, e);
                } else {
                    log::info!("Client {} disconnected", peer);
                }
            }
            Err(e) => log::warn!("Accept failed: {}", e),
        }
    }
}

/// Read frames back-to-back until the peer closes the connection.
fn handle_client(mut stream: TcpStream) -> io::Result<()> {
    let mut frame_count = 0u64;

    loop {
        let mut len_bytes = [0u8; 4];
        match stream.read_exact(&mut len_bytes) {
            Ok(()) => {}
            // Clean end of stream between frames.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e),
        }

        let total = i32::from_le_bytes(len_bytes);
        if !(FRAME_OVERHEAD as i32..=MAX_FRAME_BYTES as i32).contains(&total) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("implausible frame length {}", total),
            ));
        }

        let mut frame = vec![0u8; total as usize];
        frame[..4].copy_from_slice(&len_bytes);
        stream.read_exact(&mut frame[4..])?;

        match wire::decode(&frame) {
            Ok(mesh) => {
                frame_count += 1;
                log::info!(
                    "Frame #{}: {} vertices, {} triangles ({} bytes)",
                    frame_count,
                    mesh.vertex_count(),
                    mesh.triangle_count(),
                    frame.len()
                );
            }
            Err(e) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("frame decode failed: {}", e),
                ));
            }
        }
    }
}
