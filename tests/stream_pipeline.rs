//! End-to-end pipeline tests: dataset directory to decoded frames on the
//! receiving side of a real TCP connection.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use setu_stream::wire;
use setu_stream::{
    create_delivery_queue, CompactMesh, DatasetSource, MeshSender, MockEngine, ReconThread,
    ReconThreadConfig, RunState, SendPolicy, SenderThread, Tuning, TuningCell,
};

fn write_scene(root: &Path, scene: usize, frames: usize) {
    for sub in ["depth", "color"] {
        let dir = root.join(format!("scene_{}", scene)).join(sub);
        fs::create_dir_all(&dir).unwrap();
        for i in 0..frames {
            let mut f = File::create(dir.join(format!("{:06}.raw", i))).unwrap();
            f.write_all(&[i as u8; 16]).unwrap();
        }
    }
}

/// Read self-delimiting frames until the sender closes the connection.
fn read_frames(stream: &mut TcpStream) -> Vec<CompactMesh> {
    let mut meshes = Vec::new();

    loop {
        let mut len_bytes = [0u8; 4];
        match stream.read_exact(&mut len_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => panic!("read failed: {}", e),
        }

        let total = i32::from_le_bytes(len_bytes) as usize;
        let mut frame = vec![0u8; total];
        frame[..4].copy_from_slice(&len_bytes);
        stream.read_exact(&mut frame[4..]).unwrap();

        meshes.push(wire::decode(&frame).unwrap());
    }

    meshes
}

fn spawn_pipeline(
    root: &Path,
    trajectory_dir: &Path,
    addr: &str,
    engine: MockEngine,
    tuning: Tuning,
) -> (ReconThread, SenderThread) {
    let (tx, rx) = create_delivery_queue();

    let sender = MeshSender::connect(addr, SendPolicy::default()).unwrap();
    let sender_thread = SenderThread::spawn(rx, sender);

    let recon_thread = ReconThread::spawn(
        Box::new(engine),
        DatasetSource::new(root),
        ReconThreadConfig {
            retry_delay: Duration::from_millis(20),
            trajectory_dir: trajectory_dir.to_path_buf(),
        },
        TuningCell::new(tuning),
        Arc::new(RunState::new()),
        tx,
        Arc::new(AtomicBool::new(true)),
    );

    (recon_thread, sender_thread)
}

#[test]
fn test_pipeline_streams_meshes_in_order() {
    let temp = TempDir::new().unwrap();
    write_scene(temp.path(), 1, 7);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let tuning = Tuning {
        mesh_interval: 3,
        ..Tuning::default()
    };
    let (recon, sender) = spawn_pipeline(
        temp.path(),
        &temp.path().join("output"),
        &addr,
        MockEngine::new(),
        tuning,
    );

    let (mut peer, _) = listener.accept().unwrap();
    let meshes = read_frames(&mut peer);

    recon.join().unwrap();
    sender.join().unwrap();

    // Snapshots at frames 0, 3, 6 of 7; frame 6 is the last so the final
    // extraction is folded in. Each integrated frame contributes one quad:
    // 4 referenced vertices and 2 triangles after compaction.
    let vertex_counts: Vec<usize> = meshes.iter().map(|m| m.vertex_count()).collect();
    assert_eq!(vertex_counts, vec![4, 16, 28]);

    let triangle_counts: Vec<usize> = meshes.iter().map(|m| m.triangle_count()).collect();
    assert_eq!(triangle_counts, vec![2, 8, 14]);

    // Compaction left no trace of the padding vertices.
    for mesh in &meshes {
        for vertex in mesh.vertices() {
            assert!(vertex[0] < 1.0e6);
        }
        for tri in mesh.triangles() {
            for &index in tri {
                assert!((index as usize) < mesh.vertex_count());
            }
        }
    }
}

#[test]
fn test_pipeline_survives_tracking_failures() {
    let temp = TempDir::new().unwrap();
    write_scene(temp.path(), 1, 5);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let tuning = Tuning {
        snapshots_enabled: false,
        ..Tuning::default()
    };
    let (recon, sender) = spawn_pipeline(
        temp.path(),
        &temp.path().join("output"),
        &addr,
        MockEngine::with_tracking_failures([1, 3]),
        tuning,
    );

    let (mut peer, _) = listener.accept().unwrap();
    let meshes = read_frames(&mut peer);

    recon.join().unwrap();
    sender.join().unwrap();

    // All 5 frames still integrate despite two tracking failures, and the
    // single final mesh reflects that.
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].vertex_count(), 20);

    // Trajectory was written for every frame.
    let contents = fs::read_to_string(temp.path().join("output").join("scene_1.log")).unwrap();
    assert_eq!(contents.lines().count(), 5);
}

#[test]
fn test_pipeline_processes_multiple_datasets() {
    let temp = TempDir::new().unwrap();
    write_scene(temp.path(), 1, 2);
    write_scene(temp.path(), 2, 3);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let tuning = Tuning {
        snapshots_enabled: false,
        ..Tuning::default()
    };
    let (recon, sender) = spawn_pipeline(
        temp.path(),
        &temp.path().join("output"),
        &addr,
        MockEngine::new(),
        tuning,
    );

    let (mut peer, _) = listener.accept().unwrap();
    let meshes = read_frames(&mut peer);

    recon.join().unwrap();
    sender.join().unwrap();

    // One final mesh per dataset, in dataset order; the engine resets
    // between datasets.
    let vertex_counts: Vec<usize> = meshes.iter().map(|m| m.vertex_count()).collect();
    assert_eq!(vertex_counts, vec![8, 12]);

    assert!(temp.path().join("output").join("scene_1.log").exists());
    assert!(temp.path().join("output").join("scene_2.log").exists());
}

#[test]
fn test_empty_dataset_root_sends_nothing() {
    let temp = TempDir::new().unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let (recon, sender) = spawn_pipeline(
        temp.path(),
        &temp.path().join("output"),
        &addr,
        MockEngine::new(),
        Tuning::default(),
    );

    let (mut peer, _) = listener.accept().unwrap();
    let meshes = read_frames(&mut peer);

    recon.join().unwrap();
    sender.join().unwrap();

    assert!(meshes.is_empty());
}
