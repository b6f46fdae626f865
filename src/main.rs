//! SetuStream daemon.
//!
//! Runs the full streaming pipeline: dataset polling, reconstruction,
//! mesh compaction, and TCP delivery. The bundled `MockEngine` stands in
//! for the reconstruction library; deployments swap their own
//! `ReconstructionEngine` implementation into `ReconThread::spawn`.
//!
//! # Usage
//!
//! ```bash
//! # With default config
//! cargo run --release
//!
//! # With custom config file
//! cargo run --release -- --config setu-stream.toml
//!
//! # With command line overrides
//! cargo run --release -- --dataset ./scans --server 192.168.68.40:65432
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use setu_stream::{
    create_delivery_queue, AppConfig, DatasetSource, MeshSender, MockEngine, ReconThread,
    ReconThreadConfig, RunState, SendPolicy, SenderThread, Tuning, TuningCell,
};

#[derive(Parser)]
#[command(name = "setu-stream")]
#[command(about = "Stream reconstructed meshes from RGB-D datasets to a TCP consumer")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset root directory (overrides config)
    #[arg(short, long)]
    dataset: Option<String>,

    /// Mesh consumer address (overrides config)
    #[arg(short, long)]
    server: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match AppConfig::load(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            if Path::new("setu-stream.toml").exists() {
                match AppConfig::load(Path::new("setu-stream.toml")) {
                    Ok(config) => {
                        log::info!("Loaded configuration from setu-stream.toml");
                        config
                    }
                    Err(e) => {
                        log::error!("Failed to load setu-stream.toml: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                log::info!("Using default configuration");
                AppConfig::default()
            }
        }
    };

    if let Some(dataset) = args.dataset {
        config.dataset.root = dataset;
    }
    if let Some(server) = args.server {
        config.network.server_addr = server;
    }

    log::info!("SetuStream v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Dataset root: {}", config.dataset.root);

    // Connect before any reconstruction starts; frames must never wait on
    // connection setup mid-run.
    let policy = SendPolicy {
        max_attempts: config.network.max_attempts,
        initial_backoff: Duration::from_millis(config.network.initial_backoff_ms),
    };
    let sender = match MeshSender::connect(&config.network.server_addr, policy) {
        Ok(sender) => sender,
        Err(e) => {
            log::error!("Failed to connect to {}: {}", config.network.server_addr, e);
            std::process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let run_state = Arc::new(RunState::new());
    {
        let r = Arc::clone(&running);
        let state = Arc::clone(&run_state);
        ctrlc::set_handler(move || {
            log::info!("Shutdown requested");
            r.store(false, Ordering::SeqCst);
            state.finish();
        })
        .expect("Failed to set Ctrl-C handler");
    }

    let (queue_tx, queue_rx) = create_delivery_queue();
    let tuning = TuningCell::new(Tuning::from(&config.reconstruction));

    let sender_thread = SenderThread::spawn(queue_rx, sender);
    let recon_thread = ReconThread::spawn(
        Box::new(MockEngine::new()),
        DatasetSource::new(&config.dataset.root),
        ReconThreadConfig::from(&config),
        tuning,
        Arc::clone(&run_state),
        queue_tx,
        Arc::clone(&running),
    );

    // Join both workers before exit; the reconstruction thread pushes the
    // queue poison pill when it finishes, which releases the sender.
    if recon_thread.join().is_err() {
        log::error!("Reconstruction thread panicked");
    }
    if sender_thread.join().is_err() {
        log::error!("Sender thread panicked");
    }

    log::info!("SetuStream exited cleanly");
}
