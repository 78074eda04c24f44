//! Payscan CLI
//!
//! Command-line interface for testing and demonstrating the QR
//! scan-and-classify pipeline with a mock camera and scripted decoder.

use clap::Parser;
use payscan::{
    capture::{CaptureConfig, FacingMode, FileConfig, MockCamera},
    decode::MockDecoder,
    metrics::{MetricsRegistry, MetricsSnapshot},
    pipeline::{ScanPipeline, TickOutcome},
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Demonstration scanner: samples mock frames until a scripted QR
/// payload appears, then classifies and prints it.
#[derive(Debug, Parser)]
#[command(name = "payscan", version)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera facing mode to start with.
    #[arg(long, default_value = "environment")]
    facing: FacingMode,

    /// QR payload the scripted decoder will eventually yield.
    #[arg(long, default_value = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e")]
    payload: String,

    /// Frames to miss before the payload becomes visible.
    #[arg(long, default_value_t = 10)]
    miss_frames: usize,

    /// Give the mock camera a torch and turn it on while scanning.
    #[arg(long)]
    torch: bool,

    /// Run the HTTP classification service instead of the scan demo.
    #[cfg(feature = "service")]
    #[arg(long)]
    serve: bool,
}

#[cfg(feature = "service")]
fn run_service(file_config: &FileConfig) {
    use payscan::service::{ScanService, ServerConfig};

    if file_config.service.port == 0 {
        eprintln!("Service disabled by config (port 0)");
        std::process::exit(1);
    }

    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };
    let service = ScanService::new(ServerConfig::from(&file_config.service), registry);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = runtime.block_on(service.run()) {
        eprintln!("Service error: {}", e);
        std::process::exit(1);
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    info!("Payscan v{}", payscan::VERSION);
    info!("This is a demonstration using mock camera input");

    let file_config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    #[cfg(feature = "service")]
    if cli.serve {
        run_service(&file_config);
        return;
    }

    let capture: CaptureConfig = file_config.capture.clone();
    let frame_interval = Duration::from_millis(1000 / u64::from(capture.fps.max(1)));

    let camera = if cli.torch {
        MockCamera::new().with_torch()
    } else {
        MockCamera::new()
    };
    let decoder = MockDecoder::after_misses(cli.miss_frames, cli.payload.clone());

    let mut pipeline = ScanPipeline::new(camera, decoder, capture)
        .with_notice_ttl(Duration::from_millis(file_config.notice.display_ms));

    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };

    // Ctrl-C stops the session; the loop observes the flag on its next tick
    let stop_requested = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop_requested);
    if let Err(e) = ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::SeqCst);
    }) {
        warn!("Failed to install signal handler: {}", e);
    }

    if let Err(e) = pipeline.start(cli.facing) {
        eprintln!("Failed to start scanning: {}", e);
        std::process::exit(1);
    }

    if cli.torch {
        let status = pipeline.toggle_torch();
        info!(?status, "Torch requested");
    }

    info!(facing = %cli.facing, "Scanning...");

    let delivered = loop {
        if stop_requested.load(Ordering::SeqCst) {
            info!("Stop requested");
            pipeline.stop();
            break None;
        }

        match pipeline.tick() {
            TickOutcome::Delivered(result) => break Some(result),
            TickOutcome::NoCode => {
                std::thread::sleep(frame_interval);
            }
            TickOutcome::Idle => {
                // Session halted (camera error); surface the notice and stop
                if let Some(notice) = pipeline.active_notice() {
                    warn!(kind = ?notice.kind(), "{}", notice.message());
                }
                break None;
            }
        }
    };

    let snapshot = MetricsSnapshot::from_pipeline(
        pipeline.state(),
        pipeline.session().map(|s| s.torch_on()).unwrap_or(false),
        pipeline.stats(),
        pipeline.notices_raised(),
    );
    registry.update(&snapshot);

    match delivered {
        Some(result) => {
            println!("Scanned {}: {}", result.kind, result.address);
        }
        None => {
            println!("No code scanned");
        }
    }

    let stats = pipeline.stats();
    info!(
        "Done. Frames sampled: {}, decode hits: {}, delivered: {}",
        stats.frames_sampled, stats.decode_hits, stats.results_delivered
    );
}
