//! # vitalsd
//!
//! Host process for the vitals pipeline: wires a metrics source to the
//! broadcast server and runs until interrupted.
//!
//! Startup order matters: callbacks are registered before `initialize`, the
//! server binds before the producer starts, and any failure along the way
//! exits non-zero before the run loop is entered.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vitals_capture::{MetricsSource, ReplaySource, SyntheticConfig, SyntheticSource};
use vitals_server::config::ServerConfig;
use vitals_server::publisher::MetricsPublisher;
use vitals_server::server::VitalsServer;

/// Vitals streaming broadcast server.
#[derive(Parser, Debug)]
#[command(name = "vitalsd", about = "Vitals streaming broadcast server")]
struct Cli {
    /// Access credential for the metrics producer (opaque to this process).
    api_key: String,

    /// Capture device index.
    #[arg(default_value_t = 0)]
    device_index: u32,

    /// Replay a recorded input file instead of a live device.
    input_path: Option<PathBuf>,

    /// Host to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind.
    #[arg(long, default_value_t = 8765)]
    port: u16,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Pick the capture source: a recording when a path was given, otherwise a
/// synthetic source seeded by the device index.
fn make_source(args: &Cli) -> Box<dyn MetricsSource> {
    if let Some(path) = &args.input_path {
        info!(path = %path.display(), "using recorded input");
        Box::new(ReplaySource::new(path.clone()))
    } else {
        info!(device_index = args.device_index, "using synthetic capture source");
        Box::new(SyntheticSource::new(SyntheticConfig::for_device(
            args.device_index,
        )))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Cli::parse();

    let mut source = make_source(&args);

    let config = ServerConfig {
        host: args.host.clone(),
        port: args.port,
        ..ServerConfig::default()
    };
    let server = VitalsServer::new(config);
    let publisher = Arc::new(MetricsPublisher::new(server.registry().clone()));

    // A rejected callback registration is fatal to startup.
    let metrics_publisher = publisher.clone();
    source
        .set_on_metrics(Arc::new(move |buffer, timestamp| {
            metrics_publisher.on_metrics(buffer, timestamp);
        }))
        .context("Failed to register metrics callback")?;
    let edge_publisher = publisher;
    source
        .set_on_edge_metrics(Arc::new(move |metrics, timestamp| {
            edge_publisher.on_edge_metrics(metrics, timestamp);
        }))
        .context("Failed to register edge metrics callback")?;

    source
        .initialize(&args.api_key)
        .context("Failed to initialize metrics source")?;

    let (addr, serve_handle) = server.listen().await.context("Failed to bind server")?;
    info!("vitals stream available at ws://{addr}/ws");

    // The producer owns its own blocking thread; its callbacks publish
    // through the session registry from there.
    let stop = source.stop_handle();
    let mut producer = tokio::task::spawn_blocking(move || source.run());

    let producer_result = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for ctrl-c")?;
            info!("shutting down");
            stop.stop();
            (&mut producer).await.context("metrics source task panicked")?
        }
        result = &mut producer => {
            info!("metrics source finished");
            result.context("metrics source task panicked")?
        }
    };

    server
        .shutdown()
        .graceful_shutdown(vec![serve_handle], None)
        .await;
    producer_result.context("metrics source failed")?;

    info!("shutdown complete");
    Ok(())
}
