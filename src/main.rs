use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use clap::Parser;
use log::info;
use pitwall::config::AppConfig;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the pit wall server
    #[arg(short, long)]
    server: Option<String>,

    /// Sampling period in milliseconds
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Stable client identity reported with every snapshot
    #[arg(short, long)]
    client_id: Option<String>,
}

fn main() {
    colog::init();

    let args = Args::parse();
    let mut config = AppConfig::from_local_file().unwrap_or_default();
    if let Some(server) = args.server {
        config.server_url = server;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.sample_interval_ms = interval_ms;
    }
    if let Some(client_id) = args.client_id {
        config.client_id = Some(client_id);
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    ctrlc::set_handler(move || {
        info!("Exiting...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .expect("Could not set Ctrl-C handler");

    run(&config, shutdown);
}

#[cfg(windows)]
fn run(config: &AppConfig, shutdown: Arc<AtomicBool>) {
    use std::time::Duration;

    use pitwall::sink::HttpSink;
    use pitwall::telemetry::{IRacingSource, Sampler};

    let source = IRacingSource::new().expect("Could not start the telemetry runtime");
    let sink =
        HttpSink::new(&config.server_url).expect("Could not build the pit wall server client");
    info!("sending snapshots to {}", sink.update_url());

    let mut sampler = Sampler::new(
        source,
        sink,
        config.resolve_client_id(),
        Duration::from_millis(config.sample_interval_ms),
    );
    sampler.run(shutdown);
}

#[cfg(not(windows))]
fn run(_config: &AppConfig, _shutdown: Arc<AtomicBool>) {
    log::error!("live telemetry sampling requires the iRacing SDK and is only available on Windows");
}
