//! Camscan CLI
//!
//! Command-line interface for demonstrating the scan-session pipeline
//! with scripted capability providers.

use camscan::capability::mock::{DecodeSchedule, MockHost, ScriptedDecoder, ScriptedMedia};
use camscan::capability::{CapabilitySet, DeviceInfo};
use camscan::config::{FileConfig, ScanConfig};
use camscan::platform::Environment;
use camscan::session::ScanSession;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "camscan", version, about = "Scan-session demonstration with scripted capabilities")]
struct Cli {
    /// Identification string to classify (as a browser would present it)
    #[arg(
        long,
        default_value = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36"
    )]
    user_agent: String,

    /// Scheme of the hosting page
    #[arg(long, default_value = "https")]
    scheme: String,

    /// Hostname of the hosting page
    #[arg(long, default_value = "localhost")]
    hostname: String,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Payload the scripted decoder yields
    #[arg(long, default_value = "TICKET-DEMO-0001")]
    payload: String,

    /// Sampled frame on which the scripted decoder first succeeds
    #[arg(long, default_value_t = 30)]
    decode_after: usize,

    /// Print a capability diagnostic report and exit
    #[arg(long)]
    diagnostic: bool,

    /// Restart after each result until interrupted
    #[arg(long)]
    continuous: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Camscan v{}", camscan::VERSION);
    info!("This is a demonstration using scripted capability providers");

    let config = match cli.config {
        Some(ref path) => match FileConfig::from_file(path) {
            Ok(file) => file.scan,
            Err(e) => {
                eprintln!("Failed to load configuration: {}", e);
                std::process::exit(1);
            }
        },
        None => ScanConfig::default(),
    };

    let env = Environment::new(&cli.user_agent, &cli.scheme, &cli.hostname);
    info!("Classified platform: {}", env.platform());

    let media = ScriptedMedia::granting().with_devices(vec![
        DeviceInfo::video("demo-front", "Front Camera"),
        DeviceInfo::video("demo-back", "Back Camera"),
    ]);
    let capabilities = CapabilitySet::new(
        Arc::new(media),
        Arc::new(ScriptedDecoder::new(
            DecodeSchedule::EveryNth(cli.decode_after.max(1)),
            cli.payload.clone(),
        )),
        Arc::new(MockHost::new()),
    );

    if cli.diagnostic {
        let session = match ScanSession::new(env, config, capabilities, |_| {}) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Invalid configuration: {}", e);
                std::process::exit(1);
            }
        };
        let report = session.diagnostic().await;
        match toml::to_string_pretty(&report) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => eprintln!("Failed to render report: {}", e),
        }
        return;
    }

    let session = match ScanSession::new(env, config, capabilities, |payload| {
        println!("Scanned payload: {payload}");
    }) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let session = Arc::new(session);

    // Ctrl-C requests a stop; the session loop observes the flag.
    let (stop_tx, mut stop_rx) = tokio::sync::mpsc::channel::<()>(1);
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    }) {
        warn!("Ctrl-C handler not installed: {}", e);
    }

    let mut scans = 0usize;
    loop {
        if let Err(e) = session.start().await {
            eprintln!("Scan failed: {} ({})", e, e.reason());
            std::process::exit(1);
        }
        info!("Scanning...");

        // Wait for the one-shot result or an interrupt.
        let interrupted = loop {
            if !session.is_active() {
                break false;
            }
            tokio::select! {
                _ = stop_rx.recv() => break true,
                _ = tokio::time::sleep(Duration::from_millis(100)) => {}
            }
        };

        if interrupted {
            session.stop().await;
            info!("Interrupted after {} scan(s)", scans);
            break;
        }

        scans += 1;
        if !cli.continuous {
            break;
        }
        info!("Result delivered; restarting session");
    }

    info!("Done. Completed scans: {}", scans);
}
