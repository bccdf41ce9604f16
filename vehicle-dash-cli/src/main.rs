//! Vehicle Dash CLI Application
//!
//! Console front end for the vehicle access status dashboard. It polls the
//! backend's status endpoints on their own cadences, feeds snapshots through
//! the synchronizer library and renders every observed transition as a table
//! row, the way the browser dashboard's data panel does.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use vehicle_dash_sync::Dashboard;

mod client;
mod config;
mod panel;
mod poller;

use client::{HttpStatusClient, StatusSource};
use poller::PollTask;

/// Vehicle Dash - live console view of a vehicle access backend
#[derive(Parser, Debug)]
#[command(name = "vehicle-dash")]
#[command(about = "Poll a vehicle access backend and log status transitions", long_about = None)]
#[command(version)]
struct Args {
    /// Backend base URL (overrides the config file)
    #[arg(short, long, value_name = "URL")]
    base_url: Option<String>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many seconds (default: run until Ctrl-C)
    #[arg(short, long, value_name = "SECS")]
    duration: Option<u64>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Vehicle Dash CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using synchronizer library v{}", vehicle_dash_sync::VERSION);

    // Load configuration, then apply command-line overrides
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::AppConfig::default(),
    };
    if let Some(base_url) = args.base_url {
        config.server.base_url = base_url;
    }
    log::info!("Polling {}", config.server.base_url);

    run(config, args.duration).await
}

async fn run(config: config::AppConfig, duration_secs: Option<u64>) -> Result<()> {
    let source: Arc<dyn StatusSource> = Arc::new(HttpStatusClient::new(
        &config.server.base_url,
        config.server.request_timeout_ms,
    )?);

    let mut dashboard = Dashboard::new(config.panel.max_rows);
    // No asset loading step in the console front end; the view is usable
    // immediately
    dashboard.view.set_model_ready();
    let dashboard = Arc::new(Mutex::new(dashboard));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let pollers = [
        (PollTask::Connection, config.polling.connection_ms),
        (PollTask::Door, config.polling.door_ms),
        (PollTask::Ranging, config.polling.ranging_ms),
        (PollTask::User, config.polling.user_ms),
        (PollTask::WelcomeLight, config.polling.welcome_ms),
    ];

    let mut handles = Vec::new();
    for (task, period_ms) in pollers {
        handles.push(tokio::spawn(poller::run_poller(
            task,
            source.clone(),
            dashboard.clone(),
            Duration::from_millis(period_ms.max(1)),
            shutdown_rx.clone(),
        )));
    }
    handles.push(tokio::spawn(poller::run_render_driver(
        dashboard.clone(),
        Duration::from_millis(config.polling.frame_ms.max(1)),
        shutdown_rx.clone(),
    )));
    handles.push(tokio::spawn(panel::run_panel(
        dashboard.clone(),
        Duration::from_millis(config.polling.frame_ms.max(1)),
        shutdown_rx.clone(),
    )));

    // Run until Ctrl-C or the requested duration elapses
    match duration_secs {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                    log::info!("duration elapsed, shutting down");
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("interrupt received, shutting down");
                }
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
            log::info!("interrupt received, shutting down");
        }
    }

    shutdown_tx.send(true)?;
    for handle in handles {
        handle.await?;
    }

    let dash = dashboard.lock().unwrap_or_else(|e| e.into_inner());
    log::info!(
        "stopped with {} transition(s) retained, welcome light {}",
        dash.log.len(),
        if dash.welcome_light_active() { "on" } else { "off" }
    );
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
