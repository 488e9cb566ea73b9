use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use engine_logging::targets::{CONFIG, MONITOR};
use engine_logging::{engine_error, engine_info, engine_warn};
use freeleech_app::cli::Cli;
use freeleech_app::config::{load_file_config, resolve, FileConfig};
use freeleech_engine::{Monitor, MonitorConfig};
use log::LevelFilter;
use tokio_util::sync::CancellationToken;

const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    engine_logging::initialize(level, cli.log_file.as_deref());

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            engine_error!(target: CONFIG, "{:#}", err);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            engine_error!(target: MONITOR, "Could not start the async runtime: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(run(config));
    // A relay upload stuck in a blocking thread must not keep the process alive.
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!(target: MONITOR, "{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<MonitorConfig> {
    let file = match cli.config.as_deref() {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };
    resolve(cli, file, chrono::Utc::now().timestamp())
}

async fn run(config: MonitorConfig) -> Result<()> {
    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));
    Monitor::new(config).run(shutdown).await?;
    Ok(())
}

/// Cancel `shutdown` on Ctrl+C or, on unix, SIGTERM.
async fn watch_signals(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(err) => {
                engine_warn!(target: MONITOR, "SIGTERM handler unavailable: {}", err);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    engine_info!(target: MONITOR, "Received shutdown signal");
    shutdown.cancel();
}
