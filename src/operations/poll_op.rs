use crate::camera::snapshot_client::SnapshotClient;
use crate::common::file_utils;
use crate::config_loader::MasterConfig;
use crate::core::poll_loop;
use crate::core::shutdown::ShutdownController;
use anyhow::{Context, Result};
use clap::ArgMatches;
use futures::future::join_all;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::Instant;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;

/// Supervisor for the polling daemon: provisions directories, spawns one
/// poll loop per camera, translates SIGINT/SIGTERM into the shared
/// shutdown signal, and joins every loop before returning.
///
/// `args` is `None` when the daemon runs as the default subcommand.
pub async fn handle_poll_cli(master_config: &MasterConfig, args: Option<&ArgMatches>) -> Result<()> {
    let op_start_time = Instant::now();

    if master_config.cameras.is_empty() {
        warn!("⚠️ No cameras configured; nothing to poll.");
        return Ok(());
    }

    let save_dir: PathBuf = match args.and_then(|a| a.get_one::<String>("output")) {
        Some(path) => {
            debug!("Save root overridden via CLI: {}", path);
            PathBuf::from(path)
        }
        None => PathBuf::from(&master_config.app_settings.save_dir),
    };

    // Fatal: without its directory no camera can persist a single image.
    file_utils::provision_camera_directories(&save_dir, &master_config.cameras)
        .context("Failed to provision camera snapshot directories")?;

    let client = SnapshotClient::new(master_config.app_settings.request_timeout())
        .context("Failed to construct the snapshot HTTP client")?;

    let shutdown = ShutdownController::new();
    spawn_signal_listener(shutdown.clone())?;

    let mut tasks: Vec<(String, JoinHandle<()>)> = Vec::new();
    for camera in &master_config.cameras {
        let camera_dir = save_dir.join(&camera.name);
        let task = tokio::spawn(poll_loop::run_poll_loop(
            camera.clone(),
            client.clone(),
            camera_dir,
            master_config.app_settings.filename_timestamp_format.clone(),
            shutdown.clone(),
        ));
        tasks.push((camera.name.clone(), task));
    }
    info!(
        "🚀 Started {} camera polling task(s). Waiting for SIGINT/SIGTERM...",
        tasks.len()
    );

    // Loops only exit once shutdown is requested, so this blocks until the
    // signal fires and every loop has wound down.
    let (names, handles): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();
    let results = join_all(handles).await;
    for (name, result) in names.iter().zip(results) {
        if let Err(join_err) = result {
            error!(
                "💀 Polling task for camera '{}' did not shut down cleanly: {:#}",
                name, join_err
            );
        }
    }

    info!(
        "🏁 All camera polling tasks finished in {:?}. Exiting.",
        op_start_time.elapsed()
    );
    Ok(())
}

/// The only place OS signal semantics appear; everything downstream sees
/// the `ShutdownController`.
fn spawn_signal_listener(shutdown: ShutdownController) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to install the SIGTERM handler")?;
    tokio::spawn(async move {
        let signal_name = tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!("Failed to listen for SIGINT: {}", e);
                }
                "SIGINT"
            }
            _ = sigterm.recv() => "SIGTERM",
        };
        warn!("⚠️ {} received. Initiating shutdown...", signal_name);
        shutdown.request_shutdown();
    });
    Ok(())
}
