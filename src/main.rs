use anyhow::{bail, Result};
use log::{error, info};
use std::time::Instant;

use campoll::common::logging_setup;
use campoll::{cli, config_loader, operations};

#[tokio::main]
async fn main() -> Result<()> {
    let main_start_time = Instant::now();
    let matches = cli::build_cli().get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or("config/campoll.yaml");

    let master_config = match config_loader::load_config(config_path) {
        Ok(cfg) => {
            logging_setup::initialize_logging(Some(&cfg), &matches);
            info!(
                "✅ Configuration loaded from '{}' ({} cameras)",
                config_path,
                cfg.cameras.len()
            );
            cfg
        }
        Err(e) => {
            logging_setup::initialize_logging(None, &matches);
            error!(
                "❌ Failed to load configuration from '{}': {:#}. Exiting.",
                config_path, e
            );
            return Err(e.context(format!("Failed to load configuration from '{}'", config_path)));
        }
    };

    let op_result: Result<()> = match matches.subcommand() {
        Some(("poll", sub_matches)) => {
            operations::poll_op::handle_poll_cli(&master_config, Some(sub_matches)).await
        }
        Some(("timelapse", sub_matches)) => {
            operations::timelapse_op::handle_timelapse_cli(&master_config, sub_matches).await
        }
        Some((other, _)) => bail!("Subcommand '{}' not implemented.", other),
        None => {
            // Bare invocation runs the daemon, like the original script.
            info!("ℹ️ No subcommand provided; running the polling daemon.");
            operations::poll_op::handle_poll_cli(&master_config, None).await
        }
    };

    if let Err(e) = op_result {
        error!("❌ Operation failed after {:?}: {:#}", main_start_time.elapsed(), e);
        return Err(e);
    }

    info!("🏁 Finished in {:?}.", main_start_time.elapsed());
    Ok(())
}
