use std::process::ExitCode;

use carelink_lib::config::{self, PortalConfig};
use carelink_lib::{accounts, api, db};

#[tokio::main]
async fn main() -> ExitCode {
    carelink_lib::init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = PortalConfig::from_env()?;
    tracing::info!(db = %config.db_path.display(), bind = %config.bind, "Configuration loaded");

    {
        let conn = db::open_database(&config.db_path)?;
        if config.seed_defaults {
            accounts::seed_defaults(&conn, &config.seed_credentials)?;
        }
    }

    let server = api::start_server(config.db_path.clone(), config.bind).await?;
    tracing::info!(addr = %server.addr, "Listening");

    tokio::signal::ctrl_c().await?;
    server.shutdown().await;
    Ok(())
}
