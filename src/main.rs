use airmap::server::{self, DEFAULT_BIND, ENV_BIND};
use airmap::{Dashboard, DashboardConfig};
use log::info;
use std::env;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::from_env()?;
    info!(
        "Loading registry from {} and measurements for {}",
        config.registry_source, config.period
    );
    let dashboard = Dashboard::load(&config).await?;

    let bind = env::var(ENV_BIND).unwrap_or_else(|_| DEFAULT_BIND.to_string());
    server::run(dashboard, &bind).await?;
    Ok(())
}
