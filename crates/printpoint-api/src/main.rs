mod api_doc;
mod error;
mod handlers;
mod setup;
mod state;
mod telemetry;

use printpoint_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    telemetry::init_telemetry();
    tracing::info!(environment = %config.environment, "configuration loaded");

    let (_state, router) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router).await?;

    Ok(())
}
