use autoschedule::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting AutoSchedule");

    // Load configuration
    let config = startup::load_config().await?;

    // Run until a shutdown signal arrives
    startup::start_service(config).await
}
