use crate::components::redis_service::RedisActor;
use crate::components::{AlarmRefresh, ComponentManager, GoogleCalendarHandle};
use crate::config::Config;
use crate::error::Error;
use crate::ports::EventStore;
use crate::shutdown;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => {
            info!(
                "Using timezone {} for calendar {}",
                config.timezone, config.calendar_account
            );
            Ok(Arc::new(RwLock::new(config)))
        }
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Start the actors and components, then wait for a shutdown signal
pub async fn start_service(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    // Initialize Redis service
    let (mut redis_actor, redis_handle) = RedisActor::new(Arc::clone(&config)).await;

    tokio::spawn(async move {
        redis_actor.run().await;
    });

    let calendar = GoogleCalendarHandle::new(Arc::clone(&config), redis_handle.clone());

    // Missing access is not fatal, the token can be granted while we run
    if let Err(e) = calendar.ensure_access().await {
        warn!(
            "Calendar access not available yet, run get_calendar_token: {}",
            e
        );
    }

    let mut component_manager = ComponentManager::new(Arc::clone(&config));
    component_manager.register(AlarmRefresh::new(calendar.clone()));
    let component_manager = Arc::new(component_manager);

    let failed = component_manager.init_all(redis_handle.clone()).await?;
    if !failed.is_empty() {
        warn!("Running without components: {}", failed.join(", "));
    }

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    let shutdown_components = Arc::clone(&component_manager);
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components, calendar, redis_handle)
            .await;
    });

    info!("AutoSchedule is running");

    match shutdown_recv.await {
        Ok(()) => info!("Received shutdown signal, shutting down..."),
        Err(e) => {
            error!("Shutdown handler ended unexpectedly: {:?}", e);
            return Err(Error::Other(format!("Shutdown handler error: {}", e)).into());
        }
    }

    Ok(())
}
