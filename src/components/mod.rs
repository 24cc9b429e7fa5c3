use crate::components::redis_service::RedisActorHandle;
use crate::config::Config;
use crate::error::AppResult;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

pub mod alarm;
pub mod google_calendar;
pub mod redis_service;

pub use alarm::AlarmRefresh;
pub use google_calendar::GoogleCalendarHandle;

/// Long-running part of the service started after the actors are up
#[async_trait]
pub trait Component: Send + Sync {
    fn name(&self) -> &'static str;

    async fn init(
        &self,
        config: Arc<RwLock<Config>>,
        redis_handle: RedisActorHandle,
    ) -> AppResult<()>;

    async fn shutdown(&self) -> AppResult<()>;
}

/// Starts components in registration order and stops them in reverse
pub struct ComponentManager {
    components: Vec<Box<dyn Component>>,
    config: Arc<RwLock<Config>>,
}

impl fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.components.iter().map(|c| c.name()).collect();
        f.debug_struct("ComponentManager")
            .field("components", &names)
            .finish()
    }
}

impl ComponentManager {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            components: Vec::new(),
            config,
        }
    }

    pub fn register<T: Component + 'static>(&mut self, component: T) {
        info!("Registering component: {}", component.name());
        self.components.push(Box::new(component));
    }

    /// Initialize every component and return the names of those that failed.
    ///
    /// A failing component is logged and skipped, the rest still start.
    pub async fn init_all(&self, redis_handle: RedisActorHandle) -> AppResult<Vec<&'static str>> {
        let mut failed = Vec::new();

        for component in &self.components {
            info!("Initializing component: {}", component.name());

            if let Err(e) = component
                .init(Arc::clone(&self.config), redis_handle.clone())
                .await
            {
                error!("Error initializing component {}: {:?}", component.name(), e);
                failed.push(component.name());
            }
        }

        Ok(failed)
    }

    /// Shut components down, last registered first
    pub async fn shutdown_all(&self) -> AppResult<()> {
        info!("Shutting down {} components", self.components.len());

        for component in self.components.iter().rev() {
            if let Err(e) = component.shutdown().await {
                error!("Error shutting down component {}: {:?}", component.name(), e);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::other_error;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        fail_init: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Component for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn init(
            &self,
            _config: Arc<RwLock<Config>>,
            _redis_handle: RedisActorHandle,
        ) -> AppResult<()> {
            self.log.lock().unwrap().push(format!("init {}", self.name));
            if self.fail_init {
                return Err(other_error("boom"));
            }
            Ok(())
        }

        async fn shutdown(&self) -> AppResult<()> {
            self.log.lock().unwrap().push(format!("stop {}", self.name));
            Ok(())
        }
    }

    fn test_config() -> Arc<RwLock<Config>> {
        Arc::new(RwLock::new(Config {
            google_client_id: String::new(),
            google_client_secret: String::new(),
            calendar_account: "shifts@example.com".to_string(),
            timezone: "UTC".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            alarm_refresh_interval_hours: 12,
            alarm_label: "Work".to_string(),
        }))
    }

    #[tokio::test]
    async fn test_failed_init_does_not_stop_others() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ComponentManager::new(test_config());
        manager.register(Recorder {
            name: "first",
            fail_init: true,
            log: Arc::clone(&log),
        });
        manager.register(Recorder {
            name: "second",
            fail_init: false,
            log: Arc::clone(&log),
        });

        let failed = manager.init_all(RedisActorHandle::empty()).await.unwrap();
        manager.shutdown_all().await.unwrap();

        assert_eq!(failed, vec!["first"]);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["init first", "init second", "stop second", "stop first"]
        );
    }
}
