use crate::config::Config;
use crate::error::{redis_error, AppResult};
use crate::ports::AlarmStateStore;
use crate::schedule::AlarmTime;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client as RedisClient};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

// Redis key constants
pub mod keys {
    pub const GOOGLE_CALENDAR_TOKEN: &str = "autoschedule:google_calendar_token";
    pub const LAST_WORK_ALARM: &str = "autoschedule:last_work_alarm";
}

/// The Redis actor that processes messages
pub struct RedisActor {
    config: Arc<RwLock<Config>>,
    client: Option<RedisClient>,
    command_rx: mpsc::Receiver<RedisCommand>,
}

/// Commands that can be sent to the Redis actor
pub enum RedisCommand {
    GetToken(mpsc::Sender<AppResult<Option<Value>>>),
    SaveToken(Value, mpsc::Sender<AppResult<()>>),
    GetLastAlarm(mpsc::Sender<AppResult<Option<AlarmTime>>>),
    SaveLastAlarm(AlarmTime, mpsc::Sender<AppResult<()>>),
    ClearLastAlarm(mpsc::Sender<AppResult<()>>),
    Shutdown,
}

/// Handle for communicating with the Redis actor
#[derive(Clone)]
pub struct RedisActorHandle {
    command_tx: mpsc::Sender<RedisCommand>,
}

impl RedisActorHandle {
    /// Create a handle with no actor behind it
    pub fn empty() -> Self {
        let (command_tx, _) = mpsc::channel(32);
        Self { command_tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<AppResult<T>>) -> RedisCommand,
    ) -> AppResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(build(response_tx))
            .await
            .map_err(|e| redis_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| redis_error("Response channel closed"))?
    }

    /// Get the Google OAuth token
    pub async fn get_token(&self) -> AppResult<Option<Value>> {
        self.request(RedisCommand::GetToken).await
    }

    /// Save the Google OAuth token
    pub async fn save_token(&self, token: Value) -> AppResult<()> {
        self.request(|tx| RedisCommand::SaveToken(token, tx)).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(RedisCommand::Shutdown).await;
        Ok(())
    }
}

#[async_trait]
impl AlarmStateStore for RedisActorHandle {
    async fn load_last_alarm(&self) -> AppResult<Option<AlarmTime>> {
        self.request(RedisCommand::GetLastAlarm).await
    }

    async fn save_last_alarm(&self, time: AlarmTime) -> AppResult<()> {
        self.request(|tx| RedisCommand::SaveLastAlarm(time, tx)).await
    }

    async fn clear_last_alarm(&self) -> AppResult<()> {
        self.request(RedisCommand::ClearLastAlarm).await
    }
}

impl RedisActor {
    /// Create a new actor and return its handle
    pub async fn new(config: Arc<RwLock<Config>>) -> (Self, RedisActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let redis_url = config.read().await.redis_url.clone();
        // An invalid URL is reported on every command instead of at start-up
        let client = match RedisClient::open(redis_url.as_str()) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Invalid Redis URL {}: {}", redis_url, e);
                None
            }
        };

        let actor = Self {
            config,
            client,
            command_rx,
        };

        let handle = RedisActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Redis actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                RedisCommand::GetToken(response_tx) => {
                    let result = self.get_json(keys::GOOGLE_CALENDAR_TOKEN).await;
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::SaveToken(token, response_tx) => {
                    let result = self
                        .set_string(keys::GOOGLE_CALENDAR_TOKEN, token.to_string())
                        .await;
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::GetLastAlarm(response_tx) => {
                    let result = self.get_last_alarm().await;
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::SaveLastAlarm(time, response_tx) => {
                    let result = self
                        .set_string(keys::LAST_WORK_ALARM, time.to_string())
                        .await;
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::ClearLastAlarm(response_tx) => {
                    let result = self.delete(keys::LAST_WORK_ALARM).await;
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::Shutdown => {
                    info!("Redis actor shutting down");
                    break;
                }
            }
        }

        info!("Redis actor shut down");
    }

    /// Get a redis connection
    async fn get_redis_connection(&self) -> AppResult<MultiplexedConnection> {
        let client = match &self.client {
            Some(client) => client.clone(),
            None => {
                let redis_url = self.config.read().await.redis_url.clone();
                return Err(redis_error(&format!("Invalid Redis URL {}", redis_url)));
            }
        };

        client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| redis_error(&format!("Failed to connect to Redis: {}", e)))
    }

    async fn get_string(&self, key: &str) -> AppResult<Option<String>> {
        let mut redis_conn = self.get_redis_connection().await?;

        redis_conn
            .get(key)
            .await
            .map_err(|e| redis_error(&format!("Failed to read {} from Redis: {}", key, e)))
    }

    async fn set_string(&self, key: &str, value: String) -> AppResult<()> {
        let mut redis_conn = self.get_redis_connection().await?;

        () = redis_conn
            .set(key, value)
            .await
            .map_err(|e| redis_error(&format!("Failed to save {} to Redis: {}", key, e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut redis_conn = self.get_redis_connection().await?;

        () = redis_conn
            .del(key)
            .await
            .map_err(|e| redis_error(&format!("Failed to delete {} from Redis: {}", key, e)))?;

        Ok(())
    }

    async fn get_json(&self, key: &str) -> AppResult<Option<Value>> {
        match self.get_string(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn get_last_alarm(&self) -> AppResult<Option<AlarmTime>> {
        let Some(stored) = self.get_string(keys::LAST_WORK_ALARM).await? else {
            return Ok(None);
        };

        // A corrupt value is treated like no alarm at all
        match stored.parse::<AlarmTime>() {
            Ok(time) => Ok(Some(time)),
            Err(e) => {
                warn!("Ignoring stored alarm: {}", e);
                Ok(None)
            }
        }
    }
}
