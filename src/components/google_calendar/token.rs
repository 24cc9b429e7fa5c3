use crate::components::redis_service::RedisActorHandle;
use crate::config::Config;
use crate::error::{google_calendar_error, AppResult, Error};
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// OAuth token endpoint
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Seconds a token is assumed to live when the response does not say
const DEFAULT_EXPIRES_IN: i64 = 3600;

#[derive(Clone)]
pub struct TokenManager {
    config: Arc<RwLock<Config>>,
    client: Client,
    redis_handle: RedisActorHandle,
}

impl TokenManager {
    pub fn new(config: Arc<RwLock<Config>>, redis_handle: RedisActorHandle) -> Self {
        Self {
            config,
            client: Client::new(),
            redis_handle,
        }
    }

    /// Current access token, refreshed when expired.
    ///
    /// Without a stored token calendar access was never granted.
    pub async fn access_token(&self) -> AppResult<String> {
        let token = self.get_token().await?;

        token
            .get("access_token")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or(Error::PermissionDenied)
    }

    /// Get OAuth token from Redis, refreshing it if it has expired
    pub async fn get_token(&self) -> AppResult<Value> {
        let Some(token) = self.redis_handle.get_token().await? else {
            return Err(Error::PermissionDenied);
        };

        match token.get("expires_at").and_then(|v| v.as_i64()) {
            Some(expiry) if expiry > Utc::now().timestamp() => Ok(token),
            _ => self.refresh_token(&token).await,
        }
    }

    /// Refresh an expired token
    async fn refresh_token(&self, token: &Value) -> AppResult<Value> {
        let refresh_token = token
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .ok_or(Error::PermissionDenied)?;

        let (client_id, client_secret) = {
            let config_read = self.config.read().await;
            (
                config_read.google_client_id.clone(),
                config_read.google_client_secret.clone(),
            )
        };

        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token.to_string()),
            ("grant_type", "refresh_token".to_string()),
        ];

        info!("Refreshing Google Calendar access token");
        let response = self.client.post(TOKEN_URL).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: Value = response.json().await?;
        let access_token = new_token
            .get("access_token")
            .cloned()
            .ok_or_else(|| google_calendar_error("Token response missing 'access_token' field"))?;

        // Google does not repeat the refresh token on refresh
        let token_json = json!({
            "access_token": access_token,
            "refresh_token": refresh_token,
            "expires_at": with_expiry(&new_token),
        });

        self.set_token(token_json.clone()).await?;
        Ok(token_json)
    }

    /// Store a token, e.g. after the consent flow
    pub async fn set_token(&self, token_json: Value) -> AppResult<()> {
        self.redis_handle.save_token(token_json).await
    }
}

/// Absolute expiry timestamp for a token response
pub fn with_expiry(token_response: &Value) -> i64 {
    let expires_in = token_response
        .get("expires_in")
        .and_then(|v| v.as_i64())
        .unwrap_or(DEFAULT_EXPIRES_IN);

    Utc::now().timestamp() + expires_in
}
