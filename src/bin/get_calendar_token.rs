use autoschedule::components::google_calendar::token::{with_expiry, TokenManager, TOKEN_URL};
use autoschedule::components::redis_service::RedisActor;
use autoschedule::config::Config;
use autoschedule::error::{other_error, AppResult};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const REDIRECT_URI: &str = "http://localhost:8080";
/// Read and write access, shifts are inserted and updated
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = Arc::new(RwLock::new(Config::load()?));

    let (mut redis_actor, redis_handle) = RedisActor::new(config.clone()).await;
    let _redis_task = tokio::spawn(async move {
        redis_actor.run().await;
    });

    let token_manager = TokenManager::new(config.clone(), redis_handle.clone());

    let (client_id, client_secret) = {
        let config_read = config.read().await;
        (
            config_read.google_client_id.clone(),
            config_read.google_client_secret.clone(),
        )
    };

    // Random state to match the callback to this request
    let state = uuid::Uuid::new_v4().to_string();

    let auth_url = Url::parse_with_params(
        AUTH_URL,
        &[
            ("client_id", client_id.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("scope", CALENDAR_SCOPE),
            ("state", state.as_str()),
        ],
    )
    .map_err(|e| other_error(&format!("Failed to build authorization URL: {}", e)))?;

    println!("Opening browser for Google Calendar authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("Open this URL to continue:\n{}", auth_url);
    }

    let server = tiny_http::Server::http("127.0.0.1:8080")?;
    println!("Waiting for authorization callback...");

    let request = server.recv()?;
    let callback = Url::parse(REDIRECT_URI)
        .and_then(|base| base.join(request.url()))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let param = |name: &str| {
        callback
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if param("state").as_deref() != Some(state.as_str()) {
        return Err(other_error("Callback state does not match the request"));
    }
    let code = param("code")
        .ok_or_else(|| other_error("No authorization code found in callback"))?;

    // Exchange code for tokens
    let client = reqwest::Client::new();
    let response = client
        .post(TOKEN_URL)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", REDIRECT_URI.to_string()),
            ("grant_type", "authorization_code".to_string()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        let error_text = response.text().await?;
        return Err(other_error(&format!("Failed to get token: {}", error_text)));
    }

    let mut token_data: serde_json::Value = response.json().await?;
    let expires_at = with_expiry(&token_data);

    let Some(obj) = token_data.as_object_mut() else {
        return Err(other_error("Token data is not an object"));
    };
    obj.insert("expires_at".to_string(), json!(expires_at));

    token_manager.set_token(token_data).await?;

    let response =
        tiny_http::Response::from_string("Authorization successful! You can close this window.");
    request.respond(response)?;

    println!("Token successfully saved to Redis!");
    redis_handle.shutdown().await
}
