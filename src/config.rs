use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Default location of the optional TOML overlay
pub const CONFIG_FILE: &str = "config/autoschedule.toml";

/// Label attached to the wake-up alarm
pub const DEFAULT_ALARM_LABEL: &str = "Work";

/// Hours between two alarm refreshes
pub const DEFAULT_REFRESH_INTERVAL_HOURS: u64 = 12;

/// Main configuration structure for the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google Calendar API client ID
    pub google_client_id: String,
    /// Google Calendar API client secret
    pub google_client_secret: String,
    /// Account whose writable calendar receives the shifts
    pub calendar_account: String,
    /// Timezone used for all wall-clock times
    pub timezone: String,
    /// Redis connection URL
    pub redis_url: String,
    /// Hours between alarm refreshes
    pub alarm_refresh_interval_hours: u64,
    /// Label shown on the wake-up alarm
    pub alarm_label: String,
}

/// Values that `config/autoschedule.toml` may override
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    alarm_refresh_interval_hours: Option<u64>,
    alarm_label: Option<String>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let google_client_id =
            env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret =
            env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;
        let calendar_account =
            env::var("CALENDAR_ACCOUNT").map_err(|_| env_error("CALENDAR_ACCOUNT"))?;

        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| String::from("redis://127.0.0.1:6379"));

        let alarm_refresh_interval_hours = match env::var("ALARM_REFRESH_INTERVAL_HOURS") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| config_error("Invalid ALARM_REFRESH_INTERVAL_HOURS format"))?,
            Err(_) => DEFAULT_REFRESH_INTERVAL_HOURS,
        };

        let mut config = Config {
            google_client_id,
            google_client_secret,
            calendar_account,
            timezone,
            redis_url,
            alarm_refresh_interval_hours,
            alarm_label: DEFAULT_ALARM_LABEL.to_string(),
        };

        if Path::new(CONFIG_FILE).exists() {
            let content = fs::read_to_string(CONFIG_FILE)?;
            config.apply_overrides(&content)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge values from a TOML overlay into this config
    pub fn apply_overrides(&mut self, content: &str) -> AppResult<()> {
        let overrides: FileOverrides = toml::from_str(content)?;

        if let Some(hours) = overrides.alarm_refresh_interval_hours {
            self.alarm_refresh_interval_hours = hours;
        }
        if let Some(label) = overrides.alarm_label {
            self.alarm_label = label;
        }

        Ok(())
    }

    /// Parsed timezone
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| config_error(&format!("Invalid TIMEZONE '{}': {}", self.timezone, e)))
    }

    fn validate(&self) -> AppResult<()> {
        self.tz()?;
        if self.alarm_refresh_interval_hours == 0 {
            return Err(config_error("ALARM_REFRESH_INTERVAL_HOURS must be at least 1"));
        }
        Ok(())
    }
}
