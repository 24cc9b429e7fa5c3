use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Calendar permission denied: cannot add events without calendar access")]
    #[diagnostic(
        code(autoschedule::permission_denied),
        help("run get_calendar_token to grant calendar access")
    )]
    PermissionDenied,

    #[error("No writable calendar found for {account}")]
    #[diagnostic(code(autoschedule::calendar_lookup))]
    CalendarLookup { account: String },

    #[error("Invalid image: {0}")]
    #[diagnostic(code(autoschedule::decode))]
    Decode(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(autoschedule::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(autoschedule::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(autoschedule::google_calendar))]
    GoogleCalendar(String),

    #[error("Redis error: {0}")]
    #[diagnostic(code(autoschedule::redis))]
    Redis(String),

    #[error("Alarm error: {0}")]
    #[diagnostic(code(autoschedule::alarm))]
    Alarm(String),

    #[error(transparent)]
    #[diagnostic(code(autoschedule::io))]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(autoschedule::http))]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(autoschedule::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(autoschedule::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// tiny_http reports server start-up failures as boxed errors
impl From<Box<dyn std::error::Error + Send + Sync>> for Error {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Error::Other(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create Redis errors
pub fn redis_error(message: &str) -> Error {
    Error::Redis(message.to_string())
}

/// Helper to create alarm errors
pub fn alarm_error(message: &str) -> Error {
    Error::Alarm(message.to_string())
}

/// Helper to create image decode errors
pub fn decode_error(message: &str) -> Error {
    Error::Decode(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
