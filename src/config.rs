use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub owner_email: String,
    pub owner_password: String,
    pub default_timezone: String,
    pub session_duration_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://oxibook.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let owner_email = env::var("OWNER_EMAIL").map_err(|_| ConfigError::MissingOwnerEmail)?;

        let owner_password =
            env::var("OWNER_PASSWORD").map_err(|_| ConfigError::MissingOwnerPassword)?;

        let default_timezone = env::var("DEFAULT_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        if default_timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::InvalidTimezone(default_timezone));
        }

        let session_duration_hours = env::var("SESSION_DURATION_HOURS")
            .unwrap_or_else(|_| "9".to_string())
            .parse()
            .unwrap_or(9);

        Ok(Config {
            database_url,
            server_host,
            server_port,
            owner_email,
            owner_password,
            default_timezone,
            session_duration_hours,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OWNER_EMAIL environment variable not set")]
    MissingOwnerEmail,

    #[error("OWNER_PASSWORD environment variable not set")]
    MissingOwnerPassword,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("DEFAULT_TIMEZONE is not a valid IANA timezone: {0}")]
    InvalidTimezone(String),
}
