/// Configuration management for the API server
///
/// Configuration is loaded from environment variables, with a `.env`
/// file picked up in development.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `DEFAULT_TIMEZONE`: IANA zone used when a viewer has none
///   configured (default: America/New_York)
/// - `RUST_LOG`: Log filter (default: info)
///
/// # Example
///
/// ```no_run
/// use towndesk_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```
use chrono_tz::Tz;
use std::env;
use towndesk_shared::db::pool::DatabaseConfig;
use towndesk_shared::presentation;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Display/rendering configuration
    pub presentation: PresentationConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Display/rendering configuration
#[derive(Debug, Clone)]
pub struct PresentationConfig {
    /// Zone used for viewers without a configured timezone
    pub default_timezone: Tz,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or any variable
    /// has an invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let default_timezone = match env::var("DEFAULT_TIMEZONE") {
            Ok(raw) => raw
                .parse::<Tz>()
                .map_err(|_| anyhow::anyhow!("DEFAULT_TIMEZONE is not a valid IANA zone: {raw}"))?,
            Err(_) => presentation::DEFAULT_ZONE,
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                ..Default::default()
            },
            presentation: PresentationConfig { default_timezone },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/towndesk_test".to_string(),
                ..Default::default()
            },
            presentation: PresentationConfig {
                default_timezone: presentation::DEFAULT_ZONE,
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_shipped_default_zone() {
        assert_eq!(
            test_config().presentation.default_timezone,
            chrono_tz::America::New_York
        );
    }
}
