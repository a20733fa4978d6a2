//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use std::net::Ipv4Addr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Signing secret used when `JWT_SECRET` is not provided (development only)
const DEV_JWT_SECRET: &str = "staffdesk-dev-secret-change-in-production";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0), // Bind to 0.0.0.0 for Docker
            port: 5000,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_pool_size: usize,
    /// Connection requires TLS (`sslmode=require` or a managed host)
    pub require_tls: bool,
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

/// Token signing and transport configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Also accept the legacy `x-auth-token` header
    pub accept_legacy_header: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("accept_legacy_header", &self.accept_legacy_header)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl: Duration::from_secs(24 * 60 * 60),
            accept_legacy_header: false,
        }
    }
}

/// Account created at startup when both fields are configured
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    /// `None` runs the service on the in-memory store
    pub database: Option<DatabaseConfig>,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub store_timeout: Duration,
    pub seed_admin: Option<SeedAdmin>,
    /// Emit JSON log lines instead of the compact format
    pub json_logs: bool,
}

/// Longest accepted token lifetime (ten years)
const MAX_TOKEN_TTL_HOURS: u64 = 24 * 365 * 10;

/// Convert `TOKEN_TTL_HOURS` into a duration, rejecting zero and values that
/// would push `exp` out of range
fn token_ttl_from_hours(hours: u64) -> Result<Duration, ConfigError> {
    if hours == 0 {
        return Err(ConfigError::InvalidValue(
            "TOKEN_TTL_HOURS must be greater than zero".to_string(),
        ));
    }
    hours
        .checked_mul(60 * 60)
        .filter(|_| hours <= MAX_TOKEN_TTL_HOURS)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            ConfigError::InvalidValue(format!(
                "TOKEN_TTL_HOURS must be at most {}",
                MAX_TOKEN_TTL_HOURS
            ))
        })
}

/// `LOG_FORMAT=json` selects JSON log lines. Read before [`Settings::load`]
/// so that load-time warnings reach the configured subscriber.
pub fn json_logs_from_env() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        let server = ServerConfig {
            host: env_parse("HOST").unwrap_or_else(|| ServerConfig::default().host),
            port: env_parse("PORT").unwrap_or_else(|| ServerConfig::default().port),
        };

        let max_pool_size = env_parse("DB_MAX_CONNECTIONS").unwrap_or(10);
        let database = match std::env::var("DATABASE_URL") {
            Ok(url) => Some(Self::parse_database_url(&url, max_pool_size)?),
            Err(_) => None,
        };

        let cors = CorsConfig {
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|| CorsConfig::default().allowed_origins),
        };

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() < 16 => {
                return Err(ConfigError::InvalidValue(
                    "JWT_SECRET must be at least 16 characters".to_string(),
                ));
            }
            Ok(secret) => secret,
            Err(_) => {
                warn!("JWT_SECRET not set, using default (INSECURE - set in production!)");
                DEV_JWT_SECRET.to_string()
            }
        };

        let token_ttl = token_ttl_from_hours(env_parse("TOKEN_TTL_HOURS").unwrap_or(24))?;

        let auth = AuthConfig {
            jwt_secret,
            token_ttl,
            accept_legacy_header: env_parse("AUTH_ACCEPT_LEGACY_HEADER").unwrap_or(false),
        };

        let store_timeout = Duration::from_secs(env_parse("STORE_TIMEOUT_SECS").unwrap_or(5));

        let seed_admin = match (
            std::env::var("SEED_ADMIN_EMAIL"),
            std::env::var("SEED_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(SeedAdmin { email, password }),
            _ => None,
        };

        let json_logs = json_logs_from_env();

        Ok(Self {
            server,
            database,
            cors,
            auth,
            store_timeout,
            seed_admin,
            json_logs,
        })
    }

    /// Parse a DATABASE_URL connection string (postgresql://...)
    fn parse_database_url(url: &str, max_pool_size: usize) -> Result<DatabaseConfig, ConfigError> {
        let parsed = url::Url::parse(url).map_err(|_| {
            ConfigError::InvalidValue(
                "Invalid DATABASE_URL format (expected postgresql://...)".to_string(),
            )
        })?;

        if !matches!(parsed.scheme(), "postgres" | "postgresql") {
            return Err(ConfigError::InvalidValue(format!(
                "Unsupported DATABASE_URL scheme '{}'",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| ConfigError::InvalidValue("Missing host in DATABASE_URL".to_string()))?
            .to_string();

        let database = parsed.path().trim_start_matches('/').to_string();
        if database.is_empty() {
            return Err(ConfigError::InvalidValue(
                "Missing database name in DATABASE_URL".to_string(),
            ));
        }

        let require_tls = parsed
            .query_pairs()
            .any(|(k, v)| k == "sslmode" && v == "require")
            || host.ends_with("neon.tech");

        Ok(DatabaseConfig {
            port: parsed.port().unwrap_or(5432),
            user: parsed.username().to_string(),
            password: parsed.password().map(|p| p.to_string()).unwrap_or_default(),
            host,
            database,
            max_pool_size,
            require_tls,
        })
    }
}

/// Read and parse an environment variable, ignoring absent or unparsable values
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn test_default_token_ttl_is_one_day() {
        assert_eq!(AuthConfig::default().token_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn test_token_ttl_bounds() {
        assert_eq!(token_ttl_from_hours(24).unwrap(), Duration::from_secs(86_400));
        assert!(token_ttl_from_hours(MAX_TOKEN_TTL_HOURS).is_ok());

        assert!(token_ttl_from_hours(0).is_err());
        assert!(token_ttl_from_hours(MAX_TOKEN_TTL_HOURS + 1).is_err());
        // Would overflow u64 seconds
        assert!(token_ttl_from_hours(u64::MAX / 60).is_err());
    }

    #[test]
    fn test_parse_database_url() {
        let db = Settings::parse_database_url("postgres://hr:pw@db.local:6543/staff", 4).unwrap();
        assert_eq!(db.host, "db.local");
        assert_eq!(db.port, 6543);
        assert_eq!(db.user, "hr");
        assert_eq!(db.password, "pw");
        assert_eq!(db.database, "staff");
        assert_eq!(db.max_pool_size, 4);
        assert!(!db.require_tls);
    }

    #[test]
    fn test_parse_database_url_sslmode() {
        let db = Settings::parse_database_url("postgresql://u:p@host/db?sslmode=require", 10)
            .unwrap();
        assert_eq!(db.port, 5432);
        assert!(db.require_tls);
    }

    #[test]
    fn test_parse_database_url_rejects_other_schemes() {
        assert!(Settings::parse_database_url("mongodb://u:p@host/db", 10).is_err());
        assert!(Settings::parse_database_url("postgres://u:p@host/", 10).is_err());
        assert!(Settings::parse_database_url("not a url", 10).is_err());
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let auth = AuthConfig {
            jwt_secret: "super-secret-signing-key".to_string(),
            ..AuthConfig::default()
        };
        assert!(!format!("{:?}", auth).contains("super-secret"));
    }
}
