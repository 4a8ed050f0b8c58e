use config::{Config, Environment as EnvSource, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Accepts the short forms older deployments set. Anything else runs as
    /// development.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "develop" | "dev" => Environment::Development,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            other => {
                tracing::warn!(environment = other, "unknown environment, using development");
                Environment::Development
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Environment::from_name(&name))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_max_body_bytes() -> usize {
    64 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            pool_size: default_pool_size(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("notebot.db")
}
fn default_pool_size() -> usize {
    8
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Shared secret expected in the `adminKey` query parameter.
    #[serde(default)]
    pub admin_key: String,
}

/// Per-IP token bucket. `per_second` is a sustained request rate, not the
/// governor refill period.
#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_per_second")]
    pub per_second: u64,
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: default_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

impl RateLimitConfig {
    /// Milliseconds between token refills for the configured rate.
    pub fn replenish_interval_ms(&self) -> u64 {
        (1000 / self.per_second.max(1)).max(1)
    }
}

fn default_per_second() -> u64 {
    20
}
fn default_burst_size() -> u32 {
    50
}

impl AppConfig {
    /// Validate configuration for security requirements.
    pub fn validate(&self) -> Result<(), String> {
        if self.auth.admin_key.trim().is_empty() {
            return Err("auth.admin_key must be set. \
                 Set ADMIN_KEY or NOTEBOT__AUTH__ADMIN_KEY, or add it to config.toml."
                .to_string());
        }
        if self.rate_limit.per_second == 0 || self.rate_limit.burst_size == 0 {
            return Err("rate_limit.per_second and rate_limit.burst_size must be positive".to_string());
        }
        Ok(())
    }

    pub fn load(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();

        let path = config_path.unwrap_or("config.toml");
        builder = builder.add_source(File::with_name(path).required(false));

        // NOTEBOT__SERVER__PORT=3001, etc.
        builder = builder.add_source(
            EnvSource::with_prefix("NOTEBOT")
                .separator("__")
                .try_parsing(true),
        );

        // Flat variables used by existing deployments take precedence.
        builder = builder
            .set_override_option("auth.admin_key", env_var("ADMIN_KEY"))?
            .set_override_option("environment", env_var("ENVIRONMENT"))?
            .set_override_option("server.port", env_var("PORT"))?
            .set_override_option("database.path", env_var("DATABASE_PATH"))?;

        builder.build()?.try_deserialize()
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Load `.env` outside production, mirroring how the service is deployed.
pub fn load_dotenv() {
    let environment = std::env::var("ENVIRONMENT").map(|e| Environment::from_name(&e));
    if environment == Ok(Environment::Production) {
        return;
    }
    match dotenvy::dotenv() {
        Ok(path) => eprintln!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => eprintln!("failed to load .env: {e}"),
    }
}
