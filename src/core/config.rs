//! Configuration management

use crate::auth::password::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use clap::Parser;
use config::{Config as ConfigBuilder, ConfigError as BuilderError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),

    #[error("Invalid database configuration: {0}")]
    InvalidDatabase(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),

    #[error("Invalid security configuration: {0}")]
    InvalidSecurity(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<BuilderError> for ConfigError {
    fn from(err: BuilderError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl Config {
    /// Load configuration with precedence: CLI args > Environment variables > Config file > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        // Parse command-line arguments
        let cli_args = CliArgs::parse();

        // Build configuration with proper precedence
        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults (lowest priority).
        // security.jwt_secret deliberately has no default: an empty secret
        // fails validation below and the process refuses to start.
        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.max_connections", 100)?
            .set_default("server.request_timeout", 30)?
            .set_default("database.path", "./data/wellness-tracker.db")?
            .set_default("database.connection_pool_size", 10)?
            .set_default("database.busy_timeout", 5000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("logging.output", "stdout")?
            .set_default("logging.max_file_size", 10485760)? // 10 MB
            .set_default("logging.max_backups", 5)?
            .set_default("security.jwt_secret", "")?
            .set_default("security.token_expiry_minutes", 30)?
            .set_default("security.bcrypt_cost", bcrypt::DEFAULT_COST as u64)?
            .set_default("security.allowed_origins", vec!["*"])?;

        // 2. Load from config file if specified (medium priority)
        if let Some(config_path) = &cli_args.config {
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound(
                    config_path.display().to_string(),
                ));
            }
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        // 3. Override with environment variables (higher priority)
        // Environment variables should be prefixed with WELLNESS_ and use __ for nesting
        // Example: WELLNESS_SECURITY__JWT_SECRET=...
        builder = builder.add_source(
            Environment::with_prefix("WELLNESS")
                .separator("__")
                .try_parsing(true),
        );

        // 4. Override with CLI arguments (highest priority)
        if let Some(host) = &cli_args.host {
            builder = builder.set_override("server.host", host.clone())?;
        }
        if let Some(port) = cli_args.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(db_path) = &cli_args.database {
            builder = builder.set_override("database.path", db_path.display().to_string())?;
        }
        if let Some(log_level) = &cli_args.log_level {
            builder = builder.set_override("logging.level", log_level.clone())?;
        }

        // Build and deserialize configuration
        let config: Config = builder.build()?.try_deserialize()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let config: Config = ConfigBuilder::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logging.validate()?;
        self.security.validate()?;
        Ok(())
    }
}

/// Command-line arguments for configuration override
#[derive(Debug, Parser)]
#[command(name = "wellness-tracker")]
#[command(about = "Personal Wellness Tracker Backend Server", long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server host address
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Database file path
    #[arg(short, long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_connections: usize,
    pub request_timeout: u64, // seconds
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidServer("host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidServer("port must be greater than 0".to_string()));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidServer("max_connections must be greater than 0".to_string()));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidServer("request_timeout must be greater than 0".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub connection_pool_size: usize,
    pub busy_timeout: u64, // milliseconds
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidDatabase("path cannot be empty".to_string()));
        }

        if self.connection_pool_size == 0 {
            return Err(ConfigError::InvalidDatabase("connection_pool_size must be greater than 0".to_string()));
        }

        if self.busy_timeout == 0 {
            return Err(ConfigError::InvalidDatabase("busy_timeout must be greater than 0".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub log_file: Option<PathBuf>,
    pub max_file_size: usize, // bytes
    pub max_backups: usize,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(ConfigError::InvalidLogging(
                format!("level must be one of: {:?}", valid_levels)
            ));
        }

        let valid_formats = ["json", "text"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(ConfigError::InvalidLogging(
                format!("format must be one of: {:?}", valid_formats)
            ));
        }

        let valid_outputs = ["stdout", "file"];
        if !valid_outputs.contains(&self.output.as_str()) {
            return Err(ConfigError::InvalidLogging(
                format!("output must be one of: {:?}", valid_outputs)
            ));
        }

        if self.output == "file" && self.log_file.is_none() {
            return Err(ConfigError::InvalidLogging(
                "log_file must be specified when output is 'file'".to_string()
            ));
        }

        if self.max_file_size == 0 {
            return Err(ConfigError::InvalidLogging("max_file_size must be greater than 0".to_string()));
        }

        if self.max_backups == 0 {
            return Err(ConfigError::InvalidLogging("max_backups must be greater than 0".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub token_expiry_minutes: u64,
    pub bcrypt_cost: u32,
    pub allowed_origins: Vec<String>,
}

impl SecurityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // A missing signing secret is a fatal startup error, never a
        // per-request failure.
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidSecurity(
                "jwt_secret must be provided (set WELLNESS_SECURITY__JWT_SECRET or security.jwt_secret)".to_string()
            ));
        }

        if self.token_expiry_minutes == 0 {
            return Err(ConfigError::InvalidSecurity(
                "token_expiry_minutes must be greater than 0".to_string()
            ));
        }

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidSecurity(format!(
                "bcrypt_cost must be between {} and {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            )));
        }

        if self.allowed_origins.is_empty() {
            return Err(ConfigError::InvalidSecurity("allowed_origins cannot be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_security() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "test-secret".to_string(),
            token_expiry_minutes: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            allowed_origins: vec!["*".to_string()],
        }
    }

    #[test]
    fn test_security_validation_accepts_valid_config() {
        assert!(valid_security().validate().is_ok());
    }

    #[test]
    fn test_empty_jwt_secret_is_rejected() {
        let mut security = valid_security();
        security.jwt_secret = String::new();
        assert!(security.validate().is_err());
    }

    #[test]
    fn test_zero_token_expiry_is_rejected() {
        let mut security = valid_security();
        security.token_expiry_minutes = 0;
        assert!(security.validate().is_err());
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let mut security = valid_security();
        security.bcrypt_cost = 2;
        assert!(security.validate().is_err());

        security.bcrypt_cost = MIN_BCRYPT_COST;
        assert!(security.validate().is_ok());

        security.bcrypt_cost = MAX_BCRYPT_COST + 1;
        assert!(security.validate().is_err());
    }

    #[test]
    fn test_server_validation() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_connections: 100,
            request_timeout: 30,
        };
        assert!(server.validate().is_ok());

        let bad_port = ServerConfig { port: 0, ..server.clone() };
        assert!(bad_port.validate().is_err());

        let bad_host = ServerConfig { host: String::new(), ..server };
        assert!(bad_host.validate().is_err());
    }

    #[test]
    fn test_from_file_loads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wellness.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 3000
max_connections = 100
request_timeout = 30

[database]
path = "wellness.db"
connection_pool_size = 4
busy_timeout = 5000

[logging]
level = "info"
format = "json"
output = "stdout"
max_file_size = 10485760
max_backups = 5

[security]
jwt_secret = "file-secret"
token_expiry_minutes = 45
bcrypt_cost = 10
allowed_origins = ["*"]
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.security.jwt_secret, "file-secret");
        assert_eq!(config.security.token_expiry_minutes, 45);

        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_logging_validation() {
        let logging = LoggingConfig {
            level: "info".to_string(),
            format: "json".to_string(),
            output: "stdout".to_string(),
            log_file: None,
            max_file_size: 10485760,
            max_backups: 5,
        };
        assert!(logging.validate().is_ok());

        let bad_level = LoggingConfig { level: "verbose".to_string(), ..logging.clone() };
        assert!(bad_level.validate().is_err());

        let file_without_path = LoggingConfig { output: "file".to_string(), ..logging };
        assert!(file_without_path.validate().is_err());
    }
}
