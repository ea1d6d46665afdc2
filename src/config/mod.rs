use std::collections::HashMap;
use std::env;

use log::info;
use serde::Deserialize;
use thiserror::Error;

#[cfg(test)]
mod tests;

pub const DEFAULT_PATH: &str = "config/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Couldn't open \"{0}\": {1}")]
    Read(String, String),
    #[error("Couldn't substitute the environment variables: {0}")]
    Substitution(String),
    #[error("Error loading the configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Unsupported {0} \"{1}\"")]
    Unsupported(&'static str, String),
}

#[derive(Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sentry: Option<SentryConfig>,
}

#[derive(Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "ServiceConfig::default_filesystem")]
    pub filesystem: String,
    /// Public directory uploaded photos are written to.
    pub path: String,
}

#[derive(Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub bind_port: u16,
}

#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_backend")]
    pub backend: String,
    pub string: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub db_name: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct SentryConfig {
    pub dsn: String,
}

impl ServiceConfig {
    pub const LOCAL: &'static str = "local";

    fn default_filesystem() -> String {
        Self::LOCAL.into()
    }
}

impl DatabaseConfig {
    pub const MONGO: &'static str = "mongo";
    pub const MEMORY: &'static str = "memory";

    fn default_backend() -> String {
        Self::MONGO.into()
    }
}

impl Config {
    pub fn new<S: AsRef<str>>(path: S) -> Result<Self, ConfigError> {
        match crystalsoft_utils::read_file_string(path.as_ref()) {
            Ok(configuration) => {
                info!("\"{}\" loaded correctly.", path.as_ref());

                Self::parse(configuration)
            }
            Err(e) => Err(ConfigError::Read(
                path.as_ref().to_owned(),
                format!("{:#?}", e),
            )),
        }
    }

    /// Parses TOML after replacing `${VAR}` references with environment values.
    ///
    /// Only the variables the configuration references take part in the substitution.
    pub fn parse(configuration: String) -> Result<Self, ConfigError> {
        let variables = env::vars()
            .filter(|(name, _)| configuration.contains(&format!("${{{}}}", name)))
            .collect::<HashMap<_, _>>();

        let configuration = envsubst::substitute(configuration, &variables)
            .map_err(|e| ConfigError::Substitution(format!("{:#?}", e)))?;

        let config: Self = toml::from_str(&configuration)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.service.filesystem != ServiceConfig::LOCAL {
            return Err(ConfigError::Unsupported(
                "service.filesystem",
                self.service.filesystem.clone(),
            ));
        }

        let backend = self.database.backend.as_str();
        if backend != DatabaseConfig::MONGO && backend != DatabaseConfig::MEMORY {
            return Err(ConfigError::Unsupported(
                "database.backend",
                self.database.backend.clone(),
            ));
        }

        Ok(())
    }
}
