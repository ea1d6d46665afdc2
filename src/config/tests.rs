use std::env;

use crate::config::{Config, ConfigError, DatabaseConfig, ServiceConfig};

const CONFIGURATION: &str = r#"
[server]
bind_address = "127.0.0.1"
bind_port = 7777

[service]
path = "public/uploads/"

[database]
host = "${STOREFINDER_TEST_MONGO_HOST}"
port = 27018
db_name = "storefinder"
"#;

#[test]
fn test_parse_substitutes_environment() {
    env::set_var("STOREFINDER_TEST_MONGO_HOST", "mongo.internal");

    let config = Config::parse(CONFIGURATION.into()).unwrap();

    assert_eq!(config.server.bind_port, 7777);
    assert_eq!(config.database.host.as_deref(), Some("mongo.internal"));
    assert_eq!(config.database.port, Some(27018));
    assert!(config.sentry.is_none());
}

#[test]
fn test_parse_defaults() {
    env::set_var("STOREFINDER_TEST_MONGO_HOST", "mongo.internal");

    let config = Config::parse(CONFIGURATION.into()).unwrap();

    assert_eq!(config.service.filesystem, ServiceConfig::LOCAL);
    assert_eq!(config.database.backend, DatabaseConfig::MONGO);
}

#[test]
fn test_parse_memory_backend() {
    let config = Config::parse(
        r#"
[server]
bind_address = "0.0.0.0"
bind_port = 8080

[service]
path = "uploads"

[database]
backend = "memory"

[sentry]
dsn = "https://key@sentry.example.com/1"
"#
        .into(),
    )
    .unwrap();

    assert_eq!(config.database.backend, DatabaseConfig::MEMORY);
    assert!(config.database.host.is_none());
    assert_eq!(
        config.sentry.map(|sentry| sentry.dsn),
        Some("https://key@sentry.example.com/1".to_owned())
    );
}

#[test]
fn test_missing_file() {
    assert!(Config::new("config/does-not-exist.toml").is_err());
}

#[test]
fn test_parse_ignores_unreferenced_variables() {
    env::set_var("STOREFINDER_TEST_MONGO_HOST", "mongo.internal");
    env::set_var("STOREFINDER_TEST_WEATHER", r#"{"temperature": 21, "unit": "${C}"}"#);

    let config = Config::parse(CONFIGURATION.into()).unwrap();

    assert_eq!(config.database.host.as_deref(), Some("mongo.internal"));
}

#[test]
fn test_parse_rejects_unsupported_filesystem() {
    let result = Config::parse(
        r#"
[server]
bind_address = "0.0.0.0"
bind_port = 8080

[service]
filesystem = "s3"
path = "uploads"

[database]
backend = "memory"
"#
        .into(),
    );

    assert!(matches!(
        result,
        Err(ConfigError::Unsupported("service.filesystem", ref value)) if value == "s3"
    ));
}

#[test]
fn test_parse_rejects_unknown_backend() {
    let result = Config::parse(
        r#"
[server]
bind_address = "0.0.0.0"
bind_port = 8080

[service]
path = "uploads"

[database]
backend = "postgres"
"#
        .into(),
    );

    assert!(matches!(
        result,
        Err(ConfigError::Unsupported("database.backend", _))
    ));
}
