use std::io::{Error, ErrorKind};
use std::sync::Arc;

use actix_web::{
    middleware::{Logger, NormalizePath, TrailingSlash},
    web, App, HttpServer,
};

use clap::Arg;

use log::info;

use storefinder::config::{self, Config, DatabaseConfig};
use storefinder::data::{Data, DatabaseType};
use storefinder::file::local::Local;
use storefinder::logger;
use storefinder::memory::InMemory;
use storefinder::mongo::MongoDB;
use storefinder::services;

fn startup_error<E: std::fmt::Display>(e: E) -> Error {
    Error::new(ErrorKind::Other, e.to_string())
}

async fn connect(config: &DatabaseConfig) -> std::io::Result<DatabaseType> {
    if config.backend == DatabaseConfig::MEMORY {
        info!("Using the in-memory database, nothing will be persisted.");

        Ok(Arc::new(InMemory::new()))
    } else {
        let mongo = MongoDB::new(config).await.map_err(startup_error)?;
        mongo.ensure_indexes().await.map_err(startup_error)?;

        Ok(Arc::new(mongo))
    }
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    logger::Logger::init();

    let matches = clap::App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Path of the TOML configuration")
                .takes_value(true),
        )
        .get_matches();

    let config = Config::new(matches.value_of("config").unwrap_or(config::DEFAULT_PATH))
        .map_err(startup_error)?;

    let _sentry = config
        .sentry
        .as_ref()
        .map(|sentry| sentry::init(sentry.dsn.as_str()));

    let data = Data::new(
        Arc::new(Local::new(config.service.clone())),
        connect(&config.database).await?,
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(data.clone()))
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .wrap(Logger::default())
            .configure(services::config)
            .default_service(web::route().to(services::not_found))
    })
    .bind(format!(
        "{}:{}",
        config.server.bind_address, config.server.bind_port
    ))?
    .run()
    .await
}
