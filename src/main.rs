use std::{fs::OpenOptions, sync::Arc};

use actix_web::{web, App, HttpServer};
use migration::{Migrator, MigratorTrait as _};
use sea_orm::Database;
use tracing::Level;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{filter, fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use crate::{
    assets::{AssetStore, DisabledAssets},
    auth::Authority,
    clock::WorkClock,
    error::ApiError,
};

mod clock;
mod config;
mod consts;

mod assets;
mod auth;
mod entity;
mod error;
mod pages;
mod payroll;

#[actix_web::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let log_file = OpenOptions::new()
        .append(true)
        .create(true)
        .open("trace.log")
        .unwrap();

    let subscriber = Registry::default()
        .with(
            fmt::layer()
                .with_ansi(true)
                .with_line_number(true)
                .with_filter(EnvFilter::from_default_env())
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(log_file)
                .with_filter(filter::LevelFilter::from_level(Level::TRACE))
        );

    tracing::subscriber::set_global_default(subscriber).unwrap();

    let config::Config {
        host_address,
        database_opt,
        jwt_key,
        run_migrations
    } = config::load();

    let database = Database::connect(database_opt).await.expect("Unable to connect to database");

    if run_migrations {
        Migrator::up(&database, None).await.expect("Unable to run migrations");
    }

    let database = web::Data::new(database);
    let authority = web::Data::new(Authority::new(jwt_key.as_bytes()));
    let clock = web::Data::new(WorkClock::honduras());
    let assets: web::Data<dyn AssetStore> = web::Data::from(Arc::new(DisabledAssets) as Arc<dyn AssetStore>);

    // Malformed payloads and query strings come back in the same envelope
    // as every other request failure.
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _| ApiError::validation(err.to_string()).into());
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _| ApiError::validation(err.to_string()).into());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(database.clone())
            .app_data(authority.clone())
            .app_data(clock.clone())
            .app_data(assets.clone())
            .app_data(json_config.clone())
            .app_data(query_config.clone())
            .wrap(TracingLogger::default())
            .configure(pages::config)
    });

    server
        .bind(host_address).unwrap()
        .run().await.unwrap();
}
