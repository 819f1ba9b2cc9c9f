use clap::Parser;
use std::{path::Path, sync::Arc};
use tracing::{info, warn};

use crate::{
    config::{Config, StartArgs},
    db::PgWarehouse,
    state::AppState,
    storage::{LocalStore, UrlSigner},
};

pub mod archive;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod naming;
pub mod palette;
pub mod router;
pub mod state;
pub mod storage;
pub mod template;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let StartArgs {
        config_path,
        address: host,
        port,
        log_level: level,
    } = StartArgs::parse();

    tracing_subscriber::fmt().with_max_level(level).init();

    let config = if Path::new(&config_path).exists() {
        Config::read(&config_path).expect("invalid config file")
    } else {
        warn!("{config_path} not found, using default configuration");
        Config::default()
    };

    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let db_pool = db::create_pool(&db_url)
        .await
        .expect("unable to connect to database");

    db::migrate(&db_pool).await.expect("error while migrating");

    let signer = UrlSigner::new(
        &config.storage.public_base_url,
        &config.storage.signing_secret,
    );
    let store = Arc::new(LocalStore::new(&config.storage.root, signer.clone()));
    let warehouse = Arc::new(PgWarehouse::new(db_pool));

    info!(
        "Object store at {}, {:?} delivery",
        config.storage.root, config.delivery
    );

    let state = AppState::new(&config, store, warehouse, signer);

    let addr = format!("{host}:{port}");
    info!("Now listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("error while starting TCP listener");

    let router = router::router(state, config.max_upload_bytes());

    axum::serve(listener, router)
        .await
        .expect("error while starting server");
}
