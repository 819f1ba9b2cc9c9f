use std::{sync::Arc, time::Duration};

use crate::{
    catalog::Links,
    config::{Config, Delivery},
    db::Warehouse,
    ingest::Ingestor,
    storage::{ObjectStore, UrlSigner},
};

/// Shared handles for the HTTP layer. Every client is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Ingestor,
    pub store: Arc<dyn ObjectStore>,
    pub warehouse: Arc<dyn Warehouse>,
    pub signer: UrlSigner,
    pub delivery: Delivery,
    pub signed_url_ttl: Duration,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: Arc<dyn ObjectStore>,
        warehouse: Arc<dyn Warehouse>,
        signer: UrlSigner,
    ) -> Self {
        Self {
            ingestor: Ingestor::new(store.clone(), warehouse.clone(), config.ingest.clone()),
            store,
            warehouse,
            signer,
            delivery: config.delivery,
            signed_url_ttl: config.storage.signed_url_ttl(),
        }
    }

    pub fn links(&self) -> Links<'_> {
        match self.delivery {
            Delivery::Signed => Links::Signed {
                store: self.store.as_ref(),
                ttl: self.signed_url_ttl,
            },
            Delivery::Proxy => Links::Proxy,
        }
    }
}
