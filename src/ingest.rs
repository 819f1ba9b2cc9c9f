use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{sync::Arc, time::Instant};
use tracing::{error, info, warn};

use crate::{
    archive::BrandArchive,
    config::IngestConfig,
    db::Warehouse,
    naming::parse_category,
    storage::ObjectStore,
};

use self::category::{CategoryError, CategoryIngest, CategoryOutcome};

pub mod category;
pub mod models;

/// Result of one ingestion run. Always produced, failures included.
#[derive(Debug, Serialize)]
pub struct IngestReport {
    pub ok: bool,
    pub brand: String,
    pub run_id: uuid::Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub summary: Summary,
    pub errors: Vec<ReportError>,
    pub warnings: Vec<String>,
    pub categories: Vec<CategoryReport>,
}

#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub assets: u64,
    pub colors: u64,
}

#[derive(Debug, Serialize)]
pub struct ReportError {
    pub category: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryReport {
    pub category: String,
    pub ok: bool,
    pub inserted: u64,
    pub warnings: Vec<String>,
}

impl IngestReport {
    fn new(brand: &str, run_id: uuid::Uuid) -> Self {
        Self {
            ok: false,
            brand: brand.to_string(),
            run_id,
            started_at: Utc::now(),
            duration_ms: 0,
            summary: Summary::default(),
            errors: vec![],
            warnings: vec![],
            categories: vec![],
        }
    }

    fn fail(mut self, context: &str, message: String) -> Self {
        error!("Ingestion of '{}' aborted: {message}", self.brand);
        self.errors.push(ReportError {
            category: context.to_string(),
            message,
        });
        self.ok = false;
        self
    }
}

/// Runs brand packages through the category ingestors into the object store and warehouse.
#[derive(Clone)]
pub struct Ingestor {
    store: Arc<dyn ObjectStore>,
    warehouse: Arc<dyn Warehouse>,
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        warehouse: Arc<dyn Warehouse>,
        config: IngestConfig,
    ) -> Self {
        Self {
            store,
            warehouse,
            config,
        }
    }

    pub async fn ingest(&self, brand: &str, data: Bytes) -> IngestReport {
        let started = Instant::now();
        let run_id = uuid::Uuid::new_v4();
        let brand = brand.trim();
        let mut report = IngestReport::new(brand, run_id);

        if brand.is_empty() {
            return report.fail("*", "brand name is required".to_string());
        }

        let mut archive = match BrandArchive::open(data) {
            Ok(archive) => archive.with_entry_limit(self.config.max_entry_bytes),
            Err(e) => return report.fail("*", e.to_string()),
        };

        info!("Ingesting package for '{brand}' (run {run_id})");

        let layout = archive.walk(&self.config);

        for warning in layout.warnings {
            warn!("{warning}");
            report.warnings.push(warning);
        }

        if layout.categories.is_empty() {
            let warning = "archive contains no categories".to_string();
            warn!("{warning}");
            report.warnings.push(warning);
        }

        let deadline = self.config.time_budget().map(|budget| started + budget);

        for dir in layout.categories.iter() {
            let category = parse_category(&dir.dir_name);
            let key = category.key.clone();

            let (outcome, failure) = match deadline {
                Some(deadline) if Instant::now() >= deadline => (
                    CategoryOutcome {
                        dir_name: dir.dir_name.clone(),
                        ..Default::default()
                    },
                    Some(CategoryError::Deadline),
                ),
                _ => {
                    let ingest = CategoryIngest {
                        store: self.store.clone(),
                        config: &self.config,
                        run_id,
                        brand,
                        category,
                    };
                    ingest.run(&mut archive, dir).await
                }
            };

            let failure = match failure {
                Some(e) => Some(e.to_string()),
                None => self.load(&outcome, &mut report).await.err(),
            };

            let inserted = match failure {
                Some(_) => 0,
                None => (outcome.assets.len() + outcome.colors.len()) as u64,
            };

            match &failure {
                Some(message) => {
                    error!("Category {} failed: {message}", dir.dir_name);
                    report.errors.push(ReportError {
                        category: dir.dir_name.clone(),
                        message: message.clone(),
                    });
                }
                None => info!("Category {key}: {inserted} records"),
            }

            report.warnings.extend(
                outcome
                    .warnings
                    .iter()
                    .map(|w| format!("{}: {w}", dir.dir_name)),
            );

            report.categories.push(CategoryReport {
                category: dir.dir_name.clone(),
                ok: failure.is_none(),
                inserted,
                warnings: outcome.warnings,
            });
        }

        report.ok = report.errors.is_empty();
        report.duration_ms = started.elapsed().as_millis() as u64;

        info!(
            "Ingestion of '{brand}' finished in {}ms: {} assets, {} colors, {} errors, {} warnings",
            report.duration_ms,
            report.summary.assets,
            report.summary.colors,
            report.errors.len(),
            report.warnings.len()
        );

        report
    }

    /// One bulk load for the category, assets and colours together.
    async fn load(&self, outcome: &CategoryOutcome, report: &mut IngestReport) -> Result<(), String> {
        if outcome.assets.is_empty() && outcome.colors.is_empty() {
            return Ok(());
        }

        let loaded = self
            .warehouse
            .load_category(&outcome.assets, &outcome.colors)
            .await
            .map_err(|e| format!("load failed: {e}"))?;

        report.summary.assets += loaded.assets;
        report.summary.colors += loaded.colors;
        Ok(())
    }
}
