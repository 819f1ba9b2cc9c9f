use crate::{error::BrandkitError, naming::extension};
use clap::Parser;
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

#[derive(Debug, Clone, Parser)]
pub struct StartArgs {
    #[arg(short, long, default_value = "config.json")]
    pub config_path: String,

    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    #[arg(short, long, default_value = "3030")]
    pub port: u16,

    #[arg(short, long, default_value = "INFO")]
    pub log_level: tracing::Level,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,

    pub ingest: IngestConfig,

    /// How gallery image links are resolved
    pub delivery: Delivery,

    /// Request body limit for archive uploads, in megabytes
    pub max_upload_mb: Option<usize>,
}

impl Config {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, BrandkitError> {
        let config = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&config)?)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.unwrap_or(DEFAULT_MAX_UPLOAD_MB) * 1024 * 1024
    }
}

const DEFAULT_MAX_UPLOAD_MB: usize = 200;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory backing the object store
    pub root: String,

    /// Prefix prepended to signed `/files/..` links
    pub public_base_url: String,

    pub signing_secret: String,

    pub signed_url_ttl_secs: u64,
}

impl StorageConfig {
    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "./data/objects".to_string(),
            public_base_url: String::new(),
            signing_secret: "brandkit-dev-secret".to_string(),
            signed_url_ttl_secs: 3600,
        }
    }
}

const GALLERY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "svg", "pdf", "ttf", "otf", "woff", "woff2",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Maximum number of concurrent uploads within one category
    pub upload_concurrency: usize,

    /// Category slugs parsed as colour palettes
    pub colors_categories: Vec<String>,

    /// Category slugs that fail without an originals folder
    pub originals_required: Vec<String>,

    /// Accepted names for the originals folder, compared case-insensitively
    pub originals_dirs: Vec<String>,

    pub column_parity: ColumnParity,

    /// Extensions, lower-case and without the dot, accepted in galleries. Originals are not
    /// filtered.
    pub gallery_extensions: Vec<String>,

    /// Largest decompressed size of a single archive entry
    pub max_entry_bytes: u64,

    pub time_budget_secs: Option<u64>,
}

impl IngestConfig {
    pub fn is_colors_category(&self, key: &str) -> bool {
        self.colors_categories.iter().any(|c| c == key)
    }

    pub fn requires_originals(&self, key: &str) -> bool {
        self.originals_required.iter().any(|c| c == key)
    }

    pub fn is_originals_dir(&self, dir_name: &str) -> bool {
        let dir_name = dir_name.trim().to_lowercase();
        self.originals_dirs.iter().any(|d| *d == dir_name)
    }

    pub fn is_gallery_file(&self, file_name: &str) -> bool {
        extension(file_name).is_some_and(|ext| self.gallery_extensions.iter().any(|e| *e == ext))
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs.map(Duration::from_secs)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            upload_concurrency: 4,
            colors_categories: vec!["colors".to_string(), "cores".to_string()],
            originals_required: vec!["tipografia".to_string(), "typography".to_string()],
            originals_dirs: vec!["originals".to_string(), "originais".to_string()],
            column_parity: ColumnParity::Accept,
            gallery_extensions: GALLERY_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_entry_bytes: 256 * 1024 * 1024,
            time_budget_secs: None,
        }
    }
}

/// What to do with a 2-column subcategory holding an odd number of files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnParity {
    #[default]
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    Signed,
    #[default]
    Proxy,
}
