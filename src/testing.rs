//! In-memory collaborators and archive builders for tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{
    db::{Loaded, Warehouse},
    error::BrandkitError,
    ingest::models::{AssetRecord, ColorRecord, RecordScope, SubcategoryInfo},
    naming::parse_category,
    storage::{ObjectStore, StorageError, StorageResult},
};

pub fn zip_archive(entries: &[(&str, &[u8])]) -> Bytes {
    crate::template::pack(entries).unwrap()
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub objects: Mutex<HashMap<String, (Bytes, String)>>,
    failing: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A store refusing writes to any path ending in one of `suffixes`.
    pub fn failing_on(suffixes: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: suffixes.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths = self.objects.lock().unwrap().keys().cloned().collect::<Vec<_>>();
        paths.sort();
        paths
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .map(|(_, ct)| ct.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn write(&self, path: &str, data: Bytes, content_type: &str) -> StorageResult<String> {
        if self.failing.iter().any(|s| path.ends_with(s.as_str())) {
            return Err(StorageError::Other(format!("refused {path}")));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), (data, content_type.to_string()));
        Ok(format!("memory://{path}"))
    }

    async fn read(&self, path: &str) -> StorageResult<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(path))
    }

    fn signed_url(&self, path: &str, ttl: Duration) -> String {
        format!("memory://{path}?ttl={}", ttl.as_secs())
    }
}

#[derive(Debug, Default)]
pub struct MemoryWarehouse {
    pub assets: Mutex<Vec<AssetRecord>>,
    pub colors: Mutex<Vec<ColorRecord>>,
    /// Number of committed category loads
    pub loads: Mutex<usize>,
    fail_loads: bool,
    fail_colors: bool,
}

impl MemoryWarehouse {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_loads: true,
            ..Default::default()
        })
    }

    /// A warehouse rejecting every load that carries colours.
    pub fn failing_colors() -> Arc<Self> {
        Arc::new(Self {
            fail_colors: true,
            ..Default::default()
        })
    }

    pub fn assets(&self) -> Vec<AssetRecord> {
        self.assets.lock().unwrap().clone()
    }

    pub fn colors(&self) -> Vec<ColorRecord> {
        self.colors.lock().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        *self.loads.lock().unwrap()
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn load_category(
        &self,
        assets: &[AssetRecord],
        colors: &[ColorRecord],
    ) -> Result<Loaded, BrandkitError> {
        if self.fail_loads || (self.fail_colors && !colors.is_empty()) {
            return Err(BrandkitError::BadRequest("warehouse unavailable".to_string()));
        }
        *self.loads.lock().unwrap() += 1;
        self.assets.lock().unwrap().extend_from_slice(assets);
        self.colors.lock().unwrap().extend_from_slice(colors);
        Ok(Loaded {
            assets: assets.len() as u64,
            colors: colors.len() as u64,
        })
    }

    async fn list_assets(&self, brand: &str) -> Result<Vec<AssetRecord>, BrandkitError> {
        Ok(self
            .assets()
            .into_iter()
            .filter(|a| a.brand_name.to_lowercase() == brand.to_lowercase())
            .collect())
    }

    async fn list_colors(&self, brand: &str) -> Result<Vec<ColorRecord>, BrandkitError> {
        Ok(self
            .colors()
            .into_iter()
            .filter(|c| c.brand_name.to_lowercase() == brand.to_lowercase())
            .collect())
    }
}

fn subcategory(dir_name: &str) -> SubcategoryInfo {
    SubcategoryInfo::parse(dir_name).unwrap_or_else(|| SubcategoryInfo::fallback(dir_name))
}

/// An uploaded image record of brand `Acme` in category `01-{category}`.
pub fn image_record(category: &str, subdir: Option<&str>, name: &str) -> AssetRecord {
    let category_name = parse_category(&format!("01-{category}"));
    let sub = subdir.map(subcategory);
    let scope = RecordScope {
        run_id: uuid::Uuid::nil(),
        brand: "Acme",
        category: &category_name,
        subcategory: sub.as_ref(),
    };
    let path = match subdir {
        Some(dir) => format!("Acme/{category}/{dir}/{name}"),
        None => format!("Acme/{category}/{name}"),
    };
    let url = format!("memory://{path}");
    scope.image(name, crate::naming::file_sequence(name), false, path, url)
}

pub fn text_record(category: &str, subdir: Option<&str>, name: &str, text: &str) -> AssetRecord {
    let category_name = parse_category(&format!("01-{category}"));
    let sub = subdir.map(subcategory);
    let scope = RecordScope {
        run_id: uuid::Uuid::nil(),
        brand: "Acme",
        category: &category_name,
        subcategory: sub.as_ref(),
    };
    scope.text(name, crate::naming::file_sequence(name), text.to_string())
}
