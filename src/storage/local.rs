//! Local filesystem object store.

use async_trait::async_trait;
use bytes::Bytes;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::fs;
use tracing::debug;

use super::{validate_path, ObjectStore, StorageError, StorageResult, UrlSigner};

/// Stores objects under `root` using the object path verbatim:
///
/// ```text
/// {root}/
///   {brand}/{category}/{subdirectory}/{file name}
/// ```
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
    signer: UrlSigner,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, signer: UrlSigner) -> Self {
        Self {
            root: root.into(),
            signer,
        }
    }

    fn object_path(&self, path: &str) -> StorageResult<PathBuf> {
        validate_path(path)?;
        Ok(path.split('/').fold(self.root.clone(), |acc, s| acc.join(s)))
    }

    async fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn write(&self, path: &str, data: Bytes, content_type: &str) -> StorageResult<String> {
        let full = self.object_path(path)?;
        self.ensure_parent(&full).await?;
        fs::write(&full, &data).await?;
        debug!("Stored {path} ({} bytes, {content_type})", data.len());
        Ok(format!("file://{}", full.display()))
    }

    async fn read(&self, path: &str) -> StorageResult<Bytes> {
        let full = self.object_path(path)?;
        let data = fs::read(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(path.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let full = self.object_path(path)?;
        Ok(fs::try_exists(&full).await? && full.is_file())
    }

    fn signed_url(&self, path: &str, ttl: Duration) -> String {
        self.signer.sign(path, ttl)
    }
}
