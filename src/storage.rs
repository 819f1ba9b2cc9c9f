//! Object store holding the raw asset payloads.
//!
//! Objects are addressed by a deterministic path,
//! `{brand}/{category}/[originals/|{subdirectory}/]{file name}`, built by [`object_path`].
//! File names are never renamed or transliterated.

use async_trait::async_trait;
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

mod local;

pub use local::LocalStore;

/// Folder name used in object paths for originals, whatever the archive called it.
pub const ORIGINALS_SEGMENT: &str = "originals";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid object path: {0}")]
    InvalidPath(String),

    #[error("storage: {0}")]
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` at `path`, overwriting. Returns a reference to the stored object.
    async fn write(&self, path: &str, data: Bytes, content_type: &str) -> StorageResult<String>;

    async fn read(&self, path: &str) -> StorageResult<Bytes>;

    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// A time limited link to the object.
    fn signed_url(&self, path: &str, ttl: Duration) -> String;
}

/// Where an asset lives below its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement<'a> {
    CategoryRoot,
    Originals,
    Subdirectory(&'a str),
}

pub fn object_path(brand: &str, category_key: &str, placement: Placement, file_name: &str) -> String {
    let brand = brand_segment(brand);
    match placement {
        Placement::CategoryRoot => format!("{brand}/{category_key}/{file_name}"),
        Placement::Originals => format!("{brand}/{category_key}/{ORIGINALS_SEGMENT}/{file_name}"),
        Placement::Subdirectory(dir) => format!("{brand}/{category_key}/{}/{file_name}", dir.trim()),
    }
}

/// The brand as a single path segment.
pub fn brand_segment(brand: &str) -> String {
    brand.trim().replace(['/', '\\'], "-")
}

/// Last segment of an object path, the file name as it was ingested.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Reject paths that could escape the store root.
pub fn validate_path(path: &str) -> StorageResult<()> {
    if path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|s| s.is_empty() || s == "." || s == "..")
    {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Guess content type from file extension
pub fn content_type(file_name: &str) -> &'static str {
    match crate::naming::extension(file_name).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("ai") | Some("eps") => "application/postscript",
        Some("psd") => "image/vnd.adobe.photoshop",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("zip") => "application/zip",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Percent-encode each segment of an object path for use in a URL.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Signs object paths for `/files/..` links.
#[derive(Debug, Clone)]
pub struct UrlSigner {
    base_url: String,
    secret: String,
}

impl UrlSigner {
    pub fn new(base_url: &str, secret: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            secret: secret.to_string(),
        }
    }

    pub fn sign(&self, path: &str, ttl: Duration) -> String {
        let expires = unix_now() + ttl.as_secs();
        let sig = self.signature(path, expires);
        format!(
            "{}/files/{}?expires={expires}&sig={sig}",
            self.base_url,
            encode_path(path)
        )
    }

    pub fn verify(&self, path: &str, expires: u64, sig: &str) -> bool {
        if unix_now() > expires {
            tracing::debug!("Signed link for {path} expired at {expires}");
            return false;
        }
        self.signature(path, expires) == sig
    }

    fn signature(&self, path: &str, expires: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(path.as_bytes());
        hasher.update(expires.to_le_bytes());
        let result = hasher.finalize();
        result[..16].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
