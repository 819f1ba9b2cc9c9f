use axum::{extract::multipart::MultipartError, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum BrandkitError {
    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("multipart: {0}")]
    Multipart(#[from] MultipartError),

    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{path} is larger than {limit} bytes")]
    EntryTooLarge { path: String, limit: u64 },
}

impl IntoResponse for BrandkitError {
    fn into_response(self) -> axum::response::Response {
        match self {
            BrandkitError::BadRequest(e) | BrandkitError::InvalidArchive(e) => {
                (StatusCode::BAD_REQUEST, e).into_response()
            }
            BrandkitError::Multipart(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
            BrandkitError::Forbidden(e) => (StatusCode::FORBIDDEN, e).into_response(),
            BrandkitError::Storage(StorageError::NotFound(e)) => {
                (StatusCode::NOT_FOUND, e).into_response()
            }
            BrandkitError::Storage(StorageError::InvalidPath(e)) => {
                (StatusCode::BAD_REQUEST, e).into_response()
            }
            e => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }
}
