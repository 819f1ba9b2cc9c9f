use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_macros::debug_handler;
use bytes::Bytes;
use tracing::info;

use crate::{
    error::BrandkitError,
    ingest::IngestReport,
    state::AppState,
    template::{sample_palette, template_zip},
};

pub(super) fn ingest_router(state: AppState, max_upload_bytes: usize) -> Router {
    let upload = Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    let router = Router::new()
        .route("/template.zip", get(template))
        .route("/colors.json", get(colors_json))
        .merge(upload)
        .with_state(state);

    Router::new().nest("/ingest", router)
}

#[debug_handler]
async fn upload(
    state: State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestReport>, BrandkitError> {
    let mut brand: Option<String> = None;
    let mut archive: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "brand_name" => brand = Some(field.text().await?),
            "zip_file" => archive = Some(field.bytes().await?),
            _ => {}
        }
    }

    let brand = brand
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .ok_or_else(|| BrandkitError::BadRequest("brand_name is required".to_string()))?;

    let archive = archive
        .filter(|a| !a.is_empty())
        .ok_or_else(|| BrandkitError::BadRequest("zip_file is required".to_string()))?;

    info!("Received package for '{brand}' ({} bytes)", archive.len());

    Ok(Json(state.ingestor.ingest(&brand, archive).await))
}

async fn template() -> Result<impl IntoResponse, BrandkitError> {
    let zip = template_zip()?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"brand-package-template.zip\"",
            ),
        ],
        zip,
    ))
}

async fn colors_json() -> impl IntoResponse {
    (
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"colors.json\"",
        )],
        Json(sample_palette()),
    )
}
