use axum::{
    extract::{Path, Query, State},
    http::{header, Method},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::{
    catalog::{self, GalleryCategory, GalleryFilter, SidebarCategory},
    error::BrandkitError,
    ingest::models::ColorRecord,
    state::AppState,
    storage::{content_type, file_name_of},
};

use self::ingest::ingest_router;

mod ingest;

const IMMUTABLE_CACHE: &str = "public, max-age=31536000";
const PRIVATE_CACHE: &str = "private, max-age=0";

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST]);

    public_router(state.clone())
        .merge(ingest_router(state, max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn public_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/assets/sidebar", get(sidebar))
        .route("/assets/gallery", get(gallery))
        .route("/assets/colors", get(colors))
        .route("/stream/*path", get(stream))
        .route("/files/*path", get(signed_file))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct BrandQuery {
    brand_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    brand_name: Option<String>,
    category_key: Option<String>,
    subcategory_seq: Option<String>,
}

fn required_brand(brand: Option<&String>) -> Result<&str, BrandkitError> {
    brand
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .ok_or_else(|| BrandkitError::BadRequest("brand_name is required".to_string()))
}

pub async fn sidebar(
    state: State<AppState>,
    query: Query<BrandQuery>,
) -> Result<Json<Vec<SidebarCategory>>, BrandkitError> {
    let brand = required_brand(query.brand_name.as_ref())?;
    let assets = state.warehouse.list_assets(brand).await?;
    Ok(Json(catalog::sidebar(&assets)))
}

pub async fn gallery(
    state: State<AppState>,
    query: Query<GalleryQuery>,
) -> Result<Json<Vec<GalleryCategory>>, BrandkitError> {
    let brand = required_brand(query.brand_name.as_ref())?;

    let filter = GalleryFilter {
        category_key: query
            .category_key
            .as_ref()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()),
        subcategory_seq: query
            .subcategory_seq
            .as_ref()
            .and_then(|s| s.trim().parse().ok()),
    };

    let assets = state.warehouse.list_assets(brand).await?;
    info!("Gallery for '{brand}' from {} records", assets.len());

    Ok(Json(catalog::gallery(&assets, &filter, &state.links())))
}

pub async fn colors(
    state: State<AppState>,
    query: Query<BrandQuery>,
) -> Result<Json<Vec<ColorRecord>>, BrandkitError> {
    let brand = required_brand(query.brand_name.as_ref())?;
    let mut colors = state.warehouse.list_colors(brand).await?;
    catalog::sort_colors(&mut colors);
    Ok(Json(colors))
}

/// Proxy delivery of stored objects.
pub async fn stream(
    state: State<AppState>,
    path: Path<String>,
) -> Result<Response, BrandkitError> {
    debug!("Streaming {}", path.0);
    let data = state.store.read(&path).await?;

    let cache = if path.contains("fonts") {
        IMMUTABLE_CACHE
    } else {
        PRIVATE_CACHE
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type(file_name_of(&path))),
            (header::CACHE_CONTROL, cache),
        ],
        data,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    expires: u64,
    sig: String,
}

/// Target of signed links, served only while the signature holds.
pub async fn signed_file(
    state: State<AppState>,
    path: Path<String>,
    query: Query<SignedQuery>,
) -> Result<Response, BrandkitError> {
    if !state.signer.verify(&path, query.expires, &query.sig) {
        return Err(BrandkitError::Forbidden("invalid or expired signature".to_string()));
    }

    let data = state.store.read(&path).await?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type(file_name_of(&path))),
            (header::CACHE_CONTROL, IMMUTABLE_CACHE),
        ],
        data,
    )
        .into_response())
}
