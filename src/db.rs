use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::debug;

use crate::{
    error::BrandkitError,
    ingest::models::{AssetRecord, ColorRecord},
};

use self::models::{AssetRow, ColorRow};

pub mod models;

/// Postgres caps bind parameters per statement, batches are split below that.
const ASSET_ROWS_PER_STATEMENT: usize = 2_000;
const COLOR_ROWS_PER_STATEMENT: usize = 3_000;

pub async fn create_pool(url: &str) -> Result<PgPool, BrandkitError> {
    Ok(PgPool::connect(url).await?)
}

pub async fn migrate(pool: &PgPool) -> Result<(), BrandkitError> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}

/// Analytical store for ingested records.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Bulk load one category's records. Either every asset and colour becomes visible or
    /// none does.
    async fn load_category(
        &self,
        assets: &[AssetRecord],
        colors: &[ColorRecord],
    ) -> Result<Loaded, BrandkitError>;

    async fn list_assets(&self, brand: &str) -> Result<Vec<AssetRecord>, BrandkitError>;

    async fn list_colors(&self, brand: &str) -> Result<Vec<ColorRecord>, BrandkitError>;
}

/// Rows written by a category load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Loaded {
    pub assets: u64,
    pub colors: u64,
}

/// Brands are matched case-insensitively on every read.
const LIST_ASSETS: &str = r#"
    SELECT id, run_id, brand_name, category_key, category_label, category_seq,
           subcategory_key, subcategory_label, subcategory_seq, column_count,
           is_original, asset_type, text_content, sequence, original_name, path, url
    FROM assets
    WHERE LOWER(brand_name) = LOWER($1)
    ORDER BY category_seq, category_key, subcategory_seq NULLS FIRST, subcategory_key,
             sequence, original_name
"#;

const LIST_COLORS: &str = r#"
    SELECT id, run_id, brand_name, palette_key, color_key, color_label, hex,
           rgb_txt, cmyk_txt, pantone_txt, role_category, role_subcategory,
           sequence, raw_json
    FROM colors
    WHERE LOWER(brand_name) = LOWER($1)
    ORDER BY role_category, sequence, color_key
"#;

#[derive(Debug, Clone)]
pub struct PgWarehouse {
    pool: PgPool,
}

impl PgWarehouse {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn load_category(
        &self,
        assets: &[AssetRecord],
        colors: &[ColorRecord],
    ) -> Result<Loaded, BrandkitError> {
        let assets = dedupe_assets(assets);
        let colors = dedupe_colors(colors);
        if assets.is_empty() && colors.is_empty() {
            return Ok(Loaded::default());
        }

        let mut tx = self.pool.begin().await?;

        let loaded = Loaded {
            assets: insert_assets(&mut tx, &assets).await?,
            colors: insert_colors(&mut tx, &colors).await?,
        };

        tx.commit().await?;
        debug!(
            "Loaded {} asset rows and {} color rows",
            loaded.assets, loaded.colors
        );
        Ok(loaded)
    }

    async fn list_assets(&self, brand: &str) -> Result<Vec<AssetRecord>, BrandkitError> {
        let rows = sqlx::query_as::<_, AssetRow>(LIST_ASSETS)
            .bind(brand.trim())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(AssetRecord::from).collect())
    }

    async fn list_colors(&self, brand: &str) -> Result<Vec<ColorRecord>, BrandkitError> {
        let rows = sqlx::query_as::<_, ColorRow>(LIST_COLORS)
            .bind(brand.trim())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ColorRecord::from).collect())
    }
}

async fn insert_assets(
    conn: &mut PgConnection,
    records: &[&AssetRecord],
) -> Result<u64, BrandkitError> {
    let mut affected = 0;

    for chunk in records.chunks(ASSET_ROWS_PER_STATEMENT) {
        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO assets (id, run_id, brand_name, category_key, category_label, \
             category_seq, subcategory_key, subcategory_label, subcategory_seq, column_count, \
             is_original, asset_type, text_content, sequence, original_name, path, url) ",
        );

        query.push_values(chunk, |mut row, r| {
            row.push_bind(r.id)
                .push_bind(r.run_id)
                .push_bind(&r.brand_name)
                .push_bind(&r.category_key)
                .push_bind(&r.category_label)
                .push_bind(int(r.category_seq))
                .push_bind(&r.subcategory_key)
                .push_bind(&r.subcategory_label)
                .push_bind(r.subcategory_seq.map(int))
                .push_bind(r.columns.map(int))
                .push_bind(r.is_original)
                .push_bind(r.asset_type.as_str())
                .push_bind(&r.text_content)
                .push_bind(int(r.sequence))
                .push_bind(&r.original_name)
                .push_bind(&r.path)
                .push_bind(&r.url);
        });

        query.push(
            " ON CONFLICT (brand_name, category_key, (COALESCE(subcategory_key, '')), path, original_name) \
             DO UPDATE SET \
             run_id = EXCLUDED.run_id, \
             category_label = EXCLUDED.category_label, \
             category_seq = EXCLUDED.category_seq, \
             subcategory_label = EXCLUDED.subcategory_label, \
             subcategory_seq = EXCLUDED.subcategory_seq, \
             column_count = EXCLUDED.column_count, \
             is_original = EXCLUDED.is_original, \
             asset_type = EXCLUDED.asset_type, \
             text_content = EXCLUDED.text_content, \
             sequence = EXCLUDED.sequence, \
             url = EXCLUDED.url, \
             created_at = NOW()",
        );

        affected += query.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(affected)
}

async fn insert_colors(
    conn: &mut PgConnection,
    records: &[&ColorRecord],
) -> Result<u64, BrandkitError> {
    let mut affected = 0;

    for chunk in records.chunks(COLOR_ROWS_PER_STATEMENT) {
        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO colors (id, run_id, brand_name, palette_key, color_key, color_label, \
             hex, rgb_txt, cmyk_txt, pantone_txt, role_category, role_subcategory, sequence, \
             raw_json) ",
        );

        query.push_values(chunk, |mut row, c| {
            row.push_bind(c.id)
                .push_bind(c.run_id)
                .push_bind(&c.brand_name)
                .push_bind(&c.palette_key)
                .push_bind(&c.color_key)
                .push_bind(&c.color_label)
                .push_bind(&c.hex)
                .push_bind(&c.rgb)
                .push_bind(&c.cmyk)
                .push_bind(&c.pantone)
                .push_bind(&c.role_category)
                .push_bind(&c.role_subcategory)
                .push_bind(int(c.sequence))
                .push_bind(&c.raw_json);
        });

        query.push(
            " ON CONFLICT (brand_name, palette_key, color_key) DO UPDATE SET \
             run_id = EXCLUDED.run_id, \
             color_label = EXCLUDED.color_label, \
             hex = EXCLUDED.hex, \
             rgb_txt = EXCLUDED.rgb_txt, \
             cmyk_txt = EXCLUDED.cmyk_txt, \
             pantone_txt = EXCLUDED.pantone_txt, \
             role_category = EXCLUDED.role_category, \
             role_subcategory = EXCLUDED.role_subcategory, \
             sequence = EXCLUDED.sequence, \
             raw_json = EXCLUDED.raw_json, \
             created_at = NOW()",
        );

        affected += query.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(affected)
}

/// Integer columns are `INT`, larger values saturate.
fn int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Collapse records sharing a merge key, the last one wins. A single upsert statement cannot
/// touch the same row twice.
pub fn dedupe_assets(records: &[AssetRecord]) -> Vec<&AssetRecord> {
    dedupe(records, |r| {
        (
            r.brand_name.clone(),
            r.category_key.clone(),
            r.subcategory_key.clone().unwrap_or_default(),
            r.path.clone(),
            r.original_name.clone(),
        )
    })
}

pub fn dedupe_colors(records: &[ColorRecord]) -> Vec<&ColorRecord> {
    dedupe(records, |c| {
        (
            c.brand_name.clone(),
            c.palette_key.clone(),
            c.color_key.clone(),
            String::new(),
            String::new(),
        )
    })
}

type MergeKey = (String, String, String, String, String);

fn dedupe<T>(records: &[T], key: impl Fn(&T) -> MergeKey) -> Vec<&T> {
    let mut positions: HashMap<MergeKey, usize> = HashMap::new();
    let mut out: Vec<&T> = vec![];

    for record in records {
        match positions.get(&key(record)) {
            Some(&i) => out[i] = record,
            None => {
                positions.insert(key(record), out.len());
                out.push(record);
            }
        }
    }

    out
}
