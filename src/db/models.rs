use crate::ingest::models::{AssetRecord, AssetType, ColorRecord};

/// Row of `assets`. Postgres has no unsigned integers, counters are stored as `INT`.
#[derive(Debug, sqlx::FromRow)]
pub struct AssetRow {
    pub id: uuid::Uuid,
    pub run_id: uuid::Uuid,
    pub brand_name: String,
    pub category_key: String,
    pub category_label: String,
    pub category_seq: i32,
    pub subcategory_key: Option<String>,
    pub subcategory_label: Option<String>,
    pub subcategory_seq: Option<i32>,
    pub column_count: Option<i32>,
    pub is_original: bool,
    pub asset_type: String,
    pub text_content: Option<String>,
    pub sequence: i32,
    pub original_name: String,
    pub path: String,
    pub url: String,
}

impl From<AssetRow> for AssetRecord {
    fn from(row: AssetRow) -> Self {
        Self {
            id: row.id,
            run_id: row.run_id,
            brand_name: row.brand_name,
            category_key: row.category_key,
            category_label: row.category_label,
            category_seq: unsigned(row.category_seq),
            subcategory_key: row.subcategory_key,
            subcategory_label: row.subcategory_label,
            subcategory_seq: row.subcategory_seq.map(unsigned),
            columns: row.column_count.map(unsigned),
            is_original: row.is_original,
            asset_type: AssetType::parse(&row.asset_type),
            text_content: row.text_content,
            sequence: unsigned(row.sequence),
            original_name: row.original_name,
            path: row.path,
            url: row.url,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ColorRow {
    pub id: uuid::Uuid,
    pub run_id: uuid::Uuid,
    pub brand_name: String,
    pub palette_key: String,
    pub color_key: String,
    pub color_label: String,
    pub hex: String,
    pub rgb_txt: Option<String>,
    pub cmyk_txt: Option<String>,
    pub pantone_txt: Option<String>,
    pub role_category: String,
    pub role_subcategory: Option<String>,
    pub sequence: i32,
    pub raw_json: String,
}

impl From<ColorRow> for ColorRecord {
    fn from(row: ColorRow) -> Self {
        Self {
            id: row.id,
            run_id: row.run_id,
            brand_name: row.brand_name,
            palette_key: row.palette_key,
            color_key: row.color_key,
            color_label: row.color_label,
            hex: row.hex,
            rgb: row.rgb_txt,
            cmyk: row.cmyk_txt,
            pantone: row.pantone_txt,
            role_category: row.role_category,
            role_subcategory: row.role_subcategory,
            sequence: unsigned(row.sequence),
            raw_json: row.raw_json,
        }
    }
}

fn unsigned(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}
