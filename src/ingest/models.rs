use serde::Serialize;

use crate::{
    naming::{parse_subcategory, CategoryName, SubcategoryName},
    palette::PaletteColor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Image,
    Text,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Image => "image",
            AssetType::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "text" => AssetType::Text,
            _ => AssetType::Image,
        }
    }
}

/// Subcategory fields shared by every record of one subdirectory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcategoryInfo {
    pub key: String,
    pub label: Option<String>,
    pub sequence: u32,
    pub columns: Option<u32>,
}

impl SubcategoryInfo {
    /// `None` when the directory does not follow the subcategory grammar.
    pub fn parse(dir_name: &str) -> Option<Self> {
        match parse_subcategory(dir_name) {
            SubcategoryName::Matched {
                sequence,
                label,
                columns,
            } => Some(Self {
                key: subcategory_key(dir_name),
                label,
                sequence,
                columns,
            }),
            SubcategoryName::NoMatch => None,
        }
    }

    /// A plain leaf for a directory outside the grammar, labeled with its raw name.
    pub fn fallback(dir_name: &str) -> Self {
        Self {
            key: subcategory_key(dir_name),
            label: Some(dir_name.trim().to_string()),
            sequence: 0,
            columns: None,
        }
    }
}

fn subcategory_key(dir_name: &str) -> String {
    dir_name.trim().to_lowercase()
}

/// One row of the `assets` table.
///
/// Either `path`/`url` point at an uploaded payload, or `text_content` holds the text and
/// both are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRecord {
    pub id: uuid::Uuid,
    pub run_id: uuid::Uuid,
    pub brand_name: String,
    pub category_key: String,
    pub category_label: String,
    pub category_seq: u32,
    pub subcategory_key: Option<String>,
    pub subcategory_label: Option<String>,
    pub subcategory_seq: Option<u32>,
    pub columns: Option<u32>,
    pub is_original: bool,
    pub asset_type: AssetType,
    pub text_content: Option<String>,
    pub sequence: u32,
    /// File name exactly as found in the archive
    pub original_name: String,
    pub path: String,
    pub url: String,
}

/// Category/subcategory context an asset record is created in.
#[derive(Debug, Clone)]
pub struct RecordScope<'a> {
    pub run_id: uuid::Uuid,
    pub brand: &'a str,
    pub category: &'a CategoryName,
    pub subcategory: Option<&'a SubcategoryInfo>,
}

impl RecordScope<'_> {
    fn record(&self, original_name: &str, sequence: u32) -> AssetRecord {
        let sub = self.subcategory;
        AssetRecord {
            id: uuid::Uuid::new_v4(),
            run_id: self.run_id,
            brand_name: self.brand.to_string(),
            category_key: self.category.key.clone(),
            category_label: self.category.label.clone(),
            category_seq: self.category.sequence,
            subcategory_key: sub.map(|s| s.key.clone()),
            subcategory_label: sub.and_then(|s| s.label.clone()),
            subcategory_seq: sub.map(|s| s.sequence),
            columns: sub.and_then(|s| s.columns),
            is_original: false,
            asset_type: AssetType::Image,
            text_content: None,
            sequence,
            original_name: original_name.to_string(),
            path: String::new(),
            url: String::new(),
        }
    }

    pub fn image(
        &self,
        original_name: &str,
        sequence: u32,
        is_original: bool,
        path: String,
        url: String,
    ) -> AssetRecord {
        AssetRecord {
            is_original,
            path,
            url,
            ..self.record(original_name, sequence)
        }
    }

    pub fn text(&self, original_name: &str, sequence: u32, content: String) -> AssetRecord {
        AssetRecord {
            asset_type: AssetType::Text,
            text_content: Some(content),
            ..self.record(original_name, sequence)
        }
    }
}

/// One row of the `colors` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorRecord {
    pub id: uuid::Uuid,
    pub run_id: uuid::Uuid,
    pub brand_name: String,
    pub palette_key: String,
    pub color_key: String,
    pub color_label: String,
    pub hex: String,
    pub rgb: Option<String>,
    pub cmyk: Option<String>,
    pub pantone: Option<String>,
    pub role_category: String,
    pub role_subcategory: Option<String>,
    pub sequence: u32,
    pub raw_json: String,
}

impl ColorRecord {
    pub fn new(run_id: uuid::Uuid, brand: &str, palette_key: &str, color: PaletteColor) -> Self {
        let PaletteColor {
            key,
            label,
            hex,
            rgb,
            cmyk,
            pantone,
            category,
            subcategory,
            sequence,
            raw,
        } = color;

        Self {
            id: uuid::Uuid::new_v4(),
            run_id,
            brand_name: brand.to_string(),
            palette_key: palette_key.to_string(),
            color_key: key,
            color_label: label,
            hex,
            rgb,
            cmyk,
            pantone,
            role_category: category,
            role_subcategory: subcategory,
            sequence,
            raw_json: raw,
        }
    }

    pub fn role(&self) -> &str {
        self.role_subcategory
            .as_deref()
            .unwrap_or(&self.role_category)
    }
}
