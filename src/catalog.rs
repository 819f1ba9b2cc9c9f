//! Read side: sidebar navigation, gallery assembly and colour listings built from stored
//! records.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, time::Duration};

use crate::{
    ingest::models::{AssetRecord, AssetType, ColorRecord},
    storage::{brand_segment, encode_path, ObjectStore},
};

use self::fonts::FontFace;

pub mod fonts;

/// Sort position of the group without a subcategory.
const UNGROUPED_SEQ: u32 = 9999;

#[derive(Debug, Serialize)]
pub struct SidebarCategory {
    pub category_key: String,
    pub category_label: String,
    pub category_seq: u32,
    pub subcategory_count: usize,
    pub subcategories: Vec<SidebarSubcategory>,
}

#[derive(Debug, Serialize)]
pub struct SidebarSubcategory {
    pub subcategory_key: String,
    pub subcategory_label: Option<String>,
    pub subcategory_seq: Option<u32>,
    pub columns: Option<u32>,
}

pub fn sidebar(assets: &[AssetRecord]) -> Vec<SidebarCategory> {
    let mut categories: BTreeMap<(u32, &str), SidebarCategory> = BTreeMap::new();

    for asset in assets {
        let category = categories
            .entry((asset.category_seq, &asset.category_key))
            .or_insert_with(|| SidebarCategory {
                category_key: asset.category_key.clone(),
                category_label: asset.category_label.clone(),
                category_seq: asset.category_seq,
                subcategory_count: 0,
                subcategories: vec![],
            });

        let Some(key) = &asset.subcategory_key else {
            continue;
        };

        if category
            .subcategories
            .iter()
            .any(|s| &s.subcategory_key == key)
        {
            continue;
        }

        category.subcategories.push(SidebarSubcategory {
            subcategory_key: key.clone(),
            subcategory_label: asset.subcategory_label.clone(),
            subcategory_seq: asset.subcategory_seq,
            columns: asset.columns,
        });
    }

    categories
        .into_values()
        .map(|mut c| {
            c.subcategories.sort_by(|a, b| {
                (a.subcategory_seq.unwrap_or(UNGROUPED_SEQ), &a.subcategory_key)
                    .cmp(&(b.subcategory_seq.unwrap_or(UNGROUPED_SEQ), &b.subcategory_key))
            });
            c.subcategory_count = c.subcategories.len();
            c
        })
        .collect()
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct GalleryFilter {
    pub category_key: Option<String>,
    pub subcategory_seq: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct GalleryCategory {
    pub category_key: String,
    pub category_label: String,
    pub category_seq: u32,
    pub category_text: String,
    pub subcategories: Vec<GallerySubcategory>,
}

#[derive(Debug, Serialize)]
pub struct GallerySubcategory {
    pub subcategory_key: Option<String>,
    pub subcategory_label: Option<String>,
    pub subcategory_seq: Option<u32>,
    pub columns: Option<u32>,
    pub subcategory_text: String,
    pub storage_prefix: String,
    pub images: Vec<GalleryImage>,
}

#[derive(Debug, Serialize)]
pub struct GalleryImage {
    pub is_original: bool,
    pub original_name: String,
    pub path: String,
    pub url: String,
    pub sequence: u32,
    /// Where the client should fetch the payload from
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontFace>,
}

/// How gallery links are produced.
pub enum Links<'a> {
    Signed {
        store: &'a dyn ObjectStore,
        ttl: Duration,
    },
    Proxy,
}

impl Links<'_> {
    pub fn resolve(&self, path: &str) -> String {
        match self {
            Links::Signed { store, ttl } => store.signed_url(path, *ttl),
            Links::Proxy => format!("/stream/{}", encode_path(path)),
        }
    }
}

/// Group a brand's records into categories and subcategories.
///
/// Category texts ignore the subcategory filter, everything else honours both filters.
pub fn gallery(assets: &[AssetRecord], filter: &GalleryFilter, links: &Links) -> Vec<GalleryCategory> {
    let in_category = |a: &&AssetRecord| {
        filter
            .category_key
            .as_ref()
            .map_or(true, |key| &a.category_key == key)
    };
    let in_subcategory = |a: &&AssetRecord| {
        filter
            .subcategory_seq
            .map_or(true, |seq| a.subcategory_seq == Some(seq))
    };

    let mut categories: BTreeMap<(u32, &str), GalleryCategory> = BTreeMap::new();
    let mut groups: BTreeMap<(&str, Option<&str>), Vec<&AssetRecord>> = BTreeMap::new();

    for asset in assets.iter().filter(in_category).filter(in_subcategory) {
        categories
            .entry((asset.category_seq, &asset.category_key))
            .or_insert_with(|| GalleryCategory {
                category_key: asset.category_key.clone(),
                category_label: asset.category_label.clone(),
                category_seq: asset.category_seq,
                category_text: String::new(),
                subcategories: vec![],
            });

        groups
            .entry((&asset.category_key, asset.subcategory_key.as_deref()))
            .or_default()
            .push(asset);
    }

    for category in categories.values_mut() {
        let texts = assets
            .iter()
            .filter(in_category)
            .filter(|a| a.category_key == category.category_key && a.subcategory_key.is_none())
            .collect::<Vec<_>>();
        category.category_text = join_texts(&texts);
    }

    for ((category_key, _), records) in groups {
        let Some(category) = categories
            .values_mut()
            .find(|c| c.category_key == category_key)
        else {
            continue;
        };

        let first = records[0];
        let brand = brand_segment(&first.brand_name);

        let mut images = records
            .iter()
            .filter(|a| a.asset_type == AssetType::Image)
            .collect::<Vec<_>>();
        images.sort_by(|a, b| (a.sequence, &a.original_name).cmp(&(b.sequence, &b.original_name)));

        let storage_prefix = match &first.subcategory_key {
            None => format!("{brand}/{category_key}/"),
            Some(key) => images
                .iter()
                .find_map(|a| a.path.rsplit_once('/').map(|(dir, _)| format!("{dir}/")))
                .unwrap_or_else(|| format!("{brand}/{category_key}/{key}/")),
        };

        category.subcategories.push(GallerySubcategory {
            subcategory_key: first.subcategory_key.clone(),
            subcategory_label: first.subcategory_label.clone(),
            subcategory_seq: first.subcategory_seq,
            columns: first.columns,
            subcategory_text: match first.subcategory_key {
                Some(_) => join_texts(&records),
                None => String::new(),
            },
            storage_prefix,
            images: images
                .into_iter()
                .map(|a| GalleryImage {
                    is_original: a.is_original,
                    original_name: a.original_name.clone(),
                    path: a.path.clone(),
                    url: a.url.clone(),
                    sequence: a.sequence,
                    link: links.resolve(&a.path),
                    font: FontFace::from_file_name(&a.original_name),
                })
                .collect(),
        });
    }

    categories
        .into_values()
        .map(|mut c| {
            c.subcategories.sort_by(|a, b| {
                (
                    a.subcategory_seq.unwrap_or(UNGROUPED_SEQ),
                    a.subcategory_key.as_deref().unwrap_or_default(),
                )
                    .cmp(&(
                        b.subcategory_seq.unwrap_or(UNGROUPED_SEQ),
                        b.subcategory_key.as_deref().unwrap_or_default(),
                    ))
            });
            c
        })
        .collect()
}

/// Text records in sequence order, separated by a blank line.
fn join_texts(records: &[&AssetRecord]) -> String {
    let mut texts = records
        .iter()
        .filter(|a| a.asset_type == AssetType::Text)
        .filter_map(|a| a.text_content.as_deref().map(|t| (a.sequence, t)))
        .collect::<Vec<_>>();
    texts.sort_by_key(|(sequence, _)| *sequence);

    texts
        .into_iter()
        .map(|(_, t)| t.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Palette listing order: role category, sequence, key.
pub fn sort_colors(colors: &mut [ColorRecord]) {
    colors.sort_by(|a, b| {
        (&a.role_category, a.sequence, &a.color_key).cmp(&(&b.role_category, b.sequence, &b.color_key))
    });
}
