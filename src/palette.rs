//! Colour palette documents.
//!
//! Three shapes are accepted:
//!
//! ```json
//! {"colors": [{"category": "main", "subcategory": "primary", "label": "Verde", "hex": "#003C2D"}]}
//! {"main": {"primary": [..], "secondary": [..], "others": [..]}, "secondary": [..]}
//! {"primary": {"name": "Verde", "hex": "003C2D"}, "secondary": {}, "others": []}
//! ```
//!
//! Every shape flattens to [`PaletteColor`]s. Entries without a valid hex are dropped with a
//! warning, only a document that is not JSON (or not an object) fails as a whole.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

use crate::naming::slugify;

lazy_static::lazy_static! {
    static ref HEX: Regex = Regex::new(r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").unwrap();
}

const ROLES: &[&str] = &["primary", "secondary", "others"];

/// Largest sequence stored, the warehouse column is a signed 32-bit integer.
pub const MAX_SEQUENCE: u32 = i32::MAX as u32;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("palette is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("palette must be a JSON object, found {0}")]
    Shape(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteColor {
    pub key: String,
    pub label: String,
    /// `#RGB` or `#RRGGBB`, upper-case
    pub hex: String,
    pub rgb: Option<String>,
    pub cmyk: Option<String>,
    pub pantone: Option<String>,
    /// `main` or `secondary`
    pub category: String,
    /// `primary`, `secondary` or `others` when the palette nests by role
    pub subcategory: Option<String>,
    pub sequence: u32,
    /// The entry as it appeared in the document
    pub raw: String,
}

impl PaletteColor {
    pub fn role(&self) -> &str {
        self.subcategory.as_deref().unwrap_or(&self.category)
    }
}

#[derive(Debug, Default)]
pub struct Palette {
    pub colors: Vec<PaletteColor>,
    pub warnings: Vec<String>,
}

/// Add the leading `#` when missing and upper-case. `None` unless 3 or 6 hex digits remain.
pub fn normalize_hex(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let value = if value.starts_with('#') {
        value.to_string()
    } else {
        format!("#{value}")
    };

    HEX.is_match(&value).then(|| value.to_uppercase())
}

pub fn parse_palette(data: &[u8]) -> Result<Palette, PaletteError> {
    let root = match serde_json::from_slice(data)? {
        Value::Object(root) => root,
        other => return Err(PaletteError::Shape(kind(&other))),
    };

    let mut builder = PaletteBuilder::default();

    if let Some(colors) = root.get("colors") {
        match colors {
            Value::Array(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    builder.flat_entry(&format!("colors[{i}]"), entry);
                }
            }
            other => builder
                .warnings
                .push(format!("'colors' must be a list, found {}", kind(other))),
        }
    } else if root.contains_key("main") || (root.len() == 1 && root.contains_key("secondary")) {
        if let Some(main) = root.get("main") {
            builder.group("main", main);
        }
        if let Some(secondary) = root.get("secondary") {
            builder.group("secondary", secondary);
        }
    } else if root.contains_key("primary") || root.contains_key("others") {
        for role in ROLES {
            if let Some(value) = root.get(*role) {
                builder.entries(role, "main", Some(*role), value);
            }
        }
    }

    if builder.colors.is_empty() && builder.warnings.is_empty() {
        builder.warnings.push("palette has no colors".to_string());
    }

    Ok(Palette {
        colors: builder.colors,
        warnings: builder.warnings,
    })
}

#[derive(Default)]
struct PaletteBuilder {
    colors: Vec<PaletteColor>,
    warnings: Vec<String>,
    keys: HashSet<String>,
}

impl PaletteBuilder {
    /// A `main`/`secondary` group: a list, a single entry, or an object nested by role.
    fn group(&mut self, category: &str, value: &Value) {
        match value {
            Value::Object(obj) if ROLES.iter().any(|r| obj.contains_key(*r)) => {
                for role in ROLES {
                    if let Some(value) = obj.get(*role) {
                        self.entries(&format!("{category}.{role}"), category, Some(*role), value);
                    }
                }
                for role in obj.keys().filter(|k| !ROLES.contains(&k.as_str())) {
                    self.warnings
                        .push(format!("unknown palette role '{category}.{role}' skipped"));
                }
            }
            value => self.entries(category, category, None, value),
        }
    }

    fn entries(&mut self, at: &str, category: &str, subcategory: Option<&str>, value: &Value) {
        match value {
            Value::Array(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    self.entry(&format!("{at}[{i}]"), category, subcategory, entry);
                }
            }
            entry => self.entry(at, category, subcategory, entry),
        }
    }

    fn flat_entry(&mut self, at: &str, entry: &Value) {
        let Value::Object(obj) = entry else {
            return self.warnings.push(format!("{at}: entry is not an object"));
        };

        let category = text(obj, &["category"])
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|| "main".to_string());
        let subcategory = text(obj, &["subcategory"]).map(|s| s.to_lowercase());

        self.entry(at, &category, subcategory.as_deref(), entry);
    }

    fn entry(&mut self, at: &str, category: &str, subcategory: Option<&str>, entry: &Value) {
        let Value::Object(obj) = entry else {
            return self.warnings.push(format!("{at}: entry is not an object"));
        };

        let raw_hex = text(obj, &["hex", "HEX"]);
        let Some(hex) = raw_hex.as_deref().and_then(normalize_hex) else {
            return self
                .warnings
                .push(format!("{at}: skipped, no valid hex ({raw_hex:?})"));
        };

        let label = text(obj, &["label", "name"]).unwrap_or_default();
        let sequence = obj
            .get("sequence")
            .and_then(sequence_value)
            .unwrap_or(self.colors.len() as u32 + 1);

        let role = subcategory.unwrap_or(category);
        let base = match slugify(&label) {
            slug if slug.is_empty() => role.to_string(),
            slug => slug,
        };
        let mut key = base.clone();
        let mut n = 2;
        while !self.keys.insert(key.clone()) {
            key = format!("{base}-{n}");
            n += 1;
        }

        self.colors.push(PaletteColor {
            key,
            label,
            hex,
            rgb: text(obj, &["RGB", "rgb"]),
            cmyk: text(obj, &["CMYK", "cmyk"]),
            pantone: text(obj, &["Pantone", "pantone", "PANTONE"]),
            category: category.to_string(),
            subcategory: subcategory.map(str::to_string),
            sequence,
            raw: entry.to_string(),
        });
    }
}

/// A field rendered as text. Numbers and lists of numbers (`[0, 60, 45]`) are joined by commas.
fn text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    let value = keys.iter().find_map(|k| obj.get(*k))?;
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.trim().to_string(),
                v => v.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Explicit sequences are clamped to what the warehouse column can hold.
fn sequence_value(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    Some(n.min(u64::from(MAX_SEQUENCE)) as u32)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
