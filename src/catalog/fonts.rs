//! `@font-face` metadata guessed from font file names.

use regex::Regex;
use serde::Serialize;

use crate::naming::extension;

lazy_static::lazy_static! {
    static ref ORDER_PREFIX: Regex = Regex::new(r"^\d{2}_").unwrap();
    static ref STYLE_WORDS: Regex = Regex::new(
        r"(?i)\b(regular|italic|oblique|bold|medium|light|black|thin|extrabold|extralight|semibold|demibold|variablefont|wght)\b"
    )
    .unwrap();
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
}

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "woff", "woff2"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontFace {
    pub family: String,
    pub weight: u16,
    pub style: &'static str,
    pub format: &'static str,
}

impl FontFace {
    /// `None` for anything that is not a font file.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = extension(file_name)?;
        if !FONT_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }

        Some(Self {
            family: family(file_name),
            weight: weight(file_name),
            style: style(file_name),
            format: format(&ext),
        })
    }
}

fn format(ext: &str) -> &'static str {
    match ext {
        "woff2" => "woff2",
        "woff" => "woff",
        "otf" => "opentype",
        _ => "truetype",
    }
}

fn family(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    let stem = ORDER_PREFIX.replace(stem, "").replace(['_', '-'], " ");
    let stem = STYLE_WORDS.replace_all(&stem, "");
    let family = SPACES.replace_all(&stem, " ").trim().to_string();

    if family.is_empty() {
        "BrandFont".to_string()
    } else {
        family
    }
}

fn weight(file_name: &str) -> u16 {
    let f = file_name.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| f.contains(w));

    if has(&["variable"]) && has(&["wght"]) {
        400
    } else if has(&["thin", "hairline"]) {
        100
    } else if has(&["extralight", "ultralight"]) {
        200
    } else if has(&["light"]) {
        300
    } else if has(&["extrabold", "ultrabold", "heavy"]) {
        800
    } else if has(&["semibold", "demibold"]) {
        600
    } else if has(&["bold"]) {
        700
    } else if has(&["black"]) {
        900
    } else if has(&["medium"]) {
        500
    } else {
        400
    }
}

fn style(file_name: &str) -> &'static str {
    let f = file_name.to_lowercase();
    if f.contains("italic") {
        "italic"
    } else if f.contains("oblique") {
        "oblique"
    } else {
        "normal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_from_names() {
        let face = FontFace::from_file_name("01_Inter-BoldItalic.woff2").unwrap();
        assert_eq!(face.family, "Inter BoldItalic");
        assert_eq!(face.weight, 700);
        assert_eq!(face.style, "italic");
        assert_eq!(face.format, "woff2");

        let face = FontFace::from_file_name("Brand_Sans-Bold_Italic.otf").unwrap();
        assert_eq!(face.family, "Brand Sans");
        assert_eq!(face.format, "opentype");

        let face = FontFace::from_file_name("Roboto-ExtraBold.ttf").unwrap();
        assert_eq!(face.family, "Roboto");
        assert_eq!(face.weight, 800);
        assert_eq!(face.style, "normal");
        assert_eq!(face.format, "truetype");
    }

    #[test]
    fn fallbacks() {
        let face = FontFace::from_file_name("02_Regular.woff").unwrap();
        assert_eq!(face.family, "BrandFont");
        assert_eq!(face.weight, 400);

        assert_eq!(
            FontFace::from_file_name("Font-VariableFont_wght.ttf").unwrap().weight,
            400
        );
        assert!(FontFace::from_file_name("logo.png").is_none());
        assert!(FontFace::from_file_name("fonts").is_none());
    }
}
