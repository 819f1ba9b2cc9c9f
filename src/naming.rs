//! Directory and file naming grammar of a brand package.
//!
//! Categories are `NN-label`, subcategories are `NN-label-CC`, `NN-CC`, `NN--CC`, `NN-label`
//! or a bare `NN`, where `NN` is the display order and `CC` the gallery column count. Files
//! may carry a leading sequence such as `01.png`, `2_logo.svg` or `003 mockup.jpg`.
//!
//! Nothing in here fails: unknown shapes resolve to a fallback or to [`SubcategoryName::NoMatch`].

use regex::Regex;

lazy_static::lazy_static! {
    static ref CATEGORY: Regex = Regex::new(r"^(\d{2})-(.+)$").unwrap();
    static ref SUB_LABELED: Regex = Regex::new(r"^(\d{2})-(.*?)-(\d{1,2})$").unwrap();
    static ref SUB_UNLABELED: Regex = Regex::new(r"^(\d{2})-(\d{1,2})$").unwrap();
    static ref SUB_DOUBLE_DASH: Regex = Regex::new(r"^(\d{2})--(\d{1,2})$").unwrap();
    static ref SUB_BARE: Regex = Regex::new(r"^(\d{2})$").unwrap();
    static ref SUB_LABEL_ONLY: Regex = Regex::new(r"^(\d{2})-(.+)$").unwrap();
    static ref FILE_SEQUENCE: Regex = Regex::new(r"^(\d{1,3})(?:[-_.\s].*)?$").unwrap();
}

/// A resolved `NN-label` category directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryName {
    pub sequence: u32,
    pub label: String,
    pub key: String,
}

/// Parse a category directory. Names outside the grammar keep their raw text as the label
/// and sort first with sequence 0.
pub fn parse_category(dir_name: &str) -> CategoryName {
    let dir_name = dir_name.trim();

    let (sequence, label) = match CATEGORY.captures(dir_name) {
        Some(caps) => (parse_number(&caps[1]), caps[2].trim().to_string()),
        None => (0, dir_name.to_string()),
    };

    let key = slugify(&label);
    CategoryName {
        sequence,
        label,
        key,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubcategoryName {
    Matched {
        sequence: u32,
        label: Option<String>,
        /// Raw column count, range checks belong to the presentation layer.
        columns: Option<u32>,
    },
    NoMatch,
}

pub fn parse_subcategory(dir_name: &str) -> SubcategoryName {
    let dir_name = dir_name.trim();

    if let Some(caps) = SUB_LABELED.captures(dir_name) {
        return SubcategoryName::Matched {
            sequence: parse_number(&caps[1]),
            label: non_empty(&caps[2]),
            columns: Some(parse_number(&caps[3])),
        };
    }

    if let Some(caps) = SUB_UNLABELED
        .captures(dir_name)
        .or_else(|| SUB_DOUBLE_DASH.captures(dir_name))
    {
        return SubcategoryName::Matched {
            sequence: parse_number(&caps[1]),
            label: None,
            columns: Some(parse_number(&caps[2])),
        };
    }

    if let Some(caps) = SUB_BARE.captures(dir_name) {
        return SubcategoryName::Matched {
            sequence: parse_number(&caps[1]),
            label: None,
            columns: None,
        };
    }

    if let Some(caps) = SUB_LABEL_ONLY.captures(dir_name) {
        return SubcategoryName::Matched {
            sequence: parse_number(&caps[1]),
            label: non_empty(&caps[2]),
            columns: None,
        };
    }

    SubcategoryName::NoMatch
}

/// Leading sequence of a file name, `0` when there is none.
///
/// Only the last path segment is considered and its extension is ignored.
pub fn file_sequence(file_name: &str) -> u32 {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };

    FILE_SEQUENCE
        .captures(stem)
        .map(|caps| parse_number(&caps[1]))
        .unwrap_or(0)
}

/// Order files by extracted sequence, then by name. Stable.
pub fn sort_by_sequence<T>(items: &mut [T], name: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| {
        let (a, b) = (name(a), name(b));
        (file_sequence(a), a).cmp(&(file_sequence(b), b))
    });
}

/// Lower-case key with every run of non-alphanumeric characters collapsed to one `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Lower-cased extension without the dot.
pub fn extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .map(|(_, ext)| ext.to_lowercase())
}

fn parse_number(digits: &str) -> u32 {
    digits.parse().unwrap_or(0)
}

fn non_empty(label: &str) -> Option<String> {
    let label = label.trim();
    (!label.is_empty()).then(|| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_with_prefix() {
        let cat = parse_category("01-Logos ");
        assert_eq!(cat.sequence, 1);
        assert_eq!(cat.label, "Logos");
        assert_eq!(cat.key, "logos");

        let cat = parse_category("12-  Ícones da Marca ");
        assert_eq!(cat.sequence, 12);
        assert_eq!(cat.label, "Ícones da Marca");
        assert_eq!(cat.key, "ícones-da-marca");
    }

    #[test]
    fn category_fallback_keeps_raw_name() {
        let cat = parse_category("Mockups");
        assert_eq!(cat.sequence, 0);
        assert_eq!(cat.label, "Mockups");
        assert_eq!(cat.key, "mockups");

        let cat = parse_category("1-short");
        assert_eq!(cat.sequence, 0);
        assert_eq!(cat.label, "1-short");
    }

    #[test]
    fn subcategory_shapes_agree_on_columns() {
        let labeled = parse_subcategory("01-hero-02");
        let unlabeled = parse_subcategory("01-02");
        let double_dash = parse_subcategory("01--02");

        assert_eq!(
            labeled,
            SubcategoryName::Matched {
                sequence: 1,
                label: Some("hero".to_string()),
                columns: Some(2)
            }
        );

        for other in [unlabeled, double_dash] {
            assert_eq!(
                other,
                SubcategoryName::Matched {
                    sequence: 1,
                    label: None,
                    columns: Some(2)
                }
            );
        }
    }

    #[test]
    fn subcategory_label_may_contain_dashes() {
        assert_eq!(
            parse_subcategory("03-usos-incorretos-4"),
            SubcategoryName::Matched {
                sequence: 3,
                label: Some("usos-incorretos".to_string()),
                columns: Some(4)
            }
        );
    }

    #[test]
    fn subcategory_columns_are_not_range_checked() {
        assert_eq!(
            parse_subcategory("02-grid-09"),
            SubcategoryName::Matched {
                sequence: 2,
                label: Some("grid".to_string()),
                columns: Some(9)
            }
        );
    }

    #[test]
    fn subcategory_without_columns() {
        assert_eq!(
            parse_subcategory("07"),
            SubcategoryName::Matched {
                sequence: 7,
                label: None,
                columns: None
            }
        );
        assert_eq!(
            parse_subcategory("04-summer-2024"),
            SubcategoryName::Matched {
                sequence: 4,
                label: Some("summer-2024".to_string()),
                columns: None
            }
        );
    }

    #[test]
    fn subcategory_no_match() {
        for name in ["extras", "", "1-a-2", "abc-01-02", "001"] {
            assert_eq!(parse_subcategory(name), SubcategoryName::NoMatch, "{name}");
        }
    }

    #[test]
    fn file_sequences() {
        assert_eq!(file_sequence("01.png"), 1);
        assert_eq!(file_sequence("2_logo.svg"), 2);
        assert_eq!(file_sequence("003 mockup.jpg"), 3);
        assert_eq!(file_sequence("12-a.b.png"), 12);
        assert_eq!(file_sequence("1234.png"), 0);
        assert_eq!(file_sequence("12abc.png"), 0);
        assert_eq!(file_sequence("logo.png"), 0);
        assert_eq!(file_sequence("05"), 5);
        assert_eq!(file_sequence("dir/09-x.png"), 9);
    }

    #[test]
    fn file_sequence_is_idempotent_over_basenames() {
        for name in ["01.png", "a/b/07_x.svg", "x.png", "001-α.jpg"] {
            let base = name.rsplit('/').next().unwrap();
            assert_eq!(file_sequence(base), file_sequence(&base.to_string()));
            assert_eq!(file_sequence(name), file_sequence(base));
        }
    }

    #[test]
    fn sorting_is_sequence_then_name() {
        let mut files = vec!["b.png", "02.png", "a.png", "01-z.png", "01-a.png"];
        sort_by_sequence(&mut files, |f| *f);
        assert_eq!(files, vec!["a.png", "b.png", "01-a.png", "01-z.png", "02.png"]);
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("  Cores da Marca!! "), "cores-da-marca");
        assert_eq!(slugify("--x--"), "x");
        assert_eq!(slugify("Tipografia"), "tipografia");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn extensions() {
        assert_eq!(extension("a.PNG").as_deref(), Some("png"));
        assert_eq!(extension(".DS_Store"), None);
        assert_eq!(extension("noext"), None);
    }
}
