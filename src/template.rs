//! Downloadable package template and sample palette.

use bytes::Bytes;
use serde_json::json;
use std::io::{Cursor, Write};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::error::BrandkitError;

const ROOT: &str = "brand-package/";

const README_ROOT: &str = "# Brand package

- Categories: `NN-category-name/`
- Subcategories:
  - `NN-subcategory-name-CC` (titled, `CC` = gallery columns `01..04`)
  - `NN-CC` or `NN--CC` (untitled)
- Use hyphens, not underscores.
- `originais/` is optional in every category and required in `03-tipografia/`.
- `02-cores/` holds `colors.json` plus the optional `principal.txt` and `secundaria.txt`.
- Any `.txt` placed directly in a category or subcategory folder becomes its description.
";

const README_CATEGORY: &str = "# Category

Optional `.txt` files here describe the category, names are free.
Files in `originais/` are offered as downloads.

Accepted subfolders:
- `NN-subcategory-name-CC`
- `NN-CC` or `NN--CC` (untitled)

Inside each subfolder:
- `.txt` files describe the subcategory
- images and other files are laid out in `CC` columns
";

struct TemplateCategory {
    dir: &'static str,
    texts: &'static [&'static str],
    originals: Option<&'static [&'static str]>,
    subs: &'static [(&'static str, &'static [&'static str], &'static [&'static str])],
}

const CATEGORIES: &[TemplateCategory] = &[
    TemplateCategory {
        dir: "01-categoria-a",
        texts: &["descricao-categoria.txt"],
        originals: Some(&["arquivo.ai", "manual.pdf"]),
        subs: &[
            ("01-hero-01", &["notas.txt"], &["01.png", "02.png"]),
            ("02-02", &["sub.txt"], &["01.png", "02.png"]),
        ],
    },
    TemplateCategory {
        dir: "03-tipografia",
        texts: &["tipos.txt"],
        originals: Some(&["fontes.zip"]),
        subs: &[
            ("01-titulos-01", &["sugestoes.txt"], &["01.png"]),
            ("02-corpo-02", &[], &["01.png", "02.png"]),
        ],
    },
    TemplateCategory {
        dir: "04-categoria-b",
        texts: &["desc.txt"],
        originals: None,
        subs: &[("01-conjuntos-03", &["bloco.txt"], &["01.png", "02.png", "03.png"])],
    },
];

/// Zip `entries` in order. Names ending in `/` become directory entries.
pub fn pack(entries: &[(&str, &[u8])]) -> Result<Bytes, BrandkitError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for (name, data) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options)?;
        } else {
            zip.start_file(*name, options)?;
            zip.write_all(data)?;
        }
    }

    Ok(Bytes::from(zip.finish()?.into_inner()))
}

/// A single-colour palette in the flat shape.
pub fn sample_palette() -> serde_json::Value {
    json!({
        "colors": [
            {
                "category": "main",
                "subcategory": "primary",
                "label": "Verde Escuro",
                "hex": "#003C2D",
                "RGB": "0,60,45",
                "CMYK": "93,5,75,70",
                "Pantone": "343 C",
                "sequence": 1
            }
        ]
    })
}

fn full_palette() -> serde_json::Value {
    json!({
        "colors": [
            {
                "category": "main",
                "subcategory": "primary",
                "label": "Verde Escuro",
                "hex": "#003C2D",
                "RGB": "0,60,45",
                "CMYK": "93,5,75,70",
                "Pantone": "343 C",
                "sequence": 1
            },
            {
                "category": "secondary",
                "label": "Azul",
                "hex": "#4F71F6",
                "RGB": "79,113,246",
                "CMYK": "79,55,0,4",
                "Pantone": "2727 C",
                "sequence": 2
            }
        ]
    })
}

/// The example package offered for download, wrapped in `brand-package/`.
pub fn template_zip() -> Result<Bytes, BrandkitError> {
    let mut files: Vec<(String, Vec<u8>)> = vec![
        (ROOT.to_string(), vec![]),
        (format!("{ROOT}README.md"), README_ROOT.into()),
    ];

    for category in CATEGORIES.iter().take(1) {
        write_category(category, &mut files);
    }

    let cores = category_dir("02-cores", &mut files);
    files.push((
        format!("{cores}colors.json"),
        serde_json::to_vec_pretty(&full_palette())?,
    ));
    files.push((
        format!("{cores}principal.txt"),
        "Main colours description (main/primary).".into(),
    ));
    files.push((
        format!("{cores}secundaria.txt"),
        "Secondary colours description (secondary).".into(),
    ));

    for category in CATEGORIES.iter().skip(1) {
        write_category(category, &mut files);
    }

    let entries = files
        .iter()
        .map(|(name, data)| (name.as_str(), data.as_slice()))
        .collect::<Vec<_>>();
    pack(&entries)
}

/// Adds the category folder with its README and returns its path.
fn category_dir(dir: &str, files: &mut Vec<(String, Vec<u8>)>) -> String {
    let path = format!("{ROOT}{dir}/");
    files.push((path.clone(), vec![]));
    files.push((format!("{path}README.md"), README_CATEGORY.into()));
    path
}

fn write_category(category: &TemplateCategory, files: &mut Vec<(String, Vec<u8>)>) {
    let path = category_dir(category.dir, files);

    for text in category.texts {
        files.push((
            format!("{path}{text}"),
            format!("Free text for category {}.\n", category.dir).into(),
        ));
    }

    if let Some(originals) = category.originals {
        files.push((format!("{path}originais/"), vec![]));
        for name in originals {
            files.push((format!("{path}originais/{name}"), vec![]));
        }
    }

    for (dir, texts, images) in category.subs {
        let sub = format!("{path}{dir}/");
        files.push((sub.clone(), vec![]));
        for text in texts.iter() {
            files.push((
                format!("{sub}{text}"),
                format!("Free text for subcategory {dir}.\n").into(),
            ));
        }
        for image in images.iter() {
            files.push((format!("{sub}{image}"), vec![]));
        }
    }
}
