//! Per-category ingestion.
//!
//! A category runs through these steps, any of which may end it with a [`CategoryError`]:
//!
//! 1. guards: mandatory originals folder, column parity
//! 2. originals, uploaded with `is_original` set
//! 3. subdirectories (texts, then sorted binaries) or the flat category root
//! 4. loose `.txt` files at the root as category-level texts
//!
//! Colour categories skip all of the above and go through the palette instead.

use futures::{stream, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    archive::{ArchiveEntry, BrandArchive, CategoryDir, Subdir},
    config::{ColumnParity, IngestConfig},
    error::BrandkitError,
    naming::{extension, file_sequence, sort_by_sequence, CategoryName},
    palette::{parse_palette, PaletteError},
    storage::{content_type, object_path, ObjectStore, Placement},
};

use super::models::{AssetRecord, ColorRecord, RecordScope, SubcategoryInfo};

const PALETTE_FILES: &[&str] = &["colors.json", "cores.json"];
const MAIN_TEXTS: &[&str] = &["principal.txt", "main.txt"];
const SECONDARY_TEXTS: &[&str] = &["secundaria.txt", "secondary.txt"];

/// Conditions that abort a single category.
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("required originals folder is missing")]
    MissingOriginals,

    #[error("subcategory {subdirectory} has 2 columns but {count} images")]
    OddColumns { subdirectory: String, count: usize },

    #[error("palette {file}: {source}")]
    Palette {
        file: String,
        #[source]
        source: PaletteError,
    },

    #[error("palette {file} unreadable: {source}")]
    PaletteRead {
        file: String,
        #[source]
        source: BrandkitError,
    },

    #[error("time budget exhausted before the category started")]
    Deadline,
}

/// Records and diagnostics produced by one category.
#[derive(Debug, Default)]
pub struct CategoryOutcome {
    pub dir_name: String,
    pub assets: Vec<AssetRecord>,
    pub colors: Vec<ColorRecord>,
    pub warnings: Vec<String>,
}

impl CategoryOutcome {
    fn warn(&mut self, message: String) {
        warn!("{}: {message}", self.dir_name);
        self.warnings.push(message);
    }
}

pub struct CategoryIngest<'a> {
    pub store: Arc<dyn ObjectStore>,
    pub config: &'a IngestConfig,
    pub run_id: uuid::Uuid,
    pub brand: &'a str,
    pub category: CategoryName,
}

impl<'a> CategoryIngest<'a> {
    /// Process one category directory. Warnings accumulated before a failure are kept in the
    /// outcome, its records are not.
    pub async fn run(
        &self,
        archive: &mut BrandArchive,
        dir: &CategoryDir,
    ) -> (CategoryOutcome, Option<CategoryError>) {
        let mut out = CategoryOutcome {
            dir_name: dir.dir_name.clone(),
            warnings: dir.warnings.clone(),
            ..Default::default()
        };

        let result = if self.config.is_colors_category(&self.category.key) {
            self.colors(archive, dir, &mut out).await
        } else {
            self.generic(archive, dir, &mut out).await
        };

        match result {
            Ok(()) => (out, None),
            Err(e) => {
                out.assets.clear();
                out.colors.clear();
                (out, Some(e))
            }
        }
    }

    fn scope<'s>(&'s self, subcategory: Option<&'s SubcategoryInfo>) -> RecordScope<'s> {
        RecordScope {
            run_id: self.run_id,
            brand: self.brand,
            category: &self.category,
            subcategory,
        }
    }

    async fn generic(
        &self,
        archive: &mut BrandArchive,
        dir: &CategoryDir,
        out: &mut CategoryOutcome,
    ) -> Result<(), CategoryError> {
        if dir.originals.is_none() && self.config.requires_originals(&self.category.key) {
            return Err(CategoryError::MissingOriginals);
        }

        let subdirs = self.resolve_subdirs(dir, out);

        if self.config.column_parity == ColumnParity::Reject {
            for (subdir, info) in subdirs.iter() {
                let count = subdir
                    .files
                    .iter()
                    .filter(|f| self.config.is_gallery_file(&f.name))
                    .count();
                if info.columns == Some(2) && count % 2 == 1 {
                    return Err(CategoryError::OddColumns {
                        subdirectory: subdir.dir_name.clone(),
                        count,
                    });
                }
            }
        }

        let category_scope = self.scope(None);

        if let Some(originals) = &dir.originals {
            let entries = originals.iter().collect();
            self.upload(archive, &category_scope, Placement::Originals, true, entries, out)
                .await;
        }

        let (texts, binaries) = split_texts(&dir.root_files);

        if dir.subdirs.is_empty() {
            let binaries = self.gallery_files(binaries, out);
            self.upload(archive, &category_scope, Placement::CategoryRoot, false, binaries, out)
                .await;
        } else {
            for entry in binaries {
                out.warn(format!(
                    "file at category root skipped, category has subdirectories: {}",
                    entry.path
                ));
            }

            for (subdir, info) in subdirs.iter() {
                let scope = self.scope(Some(info));
                let (texts, binaries) = split_texts(&subdir.files);

                self.texts(archive, &scope, texts, out);
                let binaries = self.gallery_files(binaries, out);

                if binaries.is_empty() && !subdir.files.is_empty() {
                    debug!("Subcategory {} holds only texts", subdir.dir_name);
                }

                let placement = Placement::Subdirectory(&subdir.dir_name);
                self.upload(archive, &scope, placement, false, binaries, out)
                    .await;
            }
        }

        self.texts(archive, &category_scope, texts, out);

        Ok(())
    }

    /// Pair every usable subdirectory with its subcategory fields.
    fn resolve_subdirs<'d>(
        &self,
        dir: &'d CategoryDir,
        out: &mut CategoryOutcome,
    ) -> Vec<(&'d Subdir, SubcategoryInfo)> {
        let mut resolved = vec![];

        for subdir in dir.subdirs.iter() {
            let info = match SubcategoryInfo::parse(&subdir.dir_name) {
                Some(info) => info,
                None if subdir.nested.is_empty() => {
                    debug!("Treating {} as a plain subdirectory", subdir.dir_name);
                    SubcategoryInfo::fallback(&subdir.dir_name)
                }
                None => {
                    out.warn(format!(
                        "unrecognised subdirectory with nested folders skipped: {}",
                        subdir.dir_name
                    ));
                    continue;
                }
            };

            for path in subdir.nested.iter() {
                out.warn(format!("nested file skipped: {path}"));
            }

            if subdir.files.is_empty() {
                out.warn(format!("empty subdirectory: {}", subdir.dir_name));
                continue;
            }

            resolved.push((subdir, info));
        }

        resolved
    }

    async fn colors(
        &self,
        archive: &mut BrandArchive,
        dir: &CategoryDir,
        out: &mut CategoryOutcome,
    ) -> Result<(), CategoryError> {
        let scope = self.scope(None);

        let palette_file = find_palette(&dir.root_files);

        match palette_file {
            Some(entry) => {
                let data = archive
                    .read(entry)
                    .map_err(|source| CategoryError::PaletteRead {
                        file: entry.name.clone(),
                        source,
                    })?;

                let palette = parse_palette(&data).map_err(|source| CategoryError::Palette {
                    file: entry.name.clone(),
                    source,
                })?;

                for warning in palette.warnings {
                    out.warn(format!("{}: {warning}", entry.name));
                }

                out.colors.extend(
                    palette
                        .colors
                        .into_iter()
                        .map(|c| ColorRecord::new(self.run_id, self.brand, &self.category.key, c)),
                );
            }
            None => out.warn("palette document not found".to_string()),
        }

        let mut used: Vec<&ArchiveEntry> = palette_file.into_iter().collect();

        for (names, sequence) in [(MAIN_TEXTS, 1), (SECONDARY_TEXTS, 2)] {
            let Some(entry) = find_named(&dir.root_files, names) else {
                out.warn(format!("optional text {} not found", names[0]));
                continue;
            };
            used.push(entry);

            if let Some(text) = read_text(archive, entry, out) {
                out.assets.push(scope.text(&entry.name, sequence, text));
            }
        }

        for entry in dir.root_files.iter() {
            if !used.iter().any(|u| u.index == entry.index) {
                out.warn(format!("unexpected file in colors category skipped: {}", entry.path));
            }
        }

        if dir.originals.is_some() {
            out.warn("originals folder ignored in colors category".to_string());
        }

        for subdir in dir.subdirs.iter() {
            out.warn(format!(
                "subdirectory ignored in colors category: {}",
                subdir.dir_name
            ));
        }

        Ok(())
    }

    /// One text record per file, in sequence order.
    fn texts(
        &self,
        archive: &mut BrandArchive,
        scope: &RecordScope<'_>,
        mut entries: Vec<&ArchiveEntry>,
        out: &mut CategoryOutcome,
    ) {
        sort_by_sequence(&mut entries, |e| e.name.as_str());

        for entry in entries {
            if let Some(text) = read_text(archive, entry, out) {
                out.assets
                    .push(scope.text(&entry.name, file_sequence(&entry.name), text));
            }
        }
    }

    /// Keep the files a gallery can show, warn about the rest.
    fn gallery_files<'e>(
        &self,
        entries: Vec<&'e ArchiveEntry>,
        out: &mut CategoryOutcome,
    ) -> Vec<&'e ArchiveEntry> {
        let (shown, skipped): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|e| self.config.is_gallery_file(&e.name));

        for entry in skipped {
            out.warn(format!("unsupported file type skipped: {}", entry.path));
        }

        shown
    }

    /// Upload `entries` with bounded concurrency and queue a record for every file that made
    /// it into the store. Failures only drop the file.
    ///
    /// Payloads are read up front so the fan-out only holds owned values.
    async fn upload(
        &self,
        archive: &mut BrandArchive,
        scope: &RecordScope<'_>,
        placement: Placement<'_>,
        is_original: bool,
        mut entries: Vec<&ArchiveEntry>,
        out: &mut CategoryOutcome,
    ) {
        sort_by_sequence(&mut entries, |e| e.name.as_str());

        let jobs = entries
            .into_iter()
            .map(|entry| {
                let path = object_path(self.brand, &self.category.key, placement, &entry.name);
                (entry.clone(), path, archive.read(entry))
            })
            .collect::<Vec<_>>();

        let store = self.store.clone();
        let concurrency = self.config.upload_concurrency.max(1);

        let results = stream::iter(jobs)
            .map(move |(entry, path, data)| {
                let store = store.clone();
                async move {
                    let result = match data {
                        Ok(data) => store
                            .write(&path, data, content_type(&entry.name))
                            .await
                            .map_err(BrandkitError::from),
                        Err(e) => Err(e),
                    };
                    (entry, path, result)
                }
            })
            .buffered(concurrency)
            .collect::<Vec<_>>()
            .await;

        for (entry, path, result) in results {
            match result {
                Ok(url) => {
                    debug!("Uploaded {path}");
                    out.assets.push(scope.image(
                        &entry.name,
                        file_sequence(&entry.name),
                        is_original,
                        path,
                        url,
                    ));
                }
                Err(e) => out.warn(format!("upload of {} failed: {e}", entry.path)),
            }
        }
    }
}

fn is_text(name: &str) -> bool {
    extension(name).as_deref() == Some("txt")
}

fn split_texts(entries: &[ArchiveEntry]) -> (Vec<&ArchiveEntry>, Vec<&ArchiveEntry>) {
    entries.iter().partition(|e| is_text(&e.name))
}

fn find_named<'e>(entries: &'e [ArchiveEntry], names: &[&str]) -> Option<&'e ArchiveEntry> {
    names.iter().find_map(|name| {
        entries
            .iter()
            .find(|e| e.name.trim().eq_ignore_ascii_case(name))
    })
}

fn find_palette(entries: &[ArchiveEntry]) -> Option<&ArchiveEntry> {
    find_named(entries, PALETTE_FILES).or_else(|| {
        let mut json = entries
            .iter()
            .filter(|e| extension(&e.name).as_deref() == Some("json"));
        match (json.next(), json.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    })
}

/// Trimmed UTF-8 contents, `None` for unreadable or blank files.
fn read_text(
    archive: &mut BrandArchive,
    entry: &ArchiveEntry,
    out: &mut CategoryOutcome,
) -> Option<String> {
    let data = match archive.read(entry) {
        Ok(data) => data,
        Err(e) => {
            out.warn(format!("unreadable text {}: {e}", entry.path));
            return None;
        }
    };

    let text = match std::str::from_utf8(&data) {
        Ok(text) => text.trim().to_string(),
        Err(_) => {
            out.warn(format!("text {} is not valid UTF-8, invalid bytes replaced", entry.path));
            String::from_utf8_lossy(&data).trim().to_string()
        }
    };

    if text.is_empty() {
        debug!("Skipping blank text {}", entry.path);
        return None;
    }

    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ingest::models::AssetType,
        naming::parse_category,
        testing::{zip_archive, MemoryStore},
    };

    async fn ingest_with(
        store: Arc<MemoryStore>,
        config: IngestConfig,
        entries: &[(&str, &[u8])],
    ) -> Vec<(CategoryOutcome, Option<CategoryError>)> {
        let mut archive = BrandArchive::open(zip_archive(entries))
            .unwrap()
            .with_entry_limit(config.max_entry_bytes);
        let layout = archive.walk(&config);
        let mut outcomes = vec![];

        for dir in layout.categories.iter() {
            let ingest = CategoryIngest {
                store: store.clone(),
                config: &config,
                run_id: uuid::Uuid::nil(),
                brand: "Acme",
                category: parse_category(&dir.dir_name),
            };
            outcomes.push(ingest.run(&mut archive, dir).await);
        }

        outcomes
    }

    async fn ingest(entries: &[(&str, &[u8])]) -> Vec<(CategoryOutcome, Option<CategoryError>)> {
        ingest_with(MemoryStore::new(), IngestConfig::default(), entries).await
    }

    #[tokio::test]
    async fn flat_category() {
        let outcomes = ingest(&[("01-logos/primary.png", b"png")]).await;
        let (out, err) = &outcomes[0];

        assert!(err.is_none());
        assert_eq!(out.assets.len(), 1);

        let record = &out.assets[0];
        assert_eq!(record.category_key, "logos");
        assert_eq!(record.category_seq, 1);
        assert_eq!(record.subcategory_key, None);
        assert_eq!(record.subcategory_seq, None);
        assert_eq!(record.asset_type, AssetType::Image);
        assert_eq!(record.path, "Acme/logos/primary.png");
        assert_eq!(record.url, "memory://Acme/logos/primary.png");
        assert_eq!(record.text_content, None);
    }

    #[tokio::test]
    async fn odd_count_in_two_columns_is_accepted() {
        let store = MemoryStore::new();
        let outcomes = ingest_with(
            store.clone(),
            IngestConfig::default(),
            &[
                ("01-logos/01-hero-02/10-final.png", b"c"),
                ("01-logos/01-hero-02/b.png", b"b"),
                ("01-logos/01-hero-02/2_alt.png", b"a"),
            ],
        )
        .await;
        let (out, err) = &outcomes[0];

        assert!(err.is_none());
        let names = out
            .assets
            .iter()
            .map(|a| a.original_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["b.png", "2_alt.png", "10-final.png"]);
        assert!(out.assets.iter().all(|a| a.columns == Some(2)));
        assert!(out.assets.iter().all(|a| a.subcategory_key.as_deref() == Some("01-hero-02")));
        assert_eq!(
            store.paths(),
            vec![
                "Acme/logos/01-hero-02/10-final.png",
                "Acme/logos/01-hero-02/2_alt.png",
                "Acme/logos/01-hero-02/b.png",
            ]
        );
    }

    #[tokio::test]
    async fn odd_count_in_two_columns_is_rejected_when_configured() {
        let config = IngestConfig {
            column_parity: ColumnParity::Reject,
            ..Default::default()
        };
        let store = MemoryStore::new();
        let outcomes = ingest_with(
            store.clone(),
            config,
            &[
                ("01-logos/01-hero-02/01.png", b"1"),
                ("01-logos/01-hero-02/02.png", b"2"),
                ("01-logos/01-hero-02/03.png", b"3"),
                ("01-logos/01-hero-02/notes.txt", b"text"),
            ],
        )
        .await;
        let (out, err) = &outcomes[0];

        assert!(matches!(
            err,
            Some(CategoryError::OddColumns { count: 3, .. })
        ));
        assert!(out.assets.is_empty());
        assert!(store.paths().is_empty());
    }

    #[tokio::test]
    async fn missing_typography_originals_fails_category() {
        let outcomes = ingest(&[
            ("01-logos/primary.png", b"p"),
            ("03-tipografia/01-titulos-01/01.png", b"t"),
        ])
        .await;

        assert!(outcomes[0].1.is_none());
        assert_eq!(outcomes[0].0.assets.len(), 1);
        assert!(matches!(outcomes[1].1, Some(CategoryError::MissingOriginals)));
        assert!(outcomes[1].0.assets.is_empty());
    }

    #[tokio::test]
    async fn originals_subdirs_and_texts() {
        let store = MemoryStore::new();
        let outcomes = ingest_with(
            store.clone(),
            IngestConfig::default(),
            &[
                ("03-tipografia/tipos.txt", b"  Fontes da marca \n"),
                ("03-tipografia/originais/Fonte Bold.otf", b"otf"),
                ("03-tipografia/01-titulos-01/notas.txt", b"Titulos"),
                ("03-tipografia/01-titulos-01/01.png", b"1"),
                ("03-tipografia/02-corpo-02/01.png", b"1"),
                ("03-tipografia/02-corpo-02/02.png", b"2"),
            ],
        )
        .await;
        let (out, err) = &outcomes[0];
        assert!(err.is_none());
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);

        let originals = out.assets.iter().filter(|a| a.is_original).collect::<Vec<_>>();
        assert_eq!(originals.len(), 1);
        assert_eq!(originals[0].path, "Acme/tipografia/originals/Fonte Bold.otf");
        assert_eq!(originals[0].subcategory_key, None);
        assert_eq!(
            store.content_type("Acme/tipografia/originals/Fonte Bold.otf").as_deref(),
            Some("font/otf")
        );

        let texts = out
            .assets
            .iter()
            .filter(|a| a.asset_type == AssetType::Text)
            .collect::<Vec<_>>();
        assert_eq!(texts.len(), 2);

        let sub_text = texts
            .iter()
            .find(|t| t.subcategory_key.as_deref() == Some("01-titulos-01"))
            .unwrap();
        assert_eq!(sub_text.text_content.as_deref(), Some("Titulos"));
        assert_eq!(sub_text.subcategory_label.as_deref(), Some("titulos"));
        assert!(sub_text.path.is_empty() && sub_text.url.is_empty());

        let cat_text = texts.iter().find(|t| t.subcategory_key.is_none()).unwrap();
        assert_eq!(cat_text.text_content.as_deref(), Some("Fontes da marca"));

        let corpo = out
            .assets
            .iter()
            .filter(|a| a.subcategory_key.as_deref() == Some("02-corpo-02"))
            .collect::<Vec<_>>();
        assert_eq!(corpo.len(), 2);
        assert_eq!(corpo[0].subcategory_seq, Some(2));
        assert_eq!(corpo[0].columns, Some(2));
        assert_eq!(corpo[0].subcategory_label.as_deref(), Some("corpo"));
    }

    #[tokio::test]
    async fn failed_upload_drops_only_that_file() {
        let store = MemoryStore::failing_on(&["02.png"]);
        let outcomes = ingest_with(
            store.clone(),
            IngestConfig::default(),
            &[
                ("01-logos/01.png", b"1"),
                ("01-logos/02.png", b"2"),
                ("01-logos/03.png", b"3"),
            ],
        )
        .await;
        let (out, err) = &outcomes[0];

        assert!(err.is_none());
        let names = out
            .assets
            .iter()
            .map(|a| a.original_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["01.png", "03.png"]);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("01-logos/02.png"));
    }

    #[tokio::test]
    async fn unsupported_file_types_are_skipped() {
        let store = MemoryStore::new();
        let outcomes = ingest_with(
            store.clone(),
            IngestConfig::default(),
            &[
                ("01-logos/01-hero-02/01.png", b"1"),
                ("01-logos/01-hero-02/notes.md", b"notes"),
                ("01-logos/01-hero-02/setup.exe", b"MZ"),
                ("01-logos/originais/logo.ai", b"ai"),
                ("04-icones/sprite.psd", b"psd"),
                ("04-icones/01.svg", b"<svg/>"),
            ],
        )
        .await;

        let (logos, err) = &outcomes[0];
        assert!(err.is_none());
        let names = logos
            .assets
            .iter()
            .map(|a| a.original_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["logo.ai", "01.png"]);
        assert_eq!(logos.warnings.len(), 2);
        assert!(logos
            .warnings
            .iter()
            .all(|w| w.starts_with("unsupported file type skipped")));

        let (icons, _) = &outcomes[1];
        assert_eq!(icons.assets.len(), 1);
        assert_eq!(icons.assets[0].original_name, "01.svg");
        assert_eq!(icons.warnings, vec!["unsupported file type skipped: 04-icones/sprite.psd"]);

        assert!(!store.paths().iter().any(|p| p.ends_with(".exe") || p.ends_with(".md")));
    }

    #[tokio::test]
    async fn oversized_entry_is_dropped() {
        let config = IngestConfig {
            max_entry_bytes: 4,
            ..Default::default()
        };
        let store = MemoryStore::new();
        let outcomes = ingest_with(
            store.clone(),
            config,
            &[("01-logos/01.png", b"1234"), ("01-logos/02.png", b"12345")],
        )
        .await;
        let (out, err) = &outcomes[0];

        assert!(err.is_none());
        assert_eq!(out.assets.len(), 1);
        assert_eq!(out.assets[0].original_name, "01.png");
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("larger than 4 bytes"));
        assert_eq!(store.paths(), vec!["Acme/logos/01.png"]);
    }

    #[tokio::test]
    async fn root_binaries_beside_subdirs_are_skipped() {
        let outcomes = ingest(&[
            ("01-logos/stray.png", b"s"),
            ("01-logos/intro.txt", b"intro"),
            ("01-logos/01-hero-01/01.png", b"1"),
        ])
        .await;
        let (out, _) = &outcomes[0];

        assert_eq!(out.assets.len(), 2);
        assert!(out.assets.iter().all(|a| a.original_name != "stray.png"));
        assert_eq!(out.warnings.len(), 1);
    }

    #[tokio::test]
    async fn unrecognised_subdirectories() {
        let outcomes = ingest(&[
            ("01-logos/Extras/a.png", b"a"),
            ("01-logos/Misc/deep/b.png", b"b"),
        ])
        .await;
        let (out, err) = &outcomes[0];

        assert!(err.is_none());
        assert_eq!(out.assets.len(), 1);
        let record = &out.assets[0];
        assert_eq!(record.subcategory_key.as_deref(), Some("extras"));
        assert_eq!(record.subcategory_label.as_deref(), Some("Extras"));
        assert_eq!(record.subcategory_seq, Some(0));
        assert_eq!(record.columns, None);
        assert_eq!(record.path, "Acme/logos/Extras/a.png");
        assert_eq!(out.warnings.len(), 1);
    }

    #[tokio::test]
    async fn legacy_palette() {
        let outcomes = ingest(&[(
            "02-cores/colors.json",
            br#"{"primary":{"name":"Verde","hex":"003C2D"}, "secondary":{}, "others":[]}"#,
        )])
        .await;
        let (out, err) = &outcomes[0];

        assert!(err.is_none());
        assert_eq!(out.colors.len(), 1);
        assert_eq!(out.colors[0].role(), "primary");
        assert_eq!(out.colors[0].hex, "#003C2D");
        assert_eq!(out.colors[0].palette_key, "cores");
        assert!(out.assets.is_empty());
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("colors.json:")));
    }

    #[tokio::test]
    async fn palette_with_auxiliary_texts() {
        let store = MemoryStore::new();
        let outcomes = ingest_with(
            store.clone(),
            IngestConfig::default(),
            &[
                (
                    "02-cores/colors.json",
                    br##"{"colors":[{"category":"main","label":"Azul","hex":"#4F71F6"}]}"##,
                ),
                ("02-cores/principal.txt", b"Cores principais"),
                ("02-cores/secundaria.txt", b"Cores secundarias"),
                ("02-cores/swatch.png", b"png"),
            ],
        )
        .await;
        let (out, err) = &outcomes[0];

        assert!(err.is_none());
        assert_eq!(out.colors.len(), 1);
        assert_eq!(out.assets.len(), 2);
        assert_eq!(out.assets[0].sequence, 1);
        assert_eq!(out.assets[0].text_content.as_deref(), Some("Cores principais"));
        assert_eq!(out.assets[1].sequence, 2);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("swatch.png"));
        assert!(store.paths().is_empty());
    }

    #[tokio::test]
    async fn broken_palette_fails_only_its_category() {
        let outcomes = ingest(&[
            ("01-logos/primary.png", b"p"),
            ("02-cores/colors.json", b"{not json"),
        ])
        .await;

        assert!(outcomes[0].1.is_none());
        assert!(matches!(outcomes[1].1, Some(CategoryError::Palette { .. })));
    }

    #[tokio::test]
    async fn missing_palette_is_a_warning() {
        let outcomes = ingest(&[("02-cores/principal.txt", b"texto")]).await;
        let (out, err) = &outcomes[0];

        assert!(err.is_none());
        assert_eq!(out.assets.len(), 1);
        assert!(out.warnings.iter().any(|w| w == "palette document not found"));
        assert!(out.warnings.iter().any(|w| w.contains("secundaria.txt")));
    }

    #[test]
    fn palette_lookup_order() {
        let entry = |index, name: &str| ArchiveEntry {
            index,
            name: name.to_string(),
            path: format!("02-cores/{name}"),
        };

        let entries = vec![entry(0, "palette.json"), entry(1, "Cores.JSON")];
        assert_eq!(find_palette(&entries).unwrap().index, 1);

        let entries = vec![entry(0, "palette.json")];
        assert_eq!(find_palette(&entries).unwrap().index, 0);

        let entries = vec![entry(0, "a.json"), entry(1, "b.json")];
        assert!(find_palette(&entries).is_none());
    }
}
