//! Brand package archive walking.
//!
//! A package is a zip whose top-level directories are categories. Inside a category, loose
//! files sit at the root, source files sit in an originals folder and everything else is
//! grouped by its second-level directory:
//!
//! ```text
//! [wrapper/]
//!   01-logos/
//!     intro.txt
//!     originais/logo.ai
//!     01-hero-02/01.png
//! ```

use bytes::Bytes;
use std::{
    collections::BTreeMap,
    io::{Cursor, Read},
};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::{config::IngestConfig, error::BrandkitError, naming::parse_category};

/// Basenames that never carry brand content, compared lower-cased.
const SYSTEM_FILES: &[&str] = &[
    ".ds_store",
    "ds_store",
    ".dsstore",
    "thumbs.db",
    "desktop.ini",
    "readme.txt",
    "readme.md",
];

const SYSTEM_DIRS: &[&str] = &["__macosx", ".git", ".svn"];

pub struct BrandArchive {
    zip: ZipArchive<Cursor<Bytes>>,
    entry_limit: u64,
}

impl BrandArchive {
    /// Open an in-memory zip. Failing here is the only error that aborts a whole ingestion.
    pub fn open(data: Bytes) -> Result<Self, BrandkitError> {
        let zip = ZipArchive::new(Cursor::new(data))
            .map_err(|e| BrandkitError::InvalidArchive(e.to_string()))?;
        Ok(Self {
            zip,
            entry_limit: u64::MAX - 1,
        })
    }

    /// Cap the decompressed size of a single entry.
    pub fn with_entry_limit(mut self, limit: u64) -> Self {
        self.entry_limit = limit.min(u64::MAX - 1);
        self
    }

    /// Decompress one entry. Sizes declared in the archive are not trusted, reading stops one
    /// byte past the entry limit.
    pub fn read(&mut self, entry: &ArchiveEntry) -> Result<Bytes, BrandkitError> {
        let file = self.zip.by_index(entry.index)?;
        let mut buf = vec![];
        file.take(self.entry_limit + 1).read_to_end(&mut buf)?;

        if buf.len() as u64 > self.entry_limit {
            return Err(BrandkitError::EntryTooLarge {
                path: entry.path.clone(),
                limit: self.entry_limit,
            });
        }

        Ok(Bytes::from(buf))
    }

    /// Classify every entry into categories, see the module docs for the layout.
    pub fn walk(&mut self, config: &IngestConfig) -> PackageLayout {
        let mut warnings = vec![];
        let mut files = vec![];
        let mut dirs = vec![];

        for index in 0..self.zip.len() {
            let file = match self.zip.by_index_raw(index) {
                Ok(file) => file,
                Err(e) => {
                    warn!("Unreadable archive entry #{index}: {e}");
                    warnings.push(format!("unreadable archive entry #{index}: {e}"));
                    continue;
                }
            };

            let is_dir = file.is_dir();
            let raw = file.name().replace('\\', "/");
            let segments = raw
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>();

            if segments.is_empty() || is_system_path(&segments) {
                debug!("Skipping system entry {raw}");
                continue;
            }

            if segments.iter().any(|s| s == ".." || s == ".") {
                warnings.push(format!("entry with relative path skipped: {raw}"));
                continue;
            }

            if is_dir {
                dirs.push(segments);
            } else {
                files.push((index, segments));
            }
        }

        if let Some(wrapper) = wrapper_root(&files) {
            debug!("Stripping wrapper directory {wrapper}");
            for (_, segments) in files.iter_mut() {
                segments.remove(0);
            }
            for segments in dirs.iter_mut() {
                if segments.first().is_some_and(|s| s.eq_ignore_ascii_case(&wrapper)) {
                    segments.remove(0);
                }
            }
        }

        let mut categories: BTreeMap<String, CategoryDir> = BTreeMap::new();

        for segments in dirs.iter().filter(|s| !s.is_empty()) {
            let category = category_entry(&mut categories, &segments[0]);
            if let Some(sub) = segments.get(1) {
                if config.is_originals_dir(sub) {
                    category.originals.get_or_insert_with(Vec::new);
                } else {
                    subdir_entry(&mut category.subdirs, sub);
                }
            }
        }

        for (index, mut segments) in files {
            let path = segments.join("/");
            match segments.len() {
                0 => {}
                1 => {
                    warn!("File outside any category: {path}");
                    warnings.push(format!("file outside any category skipped: {path}"));
                }
                2 => {
                    let name = segments.remove(1);
                    category_entry(&mut categories, &segments[0])
                        .root_files
                        .push(ArchiveEntry { index, name, path });
                }
                depth => {
                    let category = category_entry(&mut categories, &segments[0]);
                    let name = segments.remove(depth - 1);

                    if config.is_originals_dir(&segments[1]) {
                        if depth == 3 {
                            category
                                .originals
                                .get_or_insert_with(Vec::new)
                                .push(ArchiveEntry { index, name, path });
                        } else {
                            category.originals.get_or_insert_with(Vec::new);
                            category
                                .warnings
                                .push(format!("nested file in originals skipped: {path}"));
                        }
                        continue;
                    }

                    let subdir = subdir_entry(&mut category.subdirs, &segments[1]);
                    if depth == 3 {
                        subdir.files.push(ArchiveEntry { index, name, path });
                    } else {
                        subdir.nested.push(path);
                    }
                }
            }
        }

        PackageLayout {
            categories: categories
                .into_values()
                .map(|mut c| {
                    c.subdirs.sort_by_key(|s| s.dir_name.to_lowercase());
                    c
                })
                .collect(),
            warnings,
        }
    }
}

/// A file inside the archive. `name` keeps its original bytes and casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub index: usize,
    pub name: String,
    /// Path inside the package, wrapper directory removed
    pub path: String,
}

#[derive(Debug, Default)]
pub struct PackageLayout {
    pub categories: Vec<CategoryDir>,
    /// Issues not attributable to a single category
    pub warnings: Vec<String>,
}

#[derive(Debug, Default)]
pub struct CategoryDir {
    /// Directory name as first seen in the archive
    pub dir_name: String,

    pub root_files: Vec<ArchiveEntry>,

    /// `Some` whenever an originals folder exists, even an empty one
    pub originals: Option<Vec<ArchiveEntry>>,

    pub subdirs: Vec<Subdir>,

    pub warnings: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Subdir {
    pub dir_name: String,
    pub files: Vec<ArchiveEntry>,
    /// Paths of files below the subdirectory's first level
    pub nested: Vec<String>,
}

fn category_entry<'a>(
    categories: &'a mut BTreeMap<String, CategoryDir>,
    dir_name: &str,
) -> &'a mut CategoryDir {
    categories
        .entry(dir_name.to_lowercase())
        .or_insert_with(|| CategoryDir {
            dir_name: dir_name.to_string(),
            ..Default::default()
        })
}

fn subdir_entry<'a>(subdirs: &'a mut Vec<Subdir>, dir_name: &str) -> &'a mut Subdir {
    let lower = dir_name.to_lowercase();
    match subdirs
        .iter()
        .position(|s| s.dir_name.to_lowercase() == lower)
    {
        Some(i) => &mut subdirs[i],
        None => {
            subdirs.push(Subdir {
                dir_name: dir_name.to_string(),
                ..Default::default()
            });
            let last = subdirs.len() - 1;
            &mut subdirs[last]
        }
    }
}

fn is_system_path(segments: &[String]) -> bool {
    let Some((base, dirs)) = segments.split_last() else {
        return true;
    };

    if dirs.iter().any(|d| {
        let d = d.to_lowercase();
        SYSTEM_DIRS.contains(&d.as_str()) || d.starts_with("._")
    }) {
        return true;
    }

    let base = base.to_lowercase();
    base.starts_with("._") || base.starts_with('.') || SYSTEM_FILES.contains(&base.as_str())
}

/// The single top-level directory wrapping every file, if any.
///
/// A shared root that already reads as a `NN-label` category is kept, as is one whose
/// removal would leave no directories behind.
fn wrapper_root(files: &[(usize, Vec<String>)]) -> Option<String> {
    let first = files.first()?.1.first()?.clone();

    let shared = files
        .iter()
        .all(|(_, s)| s.len() > 1 && s[0].eq_ignore_ascii_case(&first));
    if !shared {
        return None;
    }

    if parse_category(&first).sequence > 0 || first.starts_with("00-") {
        return None;
    }

    files
        .iter()
        .any(|(_, s)| s.len() > 2)
        .then_some(first)
}
