//! Post-sort analytics and cleanup.
//!
//! After sorting, the tree is walked bottom-up. Category folders are listed
//! and their files' extensions are tallied as known or unknown. Every other
//! directory outside the category folders is leftover clutter and is removed.

use crate::config::CompiledFilters;
use crate::file_category::{Category, NO_EXTENSION, dotted_extension, is_known_extension};
use crate::file_organizer::{OrganizeError, OrganizeResult, is_skippable, walk_error};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The direct contents of one category folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryListing {
    pub category: Category,
    /// Names of the files directly inside the folder, sorted.
    pub files: Vec<String>,
    /// Names of the subfolders directly inside the folder, sorted.
    pub folders: Vec<String>,
}

impl CategoryListing {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }
}

/// Summary of an organized tree.
#[derive(Debug, Default)]
pub struct AnalyticsReport {
    /// Category folders in the order the walk reached them.
    pub listings: Vec<CategoryListing>,
    /// Extensions found in category folders that the category table knows.
    pub known: BTreeSet<String>,
    /// Extensions the table does not know, including [`NO_EXTENSION`].
    pub unknown: BTreeSet<String>,
    /// Stray files deleted from leftover directories.
    pub removed_files: Vec<PathBuf>,
    /// Leftover directories removed.
    pub removed_dirs: Vec<PathBuf>,
}

impl AnalyticsReport {
    fn record_extension(&mut self, file_name: &str) {
        match dotted_extension(Path::new(file_name)) {
            Some(ext) if is_known_extension(&ext) => {
                self.known.insert(ext);
            }
            Some(ext) => {
                self.unknown.insert(ext);
            }
            None => {
                self.unknown.insert(NO_EXTENSION.to_string());
            }
        }
    }
}

/// Runs the post-sort pass.
pub struct Analytics;

impl Analytics {
    /// Walks `root` bottom-up, reporting category folders and removing clutter.
    ///
    /// A category folder is exactly `root/<category>`; it is listed but never
    /// modified, and anything nested inside it is left alone. Any other
    /// directory has its direct files deleted and is then removed, except for
    /// `root` itself. Files rejected by `filters` are protected, and a
    /// directory still holding protected content is kept.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use clean_folder::analytics::Analytics;
    /// use clean_folder::config::FilterConfig;
    /// use std::path::Path;
    ///
    /// let filters = FilterConfig::default().compile().unwrap();
    /// let report = Analytics::run(Path::new("/path/to/folder"), &filters).unwrap();
    /// println!("Unknown extensions: {:?}", report.unknown);
    /// ```
    pub fn run(root: &Path, filters: &CompiledFilters) -> OrganizeResult<AnalyticsReport> {
        if !root.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: root.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "base path is not an existing directory",
                ),
            });
        }

        // The whole walk is collected before anything is deleted.
        let mut dirs = Vec::new();
        for entry in WalkDir::new(root).contents_first(true).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            }
        }

        let mut report = AnalyticsReport::default();
        for dir in dirs {
            if let Some(category) = category_folder(root, &dir) {
                let listing = Self::list(category, &dir)?;
                for file in &listing.files {
                    report.record_extension(file);
                }
                report.listings.push(listing);
            } else if !is_skippable(root, &dir) {
                Self::clean(root, &dir, filters, &mut report)?;
            }
        }

        Ok(report)
    }

    fn list(category: Category, dir: &Path) -> OrganizeResult<CategoryListing> {
        let mut listing = CategoryListing {
            category,
            files: Vec::new(),
            folders: Vec::new(),
        };

        for entry in read_dir_sorted(dir)? {
            let name = entry.file_name().to_string_lossy().to_string();
            match entry.file_type() {
                Ok(ft) if ft.is_dir() => listing.folders.push(name),
                _ => listing.files.push(name),
            }
        }

        Ok(listing)
    }

    fn clean(
        root: &Path,
        dir: &Path,
        filters: &CompiledFilters,
        report: &mut AnalyticsReport,
    ) -> OrganizeResult<()> {
        let mut protected = false;

        for entry in read_dir_sorted(dir)? {
            let path = entry.path();
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);

            if is_dir {
                // Children were visited first, so a surviving subdirectory is
                // either a category folder or holds protected files.
                protected = true;
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path.as_path());
            if !filters.allows(relative) {
                protected = true;
                continue;
            }

            fs::remove_file(&path).map_err(|e| OrganizeError::RemoveFailed {
                path: path.clone(),
                source: e,
            })?;
            report.removed_files.push(path);
        }

        if dir != root && !protected {
            fs::remove_dir_all(dir).map_err(|e| OrganizeError::RemoveFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
            report.removed_dirs.push(dir.to_path_buf());
        }

        Ok(())
    }
}

/// Returns the category if `dir` is one of the category folders of `root`.
pub fn category_folder(root: &Path, dir: &Path) -> Option<Category> {
    if dir.parent()? != root {
        return None;
    }
    Category::from_dir_name(dir.file_name()?.to_str()?)
}

fn read_dir_sorted(dir: &Path) -> OrganizeResult<Vec<fs::DirEntry>> {
    let read_failed = |e| OrganizeError::ReadDirFailed {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(read_failed)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_failed)?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}
