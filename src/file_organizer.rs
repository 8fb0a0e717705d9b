/// Sort engine: walks a root folder and relocates files into category folders.
///
/// Sorting happens in two steps. [`FileOrganizer::plan`] walks the tree once
/// and buckets every file by category without touching the filesystem.
/// [`FileOrganizer::execute`] then creates the category folders, moves and
/// renames each file, and unpacks archives in place.
use crate::archive::{self, ExtractError};
use crate::config::CompiledFilters;
use crate::file_category::{Category, FileMapper, dotted_extension};
use crate::normalize::target_file_name;
use crate::output::OutputFormatter;
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A file discovered during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Where the file currently lives.
    pub source: PathBuf,
    /// Extension with its leading dot, if any.
    pub extension: Option<String>,
    /// The category it will be sorted into.
    pub category: Category,
}

impl FileRecord {
    /// Classifies the file at `source`.
    pub fn new(source: PathBuf) -> Self {
        let extension = dotted_extension(&source);
        let category = FileMapper::standard().categorize(extension.as_deref());
        Self {
            source,
            extension,
            category,
        }
    }

    /// The name the file will have inside its category folder.
    pub fn target_name(&self) -> OsString {
        match self.source.file_name() {
            Some(name) => target_file_name(Path::new(name), self.category),
            None => OsString::new(),
        }
    }
}

/// Everything a sorting run is going to do.
#[derive(Debug, Clone)]
pub struct SortPlan {
    /// The folder being organized; category folders are created directly inside it.
    pub root: PathBuf,
    /// Files to relocate, bucketed by category.
    pub buckets: BTreeMap<Category, Vec<FileRecord>>,
    /// Empty directories found during the walk.
    pub empty_dirs: Vec<PathBuf>,
}

impl SortPlan {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            buckets: BTreeMap::new(),
            empty_dirs: Vec::new(),
        }
    }

    fn add(&mut self, record: FileRecord) {
        self.buckets.entry(record.category).or_default().push(record);
    }

    /// Total number of files in the plan.
    pub fn file_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Returns true if there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty() && self.empty_dirs.is_empty()
    }
}

/// Records a single file that was relocated.
#[derive(Debug, Clone)]
pub struct Operation {
    /// The original path of the file before sorting.
    pub original_path: PathBuf,
    /// The new path of the file after sorting.
    pub new_path: PathBuf,
    /// The category the file was moved to.
    pub category: Category,
}

/// What a sorting run actually did.
#[derive(Debug, Default)]
pub struct SortReport {
    /// Every file that was relocated, in processing order.
    pub operations: Vec<Operation>,
    /// Archives that were unpacked, with the directory they went to.
    pub extracted: Vec<(PathBuf, PathBuf)>,
    /// Archives that could not be unpacked; they stay in the archives folder.
    pub failed_archives: Vec<(PathBuf, String)>,
    /// Empty directories that were removed.
    pub removed_dirs: Vec<PathBuf>,
}

impl SortReport {
    /// Number of relocated files per category folder name.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for op in &self.operations {
            *counts.entry(op.category.dir_name().to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Errors that can occur during sorting.
///
/// Any of these aborts the run; work that already completed is kept.
#[derive(Debug)]
pub enum OrganizeError {
    /// The root folder could not be used.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to list a directory during a walk.
    ReadDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create a category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to copy a file into its category directory.
    CopyFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Failed to give a copied file its normalized name.
    RenameFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Failed to delete a file or directory.
    RemoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
            Self::ReadDirFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::CopyFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to copy {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::RenameFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to rename {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::RemoveFailed { path, source } => {
                write!(f, "Failed to remove {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for sorting operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Returns true if `path` is a category folder of `root` or lies inside one.
///
/// Such paths are already organized and are never collected again, which
/// keeps repeated runs from nesting category folders.
///
/// # Examples
///
/// ```
/// use clean_folder::file_organizer::is_skippable;
/// use std::path::Path;
///
/// let root = Path::new("/data");
/// assert!(is_skippable(root, Path::new("/data/images")));
/// assert!(is_skippable(root, Path::new("/data/archives/photos")));
/// assert!(!is_skippable(root, Path::new("/data/holiday/images")));
/// ```
pub fn is_skippable(root: &Path, path: &Path) -> bool {
    Category::ALL
        .iter()
        .any(|category| path.starts_with(root.join(category.dir_name())))
}

/// Sorts files into category subdirectories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Walks `root` and works out where every file should go.
    ///
    /// Category folders (and anything beneath them) are skipped. Files
    /// rejected by `filters` are left out. Symlinks are not followed into
    /// directories, but a link to a file is sorted by its content. Nothing
    /// on disk is modified.
    pub fn plan(root: &Path, filters: &CompiledFilters) -> OrganizeResult<SortPlan> {
        if !root.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: root.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "base path is not an existing directory",
                ),
            });
        }

        let mut plan = SortPlan::new(root.to_path_buf());
        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_skippable(root, entry.path()));

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            let path = entry.path();

            if entry.file_type().is_dir() {
                if is_empty_dir(path)? {
                    plan.empty_dirs.push(path.to_path_buf());
                }
                continue;
            }
            if !is_regular_file(&entry)? {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            if filters.allows(relative) {
                plan.add(FileRecord::new(path.to_path_buf()));
            }
        }

        Ok(plan)
    }

    /// Carries out a plan.
    ///
    /// Empty directories are removed first, then each bucket is processed in
    /// category order. Archives are unpacked after relocation; the relocated
    /// archive is deleted on success and kept (with a warning) on failure.
    ///
    /// # Errors
    ///
    /// Any failure to create a folder, copy, rename or remove a file aborts
    /// the run immediately. Archive failures never do.
    pub fn execute(plan: &SortPlan, progress: &ProgressBar) -> OrganizeResult<SortReport> {
        let mut report = SortReport::default();

        for dir in &plan.empty_dirs {
            fs::remove_dir(dir).map_err(|e| OrganizeError::RemoveFailed {
                path: dir.clone(),
                source: e,
            })?;
            report.removed_dirs.push(dir.clone());
        }

        for (category, records) in &plan.buckets {
            let category_path = plan.root.join(category.dir_name());
            fs::create_dir_all(&category_path).map_err(|e| {
                OrganizeError::DirectoryCreationFailed {
                    path: category_path.clone(),
                    source: e,
                }
            })?;

            for record in records {
                progress.set_message(record.source.display().to_string());
                let operation = Self::move_to_category_with_record(record, &category_path)?;

                if *category == Category::Archives {
                    match archive::extract(&operation.new_path) {
                        Ok(dir) => {
                            fs::remove_file(&operation.new_path).map_err(|e| {
                                OrganizeError::RemoveFailed {
                                    path: operation.new_path.clone(),
                                    source: e,
                                }
                            })?;
                            report.extracted.push((operation.new_path.clone(), dir));
                        }
                        Err(e) => {
                            progress.suspend(|| OutputFormatter::warning(&e.to_string()));
                            report
                                .failed_archives
                                .push((operation.new_path.clone(), describe(&e)));
                        }
                    }
                }

                report.operations.push(operation);
                progress.inc(1);
            }
        }

        Ok(report)
    }

    /// Plans and executes a full sorting run over `root`.
    pub fn sort(
        root: &Path,
        filters: &CompiledFilters,
        progress: &ProgressBar,
    ) -> OrganizeResult<SortReport> {
        let plan = Self::plan(root, filters)?;
        progress.set_length(plan.file_count() as u64);
        Self::execute(&plan, progress)
    }

    /// Moves one file into its category folder under its normalized name.
    ///
    /// The file is copied in under its original name, renamed to the
    /// normalized name (replacing any file already there), and only then is
    /// the source removed.
    fn move_to_category_with_record(
        record: &FileRecord,
        category_path: &Path,
    ) -> OrganizeResult<Operation> {
        let file_name = record
            .source
            .file_name()
            .ok_or_else(|| OrganizeError::CopyFailed {
                source: record.source.clone(),
                destination: category_path.to_path_buf(),
                source_error: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;

        let copied_path = category_path.join(file_name);
        fs::copy(&record.source, &copied_path).map_err(|e| OrganizeError::CopyFailed {
            source: record.source.clone(),
            destination: copied_path.clone(),
            source_error: e,
        })?;

        let new_path = category_path.join(record.target_name());
        if new_path != copied_path {
            fs::rename(&copied_path, &new_path).map_err(|e| OrganizeError::RenameFailed {
                source: copied_path.clone(),
                destination: new_path.clone(),
                source_error: e,
            })?;
        }

        fs::remove_file(&record.source).map_err(|e| OrganizeError::RemoveFailed {
            path: record.source.clone(),
            source: e,
        })?;

        Ok(Operation {
            original_path: record.source.clone(),
            new_path,
            category: record.category,
        })
    }
}

/// Converts a failed walk step into a [`OrganizeError::ReadDirFailed`].
pub(crate) fn walk_error(root: &Path, error: walkdir::Error) -> OrganizeError {
    let path = error.path().unwrap_or(root).to_path_buf();
    OrganizeError::ReadDirFailed {
        path,
        source: error.into(),
    }
}

fn is_empty_dir(dir: &Path) -> OrganizeResult<bool> {
    let mut entries = fs::read_dir(dir).map_err(|e| OrganizeError::ReadDirFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;
    Ok(entries.next().is_none())
}

/// Returns true for regular files and for symlinks that resolve to one.
///
/// Dangling links, links to directories, sockets and FIFOs are not sorted.
fn is_regular_file(entry: &DirEntry) -> OrganizeResult<bool> {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return Ok(true);
    }
    if !file_type.is_symlink() {
        return Ok(false);
    }

    match fs::metadata(entry.path()) {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(OrganizeError::ReadDirFailed {
            path: entry.path().to_path_buf(),
            source: e,
        }),
    }
}

fn describe(error: &ExtractError) -> String {
    match error {
        ExtractError::Unsupported { .. } => "unsupported archive type".to_string(),
        other => other.to_string(),
    }
}
