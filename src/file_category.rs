/// File categorization system for sorting files by extension.
///
/// This module maps file extensions (including the leading dot) to a fixed set
/// of categories. The table is static: every known extension belongs to exactly
/// one category and everything else falls into [`Category::Unknown`].
///
/// # Examples
///
/// ```
/// use clean_folder::file_category::{Category, category_for};
///
/// assert_eq!(category_for(".png"), Category::Images);
/// assert_eq!(category_for(".JPG"), Category::Images);
/// assert_eq!(category_for(".xyz"), Category::Unknown);
/// ```
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// Label used in reports for files that have no extension at all.
pub const NO_EXTENSION: &str = "<no extension>";

/// Represents a sorting category.
///
/// Each category corresponds to an output folder directly under the root
/// being organized. Declaration order is the order buckets are processed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Image files (PNG, JPG, SVG, GIF)
    Images,
    /// Video files (MOV, MP4, MKV, AVI)
    Video,
    /// Document files (DOCX, TXT, PDF, XLSX, PPTX)
    Documents,
    /// Audio files (MP3, OGG, WAV, AMR)
    Audio,
    /// Archive files (ZIP, TAR, GZ, TGZ, RAR)
    Archives,
    /// Everything the table does not recognize
    Unknown,
}

impl Category {
    /// All categories, catch-all last.
    pub const ALL: [Category; 6] = [
        Category::Images,
        Category::Video,
        Category::Documents,
        Category::Audio,
        Category::Archives,
        Category::Unknown,
    ];

    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use clean_folder::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "images");
    /// assert_eq!(Category::Video.dir_name(), "video");
    /// assert_eq!(Category::Unknown.dir_name(), "unknown");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Video => "video",
            Category::Documents => "documents",
            Category::Audio => "audio",
            Category::Archives => "archives",
            Category::Unknown => "unknown",
        }
    }

    /// Returns the extensions recognized for this category.
    ///
    /// The catch-all category has no extensions of its own.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Images => &[".png", ".jpeg", ".svg", ".gif", ".jpg"],
            Category::Video => &[".mov", ".mp4", ".mkv", ".avi"],
            Category::Documents => &[".docx", ".doc", ".txt", ".pdf", ".xls", ".xlsx", ".pptx"],
            Category::Audio => &[".mp3", ".ogg", ".wav", ".amr"],
            Category::Archives => &[".gz", ".zip", ".tar", ".rar", ".tgz"],
            Category::Unknown => &[],
        }
    }

    /// Looks up a category by its output folder name.
    ///
    /// ```
    /// use clean_folder::file_category::Category;
    ///
    /// assert_eq!(Category::from_dir_name("audio"), Some(Category::Audio));
    /// assert_eq!(Category::from_dir_name("Downloads"), None);
    /// ```
    pub fn from_dir_name(name: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.dir_name() == name)
    }

    /// Returns a human-readable description of this category.
    pub fn description(&self) -> &'static str {
        match self {
            Category::Images => "Image files",
            Category::Video => "Video files",
            Category::Documents => "Document files",
            Category::Audio => "Audio files",
            Category::Archives => "Archive files",
            Category::Unknown => "Unrecognized files",
        }
    }
}

/// Maps file extensions to categories.
///
/// The standard mapper is built once from [`Category::extensions`] and shared
/// for the lifetime of the process; use [`category_for`] rather than building
/// one by hand.
#[derive(Debug, Clone)]
pub struct FileMapper {
    extension_map: HashMap<&'static str, Category>,
}

static STANDARD_MAPPER: LazyLock<FileMapper> = LazyLock::new(FileMapper::new);

impl FileMapper {
    /// Creates a new `FileMapper` with all standard mappings.
    fn new() -> Self {
        let mut mapper = Self {
            extension_map: HashMap::new(),
        };
        mapper.populate_standard_mappings();
        mapper
    }

    /// Returns the process-wide standard mapper.
    pub fn standard() -> &'static FileMapper {
        &STANDARD_MAPPER
    }

    fn populate_standard_mappings(&mut self) {
        for category in Category::ALL {
            for ext in category.extensions() {
                self.extension_map.insert(*ext, category);
            }
        }
    }

    /// Maps an extension (with leading dot) to a category, if the table knows it.
    ///
    /// Matching ignores ASCII case, so `.PDF` and `.pdf` are the same.
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        self.extension_map
            .get(ext.to_ascii_lowercase().as_str())
            .copied()
    }

    /// Determines the category for an extension, defaulting to `Unknown`.
    pub fn categorize(&self, ext: Option<&str>) -> Category {
        ext.and_then(|e| self.extension_to_category(e))
            .unwrap_or(Category::Unknown)
    }
}

/// Returns the category for an extension such as `".txt"`.
///
/// Total: an empty or unrecognized extension yields [`Category::Unknown`].
pub fn category_for(extension: &str) -> Category {
    FileMapper::standard().categorize(Some(extension))
}

/// Returns true if the extension appears anywhere in the category table.
pub fn is_known_extension(extension: &str) -> bool {
    FileMapper::standard()
        .extension_to_category(extension)
        .is_some()
}

/// Returns the extension of a path with its leading dot, e.g. `".gz"` for
/// `data.tar.gz`. Dotfiles such as `.bashrc` have no extension.
pub fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}
