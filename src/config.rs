//! Filter configuration.
//!
//! The category table is fixed; what a run is allowed to touch is not. A
//! TOML file lists files to leave alone, and those files are neither sorted
//! nor deleted by the cleanup pass:
//!
//! ```toml
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = [".DS_Store", "Thumbs.db"]
//! patterns = ["*.tmp", "projects/**"]
//! extensions = [".bak", "part"]
//! regex = ["^~\\$"]
//!
//! [filters.include]
//! patterns = ["projects/**/*.pdf"]
//! ```
//!
//! Patterns match paths relative to the folder being sorted. Include
//! patterns win over every exclude rule. A [`LOCAL_CONFIG_FILE`] at the top
//! of the sorted folder is always left in place.

use crate::file_category::dotted_extension;
use glob::Pattern;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Per-directory configuration file, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".clean-folderrc.toml";

#[derive(Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    NotFound(PathBuf),
    Read { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Glob { pattern: String, source: glob::PatternError },
    Regex { pattern: String, source: regex::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "{} not found", path.display()),
            Self::Read { path, source } => write!(f, "cannot read {}: {}", path.display(), source),
            Self::Parse { path, source } => write!(f, "{}: {}", path.display(), source),
            Self::Glob { pattern, source } => write!(f, "bad glob '{}': {}", pattern, source),
            Self::Regex { pattern, source } => write!(f, "bad regex '{}': {}", pattern, source),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Glob { source, .. } => Some(source),
            Self::Regex { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub filters: FilterRules,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// Whether dotfiles take part in a run.
    pub enable_hidden_files: bool,
    pub exclude: ExcludeRules,
    pub include: IncludeRules,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExcludeRules {
    /// Exact file names, matched in any folder.
    pub filenames: Vec<String>,
    /// Glob patterns over the relative path.
    pub patterns: Vec<String>,
    /// Extensions, with or without the leading dot; case is ignored.
    pub extensions: Vec<String>,
    /// Regular expressions over the file name.
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IncludeRules {
    pub patterns: Vec<String>,
}

impl FilterConfig {
    /// Loads the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise the first existing file of
    /// `./.clean-folderrc.toml` and `~/.config/clean-folder/config.toml` is
    /// used, and with neither present every file takes part.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::from_file(path);
        }

        match Self::search_paths().into_iter().find(|path| path.is_file()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(PathBuf::from(home).join(".config/clean-folder/config.toml"));
        }
        paths
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates every pattern and builds the matcher used during a run.
    pub fn compile(&self) -> Result<CompiledFilters, ConfigError> {
        let rules = &self.filters;
        Ok(CompiledFilters {
            hidden_files: rules.enable_hidden_files,
            names: rules.exclude.filenames.iter().cloned().collect(),
            extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| format!(".{}", ext.trim_start_matches('.').to_ascii_lowercase()))
                .collect(),
            excluded: globs(&rules.exclude.patterns)?,
            regexes: rules
                .exclude
                .regex
                .iter()
                .map(|pattern| {
                    Regex::new(pattern).map_err(|source| ConfigError::Regex {
                        pattern: pattern.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            included: globs(&rules.include.patterns)?,
        })
    }
}

fn globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| ConfigError::Glob {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Compiled filter rules.
#[derive(Debug)]
pub struct CompiledFilters {
    hidden_files: bool,
    names: HashSet<String>,
    /// Lowercase, with the leading dot.
    extensions: HashSet<String>,
    excluded: Vec<Pattern>,
    regexes: Vec<Regex>,
    included: Vec<Pattern>,
}

impl CompiledFilters {
    /// Returns true if a run may sort or delete the file at `relative`, a
    /// path relative to the folder being sorted.
    ///
    /// ```
    /// use clean_folder::config::FilterConfig;
    /// use std::path::Path;
    ///
    /// let filters = FilterConfig::default().compile().unwrap();
    /// assert!(filters.allows(Path::new("inbox/photo.jpg")));
    /// assert!(!filters.allows(Path::new(".clean-folderrc.toml")));
    /// ```
    pub fn allows(&self, relative: &Path) -> bool {
        if relative == Path::new(LOCAL_CONFIG_FILE) {
            return false;
        }
        if self.included.iter().any(|p| p.matches_path(relative)) {
            return true;
        }

        let name = relative
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let excluded = (!self.hidden_files && name.starts_with('.'))
            || self.names.contains(name.as_ref())
            || dotted_extension(relative)
                .is_some_and(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
            || self.excluded.iter().any(|p| p.matches_path(relative))
            || self.regexes.iter().any(|r| r.is_match(&name));

        !excluded
    }
}
