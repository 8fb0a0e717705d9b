//! clean-folder - sort a folder into category subdirectories
//!
//! This library classifies files by extension, transliterates their names to
//! an ASCII-safe form, moves them into per-category folders, unpacks archives
//! in place, removes leftover directories, and reports which extensions it
//! recognized. Which files take part can be narrowed with a TOML filter
//! configuration.

pub mod analytics;
pub mod archive;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod normalize;
pub mod output;

pub use analytics::{Analytics, AnalyticsReport};
pub use archive::{ArchiveFormat, ExtractError};
pub use config::{CompiledFilters, ConfigError, FilterConfig};
pub use file_category::{Category, FileMapper, category_for};
pub use file_organizer::{FileOrganizer, OrganizeError, SortPlan, SortReport};
pub use normalize::normalize;

pub use cli::{RunMode, run_cli_with_config};
