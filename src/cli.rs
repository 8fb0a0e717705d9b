//! Command-line interface module for clean-folder.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing and folder validation
//! - Loading the filter configuration
//! - Running the sort engine (or previewing it in dry-run mode)
//! - Running the analytics pass and printing its summary

use crate::analytics::{Analytics, AnalyticsReport};
use crate::config::{CompiledFilters, FilterConfig};
use crate::file_organizer::{FileOrganizer, SortPlan, SortReport};
use crate::output::OutputFormatter;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Sort a folder into images, video, documents, audio, archives and unknown.
#[derive(Debug, Parser)]
#[command(name = "clean-folder", version, about)]
pub struct Cli {
    /// The folder to organize.
    pub folder: Option<PathBuf>,

    /// Show what would happen without touching any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Filter configuration file (TOML).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// What a run should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Sort the folder, then clean up and report.
    Apply,
    /// Only show the plan.
    DryRun,
}

impl Cli {
    pub fn mode(&self) -> RunMode {
        if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Apply
        }
    }
}

/// Checks that a folder was given, exists and is a directory.
///
/// # Examples
///
/// ```
/// use clean_folder::cli::validate_folder;
/// use std::path::Path;
///
/// assert!(validate_folder(None).is_err());
/// assert!(validate_folder(Some(Path::new("/non/existent"))).is_err());
/// assert!(validate_folder(Some(Path::new("."))).is_ok());
/// ```
pub fn validate_folder(folder: Option<&Path>) -> Result<&Path, String> {
    let folder = folder.ok_or_else(|| "No folder path given".to_string())?;

    if !folder.exists() {
        return Err(format!("Path \"{}\" does not exist", folder.display()));
    }
    if !folder.is_dir() {
        return Err(format!("Path \"{}\" is not a directory", folder.display()));
    }

    Ok(folder)
}

/// Runs the application for parsed arguments.
pub fn run(cli: &Cli) -> Result<(), String> {
    let folder = validate_folder(cli.folder.as_deref())?;
    run_cli_with_config(cli.mode(), folder, cli.config.as_deref())
}

/// Runs the application with an optional configuration file.
///
/// # Arguments
///
/// * `mode` - Whether to sort for real or only preview
/// * `dir_path` - The folder to organize; must already exist
/// * `config_path` - Optional path to configuration file
///
/// # Examples
///
/// ```no_run
/// use clean_folder::cli::{RunMode, run_cli_with_config};
/// use std::path::Path;
///
/// match run_cli_with_config(RunMode::Apply, Path::new("/path/to/folder"), None) {
///     Ok(()) => println!("Done"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli_with_config(
    mode: RunMode,
    dir_path: &Path,
    config_path: Option<&Path>,
) -> Result<(), String> {
    let config = FilterConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let filters = config
        .compile()
        .map_err(|e| format!("Error compiling filters: {}", e))?;

    match mode {
        RunMode::Apply => sort_and_report(dir_path, &filters),
        RunMode::DryRun => preview(dir_path, &filters),
    }
}

fn sort_and_report(base_path: &Path, filters: &CompiledFilters) -> Result<(), String> {
    OutputFormatter::info(&format!("Sorting {}", base_path.display()));

    let progress = OutputFormatter::create_progress_bar(0);
    let result = FileOrganizer::sort(base_path, filters, &progress);
    progress.finish_and_clear();
    let report = result.map_err(|e| e.to_string())?;
    print_sort_report(&report);

    let analytics = Analytics::run(base_path, filters).map_err(|e| e.to_string())?;
    print_analytics(&analytics);

    Ok(())
}

fn print_sort_report(report: &SortReport) {
    if report.operations.is_empty() {
        OutputFormatter::plain("Nothing to sort.");
    } else {
        OutputFormatter::summary_table(&report.category_counts(), report.operations.len());
    }

    for (archive, dir) in &report.extracted {
        OutputFormatter::success(&format!(
            "Extracted {} into {}",
            archive.display(),
            dir.display()
        ));
    }
    if !report.failed_archives.is_empty() {
        OutputFormatter::warning(&format!(
            "{} archive(s) could not be extracted and were left in place",
            report.failed_archives.len()
        ));
    }
}

fn print_analytics(report: &AnalyticsReport) {
    OutputFormatter::header("CONTENTS");
    for listing in report.listings.iter().filter(|l| !l.is_empty()) {
        let folder = listing.category.dir_name();
        if !listing.files.is_empty() {
            OutputFormatter::name_list("Files in", folder, &listing.files);
        }
        if !listing.folders.is_empty() {
            OutputFormatter::name_list("Folders in", folder, &listing.folders);
        }
    }

    if !report.removed_dirs.is_empty() {
        OutputFormatter::plain(&format!(
            "\nRemoved {} leftover folder(s)",
            report.removed_dirs.len()
        ));
    }

    println!();
    if !report.known.is_empty() {
        OutputFormatter::plain(&format!(
            "Extensions encountered: {}",
            join(&report.known)
        ));
    }
    if !report.unknown.is_empty() {
        OutputFormatter::plain(&format!("Unknown extensions: {}", join(&report.unknown)));
    }

    OutputFormatter::success("All cleaned up");
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Shows where every file would go without touching anything.
fn preview(base_path: &Path, filters: &CompiledFilters) -> Result<(), String> {
    OutputFormatter::dry_run_notice(&format!("Analyzing {}", base_path.display()));

    let plan = FileOrganizer::plan(base_path, filters).map_err(|e| e.to_string())?;
    if plan.is_empty() {
        OutputFormatter::plain("No files found to sort.");
        return Ok(());
    }

    print_plan(&plan);

    OutputFormatter::dry_run_notice("Dry run complete. No files were modified.");
    Ok(())
}

fn print_plan(plan: &SortPlan) {
    let mut counts = BTreeMap::new();

    for (category, records) in &plan.buckets {
        OutputFormatter::header(&format!(
            "{} → {}/",
            category.description(),
            category.dir_name()
        ));
        for record in records {
            let source = record
                .source
                .strip_prefix(&plan.root)
                .unwrap_or(record.source.as_path());
            OutputFormatter::plain(&format!(
                " - {} → {}",
                source.display(),
                Path::new(&record.target_name()).display()
            ));
        }
        counts.insert(category.dir_name().to_string(), records.len());
    }

    for dir in &plan.empty_dirs {
        OutputFormatter::plain(&format!("Would remove empty folder {}", dir.display()));
    }

    OutputFormatter::summary_table(&counts, plan.file_count());
}
