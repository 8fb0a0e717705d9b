//! Terminal output.
//!
//! Everything the binary prints goes through [`OutputFormatter`]. Reports go
//! to stdout; warnings and errors go to stderr so that a failed archive
//! still shows up when the report is piped elsewhere.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

const PROGRESS_TEMPLATE: &str = "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}";

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message);
    }

    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(title: &str) {
        println!("\n{}", title.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{} {}", "[DRY RUN]".yellow().bold(), message.yellow());
    }

    /// Prints `label folder: a, b, c` with the folder column padded so that
    /// consecutive lists line up.
    ///
    /// ```no_run
    /// use clean_folder::output::OutputFormatter;
    ///
    /// OutputFormatter::name_list("Files in", "documents", &["a.txt".to_string()]);
    /// ```
    pub fn name_list(label: &str, folder: &str, names: &[String]) {
        println!("{} {:15} {}", label.bold(), folder, names.join(", "));
    }

    /// Progress bar for the relocation loop. Pass 0 when the file count is
    /// not known yet and set the length later.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        ProgressBar::new(total).with_style(style)
    }

    /// Prints per-folder file counts followed by the total.
    ///
    /// ```no_run
    /// use clean_folder::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let counts = BTreeMap::from([("documents".to_string(), 2), ("images".to_string(), 1)]);
    /// OutputFormatter::summary_table(&counts, 3);
    /// ```
    pub fn summary_table(counts: &BTreeMap<String, usize>, total: usize) {
        const FIRST_COLUMN: &str = "Category";

        let width = counts
            .keys()
            .map(String::len)
            .fold(FIRST_COLUMN.len(), usize::max);
        let rule = "-".repeat(width + 10);

        Self::header("SUMMARY");
        println!("{:<width$} | {}", FIRST_COLUMN, "Files".bold());
        println!("{}", rule);
        for (folder, count) in counts {
            println!("{:<width$} | {}", folder, file_count(*count));
        }
        println!("{}", rule);
        println!("{:<width$} | {}", "Total", file_count(total));
    }
}

fn file_count(count: usize) -> String {
    let noun = if count == 1 { "file" } else { "files" };
    format!("{} {}", count.to_string().green(), noun)
}
