//! Output formatting and styling module.
//!
//! Report text is produced by plain `*_lines` functions so it can be checked
//! without a terminal. [`OutputFormatter`] adds color and prints it, and
//! [`ProgressObserver`] drives a progress bar during an organize pass.

use crate::analysis::{Preview, Stats};
use crate::file_organizer::{FileOutcome, MoveFailure, OrganizeObserver, OrganizeReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Width of the `-----` separator lines.
const SEPARATOR_WIDTH: usize = 50;

/// How many file names a preview shows per category.
pub const PREVIEW_LIMIT: usize = 5;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Formats a byte count as megabytes with two decimals.
///
/// ```
/// use tidyfold::output::format_mb;
///
/// assert_eq!(format_mb(1000), "0.00");
/// assert_eq!(format_mb(1_572_864), "1.50");
/// ```
pub fn format_mb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_MB)
}

/// The separator line used between report sections.
pub fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

/// Renders directory statistics.
///
/// One line per non-empty category, a separator, then the total.
pub fn stats_lines(stats: &Stats) -> Vec<String> {
    let mut lines: Vec<String> = stats
        .iter()
        .filter(|(_, s)| s.count > 0)
        .map(|(category, s)| {
            format!("{}: {} files ({} MB)", category, s.count, format_mb(s.size))
        })
        .collect();

    lines.push(separator());
    lines.push(format!(
        "Total: {} files ({} MB)",
        stats.total_count(),
        format_mb(stats.total_size())
    ));
    lines
}

/// Renders the planned moves, at most [`PREVIEW_LIMIT`] names per category.
pub fn preview_lines(preview: &Preview) -> Vec<String> {
    let mut lines = Vec::new();
    for (category, files) in preview.iter().filter(|(_, files)| !files.is_empty()) {
        lines.push(String::new());
        lines.push(format!(
            "{} folder would contain {} files:",
            category,
            files.len()
        ));
        lines.extend(
            files
                .iter()
                .take(PREVIEW_LIMIT)
                .map(|name| format!("  - {name}")),
        );
        if files.len() > PREVIEW_LIMIT {
            lines.push(format!(
                "  - ... and {} more files",
                files.len() - PREVIEW_LIMIT
            ));
        }
    }
    lines
}

/// Renders the outcome of an organize pass.
pub fn organize_lines(report: &OrganizeReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .moved
        .iter()
        .filter(|(_, files)| !files.is_empty())
        .map(|(category, files)| format!("Moved {} files to {} folder", files.len(), category))
        .collect();

    lines.push(separator());
    lines.push(format!("Total: {} files organized", report.total_moved()));
    lines
}

/// Renders one file that could not be moved.
pub fn failure_line(failure: &MoveFailure) -> String {
    format!("Error moving {}: {}", failure.name, failure.error)
}

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints a section header, preceded by a blank line.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints lines as-is, dimming separators.
    pub fn lines(lines: &[String]) {
        for line in lines {
            if line.chars().all(|c| c == '-') && !line.is_empty() {
                println!("{}", line.dimmed());
            } else {
                println!("{line}");
            }
        }
    }

    /// Prints the statistics block of an analysis.
    pub fn stats(stats: &Stats) {
        Self::plain("\nCurrent directory contents:");
        Self::plain(&separator());
        Self::lines(&stats_lines(stats));
    }

    /// Prints the preview block.
    pub fn preview(preview: &Preview) {
        Self::plain(&separator());
        for line in preview_lines(preview) {
            if line.ends_with("files:") {
                println!("{}", line.cyan());
            } else {
                println!("{line}");
            }
        }
        Self::plain(&separator());
    }

    /// Prints a per-file move error on stdout, in line with the pass.
    pub fn move_failure(failure: &MoveFailure) {
        println!("{}", failure_line(failure).red());
    }

    /// Prints the result of an organize pass.
    ///
    /// Per-file errors were already printed while the pass ran.
    pub fn organize_report(report: &OrganizeReport) {
        Self::header("Organization complete:");
        Self::plain(&separator());
        Self::lines(&organize_lines(report));
        if !report.is_complete_success() {
            Self::warning(&format!(
                "{} files could not be organized. Please review errors above.",
                report.failures.len()
            ));
        }
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{message}");
    }

    /// Creates a progress bar for file moves.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }
}

/// Shows organize progress on a terminal progress bar.
///
/// The bar draws to stderr and stays hidden when stderr is not a terminal.
#[derive(Default)]
pub struct ProgressObserver {
    bar: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the bar from the terminal.
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl OrganizeObserver for ProgressObserver {
    fn on_start(&mut self, total: usize) {
        self.bar = Some(OutputFormatter::create_progress_bar(total as u64));
    }

    fn on_file(&mut self, outcome: &FileOutcome) {
        match (&self.bar, outcome) {
            (Some(bar), Ok(moved)) => bar.set_message(moved.name.clone()),
            (Some(bar), Err(failure)) => {
                bar.suspend(|| OutputFormatter::move_failure(failure));
                bar.set_message(format!("failed: {}", failure.name));
            }
            (None, Ok(_)) => {}
            (None, Err(failure)) => OutputFormatter::move_failure(failure),
        }
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }
}
