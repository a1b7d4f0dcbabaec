//! Command-line interface module for tidyfold.
//!
//! This module handles all CLI-related functionality including:
//! - Command-line parsing
//! - Interactive confirmation
//! - Orchestrating analyze → preview → confirm → organize per directory

use crate::analysis::{self, Classifier};
use crate::config::AppConfig;
use crate::file_organizer::{FileOrganizer, OrganizeError, OrganizeReport, OrganizeResult};
use crate::output::{OutputFormatter, ProgressObserver};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Sort the files of a folder into category subfolders by extension.
///
/// Without arguments, organizes the Desktop and Downloads folders
/// (`DESKTOP_PATH` / `DOWNLOADS_PATH` override their locations). Every folder
/// is analyzed and previewed first, and nothing moves until you answer `y`.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "tidyfold", version, about)]
pub struct Cli {
    /// Directories to organize instead of the configured ones.
    #[arg(value_name = "DIR")]
    pub directories: Vec<PathBuf>,

    /// Path to a TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log every file decision to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

/// True iff the answer, trimmed and lower-cased, is exactly `"y"`.
///
/// ```
/// use tidyfold::cli::is_affirmative;
///
/// assert!(is_affirmative(" Y\n"));
/// assert!(!is_affirmative("yes"));
/// ```
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().to_lowercase() == "y"
}

/// Prompts on stdout and reads one line from stdin.
///
/// End of input or a read error counts as "no".
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        print!("{message}");
        if let Err(e) = io::stdout().flush() {
            tracing::warn!(error = %e, "could not flush prompt");
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) => false,
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "could not read confirmation");
                false
            }
        }
    }
}

/// Where one directory's pass currently stands.
///
/// A pass only moves forward: `Unscanned → Analyzed → Previewed`, then ends
/// in `Skipped` or `Organized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryState {
    Unscanned,
    Analyzed,
    Previewed,
    Skipped,
    Organized,
}

impl DirectoryState {
    /// True for `Skipped` and `Organized`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DirectoryState::Skipped | DirectoryState::Organized)
    }
}

/// How one directory's pass ended.
#[derive(Debug)]
pub enum DirectoryOutcome {
    /// The directory does not exist; nothing was scanned or asked.
    NotFound,
    /// The user declined; nothing moved.
    Skipped,
    /// Files were moved (possibly with per-file failures).
    Organized(OrganizeReport),
}

impl DirectoryOutcome {
    /// The terminal state this outcome corresponds to, if any was reached.
    pub fn state(&self) -> Option<DirectoryState> {
        match self {
            DirectoryOutcome::NotFound => None,
            DirectoryOutcome::Skipped => Some(DirectoryState::Skipped),
            DirectoryOutcome::Organized(_) => Some(DirectoryState::Organized),
        }
    }
}

/// One directory's trip through analyze, preview, confirm and organize.
struct DirectoryPass<'a> {
    dir: &'a Path,
    classifier: &'a Classifier,
    state: DirectoryState,
}

impl<'a> DirectoryPass<'a> {
    fn new(dir: &'a Path, classifier: &'a Classifier) -> Self {
        Self {
            dir,
            classifier,
            state: DirectoryState::Unscanned,
        }
    }

    fn advance(&mut self, next: DirectoryState) {
        tracing::debug!(dir = %self.dir.display(), from = ?self.state, to = ?next, "directory state");
        self.state = next;
    }

    fn analyze(&mut self) -> OrganizeResult<()> {
        OutputFormatter::header(&format!("Analyzing {}...", self.dir.display()));
        let stats = analysis::analyze(self.dir, self.classifier)?;
        OutputFormatter::stats(&stats);
        self.advance(DirectoryState::Analyzed);
        Ok(())
    }

    fn preview(&mut self) -> OrganizeResult<()> {
        OutputFormatter::header(&format!(
            "Preview of organization for {}:",
            self.dir.display()
        ));
        let moves = analysis::preview(self.dir, self.classifier)?;
        OutputFormatter::preview(&moves);
        self.advance(DirectoryState::Previewed);
        Ok(())
    }

    fn skip(&mut self) -> DirectoryOutcome {
        OutputFormatter::plain("Organization skipped.");
        self.advance(DirectoryState::Skipped);
        DirectoryOutcome::Skipped
    }

    fn organize(&mut self) -> OrganizeResult<DirectoryOutcome> {
        OutputFormatter::header(&format!("Organizing {}...", self.dir.display()));
        let mut progress = ProgressObserver::new();
        let result = FileOrganizer::organize(self.dir, self.classifier, &mut progress);
        progress.finish();
        let report = result?;
        OutputFormatter::organize_report(&report);
        self.advance(DirectoryState::Organized);
        Ok(DirectoryOutcome::Organized(report))
    }
}

/// Runs the full pass for one directory.
///
/// A missing directory yields [`DirectoryOutcome::NotFound`] without
/// scanning or prompting. Any other error means the directory could not be
/// listed; per-file move errors are inside the returned report instead.
pub fn process_directory(
    dir: &Path,
    classifier: &Classifier,
    confirm: &mut dyn Confirm,
) -> OrganizeResult<DirectoryOutcome> {
    if !dir.exists() {
        OutputFormatter::warning(&format!("Directory not found: {}", dir.display()));
        return Ok(DirectoryOutcome::NotFound);
    }

    let mut pass = DirectoryPass::new(dir, classifier);
    pass.analyze()?;
    pass.preview()?;

    let question = format!("\nDo you want to organize {}? (y/n): ", dir.display());
    if confirm.confirm(&question) {
        pass.organize()
    } else {
        Ok(pass.skip())
    }
}

/// Loads configuration and processes every target directory in order.
///
/// Directories are independent: one that is missing, unreadable or only
/// partly organized never stops the next one. Only invalid configuration
/// fails the run.
pub fn run(cli: &Cli, confirm: &mut dyn Confirm) -> anyhow::Result<Vec<(PathBuf, DirectoryOutcome)>> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let classifier = Classifier::new(config.extension_table()?, config.exclude_rules()?);

    let directories = if cli.directories.is_empty() {
        config.target_directories()
    } else {
        cli.directories.clone()
    };

    let mut outcomes = Vec::with_capacity(directories.len());
    for dir in directories {
        tracing::info!(dir = %dir.display(), "processing directory");
        match process_directory(&dir, &classifier, confirm) {
            Ok(outcome) => outcomes.push((dir, outcome)),
            Err(OrganizeError::DirectoryNotFound { .. }) => {
                // Vanished between the existence check and the scan.
                OutputFormatter::warning(&format!("Directory not found: {}", dir.display()));
                outcomes.push((dir, DirectoryOutcome::NotFound));
            }
            Err(e) => {
                OutputFormatter::error(&e.to_string());
                tracing::error!(dir = %dir.display(), error = %e, "directory pass aborted");
            }
        }
    }

    Ok(outcomes)
}
