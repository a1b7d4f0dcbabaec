/// Directory scanning and aggregation.
///
/// A scan lists the immediate children of a directory, skips anything that
/// is a directory, and classifies the rest. `analyze` and `preview` each run
/// their own scan and differ only in what they accumulate per category.
use crate::config::ExcludeRules;
use crate::file_category::{Category, CategoryMap, ExtensionTable, normalized_extension};
use crate::file_organizer::{OrganizeError, OrganizeResult};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Immutable classification rules shared by every pass over a directory.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    table: ExtensionTable,
    exclude: ExcludeRules,
}

impl Classifier {
    pub fn new(table: ExtensionTable, exclude: ExcludeRules) -> Self {
        Self { table, exclude }
    }

    pub fn table(&self) -> &ExtensionTable {
        &self.table
    }

    /// Classifies a file name by extension.
    pub fn classify(&self, filename: &str) -> Category {
        self.table.classify(filename)
    }

    /// True if the file is excluded from every pass.
    pub fn is_excluded(&self, filename: &str) -> bool {
        self.exclude.is_excluded(filename)
    }
}

/// A regular (non-directory) child of a scanned directory.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    /// The file name exactly as the filesystem reports it.
    pub file_name: OsString,
    /// The file name for display and matching; lossy if not valid UTF-8.
    pub name: String,
    /// The full path to the file.
    pub path: PathBuf,
    /// Lower-cased extension including the dot, or empty.
    pub extension: String,
    /// Size in bytes at scan time.
    pub size: u64,
    /// The category the file belongs to.
    pub category: Category,
}

/// File count and total byte size of one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryStats {
    pub count: usize,
    pub size: u64,
}

/// Per-category statistics of one scan.
pub type Stats = CategoryMap<CategoryStats>;

/// Per-category file names of one scan, in scan order.
pub type Preview = CategoryMap<Vec<String>>;

impl Stats {
    /// Total number of files across all categories.
    pub fn total_count(&self) -> usize {
        self.iter().map(|(_, s)| s.count).sum()
    }

    /// Total size in bytes across all categories.
    pub fn total_size(&self) -> u64 {
        self.iter().map(|(_, s)| s.size).sum()
    }
}

/// Lists and classifies the immediate non-directory entries of `dir`.
///
/// Subdirectories (and links that resolve to directories) are skipped and
/// never descended into. Entries are returned in listing order.
///
/// # Errors
///
/// Returns [`OrganizeError::DirectoryNotFound`] if `dir` does not exist and
/// [`OrganizeError::ReadDirFailed`] if it cannot be listed.
pub fn scan_directory(dir: &Path, classifier: &Classifier) -> OrganizeResult<Vec<DirectoryEntry>> {
    if !dir.exists() {
        return Err(OrganizeError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let read_dir = fs::read_dir(dir).map_err(|source| OrganizeError::ReadDirFailed {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let file_name = entry.file_name();
        let name = file_name.to_string_lossy().into_owned();
        let path = entry.path();

        let size = match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => continue,
            Ok(meta) => meta.len(),
            Err(e) => {
                // Broken link or a file that vanished after listing.
                tracing::warn!(file = %name, error = %e, "could not read file metadata");
                entry.metadata().map(|meta| meta.len()).unwrap_or(0)
            }
        };

        if classifier.is_excluded(&name) {
            tracing::debug!(file = %name, "excluded by configuration");
            continue;
        }

        let extension = normalized_extension(&name);
        let category = classifier.table().classify_extension(&extension);
        entries.push(DirectoryEntry {
            file_name,
            name,
            path,
            extension,
            size,
            category,
        });
    }

    Ok(entries)
}

/// Counts files and bytes per category.
///
/// Every scanned file lands in exactly one bucket, so the bucket counts sum
/// to the number of non-directory entries.
pub fn analyze(dir: &Path, classifier: &Classifier) -> OrganizeResult<Stats> {
    let mut stats = Stats::new(classifier.table());
    for entry in scan_directory(dir, classifier)? {
        if let Some(bucket) = stats.get_mut(entry.category) {
            bucket.count += 1;
            bucket.size += entry.size;
        }
    }
    tracing::info!(
        dir = %dir.display(),
        files = stats.total_count(),
        bytes = stats.total_size(),
        "analyzed directory"
    );
    Ok(stats)
}

/// Groups file names per category in scan order.
pub fn preview(dir: &Path, classifier: &Classifier) -> OrganizeResult<Preview> {
    let mut moves = Preview::new(classifier.table());
    for entry in scan_directory(dir, classifier)? {
        if let Some(files) = moves.get_mut(entry.category) {
            files.push(entry.name);
        }
    }
    Ok(moves)
}
