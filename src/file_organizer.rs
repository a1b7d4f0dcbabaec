/// File organization: moving files into category directories.
///
/// This module relocates the files of a base directory into
/// `<base>/<Category>` subdirectories. Destination names never overwrite an
/// existing file: a taken `name.ext` becomes `name (1).ext`, `name (2).ext`,
/// and so on. A failure on one file is recorded and the batch continues.
use crate::analysis::{Classifier, DirectoryEntry, scan_directory};
use crate::file_category::{Category, CategoryMap, split_extension_os};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during scanning and file organization.
#[derive(Debug, thiserror::Error)]
pub enum OrganizeError {
    /// The directory to scan or organize does not exist.
    #[error("Directory not found: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },
    /// The directory exists but could not be listed.
    #[error("Failed to read directory {}: {source}", .path.display())]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Failed to create a category directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Failed to move a file to its category directory.
    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A file that was successfully relocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedFile {
    /// The file name as it was in the base directory.
    pub name: String,
    /// The original path of the file before organization.
    pub original_path: PathBuf,
    /// The new path of the file, possibly with a ` (i)` suffix.
    pub new_path: PathBuf,
    /// The category the file was moved to.
    pub category: Category,
}

/// A file that could not be relocated, and why.
#[derive(Debug)]
pub struct MoveFailure {
    pub name: String,
    pub category: Category,
    pub error: OrganizeError,
}

/// Outcome of relocating one file.
pub type FileOutcome = Result<MovedFile, MoveFailure>;

/// Everything that happened during one organize pass.
#[derive(Debug)]
pub struct OrganizeReport {
    /// Names of moved files per category, in scan order.
    pub moved: CategoryMap<Vec<String>>,
    /// Files that stayed where they were because their move failed.
    pub failures: Vec<MoveFailure>,
}

impl OrganizeReport {
    fn new(classifier: &Classifier) -> Self {
        Self {
            moved: CategoryMap::new(classifier.table()),
            failures: Vec::new(),
        }
    }

    fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            Ok(moved) => {
                if let Some(files) = self.moved.get_mut(moved.category) {
                    files.push(moved.name);
                }
            }
            Err(failure) => self.failures.push(failure),
        }
    }

    /// Total number of files moved.
    pub fn total_moved(&self) -> usize {
        self.moved.iter().map(|(_, files)| files.len()).sum()
    }

    /// True if every scanned file was moved.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Receives progress notifications during [`FileOrganizer::organize`].
pub trait OrganizeObserver {
    /// Called once, after the scan, with the number of files to move.
    fn on_start(&mut self, _total: usize) {}
    /// Called after each file, whether or not it moved.
    fn on_file(&mut self, _outcome: &FileOutcome) {}
}

impl OrganizeObserver for () {}

/// Picks a destination inside `category_dir` that does not exist yet.
///
/// Returns `category_dir/filename` when free, otherwise the first free
/// `category_dir/<stem> (i)<ext>` for `i = 1, 2, ...`. The name is used as
/// raw bytes, so names that are not valid UTF-8 keep them.
///
/// # Examples
///
/// ```
/// use tidyfold::file_organizer::resolve_destination;
/// use std::path::Path;
///
/// let dir = Path::new("/definitely/not/there");
/// assert_eq!(resolve_destination(dir, "a.txt"), dir.join("a.txt"));
/// ```
pub fn resolve_destination(category_dir: &Path, filename: impl AsRef<OsStr>) -> PathBuf {
    let filename = filename.as_ref();
    let candidate = category_dir.join(filename);
    if !is_taken(&candidate) {
        return candidate;
    }

    let (stem, ext) = split_extension_os(filename);
    (1u64..)
        .map(|i| {
            let mut name = OsString::from(stem);
            name.push(format!(" ({i})"));
            name.push(ext);
            category_dir.join(name)
        })
        .find(|path| !is_taken(path))
        .unwrap_or(candidate)
}

// Unlike `Path::exists`, a dangling symlink counts as taken.
fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Moves `from` to `to`, copying across filesystems when a rename cannot.
///
/// After a successful return the file exists only at `to`. On error it
/// exists only at `from`.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(from = %from.display(), to = %to.display(), "rename crosses devices, copying");
            copy_then_remove(from, to)
        }
        Err(e) => Err(e),
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    if let Err(copy_err) = fs::copy(from, to) {
        discard_partial_copy(to);
        return Err(copy_err);
    }
    if let Err(remove_err) = fs::remove_file(from) {
        discard_partial_copy(to);
        return Err(remove_err);
    }
    Ok(())
}

// Leaves the source as the only copy after a failed cross-device move.
fn discard_partial_copy(to: &Path) {
    match fs::remove_file(to) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::error!(path = %to.display(), error = %e, "could not remove partial copy");
        }
    }
}

/// Organizes files by moving them into category subdirectories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves one scanned file into `base_path/<Category>`.
    ///
    /// The category directory is created if it doesn't exist. The destination
    /// name is chosen by [`resolve_destination`], so nothing is overwritten.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidyfold::analysis::{Classifier, scan_directory};
    /// use tidyfold::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let base = Path::new("/path/to/base");
    /// for entry in scan_directory(base, &Classifier::default()).unwrap() {
    ///     match FileOrganizer::move_to_category(base, &entry) {
    ///         Ok(moved) => println!("{} -> {}", entry.name, moved.new_path.display()),
    ///         Err(e) => eprintln!("Error moving {}: {}", entry.name, e),
    ///     }
    /// }
    /// ```
    pub fn move_to_category(base_path: &Path, entry: &DirectoryEntry) -> OrganizeResult<MovedFile> {
        let category_path = base_path.join(entry.category.name());

        fs::create_dir_all(&category_path).map_err(|source| {
            OrganizeError::DirectoryCreationFailed {
                path: category_path.clone(),
                source,
            }
        })?;

        let destination_path = resolve_destination(&category_path, &entry.file_name);

        move_file(&entry.path, &destination_path).map_err(|source| {
            OrganizeError::FileMoveFailure {
                from: entry.path.clone(),
                to: destination_path.clone(),
                source,
            }
        })?;

        Ok(MovedFile {
            name: entry.name.clone(),
            original_path: entry.path.clone(),
            new_path: destination_path,
            category: entry.category,
        })
    }

    /// Re-scans `base_path` and moves every file into its category folder.
    ///
    /// Per-file failures are logged, reported to `observer` and collected in
    /// the report; they never stop the batch. Only a failed scan aborts.
    pub fn organize(
        base_path: &Path,
        classifier: &Classifier,
        observer: &mut dyn OrganizeObserver,
    ) -> OrganizeResult<OrganizeReport> {
        let entries = scan_directory(base_path, classifier)?;
        observer.on_start(entries.len());

        let mut report = OrganizeReport::new(classifier);
        for entry in &entries {
            let outcome = match Self::move_to_category(base_path, entry) {
                Ok(moved) => {
                    tracing::debug!(file = %moved.name, to = %moved.new_path.display(), "moved");
                    Ok(moved)
                }
                Err(error) => {
                    tracing::warn!(file = %entry.name, error = %error, "move failed");
                    Err(MoveFailure {
                        name: entry.name.clone(),
                        category: entry.category,
                        error,
                    })
                }
            };
            observer.on_file(&outcome);
            report.record(outcome);
        }

        tracing::info!(
            dir = %base_path.display(),
            moved = report.total_moved(),
            failed = report.failures.len(),
            "organized directory"
        );
        Ok(report)
    }
}
