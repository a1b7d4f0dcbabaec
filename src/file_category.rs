/// Extension-based file categorization.
///
/// This module maps file names to broad categories (e.g. "Documents",
/// "Images") using an ordered table of extension sets. The table is built
/// once and handed around explicitly; nothing here touches global state.
///
/// # Examples
///
/// ```
/// use tidyfold::file_category::{Category, ExtensionTable};
///
/// let table = ExtensionTable::standard();
/// assert_eq!(table.classify("holiday.JPG"), Category::Images);
/// assert_eq!(table.classify("notes.txt"), Category::Documents);
/// assert_eq!(table.classify("mystery.xyz"), Category::Other);
/// ```
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fmt;
use std::str::FromStr;

/// Represents a broad file category.
///
/// Every category except [`Category::Other`] owns a set of extensions in an
/// [`ExtensionTable`]. `Other` is the catch-all for anything unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Office documents and plain text (PDF, DOCX, TXT, ...)
    Documents,
    /// Image files (JPG, PNG, GIF, ...)
    Images,
    /// Video files (MP4, AVI, MOV)
    Videos,
    /// Audio files (MP3, WAV)
    Audio,
    /// Archive files (ZIP, RAR, TAR, GZ)
    Archives,
    /// Installers, executables and shortcuts
    Applications,
    /// Script sources (Python, JavaScript, shell)
    Scripts,
    /// Reserved bucket with no extensions in the standard table
    Miscellaneous,
    /// Anything no other category claims
    Other,
}

impl Category {
    /// All categories, in standard evaluation order, catch-all last.
    pub const ALL: [Category; 9] = [
        Category::Documents,
        Category::Images,
        Category::Videos,
        Category::Audio,
        Category::Archives,
        Category::Applications,
        Category::Scripts,
        Category::Miscellaneous,
        Category::Other,
    ];

    /// Returns the display name, which is also the subfolder name.
    ///
    /// ```
    /// use tidyfold::file_category::Category;
    ///
    /// assert_eq!(Category::Images.name(), "Images");
    /// assert_eq!(Category::Other.name(), "Other");
    /// ```
    pub fn name(&self) -> &'static str {
        match self {
            Category::Documents => "Documents",
            Category::Images => "Images",
            Category::Videos => "Videos",
            Category::Audio => "Audio",
            Category::Archives => "Archives",
            Category::Applications => "Applications",
            Category::Scripts => "Scripts",
            Category::Miscellaneous => "Miscellaneous",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Splits a file name into stem and extension.
///
/// The extension starts at the last `.` and keeps the dot. Leading dots do
/// not start an extension, so `.bashrc` has none.
///
/// ```
/// use tidyfold::file_category::split_extension;
///
/// assert_eq!(split_extension("report.final.pdf"), ("report.final", ".pdf"));
/// assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
/// assert_eq!(split_extension("README"), ("README", ""));
/// ```
pub fn split_extension(filename: &str) -> (&str, &str) {
    let leading_dots = filename.len() - filename.trim_start_matches('.').len();
    match filename[leading_dots..].rfind('.') {
        Some(idx) => filename.split_at(leading_dots + idx),
        None => (filename, ""),
    }
}

/// Like [`split_extension`], but on a raw file name that need not be UTF-8.
///
/// ```
/// use std::ffi::OsStr;
/// use tidyfold::file_category::split_extension_os;
///
/// let (stem, ext) = split_extension_os(OsStr::new("notes.v2.txt"));
/// assert_eq!((stem, ext), (OsStr::new("notes.v2"), OsStr::new(".txt")));
/// ```
pub fn split_extension_os(filename: &OsStr) -> (&OsStr, &OsStr) {
    let bytes = filename.as_encoded_bytes();
    let leading_dots = bytes.iter().take_while(|&&b| b == b'.').count();
    match bytes[leading_dots..].iter().rposition(|&b| b == b'.') {
        Some(idx) => {
            let (stem, ext) = bytes.split_at(leading_dots + idx);
            // SAFETY: both halves come from `as_encoded_bytes` on the same
            // OsStr and are split right before an ASCII '.', which is a
            // valid boundary in the encoding.
            unsafe {
                (
                    OsStr::from_encoded_bytes_unchecked(stem),
                    OsStr::from_encoded_bytes_unchecked(ext),
                )
            }
        }
        None => (filename, OsStr::new("")),
    }
}

/// Returns the lower-cased extension of a file name, dot included.
pub fn normalized_extension(filename: &str) -> String {
    split_extension(filename).1.to_lowercase()
}

/// Ordered mapping from categories to extension sets.
///
/// Categories are evaluated in insertion order and the first one containing
/// the extension wins, so overlapping sets resolve deterministically.
#[derive(Debug, Clone)]
pub struct ExtensionTable {
    rules: Vec<(Category, HashSet<String>)>,
}

impl ExtensionTable {
    /// Builds the built-in table.
    pub fn standard() -> Self {
        let rules: [(Category, &[&str]); 8] = [
            (Category::Documents, &[".pdf", ".docx", ".txt", ".xlsx", ".pptx"]),
            (Category::Images, &[".jpg", ".jpeg", ".png", ".gif", ".heic"]),
            (Category::Videos, &[".mp4", ".avi", ".mov"]),
            (Category::Audio, &[".mp3", ".wav"]),
            (Category::Archives, &[".zip", ".rar", ".tar", ".gz"]),
            (
                Category::Applications,
                &[".exe", ".apk", ".dmg", ".lnk", ".url"],
            ),
            (Category::Scripts, &[".py", ".js", ".sh"]),
            (Category::Miscellaneous, &[]),
        ];

        Self {
            rules: rules
                .into_iter()
                .map(|(category, exts)| {
                    (category, exts.iter().map(|ext| ext.to_string()).collect())
                })
                .collect(),
        }
    }

    /// Builds a table from ordered `(category, extensions)` rules.
    ///
    /// Extensions are lower-cased and given a leading dot when it is missing.
    ///
    /// # Errors
    ///
    /// Fails if a rule names `Other` (it is always implicit) or if the same
    /// category appears twice.
    pub fn from_rules<I, S>(rules: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (Category, Vec<S>)>,
        S: AsRef<str>,
    {
        let mut table = Self { rules: Vec::new() };
        for (category, extensions) in rules {
            if category == Category::Other {
                return Err(TableError::CatchAllRule);
            }
            if table.categories().any(|existing| existing == category) {
                return Err(TableError::DuplicateCategory(category));
            }
            let set = extensions
                .iter()
                .map(|ext| {
                    let ext = ext.as_ref().trim().to_lowercase();
                    if ext.starts_with('.') {
                        ext
                    } else {
                        format!(".{ext}")
                    }
                })
                .collect();
            table.rules.push((category, set));
        }
        Ok(table)
    }

    /// Classifies a file name by its extension.
    pub fn classify(&self, filename: &str) -> Category {
        self.classify_extension(&normalized_extension(filename))
    }

    /// Classifies an already lower-cased extension (dot included).
    pub fn classify_extension(&self, extension: &str) -> Category {
        self.rules
            .iter()
            .find(|(_, exts)| exts.contains(extension))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Other)
    }

    /// Iterates the table's categories in evaluation order, without `Other`.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.rules.iter().map(|(category, _)| *category)
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Errors raised while building an [`ExtensionTable`] from rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("'Other' is the catch-all category and cannot own extensions")]
    CatchAllRule,
    #[error("category '{0}' is listed more than once")]
    DuplicateCategory(Category),
}

/// Per-category buckets kept in table order, `Other` last.
///
/// Every category of the table gets a bucket up front, so iteration order
/// never depends on which files were seen.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMap<T> {
    buckets: Vec<(Category, T)>,
}

impl<T: Default> CategoryMap<T> {
    /// Creates one empty bucket per table category plus `Other`.
    pub fn new(table: &ExtensionTable) -> Self {
        Self {
            buckets: table
                .categories()
                .chain(std::iter::once(Category::Other))
                .map(|category| (category, T::default()))
                .collect(),
        }
    }
}

impl<T> CategoryMap<T> {
    /// Returns the bucket for a category.
    pub fn get(&self, category: Category) -> Option<&T> {
        self.buckets
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, value)| value)
    }

    /// Returns the bucket for a category mutably.
    pub fn get_mut(&mut self, category: Category) -> Option<&mut T> {
        self.buckets
            .iter_mut()
            .find(|(c, _)| *c == category)
            .map(|(_, value)| value)
    }

    /// Iterates buckets in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        self.buckets.iter().map(|(category, value)| (*category, value))
    }
}
