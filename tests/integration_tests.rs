use tidyfold::analysis::{Classifier, analyze, preview};
use tidyfold::cli::{Cli, Confirm, DirectoryOutcome, DirectoryState, process_directory, run};
use tidyfold::file_category::Category;
use tidyfold::file_organizer::FileOrganizer;
use tidyfold::output::{organize_lines, stats_lines};
/// Integration tests for tidyfold
///
/// These tests drive the library the way the binary does: real files in a
/// temporary directory, scripted answers to the confirmation prompt.
///
/// Test categories:
/// 1. Analysis and preview
/// 2. Organization and name conflicts
/// 3. Orchestration across directories
/// 4. Configuration
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary directory with helpers to populate and inspect it.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file of `len` bytes at a relative path, creating parents.
    fn create_sized(&self, rel_path: &str, len: usize) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, vec![b'x'; len]).expect("Failed to write file");
    }

    fn create_text_file(&self, rel_path: &str, content: &str) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(file_path, content).expect("Failed to write file");
    }

    fn create_subdir(&self, name: &str) {
        fs::create_dir_all(self.path().join(name)).expect("Failed to create subdirectory");
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    /// Count regular files directly in the fixture root.
    fn count_root_files(&self) -> usize {
        fs::read_dir(self.path())
            .expect("Failed to read directory")
            .flatten()
            .filter(|e| e.path().is_file())
            .count()
    }

    /// Every file below the root, as sorted relative paths.
    fn list_files_recursive(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        Self::walk_dir(self.path(), self.path(), &mut files);
        files.sort();
        files
    }

    fn walk_dir(root: &Path, dir: &Path, files: &mut Vec<PathBuf>) {
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    files.push(path.strip_prefix(root).unwrap().to_path_buf());
                } else if path.is_dir() {
                    Self::walk_dir(root, &path, files);
                }
            }
        }
    }

    /// Write an empty config file so tests never pick up the user's config.
    fn empty_config(&self) -> PathBuf {
        let path = self.path().join("tidyfold-test.toml");
        fs::write(&path, "").expect("Failed to write config");
        path
    }
}

/// Answers prompts from a script and records every question.
struct ScriptedConfirm {
    answers: VecDeque<bool>,
    questions: Vec<String>,
}

impl ScriptedConfirm {
    fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            questions: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        self.questions.push(message.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}

// ============================================================================
// Test Suite 1: Analysis and Preview
// ============================================================================

#[test]
fn test_analyze_reference_scenario() {
    let fixture = TestFixture::new();
    fixture.create_sized("a.pdf", 1000);
    fixture.create_sized("b.jpg", 2000);
    fixture.create_sized("c.xyz", 500);

    let stats = analyze(fixture.path(), &Classifier::default()).expect("analyze failed");

    assert_eq!(stats.get(Category::Documents).unwrap().count, 1);
    assert_eq!(stats.get(Category::Images).unwrap().count, 1);
    assert_eq!(stats.get(Category::Other).unwrap().count, 1);
    assert_eq!(stats.total_count(), 3);
    assert_eq!(stats.total_size(), 3500);

    let lines = stats_lines(&stats);
    assert_eq!(lines[0], "Documents: 1 files (0.00 MB)");
    assert_eq!(lines[1], "Images: 1 files (0.00 MB)");
    assert_eq!(lines[2], "Other: 1 files (0.00 MB)");
    assert_eq!(lines.last().unwrap(), "Total: 3 files (0.00 MB)");
}

#[test]
fn test_analyze_count_matches_non_directory_entries() {
    let fixture = TestFixture::new();
    let names = [
        "a.PDF", "b.docx", "c.jpeg", "d.mov", "e.wav", "f.gz", "g.apk", "h.js", "README", ".hidden",
    ];
    for name in names {
        fixture.create_sized(name, 3);
    }
    fixture.create_subdir("Images");
    fixture.create_subdir("projects");
    fixture.create_sized("projects/deep.pdf", 3);

    let stats = analyze(fixture.path(), &Classifier::default()).unwrap();

    assert_eq!(stats.total_count(), names.len());
    assert_eq!(stats.total_size(), 3 * names.len() as u64);
    assert_eq!(stats.get(Category::Other).unwrap().count, 2);
    assert_eq!(stats.get(Category::Miscellaneous).unwrap().count, 0);
}

#[test]
fn test_preview_and_organize_agree_on_unchanged_directory() {
    let fixture = TestFixture::new();
    for name in ["x.png", "y.mp3", "z.zip", "w.txt", "v.unknown"] {
        fixture.create_sized(name, 1);
    }
    let classifier = Classifier::default();

    let planned = preview(fixture.path(), &classifier).unwrap();
    let report = FileOrganizer::organize(fixture.path(), &classifier, &mut ()).unwrap();

    for (category, files) in planned.iter() {
        let mut planned_files = files.clone();
        let mut moved_files = report.moved.get(category).unwrap().clone();
        planned_files.sort();
        moved_files.sort();
        assert_eq!(planned_files, moved_files, "mismatch for {category}");
    }
}

// ============================================================================
// Test Suite 2: Organization and Name Conflicts
// ============================================================================

#[test]
fn test_organize_moves_into_category_folders() {
    let fixture = TestFixture::new();
    fixture.create_sized("photo.PNG", 10);
    fixture.create_sized("song.mp3", 10);
    fixture.create_sized("setup.exe", 10);
    fixture.create_sized("deploy.sh", 10);
    fixture.create_sized("data.bin", 10);

    let report = FileOrganizer::organize(fixture.path(), &Classifier::default(), &mut ()).unwrap();

    fixture.assert_file_exists("Images/photo.PNG");
    fixture.assert_file_exists("Audio/song.mp3");
    fixture.assert_file_exists("Applications/setup.exe");
    fixture.assert_file_exists("Scripts/deploy.sh");
    fixture.assert_file_exists("Other/data.bin");
    assert_eq!(fixture.count_root_files(), 0);
    assert!(report.is_complete_success());

    let lines = organize_lines(&report);
    assert!(lines.contains(&"Moved 1 files to Images folder".to_string()));
    assert_eq!(lines.last().unwrap(), "Total: 5 files organized");
}

#[test]
fn test_existing_file_in_category_is_not_overwritten() {
    let fixture = TestFixture::new();
    fixture.create_text_file("Documents/report.txt", "original");
    fixture.create_text_file("report.txt", "incoming");

    FileOrganizer::organize(fixture.path(), &Classifier::default(), &mut ()).unwrap();

    assert_eq!(fixture.read("Documents/report.txt"), "original");
    assert_eq!(fixture.read("Documents/report (1).txt"), "incoming");
    fixture.assert_file_not_exists("report.txt");
}

#[test]
fn test_repeated_names_get_increasing_suffixes() {
    let fixture = TestFixture::new();
    let classifier = Classifier::default();

    for round in 0..3 {
        fixture.create_text_file("name.pdf", &format!("round {round}"));
        FileOrganizer::organize(fixture.path(), &classifier, &mut ()).unwrap();
    }

    assert_eq!(fixture.read("Documents/name.pdf"), "round 0");
    assert_eq!(fixture.read("Documents/name (1).pdf"), "round 1");
    assert_eq!(fixture.read("Documents/name (2).pdf"), "round 2");
}

#[cfg(unix)]
#[test]
fn test_non_utf8_name_moves_unchanged() {
    use std::ffi::{OsStr, OsString};
    use std::os::unix::ffi::OsStrExt;

    let fixture = TestFixture::new();
    let raw = OsStr::from_bytes(b"caf\xE9.txt");
    fs::write(fixture.path().join(raw), "latin-1").unwrap();

    let report = FileOrganizer::organize(fixture.path(), &Classifier::default(), &mut ()).unwrap();

    assert!(report.is_complete_success());
    let names: Vec<OsString> = fs::read_dir(fixture.path().join("Documents"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![raw.to_os_string()]);
    assert_eq!(fs::read(fixture.path().join("Documents").join(raw)).unwrap(), b"latin-1");
}

#[test]
fn test_organize_twice_is_a_no_op() {
    let fixture = TestFixture::new();
    fixture.create_sized("a.jpg", 1);
    let classifier = Classifier::default();

    FileOrganizer::organize(fixture.path(), &classifier, &mut ()).unwrap();
    let before = fixture.list_files_recursive();
    let report = FileOrganizer::organize(fixture.path(), &classifier, &mut ()).unwrap();

    assert_eq!(report.total_moved(), 0);
    assert_eq!(fixture.list_files_recursive(), before);
}

#[test]
fn test_no_file_lost_when_some_moves_fail() {
    let fixture = TestFixture::new();
    fixture.create_text_file("keep.pdf", "pdf");
    fixture.create_text_file("stuck.mp4", "mp4");
    fixture.create_text_file("free.zip", "zip");
    // `Videos` exists as a plain file, so no Videos folder can be created.
    fixture.create_text_file("Videos", "blocker");

    let report = FileOrganizer::organize(fixture.path(), &Classifier::default(), &mut ()).unwrap();

    // The extensionless blocker may itself land in Other; either way each
    // file ends up in exactly one place.
    let files = fixture.list_files_recursive();
    let count_named = |name: &str| {
        files
            .iter()
            .filter(|p| p.file_name().unwrap() == name)
            .count()
    };
    assert_eq!(count_named("keep.pdf"), 1);
    assert_eq!(count_named("stuck.mp4"), 1);
    assert_eq!(count_named("free.zip"), 1);
    assert_eq!(count_named("Videos"), 1);

    fixture.assert_file_exists("Documents/keep.pdf");
    fixture.assert_file_exists("Archives/free.zip");
    assert_eq!(
        report.total_moved() + report.failures.len(),
        4,
        "every scanned file is either moved or reported"
    );
}

#[cfg(unix)]
#[test]
fn test_unwritable_category_folder_reports_failure() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = TestFixture::new();
    fixture.create_subdir("Images");
    fixture.create_sized("pic.gif", 1);
    fixture.create_sized("doc.txt", 1);
    fs::set_permissions(fixture.path().join("Images"), fs::Permissions::from_mode(0o555)).unwrap();

    // Root ignores permission bits; nothing to observe in that case.
    let write_check = fixture.path().join("Images").join(".write_check");
    if fs::write(&write_check, "").is_ok() {
        let _ = fs::remove_file(&write_check);
        return;
    }

    let report = FileOrganizer::organize(fixture.path(), &Classifier::default(), &mut ()).unwrap();
    fs::set_permissions(fixture.path().join("Images"), fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "pic.gif");
    fixture.assert_file_exists("pic.gif");
    fixture.assert_file_exists("Documents/doc.txt");
}

// ============================================================================
// Test Suite 3: Orchestration
// ============================================================================

#[test]
fn test_process_directory_confirmed() {
    let fixture = TestFixture::new();
    fixture.create_sized("a.pdf", 1);
    let mut confirm = ScriptedConfirm::new(&[true]);

    let outcome = process_directory(fixture.path(), &Classifier::default(), &mut confirm).unwrap();

    assert_eq!(outcome.state(), Some(DirectoryState::Organized));
    assert_eq!(confirm.questions.len(), 1);
    assert!(confirm.questions[0].contains("Do you want to organize"));
    assert!(confirm.questions[0].ends_with("? (y/n): "));
    fixture.assert_file_exists("Documents/a.pdf");
}

#[test]
fn test_process_directory_declined() {
    let fixture = TestFixture::new();
    fixture.create_sized("a.pdf", 1);
    let mut confirm = ScriptedConfirm::new(&[false]);

    let outcome = process_directory(fixture.path(), &Classifier::default(), &mut confirm).unwrap();

    assert!(matches!(outcome, DirectoryOutcome::Skipped));
    fixture.assert_file_exists("a.pdf");
    fixture.assert_file_not_exists("Documents");
}

#[test]
fn test_run_skips_missing_directory_and_continues() {
    let config_home = TestFixture::new();
    let present = TestFixture::new();
    present.create_sized("clip.mp4", 1);
    let missing = present.path().join("does-not-exist");

    let cli = Cli {
        directories: vec![missing.clone(), present.path().to_path_buf()],
        config: Some(config_home.empty_config()),
        verbose: false,
    };
    let mut confirm = ScriptedConfirm::new(&[true]);

    let outcomes = run(&cli, &mut confirm).expect("run failed");

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].0, missing);
    assert!(matches!(outcomes[0].1, DirectoryOutcome::NotFound));
    assert!(matches!(outcomes[1].1, DirectoryOutcome::Organized(_)));
    // Only the existing directory was asked about.
    assert_eq!(confirm.questions.len(), 1);
    present.assert_file_exists("Videos/clip.mp4");
}

#[test]
fn test_run_processes_each_directory_independently() {
    let config_home = TestFixture::new();
    let first = TestFixture::new();
    let second = TestFixture::new();
    first.create_sized("one.png", 1);
    second.create_sized("two.png", 1);

    let cli = Cli {
        directories: vec![first.path().to_path_buf(), second.path().to_path_buf()],
        config: Some(config_home.empty_config()),
        verbose: false,
    };
    let mut confirm = ScriptedConfirm::new(&[false, true]);

    run(&cli, &mut confirm).expect("run failed");

    first.assert_file_exists("one.png");
    second.assert_file_exists("Images/two.png");
}

#[test]
fn test_run_rejects_missing_config_file() {
    let cli = Cli {
        directories: vec![],
        config: Some(PathBuf::from("/non/existent/tidyfold.toml")),
        verbose: false,
    };
    let mut confirm = ScriptedConfirm::new(&[]);

    assert!(run(&cli, &mut confirm).is_err());
    assert!(confirm.questions.is_empty());
}

// ============================================================================
// Test Suite 4: Configuration
// ============================================================================

#[test]
fn test_config_directories_and_custom_table() {
    let config_home = TestFixture::new();
    let target = TestFixture::new();
    target.create_sized("notes.md", 1);
    target.create_sized("photo.jpg", 1);
    target.create_sized("Thumbs.db", 1);

    let config_path = config_home.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            r#"
directories = [{:?}]

[[categories]]
name = "Documents"
extensions = ["md"]

[exclude]
filenames = ["Thumbs.db"]
"#,
            target.path().to_string_lossy()
        ),
    )
    .unwrap();

    let cli = Cli {
        directories: vec![],
        config: Some(config_path),
        verbose: false,
    };
    let mut confirm = ScriptedConfirm::new(&[true]);

    let outcomes = run(&cli, &mut confirm).expect("run failed");

    assert_eq!(outcomes.len(), 1);
    target.assert_file_exists("Documents/notes.md");
    // Images is not in the custom table, so JPEGs fall through to Other.
    target.assert_file_exists("Other/photo.jpg");
    target.assert_file_exists("Thumbs.db");
}
