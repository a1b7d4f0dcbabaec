//! tidyfold - sort a folder's files into category subfolders
//!
//! This library classifies files by extension, reports what a directory
//! holds, previews where each file would go, and moves files into
//! `<Category>` subfolders without ever overwriting an existing file.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;

pub use analysis::{Classifier, analyze, preview};
pub use config::{AppConfig, ConfigError};
pub use file_category::{Category, ExtensionTable};
pub use file_organizer::{FileOrganizer, OrganizeError, OrganizeReport};

pub use cli::{Cli, Confirm, StdinConfirm, run};
