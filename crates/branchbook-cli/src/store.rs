//! The JSON working file every authoring command loads and writes back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use branchbook_core::config::{EffectiveConfig, resolve_config};
use branchbook_core::edit::{Editor, RandomIds};
use branchbook_core::{Book, ErrorCode, Operation};
use tracing::debug;

use crate::output::{CliError, OutputMode, render_error};

/// Resolved project context for one invocation.
#[derive(Debug)]
pub struct Workspace {
    pub root: PathBuf,
    pub book_path: PathBuf,
    pub config: EffectiveConfig,
}

impl Workspace {
    /// Resolve config under `root` and pick the working file: `--file` when
    /// given, otherwise `[authoring] book_file` relative to `root`.
    ///
    /// # Errors
    ///
    /// Returns an error when a config file exists but cannot be parsed.
    pub fn open(root: &Path, file_flag: Option<&Path>, cli_json: bool) -> anyhow::Result<Self> {
        let config = resolve_config(root, cli_json)?;
        let book_path = file_flag.map_or_else(
            || root.join(&config.project.authoring.book_file),
            |file| root.join(file),
        );
        Ok(Self {
            root: root.to_path_buf(),
            book_path,
            config,
        })
    }

    /// Reducer configured with this project's chapter-name prefix.
    pub fn editor(&self) -> Editor<RandomIds> {
        Editor::from_config(RandomIds, &self.config.project.authoring)
    }

    /// Load the working file, rendering a coded error on failure.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is missing or is not a valid book.
    pub fn load(&self, output: OutputMode) -> anyhow::Result<Book> {
        let shown = self.book_path.display();
        let raw = match fs::read_to_string(&self.book_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cli_err = CliError::coded(ErrorCode::BookNotFound, shown.to_string());
                render_error(output, &cli_err)?;
                anyhow::bail!("{}", cli_err.message);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {shown}"));
            }
        };

        match serde_json::from_str::<Book>(&raw) {
            Ok(book) => {
                debug!(path = %shown, chapters = book.chapters.len(), "loaded book");
                Ok(book)
            }
            Err(err) => {
                let cli_err = CliError::coded(ErrorCode::BookParseError, format!("{shown}: {err}"));
                render_error(output, &cli_err)?;
                anyhow::bail!("{}", cli_err.message)
            }
        }
    }

    /// Write `book` back, replacing the file atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be encoded or written.
    pub fn save(&self, book: &Book) -> anyhow::Result<()> {
        save_book(&self.book_path, book)
    }

    /// Load, apply one operation, save. Returns the book before and after.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or saving fails.
    pub fn apply(&self, op: &Operation, output: OutputMode) -> anyhow::Result<(Book, Book)> {
        let before = self.load(output)?;
        let after = self.editor().apply(&before, op);
        if after != before {
            self.save(&after)?;
        }
        Ok((before, after))
    }
}

/// Serialize `book` as pretty JSON into `path` via a sibling temp file.
///
/// # Errors
///
/// Returns an error if encoding, writing, or the final rename fails.
pub fn save_book(path: &Path, book: &Book) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut json = serde_json::to_string_pretty(book).context("Failed to encode book")?;
    json.push('\n');

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    debug!(path = %path.display(), "saved book");
    Ok(())
}
