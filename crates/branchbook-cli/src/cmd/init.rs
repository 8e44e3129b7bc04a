use std::io::Write;

use anyhow::{Context as _, Result};
use branchbook_core::edit::MetaPatch;
use branchbook_core::{Book, Operation};
use clap::Args;
use serde::Serialize;

use crate::output::{OutputMode, render};
use crate::store::{Workspace, save_book};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Title for the new book.
    #[arg(long, default_value = "")]
    pub title: String,

    /// Overwrite an existing book file.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[authoring]\n\
    chapter_name_prefix = \"Chapter\"\n\
    book_file = \"book.json\"\n\
    \n\
    [reader]\n\
    show_prices = true\n";

#[derive(Debug, Serialize)]
struct InitOutput {
    book_file: String,
    config_file: Option<String>,
    start_chapter_id: Option<String>,
}

/// Execute `bb init`. Creates the project skeleton:
///
/// ```text
/// .branchbook/
///   config.toml   (default project config, kept if present)
/// book.json       (title plus one start chapter)
/// ```
///
/// # Errors
///
/// Returns an error if the book file already exists and `--force` is not
/// set, or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    if ws.book_path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Use `bb init --force` to start over.",
            ws.book_path.display()
        );
    }

    let config_dir = ws.root.join(".branchbook");
    let config_path = config_dir.join("config.toml");
    let wrote_config = if config_path.exists() {
        false
    } else {
        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;
        std::fs::write(&config_path, CONFIG_TOML)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        true
    };

    let mut editor = ws.editor();
    let book = editor.apply_all(
        &Book::default(),
        &[
            Operation::SetMeta {
                patch: MetaPatch {
                    title: Some(args.title.clone()),
                    ..MetaPatch::default()
                },
            },
            Operation::AddChapter,
        ],
    );
    save_book(&ws.book_path, &book)?;

    let report = InitOutput {
        book_file: ws.book_path.display().to_string(),
        config_file: wrote_config.then(|| config_path.display().to_string()),
        start_chapter_id: book.start_chapter_id.clone(),
    };
    render(output, &report, |r, w| {
        writeln!(w, "✓ Initialized {}", r.book_file)?;
        if let Some(config) = &r.config_file {
            writeln!(w, "  Config: {config}")?;
        }
        if let Some(start) = &r.start_chapter_id {
            writeln!(w, "  Start chapter: {start}")?;
        }
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  bb chapter add --name \"The Fork\"")?;
        writeln!(w, "  bb choice add <chapter-id> --label \"Go left\" --to <chapter-id>")
    })
}
