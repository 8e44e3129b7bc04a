//! `bb chapter`: add, update, delete, and list chapters.
//!
//! Every mutation goes through the authoring reducer. Commands that name a
//! chapter check that it exists first, so a typo reports `E2001` instead of
//! silently doing nothing.

use std::io::Write;

use anyhow::Result;
use branchbook_core::edit::ChapterPatch;
use branchbook_core::{Book, Chapter, ErrorCode, Operation};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::output::{
    CliError, OutputMode, fail, format_price, pretty_kv, pretty_section, render, render_mode,
};
use crate::store::Workspace;

#[derive(Subcommand, Debug)]
pub enum ChapterCommand {
    #[command(
        about = "Add a chapter",
        after_help = "EXAMPLES:\n    # Add a chapter named by the configured prefix\n    bb chapter add\n\n    # Add a paid ending\n    bb chapter add --name \"The Vault\" --end --price 50"
    )]
    Add(ChapterAddArgs),

    #[command(
        about = "Update chapter fields",
        after_help = "EXAMPLES:\n    # Rename a chapter\n    bb chapter update ch-1a2b --name \"Dawn\"\n\n    # Make it the start chapter\n    bb chapter update ch-1a2b --start true"
    )]
    Update(ChapterUpdateArgs),

    #[command(
        about = "Delete a chapter and every choice that leads to it",
        after_help = "EXAMPLES:\n    bb chapter delete ch-1a2b"
    )]
    Delete(ChapterDeleteArgs),

    #[command(about = "List chapters", after_help = "EXAMPLES:\n    bb chapter list --json")]
    List,
}

#[derive(Args, Debug)]
pub struct ChapterAddArgs {
    /// Display name (default: "<prefix> <n>").
    #[arg(long)]
    pub name: Option<String>,

    /// Body text.
    #[arg(long)]
    pub content: Option<String>,

    /// Make this the start chapter.
    #[arg(long)]
    pub start: bool,

    /// Mark this chapter as an ending.
    #[arg(long)]
    pub end: bool,

    /// Price in satoshis to enter the chapter.
    #[arg(long)]
    pub price: Option<u64>,
}

impl ChapterAddArgs {
    fn patch(&self) -> ChapterPatch {
        ChapterPatch {
            name: self.name.clone(),
            content: self.content.clone(),
            is_start_chapter: self.start.then_some(true),
            is_end_chapter: self.end.then_some(true),
            price: self.price,
            ..ChapterPatch::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct ChapterUpdateArgs {
    /// Chapter id.
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub content: Option<String>,

    /// Set or clear the start flag.
    #[arg(long, value_name = "BOOL")]
    pub start: Option<bool>,

    /// Set or clear the ending flag. Setting it drops the chapter's choices.
    #[arg(long, value_name = "BOOL")]
    pub end: Option<bool>,

    /// Price in satoshis to enter the chapter.
    #[arg(long)]
    pub price: Option<u64>,
}

impl ChapterUpdateArgs {
    fn patch(&self) -> ChapterPatch {
        ChapterPatch {
            name: self.name.clone(),
            content: self.content.clone(),
            is_start_chapter: self.start,
            is_end_chapter: self.end,
            price: self.price,
            ..ChapterPatch::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct ChapterDeleteArgs {
    /// Chapter id.
    pub id: String,
}

/// One row of `bb chapter list`.
#[derive(Debug, Serialize)]
struct ChapterRow<'a> {
    id: &'a str,
    name: &'a str,
    is_start_chapter: bool,
    is_end_chapter: bool,
    choice_count: usize,
    price: Option<u64>,
}

impl<'a> From<&'a Chapter> for ChapterRow<'a> {
    fn from(chapter: &'a Chapter) -> Self {
        Self {
            id: &chapter.id,
            name: &chapter.name,
            is_start_chapter: chapter.is_start_chapter,
            is_end_chapter: chapter.is_end_chapter,
            choice_count: chapter.choices.len(),
            price: chapter.price,
        }
    }
}

impl ChapterRow<'_> {
    fn flags(&self) -> &'static str {
        match (self.is_start_chapter, self.is_end_chapter) {
            (true, true) => "start,end",
            (true, false) => "start",
            (false, true) => "end",
            (false, false) => "-",
        }
    }
}

pub fn run_chapter(command: &ChapterCommand, output: OutputMode, ws: &Workspace) -> Result<()> {
    match command {
        ChapterCommand::Add(args) => run_add(args, output, ws),
        ChapterCommand::Update(args) => run_update(args, output, ws),
        ChapterCommand::Delete(args) => run_delete(args, output, ws),
        ChapterCommand::List => run_list(output, ws),
    }
}

fn run_add(args: &ChapterAddArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    let before = ws.load(output)?;
    let mut editor = ws.editor();
    let added = editor.apply(&before, &Operation::AddChapter);

    let Some(id) = new_chapter_id(&before, &added) else {
        return fail(
            output,
            &CliError::coded(ErrorCode::InternalUnexpected, "no chapter was added"),
        );
    };

    let patch = args.patch();
    let after = if patch == ChapterPatch::default() {
        added
    } else {
        editor.apply(
            &added,
            &Operation::UpdateChapter {
                id: id.clone(),
                patch,
            },
        )
    };
    ws.save(&after)?;
    show_chapter(&after, &id, "Added", output)
}

fn run_update(args: &ChapterUpdateArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    let book = ws.load(output)?;
    require_chapter(&book, &args.id, output)?;

    let patch = args.patch();
    if patch == ChapterPatch::default() {
        return fail(
            output,
            &CliError::new("no fields specified")
                .with_suggestion("Use --name, --content, --start, --end, or --price"),
        );
    }

    let after = ws.editor().apply(
        &book,
        &Operation::UpdateChapter {
            id: args.id.clone(),
            patch,
        },
    );
    ws.save(&after)?;
    show_chapter(&after, &args.id, "Updated", output)
}

fn run_delete(args: &ChapterDeleteArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    let book = ws.load(output)?;
    require_chapter(&book, &args.id, output)?;

    let pruned = branchbook_core::parents_of(&book, &args.id)
        .into_iter()
        .filter(|parent| parent.chapter_id != args.id)
        .count();
    let after = ws.editor().apply(
        &book,
        &Operation::DeleteChapter {
            id: args.id.clone(),
        },
    );
    ws.save(&after)?;

    let report = serde_json::json!({
        "deleted": args.id,
        "pruned_choices": pruned,
        "start_chapter_id": after.start_chapter_id,
    });
    render(output, &report, |_, w| {
        writeln!(w, "✓ Deleted {} ({pruned} incoming choices removed)", args.id)?;
        if book.start_chapter_id.as_deref() == Some(args.id.as_str()) {
            writeln!(w, "  The book no longer has a start chapter.")?;
        }
        Ok(())
    })
}

fn run_list(output: OutputMode, ws: &Workspace) -> Result<()> {
    let book = ws.load(output)?;
    let rows: Vec<ChapterRow<'_>> = book.chapters.values().map(ChapterRow::from).collect();

    render_mode(
        output,
        &rows,
        |rows, w| {
            writeln!(w, "id\tname\tflags\tchoices\tprice")?;
            for row in rows {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}\t{}",
                    row.id,
                    row.name,
                    row.flags(),
                    row.choice_count,
                    row.price.unwrap_or(0)
                )?;
            }
            Ok(())
        },
        |rows, w| {
            pretty_section(w, &format!("Chapters ({})", rows.len()))?;
            for row in rows {
                writeln!(
                    w,
                    "{:<16} {:<28} {:<10} {:>2} choices  {}",
                    row.id,
                    row.name,
                    row.flags(),
                    row.choice_count,
                    format_price(row.price)
                )?;
            }
            Ok(())
        },
    )
}

fn show_chapter(book: &Book, id: &str, verb: &str, output: OutputMode) -> Result<()> {
    let Some(chapter) = book.chapter(id) else {
        return fail(output, &CliError::coded(ErrorCode::ChapterNotFound, id));
    };
    render(output, chapter, |c, w| {
        writeln!(w, "✓ {verb} chapter {}", c.id)?;
        pretty_kv(w, "Name", &c.name)?;
        pretty_kv(w, "Start", c.is_start_chapter.to_string())?;
        pretty_kv(w, "Ending", c.is_end_chapter.to_string())?;
        pretty_kv(w, "Price", format_price(c.price))?;
        pretty_kv(w, "Choices", c.choices.len().to_string())
    })
}

/// Render `E2001` and fail when `id` is not a chapter of `book`.
pub fn require_chapter(book: &Book, id: &str, output: OutputMode) -> Result<()> {
    if branchbook_core::chapter_exists(book, id) {
        Ok(())
    } else {
        fail(output, &CliError::coded(ErrorCode::ChapterNotFound, id))
    }
}

fn new_chapter_id(before: &Book, after: &Book) -> Option<String> {
    after
        .chapters
        .keys()
        .find(|id| !before.chapters.contains_key(*id))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chapter_id_finds_the_added_key() {
        let before = Book::new("Diff");
        let after = branchbook_core::apply(&before, &Operation::AddChapter);
        let id = new_chapter_id(&before, &after).expect("one chapter added");
        assert!(after.chapters.contains_key(&id));
        assert_eq!(new_chapter_id(&after, &after), None);
    }

    #[test]
    fn add_flags_only_patch_what_was_given() {
        let args = ChapterAddArgs {
            name: None,
            content: None,
            start: false,
            end: true,
            price: None,
        };
        assert_eq!(
            args.patch(),
            ChapterPatch {
                is_end_chapter: Some(true),
                ..ChapterPatch::default()
            }
        );
    }

    #[test]
    fn row_flags_describe_start_and_end() {
        let mut chapter = Chapter::new("a", "A");
        assert_eq!(ChapterRow::from(&chapter).flags(), "-");
        chapter.is_start_chapter = true;
        assert_eq!(ChapterRow::from(&chapter).flags(), "start");
        chapter.is_end_chapter = true;
        assert_eq!(ChapterRow::from(&chapter).flags(), "start,end");
    }
}
