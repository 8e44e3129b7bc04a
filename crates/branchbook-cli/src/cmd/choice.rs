//! `bb choice`: add, update, and delete the choices a chapter offers.

use std::io::Write;

use anyhow::Result;
use branchbook_core::edit::ChoicePatch;
use branchbook_core::{Book, Choice, ErrorCode, Operation};
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::warn;

use crate::cmd::chapter::require_chapter;
use crate::output::{CliError, OutputMode, fail, format_price, pretty_kv, render};
use crate::store::Workspace;

#[derive(Subcommand, Debug)]
pub enum ChoiceCommand {
    #[command(
        about = "Add a choice to a chapter",
        after_help = "EXAMPLES:\n    # Free choice\n    bb choice add ch-1a2b --label \"Go left\" --to ch-3c4d\n\n    # Paid choice\n    bb choice add ch-1a2b --label \"Bribe the guard\" --to ch-5e6f --price 21"
    )]
    Add(ChoiceAddArgs),

    #[command(
        about = "Update choice fields",
        after_help = "EXAMPLES:\n    bb choice update ch-1a2b co-9f8e --to ch-7a7a"
    )]
    Update(ChoiceUpdateArgs),

    #[command(about = "Delete a choice", after_help = "EXAMPLES:\n    bb choice delete ch-1a2b co-9f8e")]
    Delete(ChoiceRefArgs),
}

#[derive(Args, Debug)]
pub struct ChoiceFields {
    /// Text shown to the reader.
    #[arg(long)]
    pub label: Option<String>,

    /// Target chapter id.
    #[arg(long = "to", value_name = "CHAPTER")]
    pub target: Option<String>,

    /// Price in satoshis.
    #[arg(long)]
    pub price: Option<u64>,
}

impl ChoiceFields {
    fn patch(&self) -> ChoicePatch {
        ChoicePatch {
            label: self.label.clone(),
            target_chapter_id: self.target.clone(),
            price: self.price,
        }
    }
}

#[derive(Args, Debug)]
pub struct ChoiceAddArgs {
    /// Chapter that offers the choice.
    pub chapter_id: String,

    #[command(flatten)]
    pub fields: ChoiceFields,
}

#[derive(Args, Debug)]
pub struct ChoiceUpdateArgs {
    pub chapter_id: String,
    pub choice_id: String,

    #[command(flatten)]
    pub fields: ChoiceFields,
}

#[derive(Args, Debug)]
pub struct ChoiceRefArgs {
    pub chapter_id: String,
    pub choice_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChoiceOutput<'a> {
    chapter_id: &'a str,
    #[serde(flatten)]
    choice: &'a Choice,
}

pub fn run_choice(command: &ChoiceCommand, output: OutputMode, ws: &Workspace) -> Result<()> {
    match command {
        ChoiceCommand::Add(args) => run_add(args, output, ws),
        ChoiceCommand::Update(args) => run_update(args, output, ws),
        ChoiceCommand::Delete(args) => run_delete(args, output, ws),
    }
}

fn run_add(args: &ChoiceAddArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    let before = ws.load(output)?;
    require_chapter(&before, &args.chapter_id, output)?;
    if before
        .chapter(&args.chapter_id)
        .is_some_and(|c| c.is_end_chapter)
    {
        return fail(
            output,
            &CliError::new(format!("{} is an ending; endings offer no choices", args.chapter_id))
                .with_suggestion(format!(
                    "Run `bb chapter update {} --end false` first",
                    args.chapter_id
                )),
        );
    }
    warn_if_dangling(&before, args.fields.target.as_deref());

    let mut editor = ws.editor();
    let added = editor.apply(
        &before,
        &Operation::AddChoice {
            chapter_id: args.chapter_id.clone(),
        },
    );
    let Some(choice_id) = new_choice_id(&before, &added, &args.chapter_id) else {
        return fail(
            output,
            &CliError::coded(ErrorCode::InternalUnexpected, "no choice was added"),
        );
    };

    let patch = args.fields.patch();
    let after = if patch == ChoicePatch::default() {
        added
    } else {
        editor.apply(
            &added,
            &Operation::UpdateChoice {
                chapter_id: args.chapter_id.clone(),
                choice_id: choice_id.clone(),
                patch,
            },
        )
    };
    ws.save(&after)?;
    show_choice(&after, &args.chapter_id, &choice_id, "Added", output)
}

fn run_update(args: &ChoiceUpdateArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    let book = ws.load(output)?;
    require_choice(&book, &args.chapter_id, &args.choice_id, output)?;

    let patch = args.fields.patch();
    if patch == ChoicePatch::default() {
        return fail(
            output,
            &CliError::new("no fields specified").with_suggestion("Use --label, --to, or --price"),
        );
    }
    warn_if_dangling(&book, patch.target_chapter_id.as_deref());

    let after = ws.editor().apply(
        &book,
        &Operation::UpdateChoice {
            chapter_id: args.chapter_id.clone(),
            choice_id: args.choice_id.clone(),
            patch,
        },
    );
    ws.save(&after)?;
    show_choice(&after, &args.chapter_id, &args.choice_id, "Updated", output)
}

fn run_delete(args: &ChoiceRefArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    let book = ws.load(output)?;
    require_choice(&book, &args.chapter_id, &args.choice_id, output)?;

    let after = ws.editor().apply(
        &book,
        &Operation::DeleteChoice {
            chapter_id: args.chapter_id.clone(),
            choice_id: args.choice_id.clone(),
        },
    );
    ws.save(&after)?;

    let report = serde_json::json!({
        "chapter_id": args.chapter_id,
        "deleted": args.choice_id,
    });
    render(output, &report, |_, w| {
        writeln!(w, "✓ Deleted choice {} from {}", args.choice_id, args.chapter_id)
    })
}

fn show_choice(
    book: &Book,
    chapter_id: &str,
    choice_id: &str,
    verb: &str,
    output: OutputMode,
) -> Result<()> {
    let Some(choice) = book.chapter(chapter_id).and_then(|c| c.choice(choice_id)) else {
        return fail(output, &CliError::coded(ErrorCode::ChoiceNotFound, choice_id));
    };
    let report = ChoiceOutput { chapter_id, choice };
    render(output, &report, |r, w| {
        writeln!(w, "✓ {verb} choice {} on {}", r.choice.id, r.chapter_id)?;
        pretty_kv(w, "Label", &r.choice.label)?;
        pretty_kv(w, "Target", r.choice.target().unwrap_or("(unset)"))?;
        pretty_kv(w, "Price", format_price(r.choice.price))
    })
}

fn require_choice(
    book: &Book,
    chapter_id: &str,
    choice_id: &str,
    output: OutputMode,
) -> Result<()> {
    require_chapter(book, chapter_id, output)?;
    if book
        .chapter(chapter_id)
        .and_then(|c| c.choice(choice_id))
        .is_some()
    {
        Ok(())
    } else {
        fail(
            output,
            &CliError::coded(ErrorCode::ChoiceNotFound, format!("{chapter_id}/{choice_id}")),
        )
    }
}

fn warn_if_dangling(book: &Book, target: Option<&str>) {
    if let Some(target) = target
        && !branchbook_core::chapter_exists(book, target)
    {
        warn!(chapter = target, "choice points at a chapter that does not exist yet");
    }
}

fn new_choice_id(before: &Book, after: &Book, chapter_id: &str) -> Option<String> {
    let old = before.chapter(chapter_id)?;
    after
        .chapter(chapter_id)?
        .choices
        .iter()
        .find(|choice| old.choice(&choice.id).is_none())
        .map(|choice| choice.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchbook_core::Chapter;

    #[test]
    fn new_choice_id_finds_the_appended_choice() {
        let mut before = Book::new("Diff");
        before.chapters.insert("a".into(), Chapter::new("a", "A"));
        let after = branchbook_core::apply(
            &before,
            &Operation::AddChoice {
                chapter_id: "a".into(),
            },
        );
        let id = new_choice_id(&before, &after, "a").expect("one choice added");
        assert!(after.chapter("a").and_then(|c| c.choice(&id)).is_some());
        assert_eq!(new_choice_id(&after, &after, "a"), None);
    }

    #[test]
    fn fields_map_onto_patch() {
        let fields = ChoiceFields {
            label: Some("Go".into()),
            target: Some("b".into()),
            price: Some(3),
        };
        assert_eq!(
            fields.patch(),
            ChoicePatch {
                label: Some("Go".into()),
                target_chapter_id: Some("b".into()),
                price: Some(3),
            }
        );
    }
}
