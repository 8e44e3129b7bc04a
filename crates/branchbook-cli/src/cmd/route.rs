//! `bb route`: cheapest payable route from a chapter to any ending.

use std::io::Write;

use anyhow::Result;
use branchbook_core::ErrorCode;
use branchbook_route::cheapest_path;
use clap::Args;

use crate::output::{CliError, OutputMode, fail, pretty_kv, render};
use crate::store::Workspace;

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Chapter to start from (default: the book's start chapter).
    #[arg(long, value_name = "CHAPTER")]
    pub from: Option<String>,
}

pub fn run_route(args: &RouteArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    let book = ws.load(output)?;
    let start = args.from.as_deref().or(book.start_chapter_id.as_deref());

    let Some(route) = cheapest_path(&book, start) else {
        let detail = match start {
            Some(id) if !branchbook_core::chapter_exists(&book, id) => {
                return fail(output, &CliError::coded(ErrorCode::ChapterNotFound, id));
            }
            Some(id) => format!("no ending can be reached from {id}"),
            None => "the book has no start chapter".to_string(),
        };
        return fail(output, &CliError::coded(ErrorCode::NoRoute, detail));
    };

    render(output, &route, |r, w| {
        pretty_kv(w, "Cost", format!("{} sats", r.cost))?;
        pretty_kv(w, "Chapters", r.path.join(" → "))?;
        if !r.choices.is_empty() {
            pretty_kv(w, "Choices", r.choices.join(", "))?;
        }
        Ok(())
    })
}
