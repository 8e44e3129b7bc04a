//! `bb publish`: validate and freeze the book into a fingerprinted snapshot.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use branchbook_core::{PublishError, publish};
use clap::Args;
use serde::Serialize;

use crate::output::{CliError, OutputMode, fail, pretty_kv, render};
use crate::store::Workspace;

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Write the snapshot here (default: `<book file stem>.published.json`).
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PublishOutput {
    fingerprint: String,
    snapshot: String,
    chapters: usize,
}

pub fn run_publish(args: &PublishArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    let book = ws.load(output)?;
    let snapshot = match publish(&book) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            let detail = match &err {
                PublishError::Blocked(problems) => problems.join(" "),
                PublishError::Fingerprint(_) | PublishError::Tampered { .. } => err.to_string(),
            };
            return fail(output, &CliError::coded(err.code(), detail));
        }
    };

    let path = args
        .out
        .as_ref()
        .map_or_else(|| ws.book_path.with_extension("published.json"), |p| ws.root.join(p));
    let json = serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")?;
    std::fs::write(&path, json + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let report = PublishOutput {
        fingerprint: snapshot.fingerprint().to_string(),
        snapshot: path.display().to_string(),
        chapters: snapshot.book().chapters.len(),
    };
    render(output, &report, |r, w| {
        writeln!(w, "✓ Published")?;
        pretty_kv(w, "Fingerprint", &r.fingerprint)?;
        pretty_kv(w, "Snapshot", &r.snapshot)?;
        pretty_kv(w, "Chapters", r.chapters.to_string())
    })
}
