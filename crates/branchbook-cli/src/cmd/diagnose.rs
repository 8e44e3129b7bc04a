//! `bb diagnose`: structural report over the story graph.
//!
//! Findings are informational and never fail the command. JSON field names
//! follow [`branchbook_route::Diagnostics`].

use std::io::Write;

use anyhow::Result;
use branchbook_route::{Diagnostics, diagnose};

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::store::Workspace;

pub fn run_diagnose(output: OutputMode, ws: &Workspace) -> Result<()> {
    let book = ws.load(output)?;
    let report = diagnose(&book);
    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(r: &Diagnostics, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "chapters={} choices={} endings={} paid_choices={}",
        r.stats.chapter_count, r.stats.choice_count, r.stats.ending_count, r.stats.paid_choice_count
    )?;
    for id in &r.unreachable {
        writeln!(w, "unreachable\t{id}")?;
    }
    for id in &r.dead_ends {
        writeln!(w, "dead_end\t{id}")?;
    }
    for d in &r.dangling_choices {
        writeln!(
            w,
            "dangling\t{}\t{}\t{}",
            d.chapter_id,
            d.choice_id,
            d.target.as_deref().unwrap_or("-")
        )?;
    }
    for id in &r.endings_with_choices {
        writeln!(w, "ending_with_choices\t{id}")?;
    }
    for members in &r.cycles {
        writeln!(w, "cycle\t{}", members.join(","))?;
    }
    for id in &r.reachable_endings {
        writeln!(w, "reachable_ending\t{id}")?;
    }
    Ok(())
}

fn render_pretty(r: &Diagnostics, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Story graph")?;
    pretty_kv(w, "Chapters", r.stats.chapter_count.to_string())?;
    pretty_kv(w, "Choices", r.stats.choice_count.to_string())?;
    pretty_kv(w, "Endings", r.stats.ending_count.to_string())?;
    pretty_kv(w, "Paid", r.stats.paid_choice_count.to_string())?;
    writeln!(w)?;

    if r.is_clean() {
        writeln!(w, "✓ No structural problems found")?;
    }
    list(w, "Unreachable chapters", &r.unreachable)?;
    list(w, "Dead ends", &r.dead_ends)?;
    let dangling: Vec<String> = r
        .dangling_choices
        .iter()
        .map(|d| match &d.target {
            Some(target) => format!("{}/{} → {target} (missing)", d.chapter_id, d.choice_id),
            None => format!("{}/{} (no target)", d.chapter_id, d.choice_id),
        })
        .collect();
    list(w, "Dangling choices", &dangling)?;
    list(w, "Endings with choices", &r.endings_with_choices)?;
    let cycles: Vec<String> = r.cycles.iter().map(|c| c.join(" ⇄ ")).collect();
    list(w, "Loops", &cycles)?;
    list(w, "Reachable endings", &r.reachable_endings)
}

fn list(w: &mut dyn Write, heading: &str, items: &[String]) -> std::io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(w, "{heading} ({}):", items.len())?;
    for item in items {
        writeln!(w, "  {item}")?;
    }
    Ok(())
}
