//! `bb validate`: run the publish checks without publishing.
//!
//! Exits non-zero when any check fails, so it can gate scripts and hooks.

use std::io::Write;

use anyhow::Result;
use branchbook_core::{ErrorCode, validate_for_publish};
use serde::Serialize;

use crate::output::{OutputMode, render};
use crate::store::Workspace;

#[derive(Debug, Serialize)]
struct ValidateOutput {
    ok: bool,
    problems: Vec<String>,
}

pub fn run_validate(output: OutputMode, ws: &Workspace) -> Result<()> {
    let book = ws.load(output)?;
    let problems = validate_for_publish(&book);
    let report = ValidateOutput {
        ok: problems.is_empty(),
        problems,
    };

    render(output, &report, |r, w| {
        if r.ok {
            return writeln!(w, "✓ Ready to publish");
        }
        writeln!(w, "✗ {} problem(s):", r.problems.len())?;
        for problem in &r.problems {
            writeln!(w, "  - {problem}")?;
        }
        Ok(())
    })?;

    if report.ok {
        Ok(())
    } else {
        let code = ErrorCode::PublishBlocked;
        anyhow::bail!("{}: {}", code.code(), code.message())
    }
}
