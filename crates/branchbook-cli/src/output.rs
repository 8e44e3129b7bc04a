//! How `bb` writes results and failures.
//!
//! Results go to stdout and failures to stderr, in one of three modes:
//! framed sections for a terminal, tab-separated lines for pipes, or
//! pretty-printed JSON. The mode comes from, in order:
//!
//! 1. `--format`
//! 2. `--json`
//! 3. the mode resolved by `branchbook_core::config` (`FORMAT`, then the
//!    user config `output`, then terminal detection)

use branchbook_core::ErrorCode;
use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

/// Width of the rule under pretty section headings.
pub const RULE_WIDTH: usize = 72;

/// Key column width for [`pretty_kv`].
const KEY_WIDTH: usize = 12;

pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    writeln!(w, "{}", "-".repeat(RULE_WIDTH))
}

/// `Key:        value`
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    let key = format!("{key}:");
    writeln!(w, "{key:<KEY_WIDTH$} {}", value.as_ref())
}

/// Satoshi amount for display; `None` and zero read as free.
pub fn format_price(price: Option<u64>) -> String {
    match price {
        Some(sats) if sats > 0 => format!("{sats} sats"),
        _ => "free".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Headed sections for reading in a terminal.
    Pretty,
    /// One record per line, tab-separated.
    Text,
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Map a config-normalized mode name; anything unknown is pretty.
    fn from_resolved(raw: &str) -> Self {
        match raw {
            "json" => Self::Json,
            "text" => Self::Text,
            _ => Self::Pretty,
        }
    }
}

pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    configured: &str,
) -> OutputMode {
    format_flag.unwrap_or_else(|| {
        if json_flag {
            OutputMode::Json
        } else {
            OutputMode::from_resolved(configured)
        }
    })
}

/// A command failure as shown to the user.
///
/// Serialized under an `"error"` key in JSON mode.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    /// What to try next.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Stable `E####` code from [`ErrorCode`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a CliError,
}

impl CliError {
    /// Uncoded error for usage mistakes the code table does not cover.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// `"<code message>: <detail>"`, with the code's hint as suggestion.
    pub fn coded(code: ErrorCode, detail: impl AsRef<str>) -> Self {
        Self {
            message: format!("{}: {}", code.message(), detail.as_ref()),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

fn write_json<W: Write + ?Sized>(out: &mut W, value: &impl Serialize) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Write `value` to stdout: JSON in JSON mode, otherwise via `human`, which
/// also learns whether text or pretty was asked for.
fn emit<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human: impl FnOnce(OutputMode, &T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if mode.is_json() {
        return write_json(&mut out, value);
    }
    human(mode, value, &mut out)?;
    Ok(())
}

/// Render `value`, sharing one human renderer between text and pretty.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    emit(mode, value, |_, v, w| human_fn(v, w))
}

/// Render `value` with separate text and pretty renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    emit(mode, value, |mode, v, w| match mode {
        OutputMode::Text => text_fn(v, w),
        _ => pretty_fn(v, w),
    })
}

pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    write_error(mode, error, &mut io::stderr().lock())
}

fn write_error(mode: OutputMode, error: &CliError, out: &mut dyn Write) -> anyhow::Result<()> {
    if mode.is_json() {
        return write_json(out, &ErrorEnvelope { error });
    }
    writeln!(out, "error: {}", error.message)?;
    if let Some(suggestion) = &error.suggestion {
        writeln!(out, "  suggestion: {suggestion}")?;
    }
    Ok(())
}

/// Render `error`, then fail the command with its message.
pub fn fail(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    render_error(mode, error)?;
    anyhow::bail!("{}", error.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_flag_wins_over_everything() {
        assert_eq!(
            resolve_output_mode(Some(OutputMode::Text), true, "json"),
            OutputMode::Text
        );
    }

    #[test]
    fn json_flag_beats_configured_mode() {
        assert_eq!(resolve_output_mode(None, true, "pretty"), OutputMode::Json);
    }

    #[test]
    fn configured_mode_is_the_fallback() {
        assert_eq!(resolve_output_mode(None, false, "text"), OutputMode::Text);
        assert_eq!(resolve_output_mode(None, false, "json"), OutputMode::Json);
        assert_eq!(resolve_output_mode(None, false, "pretty"), OutputMode::Pretty);
    }

    #[test]
    fn coded_error_carries_code_and_hint() {
        let err = CliError::coded(ErrorCode::ChapterNotFound, "ch-9");
        assert_eq!(err.message, "Chapter not found: ch-9");
        assert_eq!(err.error_code.as_deref(), Some("E2001"));
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn json_error_is_wrapped() {
        let err = CliError::coded(ErrorCode::NoRoute, "no ending");
        let mut buf = Vec::new();
        write_error(OutputMode::Json, &err, &mut buf).expect("write");
        let value: serde_json::Value = serde_json::from_slice(&buf).expect("valid json");
        assert_eq!(value["error"]["error_code"], "E3002");
    }

    #[test]
    fn human_error_shows_suggestion() {
        let err = CliError::new("boom").with_suggestion("try again");
        let mut buf = Vec::new();
        write_error(OutputMode::Pretty, &err, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "error: boom\n  suggestion: try again\n");
    }

    #[test]
    fn kv_pads_the_key_column() {
        let mut buf = Vec::new();
        pretty_kv(&mut buf, "Cost", "3 sats").expect("write");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "Cost:        3 sats\n");
    }

    #[test]
    fn prices_read_as_free_when_absent_or_zero() {
        assert_eq!(format_price(None), "free");
        assert_eq!(format_price(Some(0)), "free");
        assert_eq!(format_price(Some(21)), "21 sats");
    }
}
