//! `bb read`: line-driven reader over stdin.
//!
//! Each prompt accepts a choice number, a choice id, a choice label, or one
//! of `back`, `history`, `quit`. End of input quits. In JSON mode the
//! transcript is suppressed and only the session summary is printed, which
//! makes the command scriptable:
//!
//! ```text
//! printf '1\n2\nquit\n' | bb read --json
//! ```

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use branchbook_core::{
    Book, ErrorCode, NavState, NavigateError, Navigator, PublishError, PublishedBook,
};
use clap::Args;
use serde::Serialize;

use crate::output::{CliError, OutputMode, fail, format_price, render};
use crate::store::Workspace;

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Read a snapshot written by `bb publish` instead of the working file.
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Begin at this chapter instead of the start chapter.
    #[arg(long, value_name = "CHAPTER")]
    pub from: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReadSummary {
    title: String,
    history: Vec<String>,
    current_chapter_id: Option<String>,
    reached_end: bool,
}

/// One parsed prompt line.
#[derive(Debug, PartialEq, Eq)]
enum ReaderInput<'a> {
    Empty,
    Quit,
    Back,
    History,
    Pick(usize),
    Key(&'a str),
}

fn parse_input(line: &str) -> ReaderInput<'_> {
    let line = line.trim();
    match line {
        "" => ReaderInput::Empty,
        "q" | "quit" | "exit" => ReaderInput::Quit,
        "b" | "back" => ReaderInput::Back,
        "h" | "history" => ReaderInput::History,
        _ => match line.parse::<usize>() {
            Ok(n) if n > 0 => ReaderInput::Pick(n),
            _ => ReaderInput::Key(line),
        },
    }
}

pub fn run_read(args: &ReadArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    let book = match &args.snapshot {
        Some(path) => load_snapshot(&ws.root.join(path), output)?,
        None => ws.load(output)?,
    };

    let mut nav = Navigator::new(&book);
    let entered = match &args.from {
        Some(id) => nav.enter(id).map(|_| ()),
        None => nav.start().map(|_| ()),
    };
    if let Err(err) = entered {
        return fail(output, &navigate_error(&err));
    }

    let show_prices = ws.config.project.reader.show_prices;
    let stdin = io::stdin();
    if output.is_json() {
        run_session(&mut nav, stdin.lock(), &mut io::sink(), show_prices)?;
    } else {
        let stdout = io::stdout();
        run_session(&mut nav, stdin.lock(), &mut stdout.lock(), show_prices)?;
    }

    let summary = ReadSummary {
        title: nav.book_title().to_string(),
        history: nav.history().to_vec(),
        current_chapter_id: nav.current_chapter().map(|c| c.id.clone()),
        reached_end: nav.state() == NavState::AtEnd,
    };
    render(output, &summary, |s, w| {
        writeln!(w, "Visited {} chapter(s).", s.history.len())
    })
}

/// Drive `nav` from `input` until quit or end of input.
fn run_session(
    nav: &mut Navigator,
    mut input: impl BufRead,
    out: &mut dyn Write,
    show_prices: bool,
) -> Result<()> {
    show_current(nav, out, show_prices)?;
    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(());
        }

        match parse_input(&line) {
            ReaderInput::Empty => {}
            ReaderInput::Quit => return Ok(()),
            ReaderInput::Back => {
                if nav.go_back() {
                    show_current(nav, out, show_prices)?;
                } else {
                    writeln!(out, "(no previous chapter)")?;
                }
            }
            ReaderInput::History => {
                writeln!(out, "{}", nav.history().join(" → "))?;
            }
            ReaderInput::Pick(n) => {
                let Some(id) = nav.available_choices().get(n - 1).map(|c| c.id.clone()) else {
                    writeln!(out, "(no choice {n})")?;
                    continue;
                };
                follow(nav, &id, out, show_prices)?;
            }
            ReaderInput::Key(key) => follow(nav, key, out, show_prices)?,
        }
    }
}

fn follow(nav: &mut Navigator, key: &str, out: &mut dyn Write, show_prices: bool) -> Result<()> {
    match nav.follow_choice(key) {
        Ok(_) => show_current(nav, out, show_prices),
        Err(err) => {
            writeln!(out, "({err})")?;
            Ok(())
        }
    }
}

fn show_current(nav: &Navigator, out: &mut dyn Write, show_prices: bool) -> Result<()> {
    let Some(chapter) = nav.current_chapter() else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "== {} ==", chapter.name)?;
    if !chapter.content.is_empty() {
        writeln!(out, "{}", chapter.content)?;
    }
    writeln!(out)?;

    if nav.state() == NavState::AtEnd {
        writeln!(out, "-- The End --")?;
    } else if nav.available_choices().is_empty() {
        writeln!(out, "(this chapter offers no choices)")?;
    }
    for (n, choice) in nav.available_choices().iter().enumerate() {
        if show_prices && choice.is_paid() {
            writeln!(out, "  {}. {} [{}]", n + 1, choice.label, format_price(choice.price))?;
        } else {
            writeln!(out, "  {}. {}", n + 1, choice.label)?;
        }
    }
    if nav.can_go_back() {
        writeln!(out, "  (back)")?;
    }
    Ok(())
}

fn navigate_error(err: &NavigateError) -> CliError {
    let detail = match err {
        NavigateError::ChapterNotFound(id) | NavigateError::ChoiceNotFound(id) => id,
    };
    CliError::coded(err.code(), detail)
}

/// Read a snapshot written by `bb publish` and verify it before reading.
fn load_snapshot(path: &Path, output: OutputMode) -> Result<Book> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot: PublishedBook = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

    if let Err(err) = snapshot.verify() {
        let detail = match &err {
            PublishError::Blocked(problems) => problems.join(" "),
            PublishError::Fingerprint(_) | PublishError::Tampered { .. } => err.to_string(),
        };
        let cli_err = CliError::coded(
            ErrorCode::SnapshotTampered,
            format!("{}: {detail}", path.display()),
        );
        fail(output, &cli_err)?;
    }
    Ok(snapshot.book().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchbook_core::{Chapter, Choice};
    use std::io::Cursor;

    /// `a` → (`left` free | `right` 5 sats) → `z` (end).
    fn fork() -> Book {
        let mut book = Book::new("Fork");
        let mut a = Chapter::new("a", "Crossroads");
        a.is_start_chapter = true;
        a.choices.push(Choice::new("left", "Go left").to("b"));
        a.choices.push(Choice::new("right", "Go right").to("z").priced(5));
        let mut b = Chapter::new("b", "Woods");
        b.previous_chapter_id = Some("a".into());
        b.choices.push(Choice::new("on", "Keep walking").to("z"));
        let mut z = Chapter::new("z", "Home");
        z.is_end_chapter = true;
        for chapter in [a, b, z] {
            book.chapters.insert(chapter.id.clone(), chapter);
        }
        book.start_chapter_id = Some("a".into());
        book
    }

    fn session(script: &str, show_prices: bool) -> (Navigator, String) {
        let mut nav = Navigator::new(&fork());
        nav.start().expect("start exists");
        let mut out = Vec::new();
        run_session(&mut nav, Cursor::new(script), &mut out, show_prices).expect("session");
        (nav, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn parses_commands_and_picks() {
        assert_eq!(parse_input("  \n"), ReaderInput::Empty);
        assert_eq!(parse_input("quit\n"), ReaderInput::Quit);
        assert_eq!(parse_input("b"), ReaderInput::Back);
        assert_eq!(parse_input("history"), ReaderInput::History);
        assert_eq!(parse_input("2"), ReaderInput::Pick(2));
        assert_eq!(parse_input("0"), ReaderInput::Key("0"));
        assert_eq!(parse_input("Go left\n"), ReaderInput::Key("Go left"));
    }

    #[test]
    fn number_id_and_label_all_follow() {
        let (nav, _) = session("1\nback\nright\n", true);
        assert_eq!(nav.history(), ["a", "b", "a", "z"]);
        assert_eq!(nav.state(), NavState::AtEnd);

        let (nav, _) = session("Go left\nKeep walking\n", true);
        assert_eq!(nav.history(), ["a", "b", "z"]);
    }

    #[test]
    fn unknown_input_keeps_the_cursor() {
        let (nav, out) = session("sideways\n9\nquit\n1\n", true);
        assert_eq!(nav.history(), ["a"]);
        assert!(out.contains("(choice not found: sideways)"));
        assert!(out.contains("(no choice 9)"));
    }

    #[test]
    fn back_without_predecessor_is_reported() {
        let (nav, out) = session("back\n", true);
        assert_eq!(nav.history(), ["a"]);
        assert!(out.contains("(no previous chapter)"));
    }

    #[test]
    fn prices_follow_reader_config() {
        let (_, shown) = session("", true);
        assert!(shown.contains("2. Go right [5 sats]"));
        let (_, hidden) = session("", false);
        assert!(hidden.contains("2. Go right\n"));
    }

    #[test]
    fn ending_is_announced() {
        let (_, out) = session("right\n", true);
        assert!(out.contains("-- The End --"));
    }
}
