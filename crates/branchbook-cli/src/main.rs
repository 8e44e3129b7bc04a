#![forbid(unsafe_code)]

mod cmd;
mod output;
mod store;

use branchbook_core::ErrorCode;
use clap::{Parser, Subcommand};
use output::{CliError, OutputMode};
use std::env;
use std::path::PathBuf;
use store::Workspace;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "branchbook: author and read branching, pay-per-choice stories",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json and FORMAT).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Book file to work on (default: `[authoring] book_file` from config).
    #[arg(long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Authoring",
        about = "Create a new book",
        long_about = "Create a book file with one start chapter and a default project config.",
        after_help = "EXAMPLES:\n    # Start a book in the current directory\n    bb init --title \"The Lighthouse\"\n\n    # Use a different file\n    bb init --title \"Draft\" --file drafts/draft.json"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Authoring",
        about = "Show or change book metadata",
        after_help = "EXAMPLES:\n    # Show metadata\n    bb meta\n\n    # Set the payment address for paid content\n    bb meta --payment-address author@getalby.com"
    )]
    Meta(cmd::meta::MetaArgs),

    #[command(next_help_heading = "Authoring", about = "Manage chapters")]
    Chapter {
        #[command(subcommand)]
        command: cmd::chapter::ChapterCommand,
    },

    #[command(next_help_heading = "Authoring", about = "Manage choices")]
    Choice {
        #[command(subcommand)]
        command: cmd::choice::ChoiceCommand,
    },

    #[command(
        next_help_heading = "Checks",
        about = "Check whether the book can be published",
        after_help = "EXAMPLES:\n    bb validate\n    bb validate --json"
    )]
    Validate,

    #[command(
        next_help_heading = "Checks",
        about = "Cheapest route to any ending",
        long_about = "Find the cheapest payable route from the start chapter (or --from) to any ending.",
        after_help = "EXAMPLES:\n    bb route\n    bb route --from ch-1a2b --json"
    )]
    Route(cmd::route::RouteArgs),

    #[command(
        next_help_heading = "Checks",
        about = "Report structural problems",
        long_about = "Report unreachable chapters, dead ends, dangling choices, loops, and reachable endings.",
        after_help = "EXAMPLES:\n    bb diagnose\n    bb diagnose --format text"
    )]
    Diagnose,

    #[command(
        next_help_heading = "Readers",
        about = "Validate and write a fingerprinted snapshot",
        after_help = "EXAMPLES:\n    bb publish\n    bb publish --out dist/lighthouse.json"
    )]
    Publish(cmd::publish::PublishArgs),

    #[command(
        next_help_heading = "Readers",
        about = "Read the book interactively",
        after_help = "EXAMPLES:\n    # Read the working file\n    bb read\n\n    # Read a published snapshot\n    bb read --snapshot book.published.json\n\n    # Scripted run\n    printf '1\\n2\\nquit\\n' | bb read --json"
    )]
    Read(cmd::read::ReadArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BRANCHBOOK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "branchbook=debug,info"
        } else {
            "branchbook=info,warn"
        })
    });

    let format = env::var("BRANCHBOOK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = std::env::current_dir()?;
    let ws = match Workspace::open(&project_root, cli.file.as_deref(), cli.json) {
        Ok(ws) => ws,
        Err(err) => {
            let mode = output::resolve_output_mode(cli.format, cli.json, "text");
            let cli_err = CliError::coded(ErrorCode::ConfigParseError, format!("{err:#}"));
            return output::fail(mode, &cli_err);
        }
    };
    let output = output::resolve_output_mode(cli.format, cli.json, &ws.config.resolved_output);

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, &ws),
        Commands::Meta(args) => cmd::meta::run_meta(args, output, &ws),
        Commands::Chapter { command } => cmd::chapter::run_chapter(command, output, &ws),
        Commands::Choice { command } => cmd::choice::run_choice(command, output, &ws),
        Commands::Validate => cmd::validate::run_validate(output, &ws),
        Commands::Route(args) => cmd::route::run_route(args, output, &ws),
        Commands::Diagnose => cmd::diagnose::run_diagnose(output, &ws),
        Commands::Publish(args) => cmd::publish::run_publish(args, output, &ws),
        Commands::Read(args) => cmd::read::run_read(args, output, &ws),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["bb", "--json", "validate"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Validate));
    }

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["bb", "route", "--json", "--from", "ch-1"]);
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Route(cmd::route::RouteArgs { from: Some(ref id) }) if id == "ch-1"
        ));
    }

    #[test]
    fn format_flag_takes_a_mode() {
        let cli = Cli::parse_from(["bb", "diagnose", "--format", "text"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn file_flag_is_global() {
        let cli = Cli::parse_from(["bb", "chapter", "list", "--file", "story.json"]);
        assert_eq!(cli.file.as_deref(), Some(std::path::Path::new("story.json")));
    }

    #[test]
    fn chapter_update_accepts_explicit_bools() {
        let cli = Cli::parse_from(["bb", "chapter", "update", "ch-1", "--end", "false"]);
        let Commands::Chapter {
            command: cmd::chapter::ChapterCommand::Update(args),
        } = cli.command
        else {
            panic!("expected chapter update");
        };
        assert_eq!(args.end, Some(false));
        assert_eq!(args.start, None);
    }

    #[test]
    fn choice_add_reads_target_from_to() {
        let cli = Cli::parse_from([
            "bb", "choice", "add", "ch-1", "--label", "Go", "--to", "ch-2", "--price", "21",
        ]);
        let Commands::Choice {
            command: cmd::choice::ChoiceCommand::Add(args),
        } = cli.command
        else {
            panic!("expected choice add");
        };
        assert_eq!(args.chapter_id, "ch-1");
        assert_eq!(args.fields.target.as_deref(), Some("ch-2"));
        assert_eq!(args.fields.price, Some(21));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["bb", "init", "--title", "x"],
            vec!["bb", "meta", "--title", "x"],
            vec!["bb", "chapter", "add"],
            vec!["bb", "chapter", "update", "ch-1", "--name", "n"],
            vec!["bb", "chapter", "delete", "ch-1"],
            vec!["bb", "chapter", "list"],
            vec!["bb", "choice", "add", "ch-1"],
            vec!["bb", "choice", "update", "ch-1", "co-1", "--label", "l"],
            vec!["bb", "choice", "delete", "ch-1", "co-1"],
            vec!["bb", "validate"],
            vec!["bb", "route"],
            vec!["bb", "diagnose"],
            vec!["bb", "publish"],
            vec!["bb", "read"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "Failed to parse: {:?}: error: {:?}",
                args,
                result.err()
            );
        }
    }
}
