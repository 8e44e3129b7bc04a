//! Layered TOML configuration: project file, user file, and the output
//! mode they settle on together with `FORMAT`.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Project-level settings from `.branchbook/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub authoring: AuthoringConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthoringConfig {
    /// New chapters are named `"<prefix> <n>"`.
    #[serde(default = "default_chapter_name_prefix")]
    pub chapter_name_prefix: String,
    /// Working file used when `--file` is not given, relative to the project root.
    #[serde(default = "default_book_file")]
    pub book_file: PathBuf,
}

impl Default for AuthoringConfig {
    fn default() -> Self {
        Self {
            chapter_name_prefix: default_chapter_name_prefix(),
            book_file: default_book_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default = "default_true")]
    pub show_prices: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            show_prices: default_true(),
        }
    }
}

/// Per-user settings from `<config_dir>/branchbook/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// Read `.branchbook/config.toml` under `project_root`; defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    read_toml_or_default(&project_root.join(".branchbook/config.toml"))
}

/// Read `<config_dir>/branchbook/config.toml`; defaults when absent or when
/// the platform has no config directory.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    dirs::config_dir().map_or_else(
        || Ok(UserConfig::default()),
        |dir| read_toml_or_default(&dir.join("branchbook/config.toml")),
    )
}

fn read_toml_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load both config layers and settle the output mode.
///
/// # Errors
///
/// Returns an error if either config file is malformed.
pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let resolved_output = resolve_output(
        cli_json,
        user.output.as_deref(),
        env::var("FORMAT").ok().as_deref(),
        std::io::stdout().is_terminal(),
    );

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

/// Precedence: `--json`, then `FORMAT`, then the user config, then TTY detection.
fn resolve_output(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
    is_tty: bool,
) -> String {
    fn normalize(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    env_format
        .and_then(normalize)
        .or_else(|| user_output.and_then(normalize))
        .unwrap_or(if is_tty { "pretty" } else { "text" })
        .to_string()
}

const fn default_true() -> bool {
    true
}

fn default_chapter_name_prefix() -> String {
    "Chapter".to_string()
}

fn default_book_file() -> PathBuf {
    PathBuf::from("book.json")
}
