//! Command-line parsing for the unit converter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! conversion engine and the stores.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "uconv", version, about = "Unit converter with per-user conversion history")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted before or after any subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// SQLite database path (overrides UCONV_DB).
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Conversions a guest may perform per session (overrides UCONV_GUEST_LIMIT).
    #[arg(long, global = true, value_name = "N")]
    pub guest_limit: Option<u32>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every category and its conversions.
    List,
    /// Convert a single value.
    ///
    /// Without credentials this runs as a guest; with `-u/-p` the conversion
    /// is saved to the user's history. Every invocation starts a fresh guest
    /// session, so the guest limit only applies inside the TUI.
    Convert(ConvertArgs),
    /// Create an account.
    Register(CredentialArgs),
    /// Print a user's conversion history.
    History(CredentialArgs),
    /// Export users and history to JSON.
    Export(ExportArgs),
    /// Launch the interactive TUI.
    Tui,
}

#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Category, e.g. "Length".
    #[arg(short = 'c', long)]
    pub category: String,

    /// Conversion, e.g. "Kilometers to Miles".
    #[arg(short = 'd', long)]
    pub direction: String,

    /// Value to convert (finite).
    #[arg(allow_negative_numbers = true, value_parser = parse_finite)]
    pub value: f64,

    /// Log in as this user before converting.
    #[arg(short = 'u', long, requires = "password")]
    pub username: Option<String>,

    #[arg(short = 'p', long, requires = "username")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CredentialArgs {
    #[arg(short = 'u', long)]
    pub username: String,

    #[arg(short = 'p', long)]
    pub password: String,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Output file.
    #[arg(long, short = 'o', default_value = "uconv_export.json")]
    pub out: PathBuf,
}

fn parse_finite(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.trim().parse().map_err(|_| format!("'{raw}' is not a number"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{raw}' is not a finite number"))
    }
}
