//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads configuration and starts logging
//! - opens the database
//! - dispatches to a subcommand or the TUI

use clap::Parser;
use tracing::info;

use crate::cli::{Command, ConvertArgs, CredentialArgs, ExportArgs};
use crate::config::AppConfig;
use crate::convert::ConversionTable;
use crate::domain::{ConversionOutcome, ConversionRequest, SessionState};
use crate::error::AppError;
use crate::gate::Gate;
use crate::logging::{LogTarget, init_tracing};
use crate::store::SqliteStore;

pub mod pipeline;

use pipeline::ConversionService;

/// Entry point for the `uconv` binary.
pub fn run() -> Result<(), AppError> {
    // `uconv` and `uconv --db x.db` behave like `uconv tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let config = AppConfig::from_env()?.with_overrides(&cli.global);
    let target = match cli.command {
        Command::Tui => LogTarget::File(config.log_file.clone()),
        _ => LogTarget::Stderr,
    };
    init_tracing(&config.log_filter, target)?;

    if let Command::List = cli.command {
        print!("{}", crate::report::format_catalog(&ConversionTable::standard()));
        return Ok(());
    }

    let service = open_service(&config)?;
    match cli.command {
        Command::List => Ok(()),
        Command::Convert(args) => handle_convert(&service, args),
        Command::Register(args) => handle_register(&service, args),
        Command::History(args) => handle_history(&service, args),
        Command::Export(args) => handle_export(&service, args),
        Command::Tui => crate::tui::run(service),
    }
}

/// Open the store named by `config` and wrap it with a gate.
pub fn open_service(config: &AppConfig) -> Result<ConversionService<SqliteStore>, AppError> {
    let store = SqliteStore::open(&config.db_path)?;
    let gate = Gate::new(ConversionTable::standard(), config.guest_limit);
    info!(db = %config.db_path.display(), guest_limit = config.guest_limit, "service ready");
    Ok(ConversionService::new(gate, store))
}

fn handle_convert(service: &ConversionService<SqliteStore>, args: ConvertArgs) -> Result<(), AppError> {
    let mut session = SessionState::new();
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        session = service.login(session, username, password)?;
    }

    let request = ConversionRequest::new(args.category, args.direction, args.value);
    let (_, outcome) = service.convert(session, &request);

    match outcome {
        ConversionOutcome::Allowed(_) => {
            println!("{}", crate::report::format_outcome(&request, &outcome));
            Ok(())
        }
        ConversionOutcome::Rejected(reason) => Err(reason.into()),
    }
}

fn handle_register(service: &ConversionService<SqliteStore>, args: CredentialArgs) -> Result<(), AppError> {
    service.register(&args.username, &args.password)?;
    println!("Account created for '{}'. Log in to start saving conversions.", args.username.trim());
    Ok(())
}

fn handle_history(service: &ConversionService<SqliteStore>, args: CredentialArgs) -> Result<(), AppError> {
    let session = service.login(SessionState::new(), &args.username, &args.password)?;
    let records = service.history(&session)?;
    println!("{}", crate::report::format_history(&records));
    Ok(())
}

fn handle_export(service: &ConversionService<SqliteStore>, args: ExportArgs) -> Result<(), AppError> {
    let bundle = crate::store::export_json(service.store(), &args.out)?;
    println!(
        "Exported {} user(s) and {} history row(s) to {}",
        bundle.users.len(),
        bundle.history.len(),
        args.out.display()
    );
    Ok(())
}

/// Rewrite argv so `uconv` defaults to `uconv tui`.
///
/// Rules:
/// - `uconv`                      -> `uconv tui`
/// - `uconv --db x.db ...`        -> `uconv tui --db x.db ...`
/// - `uconv --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}
