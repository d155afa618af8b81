#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # termplat
//!
//! Command-line front end for the termplat platform helpers.
//!
//! ## Subcommands
//!
//! - `termplat expand <TEMPLATE>` — expand `$VAR`, `${VAR}` and `~`
//! - `termplat mkdir-path <PATH> [--mode OCTAL]` — create a directory chain
//! - `termplat secure-dir [DIR]` — create/verify an owner-only directory
//! - `termplat prepare-log [FILE]` — create the parent directory of a log file
//! - `termplat migrate <PATH>` — escape a pre-expansion filename
//! - `termplat whoami` — current login name
//! - `termplat ticks` — monotonic millisecond counter
//!
//! Every subcommand accepts `--config <path>` and `--json`.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::{error, info};

use termplat::config::Config;
use termplat::debuglog::DebugLog;
use termplat::{dirs, expand, ticks, user, Filename, PlatError};

/// Unix platform helpers for terminal and SSH clients.
#[derive(Parser)]
#[command(name = "termplat", version)]
struct Cli {
    /// Path to TOML config file.
    #[arg(long, global = true)]
    config: Option<String>,
    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand `$VAR`, `${VAR}` and `~` against the environment.
    Expand { template: String },
    /// Create every directory along PATH.
    MkdirPath {
        path: String,
        /// Octal mode (default: `paths.dir_mode` from config).
        #[arg(long)]
        mode: Option<String>,
    },
    /// Create an owner-only directory and verify it belongs to us.
    SecureDir {
        /// Directory template (default: `paths.secure_dir`).
        dir: Option<String>,
    },
    /// Create the parent directory of a log file if it is missing.
    PrepareLog {
        /// File template (default: `session.log_file`).
        file: Option<String>,
    },
    /// Escape `$` and `~` in a filename saved before expansion existed.
    Migrate { path: String },
    /// Print the current login name.
    Whoami,
    /// Print the monotonic tick counter (milliseconds).
    Ticks,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("termplat: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut debug_log = match config.logging.debug_log_path() {
        Some(path) => match DebugLog::open(&path, false) {
            Ok(log) => Some(log),
            Err(e) => {
                error!("debug log disabled: {e}");
                None
            }
        },
        None => None,
    };

    let result = run(&cli.command, &config);

    if let Some(log) = debug_log.as_mut() {
        let line = match &result {
            Ok(v) => format!("{v}\n"),
            Err(e) => format!("error: {e}\n"),
        };
        log.dputs(&line);
    }

    match result {
        Ok(value) => {
            if cli.json {
                println!("{value}");
            } else {
                print_plain(&value);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if cli.json {
                println!("{}", json!({ "error": e.to_string() }));
            } else {
                eprintln!("termplat: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Commands, config: &Config) -> Result<Value, PlatError> {
    match command {
        Commands::Expand { template } => Ok(json!({ "expanded": expand(template.clone()) })),
        Commands::MkdirPath { path, mode } => {
            let mode = match mode {
                Some(m) => parse_mode(m)?,
                None => config.paths.dir_mode_bits(),
            };
            let path = expand(path.clone());
            dirs::make_dir_path(&path, mode)?;
            info!("created {path} (mode {mode:o})");
            Ok(json!({ "path": path, "mode": format!("{mode:o}") }))
        }
        Commands::SecureDir { dir } => {
            let dir = match dir {
                Some(d) => Filename::new(d.as_str()).expand(),
                None => config.paths.secure_dir_path(),
            };
            dirs::make_dir_and_check_ours(dir.as_str())?;
            Ok(json!({ "path": dir.as_str(), "secure": true }))
        }
        Commands::PrepareLog { file } => {
            let file = match file {
                Some(f) => Filename::new(f.as_str()).expand(),
                None => config.session.log_file_path(),
            };
            let outcome = dirs::mkdir_parent(file.as_str())?;
            Ok(json!({ "file": file.as_str(), "outcome": outcome }))
        }
        Commands::Migrate { path } => {
            let migrated = Filename::new(path.as_str()).escape_expansions();
            Ok(json!({ "migrated": migrated.as_str() }))
        }
        Commands::Whoami => Ok(json!({ "user": user::get_username() })),
        Commands::Ticks => Ok(json!({ "ticks": ticks::get_ticks() })),
    }
}

fn parse_mode(mode: &str) -> Result<u32, PlatError> {
    u32::from_str_radix(mode.trim_start_matches("0o"), 8)
        .ok()
        .filter(|m| *m <= 0o7777)
        .ok_or_else(|| PlatError::OperationFailed {
            path: mode.to_string(),
            op: "parse mode".into(),
            reason: "expected an octal permission mode".into(),
        })
}

/// Print the single interesting field of a result without JSON decoration.
fn print_plain(value: &Value) {
    let Some(obj) = value.as_object() else {
        println!("{value}");
        return;
    };
    for key in ["expanded", "migrated", "user", "ticks", "outcome", "path"] {
        match obj.get(key) {
            Some(Value::String(s)) => {
                println!("{s}");
                return;
            }
            Some(Value::Null) => {
                println!("(unknown)");
                return;
            }
            Some(other) => {
                println!("{other}");
                return;
            }
            None => {}
        }
    }
    println!("{value}");
}
