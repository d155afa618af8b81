#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

//! termplat library: Unix platform helpers for terminal and SSH clients.
//!
//! - `expand` — `$NAME`, `${NAME}` and `~` expansion of path templates
//! - `dirs` — chained mkdir, owner-only directories, parent-of-file creation
//! - `filename` / `fontspec` — persisted handles with NUL-terminated codecs
//! - `fd` — close-on-exec and non-blocking toggles
//! - `ticks` — monotonic millisecond counter
//! - `user` — login name lookup
//! - `debuglog` — caller-owned debug log sink
//! - `config` — TOML + env-var configuration

mod codec;

pub mod config;
pub mod debuglog;
pub mod dirs;
pub mod error;
pub mod expand;
pub mod fd;
pub mod filename;
pub mod fontspec;
pub mod ticks;
pub mod user;

// Re-export key types at crate root for convenience.
pub use config::Config;
pub use dirs::{make_dir_and_check_ours, make_dir_path, mkdir_parent, DirOutcome};
pub use error::PlatError;
pub use expand::{expand, expand_with, EnvLookup, ProcessEnv};
pub use filename::{Filename, OpenMode};
pub use fontspec::FontSpec;
