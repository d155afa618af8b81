//! Directory creation: whole-chain mkdir, owner-only directories, and the
//! parent directory of a file about to be written.
//!
//! All calls block and hold no state between invocations.

use nix::errno::Errno;
use nix::sys::stat::{self, Mode};
use nix::unistd::{self, AccessFlags, Uid};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PlatError;

/// Mode used by [`make_dir_and_check_ours`].
pub const OWNER_ONLY_MODE: u32 = 0o700;

/// Mode used by [`mkdir_parent`]; the process umask still applies.
pub const DEFAULT_DIR_MODE: u32 = 0o777;

/// Whether [`mkdir_parent`] had to create anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirOutcome {
    /// No parent component, or it already existed.
    NothingToDo,
    /// The parent chain was created.
    Created,
}

/// `mkdir` that treats `EEXIST` as success.
fn mkdir_tolerant(path: &str, mode: u32) -> Result<(), PlatError> {
    #[allow(clippy::cast_possible_truncation, clippy::unnecessary_cast)]
    let mode = Mode::from_bits_truncate(mode as libc::mode_t);
    match unistd::mkdir(path, mode) {
        Ok(()) => {
            debug!("mkdir {path}: created");
            Ok(())
        }
        Err(Errno::EEXIST) => {
            debug!("mkdir {path}: already exists");
            Ok(())
        }
        Err(e) => Err(PlatError::os(path, "mkdir", e)),
    }
}

/// Create every directory along `path` with `mode`.
///
/// Each prefix ending before a run of `/` is created in turn, then the full
/// path. Components that already exist are skipped, so calling this twice is
/// harmless. The first other failure stops the walk and names the component.
pub fn make_dir_path(path: &str, mode: u32) -> Result<(), PlatError> {
    let bytes = path.as_bytes();
    let mut pos = 0;
    loop {
        pos += bytes[pos..]
            .iter()
            .position(|&b| b == b'/')
            .unwrap_or(bytes.len() - pos);

        if pos > 0 {
            mkdir_tolerant(&path[..pos], mode)?;
        }

        if pos == bytes.len() {
            return Ok(());
        }
        pos += bytes[pos..].iter().take_while(|&&b| b == b'/').count();
    }
}

/// Create `dirname` as owner-only and verify it really is ours.
///
/// The ownership and permission checks run even when the directory already
/// existed.
///
/// Another process can still swap the directory between the `mkdir` and the
/// `stat`. This function does not close that window.
pub fn make_dir_and_check_ours(dirname: &str) -> Result<(), PlatError> {
    make_dir_and_check_owner(dirname, unistd::getuid())
}

fn make_dir_and_check_owner(dirname: &str, expected: Uid) -> Result<(), PlatError> {
    mkdir_tolerant(dirname, OWNER_ONLY_MODE)?;

    let st = stat::stat(dirname).map_err(|e| PlatError::os(dirname, "stat", e))?;
    #[allow(clippy::useless_conversion)]
    let mode = u32::from(st.st_mode);
    check_ownership(dirname, st.st_uid, mode, expected.as_raw()).inspect_err(|e| {
        warn!("refusing directory: {e}");
    })
}

/// Owner must be `uid` and no group/other bits may be set.
fn check_ownership(path: &str, owner: u32, mode: u32, uid: u32) -> Result<(), PlatError> {
    if owner != uid {
        return Err(PlatError::security(
            path,
            format!("directory owned by uid {owner}, not by us"),
        ));
    }
    if mode & 0o077 != 0 {
        return Err(PlatError::security(
            path,
            format!(
                "directory has overgenerous permissions {:03o} (expected 700)",
                mode & 0o777
            ),
        ));
    }
    Ok(())
}

/// Make sure the directory that will hold `file_path` exists.
///
/// The parent is everything before the last `/`. Returns
/// [`DirOutcome::NothingToDo`] when there is no parent component or it is
/// already present, without touching the filesystem further. Otherwise the
/// chain is created with [`DEFAULT_DIR_MODE`].
pub fn mkdir_parent(file_path: &str) -> Result<DirOutcome, PlatError> {
    let Some(slash) = file_path.rfind('/') else {
        return Ok(DirOutcome::NothingToDo);
    };
    let parent = &file_path[..slash];
    if parent.is_empty() || unistd::access(parent, AccessFlags::F_OK).is_ok() {
        return Ok(DirOutcome::NothingToDo);
    }

    make_dir_path(parent, DEFAULT_DIR_MODE)?;
    Ok(DirOutcome::Created)
}
