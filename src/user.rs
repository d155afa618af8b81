//! Login name of the current user.

use std::ffi::CStr;

use nix::unistd::{getuid, User};
use tracing::debug;

/// Name of the user we are running as.
///
/// Prefers `getlogin()` when its passwd entry has our uid, so several login
/// names sharing one uid are told apart while `su`'d sessions still report
/// the effective account. Otherwise falls back to the passwd entry for our
/// uid. `None` if neither resolves.
pub fn get_username() -> Option<String> {
    let uid = getuid();

    if let Some(login) = login_name() {
        match User::from_name(&login) {
            Ok(Some(user)) if user.uid == uid => return Some(login),
            _ => debug!("login name {login} does not match uid {uid}"),
        }
    }

    User::from_uid(uid).ok().flatten().map(|u| u.name)
}

fn login_name() -> Option<String> {
    // SAFETY: getlogin returns NULL or a pointer to a static NUL-terminated
    // buffer. The null case is checked, and the string is copied out before
    // any other libc call can reuse the buffer.
    unsafe {
        let ptr = libc::getlogin();
        if ptr.is_null() {
            return None;
        }
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}
