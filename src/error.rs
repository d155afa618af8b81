//! Error type shared by the filesystem and fd helpers.
//!
//! Messages are meant for display and logging. Callers should not match on
//! `reason` text programmatically.

use nix::errno::Errno;
use thiserror::Error;

/// Failure from one of the platform helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatError {
    /// An OS call failed for a reason other than "already exists".
    ///
    /// `path` names the failing component (or fd number for fcntl), `op` the
    /// call that failed, and `reason` the OS's own error text.
    #[error("{path}: {op}: {reason}")]
    OperationFailed {
        path: String,
        op: String,
        reason: String,
    },
    /// The directory exists but is not owned by us or is accessible to others.
    #[error("{path}: {reason}")]
    SecurityCheckFailed { path: String, reason: String },
}

impl PlatError {
    /// Build an [`PlatError::OperationFailed`] from a raw errno.
    pub fn os(path: impl Into<String>, op: impl Into<String>, errno: Errno) -> Self {
        Self::OperationFailed {
            path: path.into(),
            op: op.into(),
            reason: os_reason(errno as i32),
        }
    }

    /// Build an [`PlatError::OperationFailed`] from a `std::io::Error`.
    ///
    /// Errors carrying an errno get the same text as [`PlatError::os`].
    pub fn io(path: impl Into<String>, op: impl Into<String>, err: &std::io::Error) -> Self {
        let reason = match err.raw_os_error() {
            Some(code) => os_reason(code),
            None => err.to_string(),
        };
        Self::OperationFailed {
            path: path.into(),
            op: op.into(),
            reason,
        }
    }

    pub(crate) fn security(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SecurityCheckFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// `strerror` text for `code`.
///
/// std formats OS errors as `"<strerror> (os error N)"`; only the first part
/// is kept.
pub(crate) fn os_reason(code: i32) -> String {
    let text = std::io::Error::from_raw_os_error(code).to_string();
    match text.strip_suffix(&format!(" (os error {code})")) {
        Some(reason) => reason.to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_failed_message_embeds_os_text() {
        let err = PlatError::os("/a/b", "mkdir", Errno::EACCES);
        assert_eq!(err.to_string(), "/a/b: mkdir: Permission denied");
    }

    #[test]
    fn io_error_uses_errno_description() {
        let io = std::io::Error::from_raw_os_error(libc::ENOENT);
        let err = PlatError::io("x.log", "open", &io);
        assert_eq!(err.to_string(), "x.log: open: No such file or directory");
    }

    #[test]
    fn reason_matches_c_library_text() {
        assert_eq!(
            PlatError::os("p", "op", Errno::EBADF).to_string(),
            "p: op: Bad file descriptor"
        );
        assert_eq!(
            PlatError::os("p", "op", Errno::EAGAIN).to_string(),
            "p: op: Resource temporarily unavailable"
        );
    }

    #[test]
    fn os_and_io_constructors_agree() {
        for errno in [Errno::EBADF, Errno::EAGAIN, Errno::ENOTDIR, Errno::EEXIST] {
            let io = std::io::Error::from_raw_os_error(errno as i32);
            assert_eq!(PlatError::os("p", "op", errno), PlatError::io("p", "op", &io));
        }
    }

    #[test]
    fn security_message_has_no_op() {
        let err = PlatError::security("/tmp/d", "directory owned by uid 0, not by us");
        assert_eq!(
            err.to_string(),
            "/tmp/d: directory owned by uid 0, not by us"
        );
    }
}
