//! Filename handle stored in session configuration.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::PlatError;
use crate::expand;

/// Mode for [`Filename::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    /// Create or truncate.
    Write,
    /// Create or append.
    Append,
}

/// A path as configured by the user, possibly still a template.
///
/// Serialises as a bare string in config files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filename {
    path: String,
}

impl Filename {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// True for the empty path, which means "no file configured".
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.path.is_empty()
    }

    /// Bytes [`Filename::serialise`] will write, including the NUL.
    #[must_use]
    pub fn serialised_len(&self) -> usize {
        self.path.len() + 1
    }

    /// Append the NUL-terminated path to `buf`; returns bytes written.
    pub fn serialise(&self, buf: &mut Vec<u8>) -> usize {
        codec::put_cstr(buf, &self.path)
    }

    /// Decode a filename from the front of `data`.
    ///
    /// Returns the filename and the number of bytes consumed.
    #[must_use]
    pub fn deserialise(data: &[u8]) -> Option<(Self, usize)> {
        codec::take_cstr(data).map(|(s, used)| (Self::new(s), used))
    }

    /// Map a character to one that is safe inside a single path component.
    #[must_use]
    pub fn sanitise_char(c: char) -> char {
        if c == '/' {
            '.'
        } else {
            c
        }
    }

    /// Expand `$VAR`, `${VAR}` and `~` in the path.
    #[must_use]
    pub fn expand(self) -> Self {
        Self {
            path: expand::expand(self.path),
        }
    }

    /// Convert a name saved by a version without path expansion.
    ///
    /// Back then `$` and `~` were plain characters, so they are escaped to keep
    /// their literal meaning once expansion runs.
    #[must_use]
    pub fn escape_expansions(self) -> Self {
        Self {
            path: expand::escape(&self.path),
        }
    }

    /// Open the file.
    ///
    /// With `private` set the file is created with mode 0600. That only makes
    /// sense for [`OpenMode::Write`]; other modes are rejected.
    pub fn open(&self, mode: OpenMode, private: bool) -> Result<File, PlatError> {
        let mut opts = OpenOptions::new();
        match (mode, private) {
            (OpenMode::Read, false) => {
                opts.read(true);
            }
            (OpenMode::Write, _) => {
                opts.write(true).create(true).truncate(true);
                if private {
                    opts.mode(0o600);
                }
            }
            (OpenMode::Append, false) => {
                opts.append(true).create(true);
            }
            (_, true) => {
                return Err(PlatError::OperationFailed {
                    path: self.path.clone(),
                    op: "open".into(),
                    reason: "private files can only be opened for writing".into(),
                });
            }
        }
        opts.open(&self.path)
            .map_err(|e| PlatError::io(&self.path, "open", &e))
    }
}

impl fmt::Display for Filename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for Filename {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Filename {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn null_filename() {
        assert!(Filename::default().is_null());
        assert!(!Filename::new("x").is_null());
    }

    #[test]
    fn serialise_then_deserialise_consumes_exact_bytes() {
        let f = Filename::new("/var/log/putty.log");
        let mut buf = Vec::new();
        let written = f.serialise(&mut buf);
        assert_eq!(written, f.serialised_len());
        buf.extend_from_slice(b"trailing");

        let (back, used) = Filename::deserialise(&buf).unwrap();
        assert_eq!(back, f);
        assert_eq!(used, written);
    }

    #[test]
    fn deserialise_without_terminator_fails() {
        assert_eq!(Filename::deserialise(b"/no/nul"), None);
    }

    #[test]
    fn sanitise_only_touches_slash() {
        let s: String = "a/b:c".chars().map(Filename::sanitise_char).collect();
        assert_eq!(s, "a.b:c");
    }

    #[test]
    fn escape_expansions_marks_dollar_and_tilde() {
        let f = Filename::new("~/logs/$5.log").escape_expansions();
        assert_eq!(f.as_str(), "\\~/logs/\\$5.log");
    }

    #[test]
    fn private_open_creates_owner_only_file() {
        let tmp = TempDir::new().unwrap();
        let f = Filename::new(tmp.path().join("secret").to_str().unwrap());
        let mut file = f.open(OpenMode::Write, true).unwrap();
        file.write_all(b"hi").unwrap();

        let mode = std::fs::metadata(f.as_str()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn private_read_is_rejected() {
        let f = Filename::new("/dev/null");
        let err = f.open(OpenMode::Read, true).unwrap_err();
        assert!(err.to_string().starts_with("/dev/null: open: "));
    }

    #[test]
    fn append_then_read() {
        let tmp = TempDir::new().unwrap();
        let f = Filename::new(tmp.path().join("log").to_str().unwrap());
        f.open(OpenMode::Append, false).unwrap().write_all(b"a").unwrap();
        f.open(OpenMode::Append, false).unwrap().write_all(b"b").unwrap();

        let mut s = String::new();
        f.open(OpenMode::Read, false).unwrap().read_to_string(&mut s).unwrap();
        assert_eq!(s, "ab");
    }

    #[test]
    fn open_missing_reports_os_reason() {
        let f = Filename::new("/nonexistent-dir/x");
        let err = f.open(OpenMode::Read, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "/nonexistent-dir/x: open: No such file or directory"
        );
    }
}
