//! Debug log sink owned by the caller.
//!
//! Opened explicitly, passed to whatever needs it, and closed when dropped.

use std::fs::File;
use std::io::Write;

use crate::error::PlatError;
use crate::filename::{Filename, OpenMode};

/// Line-oriented debug log, optionally echoed to stdout.
pub struct DebugLog {
    file: File,
    echo: bool,
}

impl DebugLog {
    /// Create (truncate) the log at `path`.
    pub fn open(path: &Filename, echo: bool) -> Result<Self, PlatError> {
        let file = path.open(OpenMode::Write, false)?;
        Ok(Self { file, echo })
    }

    /// Write `buf` as-is and flush so the log survives a crash.
    ///
    /// Write errors are ignored.
    pub fn dputs(&mut self, buf: &str) {
        if self.echo {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(buf.as_bytes());
            let _ = out.flush();
        }
        let _ = self.file.write_all(buf.as_bytes());
        let _ = self.file.flush();
    }
}
