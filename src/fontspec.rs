//! Font specification handle.

use serde::{Deserialize, Serialize};

use crate::codec;

/// A font name as understood by the front end (e.g. `"Monospace 12"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontSpec {
    name: String,
}

impl FontSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append the NUL-terminated name to `buf`; returns bytes written.
    pub fn serialise(&self, buf: &mut Vec<u8>) -> usize {
        codec::put_cstr(buf, &self.name)
    }

    #[must_use]
    pub fn deserialise(data: &[u8]) -> Option<(Self, usize)> {
        codec::take_cstr(data).map(|(s, used)| (Self::new(s), used))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_consecutive_specs() {
        let mut buf = Vec::new();
        FontSpec::new("Monospace 12").serialise(&mut buf);
        FontSpec::new("server:fixed").serialise(&mut buf);

        let (first, used) = FontSpec::deserialise(&buf).unwrap();
        assert_eq!(first.name(), "Monospace 12");
        let (second, _) = FontSpec::deserialise(&buf[used..]).unwrap();
        assert_eq!(second.name(), "server:fixed");
    }

    #[test]
    fn truncated_buffer_fails() {
        assert_eq!(FontSpec::deserialise(b"Monospace"), None);
    }
}
