//! NUL-terminated string encoding used for persisted handles.

/// Append `s` plus a trailing NUL to `buf`. Returns the number of bytes written.
pub(crate) fn put_cstr(buf: &mut Vec<u8>, s: &str) -> usize {
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    s.len() + 1
}

/// Read one NUL-terminated UTF-8 string from the front of `data`.
///
/// Returns the string and the bytes consumed (including the NUL), or `None`
/// if `data` holds no NUL or the bytes before it are not UTF-8.
pub(crate) fn take_cstr(data: &[u8]) -> Option<(&str, usize)> {
    let end = data.iter().position(|&b| b == 0)?;
    let s = std::str::from_utf8(&data[..end]).ok()?;
    Some((s, end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_stops_at_first_nul() {
        let data = b"first\0second\0";
        assert_eq!(take_cstr(data), Some(("first", 6)));
        assert_eq!(take_cstr(&data[6..]), Some(("second", 7)));
    }

    #[test]
    fn take_requires_terminator() {
        assert_eq!(take_cstr(b"unterminated"), None);
        assert_eq!(take_cstr(b""), None);
    }

    #[test]
    fn take_rejects_invalid_utf8() {
        assert_eq!(take_cstr(b"\xff\xfe\0"), None);
    }

    #[test]
    fn put_counts_terminator() {
        let mut buf = Vec::new();
        assert_eq!(put_cstr(&mut buf, ""), 1);
        assert_eq!(put_cstr(&mut buf, "ab"), 3);
        assert_eq!(buf, b"\0ab\0");
    }
}
