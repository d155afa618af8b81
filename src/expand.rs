//! `$NAME`, `${NAME}` and `~` expansion for path templates.
//!
//! Rules:
//!
//! - `\$` and `\~` produce a literal `$` / `~`; the backslash is dropped.
//! - `$NAME` takes the longest run of ASCII alphanumerics and `_` starting
//!   with a letter or `_`.
//! - `${NAME}` takes everything up to the next `}`, whatever it contains. With
//!   no closing brace the `$` is literal.
//! - `~` is replaced by `$HOME` wherever it appears, not only at the start of
//!   a path component.
//! - Unset variables expand to nothing. Nothing here ever fails.
//!
//! There is no recursion: substituted values are copied verbatim.

use std::collections::HashMap;

/// Read-only view of environment variables.
pub trait EnvLookup {
    /// Value of `name`, or `None` if unset.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        // Such names can never be set, and std may reject them outright.
        if name.is_empty() || name.contains(['=', '\0']) {
            return None;
        }
        std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
    }
}

impl EnvLookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Expand `input` against the process environment.
pub fn expand(input: String) -> String {
    expand_with(input, &ProcessEnv)
}

/// Expand `input` against an arbitrary environment view.
pub fn expand_with<E: EnvLookup + ?Sized>(input: String, env: &E) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input.as_str();

    while let Some(c) = rest.chars().next() {
        let after = &rest[c.len_utf8()..];
        match c {
            '\\' if after.starts_with(['$', '~']) => {
                out.push_str(&after[..1]);
                rest = &after[1..];
            }
            '$' => match split_var(after) {
                Some((name, tail)) => {
                    if let Some(value) = env.lookup(name) {
                        out.push_str(&value);
                    }
                    rest = tail;
                }
                None => {
                    out.push('$');
                    rest = after;
                }
            },
            '~' => {
                if let Some(home) = env.lookup("HOME") {
                    out.push_str(&home);
                }
                rest = after;
            }
            _ => {
                out.push(c);
                rest = after;
            }
        }
    }

    out
}

/// Split the text following a `$` into `(name, remainder)`.
///
/// Returns `None` when the `$` does not start a variable reference.
fn split_var(s: &str) -> Option<(&str, &str)> {
    if let Some(braced) = s.strip_prefix('{') {
        if let Some(end) = braced.find('}') {
            return Some((&braced[..end], &braced[end + 1..]));
        }
        return None;
    }

    let first = s.chars().next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

/// Escape every `$` and `~` so that [`expand`] returns `input` unchanged.
///
/// Used to migrate strings saved before expansion was supported, where `$`
/// and `~` were ordinary filename characters.
pub fn escape(input: &str) -> String {
    let extra = input.matches(['$', '~']).count();
    if extra == 0 {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len() + extra);
    for c in input.chars() {
        if c == '$' || c == '~' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
