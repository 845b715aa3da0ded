//! Recognition of `key=value` assignment lines.
//!
//! Overrides apply to assignment lines only. The same recognizer is used
//! before placeholder expansion (replace overrides) and after it (append and
//! substitute overrides), so both agree on what an assignment is:
//!
//! ```text
//! [#]key[ ...]=value
//! ```
//!
//! `key` is one or more of `A-Z a-z 0-9 . _ -`. An optional leading `#` lets an
//! override activate a commented-out line, and spaces may sit between the key
//! and `=`. The value is everything after the first `=`, leading spaces
//! included. Lines holding several physical lines (the output of an include)
//! are never assignments.

/// A recognized assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment<'a> {
    /// The key, without the comment marker or surrounding spaces
    pub key: &'a str,
    /// Everything after the `=`
    pub value: &'a str,
}

impl Assignment<'_> {
    /// Rebuild the line in canonical `key=value` form.
    ///
    /// The comment marker and the spaces before `=` are dropped.
    #[must_use]
    pub fn render(key: &str, value: &str) -> String {
        format!("{key}={value}")
    }
}

const fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-')
}

/// Split a line into its assignment key and value, if it is one.
#[must_use]
pub fn split_assignment(line: &str) -> Option<Assignment<'_>> {
    if line.contains('\n') {
        return None;
    }

    let body = line.strip_prefix('#').unwrap_or(line);

    let key_len = body.bytes().position(|b| !is_key_byte(b)).unwrap_or(body.len());
    if key_len == 0 {
        return None;
    }
    let key = &body[..key_len];

    let rest = body[key_len..].trim_start_matches(' ');
    let value = rest.strip_prefix('=')?;

    Some(Assignment {
        key,
        value,
    })
}
