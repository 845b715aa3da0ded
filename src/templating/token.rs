//! Placeholder tokenizer.
//!
//! A template line is split into literal text and placeholder tokens:
//!
//! ```text
//! @{ [marker(] name [| default] [)] }
//! ```
//!
//! - `name` is a dotted path of letters, `.` and `_` (e.g. `db.host`)
//! - `marker` is `#` (conditional comment), `include` or `includeAll`
//! - `default` is letters, digits and `._-=?&`, used when the value is empty
//!
//! Anything that does not complete this grammar, such as a missing closing
//! brace, is literal text. Tokens never overlap and are not nested.

/// The function a placeholder applies to its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `@{#(name)}`: `#` when the value is empty, nothing otherwise
    Comment,
    /// `@{include(name)}`: splice in one resolved template
    Include,
    /// `@{includeAll(name)}`: splice in every template matching the value's patterns
    IncludeAll,
}

impl Marker {
    /// Opening text, including the parenthesis.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Comment => "#(",
            Self::Include => "include(",
            Self::IncludeAll => "includeAll(",
        }
    }
}

/// One `@{...}` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Dotted value path
    pub name: String,
    /// Function applied to the resolved value
    pub marker: Option<Marker>,
    /// Fallback for an empty value; `Some("")` when the token ends in a bare `|`
    pub default: Option<String>,
}

impl Placeholder {
    /// The name split on `.`, as handed to the value resolver.
    #[must_use]
    pub fn path(&self) -> Vec<&str> {
        self.name.split('.').collect()
    }
}

/// A piece of a tokenized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied to the output unchanged
    Literal(&'a str),
    /// A token to resolve
    Placeholder(Placeholder),
}

const OPEN: &str = "@{";

// includeAll must be tried before include
const MARKERS: [Marker; 3] = [Marker::IncludeAll, Marker::Include, Marker::Comment];

const fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'.' || b == b'_'
}

const fn is_default_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-' | b'=' | b'?' | b'&')
}

fn take_while(s: &str, pred: fn(u8) -> bool) -> usize {
    s.bytes().position(|b| !pred(b)).unwrap_or(s.len())
}

/// Parse a token body starting right after `@{`.
///
/// Returns the placeholder and the number of bytes consumed, including the
/// closing brace.
fn parse_body(body: &str) -> Option<(Placeholder, usize)> {
    let mut pos = 0;

    let marker = MARKERS.into_iter().find(|m| body.starts_with(m.prefix()));
    if let Some(marker) = marker {
        pos += marker.prefix().len();
    }

    let name_len = take_while(&body[pos..], is_name_byte);
    if name_len == 0 {
        return None;
    }
    let name = &body[pos..pos + name_len];
    pos += name_len;

    let default = if body[pos..].starts_with('|') {
        pos += 1;
        let len = take_while(&body[pos..], is_default_byte);
        let value = &body[pos..pos + len];
        pos += len;
        Some(value.to_string())
    } else {
        None
    };

    if body[pos..].starts_with(')') {
        pos += 1;
    }

    if !body[pos..].starts_with('}') {
        return None;
    }
    pos += 1;

    Some((
        Placeholder {
            name: name.to_string(),
            marker,
            default,
        },
        pos,
    ))
}

/// Split `line` into literal and placeholder segments, left to right.
///
/// Adjacent literal text is merged, so a line without tokens yields a single
/// [`Segment::Literal`] (or nothing for an empty line).
#[must_use]
pub fn tokenize(line: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = line[cursor..].find(OPEN) {
        let start = cursor + offset;
        let body_start = start + OPEN.len();

        match parse_body(&line[body_start..]) {
            Some((placeholder, consumed)) => {
                if literal_start < start {
                    segments.push(Segment::Literal(&line[literal_start..start]));
                }
                segments.push(Segment::Placeholder(placeholder));
                cursor = body_start + consumed;
                literal_start = cursor;
            }
            // `@` is a single byte, so the next search starts on a char boundary
            None => cursor = start + 1,
        }
    }

    if literal_start < line.len() {
        segments.push(Segment::Literal(&line[literal_start..]));
    }

    segments
}
