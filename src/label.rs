//! Node label parsing
//!
//! A treebank label packs a base category together with function tags and
//! coindices: `NP-SBJ-1`, `PP-PRP=4`, `-NONE-`. This module splits a raw label
//! into those parts without ever failing; anything that doesn't look like a
//! coindex is kept as an opaque function tag.

use atoi::FromRadix10Checked;

/// Label used for empty categories (traces, null elements)
pub const EMPTY_CATEGORY: &str = "-NONE-";

/// How a coindex was attached to a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoindexKind {
    /// `-N`: the node heads a new chain (antecedent of traces)
    Chain,
    /// `=N`: the node is a gapping remnant matching the `-N` constituent
    Gap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coindex {
    pub id: u32,
    pub kind: CoindexKind,
}

impl Coindex {
    pub fn chain(id: u32) -> Self {
        Self {
            id,
            kind: CoindexKind::Chain,
        }
    }

    pub fn gap(id: u32) -> Self {
        Self {
            id,
            kind: CoindexKind::Gap,
        }
    }
}

/// A label split into its parts, borrowing from the raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label<'a> {
    pub pos: &'a str,
    pub function_tags: Vec<&'a str>,
    pub coindices: Vec<Coindex>,
}

impl<'a> Label<'a> {
    pub fn is_empty_category(&self) -> bool {
        self.pos == EMPTY_CATEGORY
    }

    /// Case-insensitive function tag lookup
    pub fn has_function_tag(&self, tag: &str) -> bool {
        self.function_tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Split a raw label into base category, function tags and coindices
pub fn parse_label(raw: &str) -> Label<'_> {
    if raw == EMPTY_CATEGORY {
        return Label {
            pos: EMPTY_CATEGORY,
            function_tags: Vec::new(),
            coindices: Vec::new(),
        };
    }

    let (pos, suffix) = split_base(raw);
    let mut label = Label {
        pos,
        function_tags: Vec::new(),
        coindices: Vec::new(),
    };

    let empty_category = pos == EMPTY_CATEGORY;
    for (delim, component) in suffix_components(suffix) {
        if let Some(id) = parse_digits(component) {
            let kind = if delim == b'=' {
                CoindexKind::Gap
            } else {
                CoindexKind::Chain
            };
            label.coindices.push(Coindex { id, kind });
        } else if !empty_category && !label.has_function_tag(component) {
            label.function_tags.push(component);
        }
    }

    label
}

/// Trace coindex carried by an empty-category word such as `*T*-1`
pub fn trace_index(word: &str) -> Option<u32> {
    if !word.starts_with('*') {
        return None;
    }
    let (_, digits) = word.rsplit_once('-')?;
    parse_digits(digits)
}

// Base category and the remaining `-x`/`=x` suffix text
fn split_base(raw: &str) -> (&str, &str) {
    let bytes = raw.as_bytes();

    // -LRB-, -NONE- and friends: the category is delimited by dashes
    if bytes.first() == Some(&b'-') {
        return match raw[1..].find('-') {
            Some(end) => raw.split_at(end + 2),
            None => (raw, ""),
        };
    }

    match bytes.iter().position(|&b| b == b'-' || b == b'=') {
        Some(0) | None => (raw, ""),
        Some(split) => raw.split_at(split),
    }
}

// Iterate over (delimiter, component) pairs in a suffix like "-SBJ=2-1"
fn suffix_components(suffix: &str) -> impl Iterator<Item = (u8, &str)> {
    let bytes = suffix.as_bytes();
    let mut start = 0;
    std::iter::from_fn(move || {
        while start < bytes.len() {
            let delim = bytes[start];
            let rest = &suffix[start + 1..];
            let len = rest
                .bytes()
                .position(|b| b == b'-' || b == b'=')
                .unwrap_or(rest.len());
            let component = &rest[..len];
            start += len + 1;
            if !component.is_empty() {
                return Some((delim, component));
            }
        }
        None
    })
}

// All-digit component to coindex id
#[inline]
fn parse_digits(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    match u32::from_radix_10_checked(bytes) {
        (Some(n), used) if used == bytes.len() => Some(n),
        _ => None,
    }
}
