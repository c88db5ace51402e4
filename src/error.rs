//! Error types for reading treebanks

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// What went wrong inside a bracket group
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected ')' with no open group")]
    UnexpectedClose,

    #[error("input ended inside an open group")]
    UnclosedGroup,

    #[error("group has no label")]
    EmptyLabel,

    #[error("terminal '{0}' has no word")]
    MissingWord(String),

    #[error("unexpected text '{0}' outside of a terminal")]
    UnexpectedAtom(String),

    #[error("terminal '{label}' has more than one word ('{extra}')")]
    ExtraWord { label: String, extra: String },

    #[error("input contains no tree")]
    NoTree,
}

/// A malformed tree, with enough context to log and skip it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}:{column}: tree {tree_index}: {kind}")]
pub struct ParseError {
    pub file: Arc<str>,
    pub tree_index: usize,
    pub line: usize,
    pub column: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Error)]
pub enum TreebankError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to open file {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl TreebankError {
    /// Per-tree failures that a corpus reader can skip over
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TreebankError::Parse(_))
    }
}
