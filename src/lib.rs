//! tbtree: Penn Treebank constituency trees
//!
//! Reads bracketed treebank files into arena-backed trees with resolved
//! function tags, empty categories and coindexation, and provides head
//! percolation and tree-path algorithms on top.
//! Core implementation in Rust with optional Python bindings.

// Core modules (leaves first)
pub mod bracket; // Bracket-notation lexer and tree builder
pub mod coindex; // Trace/gap to antecedent links
pub mod error;
pub mod head; // Head percolation
pub mod index; // Terminal and token indices
pub mod iterators; // Corpus iteration with skip-on-error policy
pub mod label; // Label parsing: category, function tags, coindices
pub mod path; // Root paths, LCA, path strings
pub mod pool; // Shared string interner
pub mod reader; // Sequential tree reader
pub mod rules; // Head-rule tables
pub mod threaded; // Read-ahead reader on a producer thread
pub mod tree; // Tree data structures

// Python bindings
#[cfg(feature = "pyo3")]
pub mod python;

// Re-exports for convenience
pub use error::{ParseError, ParseErrorKind, TreebankError};
pub use iterators::{SkipMalformed, Treebank};
pub use label::{Coindex, CoindexKind, EMPTY_CATEGORY, Label, parse_label, trace_index};
pub use pool::StringPool;
pub use reader::{DynTreeReader, ReaderConfig, TreeReader};
pub use rules::{HeadRule, HeadRuleError, HeadRules, PosPattern, SearchDirection};
pub use threaded::ThreadedTreeReader;
pub use tree::{Node, NodeId, NodeRef, Tree};
