//! Corpus-level iteration
//!
//! [`Treebank`] wraps the readers with the policy most corpus code wants:
//! malformed trees are logged and skipped, I/O errors end the stream.
//! Provides:
//! - Iterating over trees from a string or a (possibly gzipped) file
//! - Sequential or read-ahead (threaded) parsing

use crate::error::TreebankError;
use crate::reader::{DynTreeReader, ReaderConfig, TreeReader};
use crate::threaded::ThreadedTreeReader;
use crate::tree::Tree;
use std::io::{BufRead, Cursor};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Source of trees for a collection
#[derive(Debug, Clone)]
enum TreeSource {
    /// In-memory bracket text
    String(String),
    /// Single file path
    File(PathBuf),
}

/// Collection of trees from a string or file
///
/// Malformed trees are logged with `tracing::warn!` and skipped. I/O errors
/// are yielded once and end the iteration.
///
/// # Examples
///
/// ```
/// use tbtree::Treebank;
///
/// let text = "(S (NP (NN a)) (VP (VB b)))\n(S (NP))\n(S (NN c))";
/// let trees: Vec<_> = Treebank::from_string(text)
///     .trees()
///     .unwrap()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(trees.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Treebank {
    source: TreeSource,
    config: ReaderConfig,
}

impl Treebank {
    /// Create from in-memory bracket text
    pub fn from_string(text: &str) -> Self {
        Self {
            source: TreeSource::String(text.to_string()),
            config: ReaderConfig::default(),
        }
    }

    /// Create from a single file path (plain or gzip)
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self {
            source: TreeSource::File(path.as_ref().to_path_buf()),
            config: ReaderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Iterate over trees in input order
    ///
    /// Fails immediately if the file cannot be opened. Can be called
    /// repeatedly; each call re-reads the source.
    pub fn trees(&self) -> Result<SkipMalformed<DynTreeReader>, TreebankError> {
        let reader = match &self.source {
            TreeSource::String(text) => TreeReader::from_reader(
                Box::new(Cursor::new(text.clone())) as Box<dyn BufRead + Send>,
                "<string>",
                &self.config,
            ),
            TreeSource::File(path) => TreeReader::from_file(path, &self.config)?,
        };
        Ok(SkipMalformed::new(reader))
    }

    /// Like [`Treebank::trees`], parsing ahead on a background thread
    pub fn threaded_trees(&self) -> Result<SkipMalformed<ThreadedTreeReader>, TreebankError> {
        let reader = match &self.source {
            TreeSource::String(text) => ThreadedTreeReader::from_reader(
                Cursor::new(text.clone()),
                "<string>",
                &self.config,
            )?,
            TreeSource::File(path) => ThreadedTreeReader::from_file(path, &self.config)?,
        };
        Ok(SkipMalformed::new(reader))
    }
}

/// Iterator adapter: warn about and drop parse errors, stop after anything else
pub struct SkipMalformed<I> {
    inner: I,
    skipped: usize,
    failed: bool,
}

impl<I> SkipMalformed<I> {
    fn new(inner: I) -> Self {
        Self {
            inner,
            skipped: 0,
            failed: false,
        }
    }

    /// Trees dropped so far because they failed to parse
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<I> Iterator for SkipMalformed<I>
where
    I: Iterator<Item = Result<Tree, TreebankError>>,
{
    type Item = Result<Tree, TreebankError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            match self.inner.next()? {
                Ok(tree) => return Some(Ok(tree)),
                Err(TreebankError::Parse(err)) => {
                    warn!("Skipping malformed tree: {}", err);
                    self.skipped += 1;
                }
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
