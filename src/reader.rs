//! Sequential tree reader
//!
//! [`TreeReader`] pulls one bracket group at a time from any `BufRead` and
//! turns it into a finished [`Tree`]: labels parsed, leaves indexed,
//! coindices linked. A malformed group produces an error for that group only
//! and the reader moves on to the next one.

use crate::bracket::BracketParser;
use crate::error::{ParseError, ParseErrorKind, TreebankError};
use crate::pool::StringPool;
use crate::tree::Tree;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::iter::FusedIterator;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reader over a file or any other boxed source
pub type DynTreeReader = TreeReader<Box<dyn BufRead + Send>>;

/// Reader settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Label given to a root written as `( (S ...) )`; `None` rejects such roots
    pub unlabeled_root: Option<String>,
    /// Trees parsed ahead by the threaded reader
    pub queue_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            unlabeled_root: Some("TOP".to_string()),
            queue_capacity: 64,
        }
    }
}

/// Reads trees one at a time from a character stream
///
/// All trees from one reader share its [`StringPool`].
///
/// # Examples
///
/// ```
/// use tbtree::TreeReader;
///
/// let mut reader = TreeReader::from_string("(S (NP (NN dogs)) (VP (VBP bark)))\n( (NN x) )");
/// let first = reader.next_tree().unwrap().unwrap();
/// assert_eq!(first.text(), "dogs bark");
/// assert_eq!(reader.count(), 1);
/// ```
pub struct TreeReader<R> {
    parser: BracketParser<R>,
    filename: Arc<str>,
    next_index: usize,
    finished: bool,
}

impl<R: BufRead> TreeReader<R> {
    pub fn from_reader(reader: R, filename: &str, config: &ReaderConfig) -> Self {
        Self::with_pool(reader, filename, config, StringPool::new())
    }

    /// Reader that interns into an existing pool
    pub fn with_pool(reader: R, filename: &str, config: &ReaderConfig, pool: StringPool) -> Self {
        Self {
            parser: BracketParser::new(reader, pool, config.unlabeled_root.clone()),
            filename: Arc::from(filename),
            next_index: 0,
            finished: false,
        }
    }

    /// Next tree, `Ok(None)` at end of input
    ///
    /// A [`TreebankError::Parse`] covers one tree; calling again continues
    /// with the next. After an I/O error the reader is finished.
    pub fn next_tree(&mut self) -> Result<Option<Tree>, TreebankError> {
        if self.finished {
            return Ok(None);
        }

        let index = self.next_index;
        match self.parser.next_group(&self.filename, index) {
            Ok(Some(nodes)) => {
                self.next_index += 1;
                let pool = self.parser.pool().clone();
                Ok(Some(Tree::from_nodes(nodes, pool, self.filename.clone(), index)))
            }
            Ok(None) => {
                debug!(file = %self.filename, trees = index, "end of input");
                self.finished = true;
                Ok(None)
            }
            Err(err @ TreebankError::Parse(_)) => {
                self.next_index += 1;
                Err(err)
            }
            Err(err) => {
                self.finished = true;
                Err(err)
            }
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn string_pool(&self) -> &StringPool {
        self.parser.pool()
    }

    /// Bracket groups consumed so far, including malformed ones
    pub fn groups_read(&self) -> usize {
        self.next_index
    }
}

impl TreeReader<Cursor<String>> {
    /// Reader over in-memory text, with default settings
    pub fn from_string(text: &str) -> Self {
        Self::from_reader(
            Cursor::new(text.to_string()),
            "<string>",
            &ReaderConfig::default(),
        )
    }
}

impl DynTreeReader {
    /// Open a file, decompressing it if it starts with the gzip magic bytes
    pub fn from_file(path: impl AsRef<Path>, config: &ReaderConfig) -> Result<Self, TreebankError> {
        let path = path.as_ref();
        let reader = open_source(path)?;
        Ok(Self::from_reader(reader, &path.to_string_lossy(), config))
    }
}

pub(crate) fn open_source(path: &Path) -> Result<Box<dyn BufRead + Send>, TreebankError> {
    let file = File::open(path).map_err(|source| TreebankError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    debug!(path = %path.display(), gzipped, "opened treebank file");

    if gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

impl<R: BufRead> Iterator for TreeReader<R> {
    type Item = Result<Tree, TreebankError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_tree().transpose()
    }
}

impl<R: BufRead> FusedIterator for TreeReader<R> {}

/// Parse the first tree in `s`
impl FromStr for Tree {
    type Err = TreebankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut reader = TreeReader::from_string(s);
        match reader.next_tree()? {
            Some(tree) => Ok(tree),
            None => Err(ParseError {
                file: reader.filename.clone(),
                tree_index: 0,
                line: 1,
                column: 1,
                kind: ParseErrorKind::NoTree,
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::{self, Read, Write};
    use tempfile::NamedTempFile;

    const THREE_TREES: &str = "\
( (S (NP-SBJ (NNP Pierre)) (VP (VBZ sleeps)) (. .)) )
( (S (NP-SBJ (PRP It)) (VP (VBD rained)) (. .)) )
(TOP (FRAG (NP (NN Nothing)) (. .)))
";

    #[test]
    fn test_read_all() {
        let trees: Vec<Tree> = TreeReader::from_string(THREE_TREES)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(trees.len(), 3);
        assert_eq!(trees[0].root().pos(), "TOP");
        assert_eq!(trees[0].text(), "Pierre sleeps .");
        assert_eq!(trees[2].root().child(0).unwrap().pos(), "FRAG");

        for (i, tree) in trees.iter().enumerate() {
            assert_eq!(tree.index(), i);
            assert_eq!(tree.filename(), "<string>");
        }
        // One pool for the whole stream
        assert!(trees[0].string_pool().same_pool(trees[2].string_pool()));
    }

    #[test]
    fn test_skip_malformed_tree() {
        let text = "(S (NP (NN a)) (VP (VB b)))\n(S (NP)\n (VP (VB c)))\n(S (NN ok))";
        let mut reader = TreeReader::from_string(text);

        let first = reader.next_tree().unwrap().unwrap();
        assert_eq!(first.index(), 0);

        match reader.next_tree() {
            Err(TreebankError::Parse(err)) => {
                assert_eq!(err.tree_index, 1);
                assert_eq!(err.line, 2);
                assert_eq!(err.kind, ParseErrorKind::MissingWord("NP".into()));
            }
            other => panic!(
                "expected parse error, got {:?}",
                other.map(|t| t.map(|t| t.to_parse()))
            ),
        }

        let third = reader.next_tree().unwrap().unwrap();
        assert_eq!(third.index(), 2);
        assert_eq!(third.text(), "ok");
        assert!(reader.next_tree().unwrap().is_none());
        assert!(reader.next_tree().unwrap().is_none());
        assert_eq!(reader.groups_read(), 3);
    }

    #[test]
    fn test_unlabeled_root_config() {
        let config = ReaderConfig {
            unlabeled_root: Some("ROOT".into()),
            ..ReaderConfig::default()
        };
        let mut reader = TreeReader::from_reader(Cursor::new("( (NN x) )"), "mem", &config);
        let tree = reader.next_tree().unwrap().unwrap();
        assert_eq!(tree.root().pos(), "ROOT");
        assert_eq!(tree.filename(), "mem");

        let config = ReaderConfig {
            unlabeled_root: None,
            ..ReaderConfig::default()
        };
        let mut reader = TreeReader::from_reader(Cursor::new("( (NN x) )"), "mem", &config);
        assert!(matches!(reader.next_tree(), Err(TreebankError::Parse(_))));
    }

    #[test]
    fn test_from_str() {
        let tree: Tree = "  (S (NN x))  (S (NN y))".parse().unwrap();
        assert_eq!(tree.text(), "x");

        match "   ".parse::<Tree>() {
            Err(TreebankError::Parse(err)) => assert_eq!(err.kind, ParseErrorKind::NoTree),
            _ => panic!("expected NoTree"),
        }
    }

    #[test]
    fn test_from_file_plain_and_gzip() {
        let mut plain = NamedTempFile::new().unwrap();
        plain.write_all(THREE_TREES.as_bytes()).unwrap();
        let count = TreeReader::from_file(plain.path(), &ReaderConfig::default())
            .unwrap()
            .filter_map(Result::ok)
            .count();
        assert_eq!(count, 3);

        let mut gz = NamedTempFile::new().unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(THREE_TREES.as_bytes()).unwrap();
        gz.write_all(&encoder.finish().unwrap()).unwrap();

        let trees: Vec<Tree> = TreeReader::from_file(gz.path(), &ReaderConfig::default())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(trees.len(), 3);
        assert_eq!(trees[1].text(), "It rained .");
        assert_eq!(trees[1].filename(), gz.path().to_string_lossy());
    }

    #[test]
    fn test_missing_file() {
        let result = TreeReader::from_file("/nonexistent/wsj_0001.mrg", &ReaderConfig::default());
        assert!(matches!(result, Err(TreebankError::FileOpen { .. })));
    }

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::other("device unplugged"));
            }
            self.served = true;
            let text = b"(S (NN a))\n";
            buf[..text.len()].copy_from_slice(text);
            Ok(text.len())
        }
    }

    #[test]
    fn test_io_error_fuses() {
        let reader = BufReader::new(FailingReader { served: false });
        let mut trees = TreeReader::from_reader(reader, "flaky", &ReaderConfig::default());

        assert!(trees.next().unwrap().is_ok());
        assert!(matches!(trees.next(), Some(Err(TreebankError::Io(_)))));
        assert!(trees.next().is_none());
    }
}
