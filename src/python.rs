//! Python bindings for tbtree
//!
//! This module provides PyO3-based Python bindings for the Rust core.
//! Trees are shared behind an `Arc`; a `Node` is the tree plus a node id.

use pyo3::exceptions::{PyIOError, PyIndexError, PyValueError};
use pyo3::prelude::*;
use std::sync::Arc;

use crate::error::TreebankError;
use crate::iterators::Treebank;
use crate::label::CoindexKind;
use crate::rules::{HeadRuleError, HeadRules as RustHeadRules};
use crate::tree::{NodeId, NodeRef, Tree as RustTree};

/// Convert TreebankError to Python exception
impl From<TreebankError> for PyErr {
    fn from(err: TreebankError) -> PyErr {
        match err {
            TreebankError::Io(e) => PyIOError::new_err(e.to_string()),
            TreebankError::Parse(e) => PyValueError::new_err(format!("Parse error: {}", e)),
            TreebankError::FileOpen { path, source } => PyIOError::new_err(format!(
                "Failed to open file {}: {}",
                path.display(),
                source
            )),
        }
    }
}

impl From<HeadRuleError> for PyErr {
    fn from(err: HeadRuleError) -> PyErr {
        match err {
            HeadRuleError::Io { .. } => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

#[pyclass(name = "Tree")]
#[derive(Clone)]
pub struct PyTree {
    pub(crate) inner: Arc<RustTree>,
}

impl PyTree {
    fn wrap(&self, node: NodeRef<'_>) -> PyNode {
        PyNode {
            tree: Arc::clone(&self.inner),
            id: node.id(),
        }
    }
}

#[pymethods]
impl PyTree {
    fn root(&self) -> PyNode {
        self.wrap(self.inner.root())
    }

    fn node(&self, id: NodeId) -> PyResult<PyNode> {
        self.inner
            .get(id)
            .map(|node| self.wrap(node))
            .ok_or_else(|| PyIndexError::new_err(format!("node id out of range: {}", id)))
    }

    /// Leaves with a real word, left to right
    fn tokens(&self) -> Vec<PyNode> {
        self.inner.tokens().map(|n| self.wrap(n)).collect()
    }

    /// All leaves, empty categories included
    fn terminals(&self) -> Vec<PyNode> {
        self.inner.terminals().map(|n| self.wrap(n)).collect()
    }

    fn __getitem__(&self, token_index: usize) -> PyResult<PyNode> {
        self.inner
            .token(token_index)
            .map(|n| self.wrap(n))
            .ok_or_else(|| {
                PyIndexError::new_err(format!("token index out of range: {}", token_index))
            })
    }

    fn __len__(&self) -> usize {
        self.inner.token_count()
    }

    /// Compute heads in place. Nodes taken earlier keep the old tree.
    fn find_heads(&mut self, rules: &PyHeadRules) {
        Arc::make_mut(&mut self.inner).find_heads(&rules.inner);
    }

    /// Path string between two nodes of this tree, e.g. `NN↑NP↑S↓VP`
    fn path(&self, from: &PyNode, to: &PyNode) -> PyResult<String> {
        if !Arc::ptr_eq(&from.tree, &self.inner) || !Arc::ptr_eq(&to.tree, &self.inner) {
            return Err(PyValueError::new_err("nodes belong to a different tree"));
        }
        Ok(self.inner.path_string(from.id, to.id))
    }

    #[getter]
    fn text(&self) -> String {
        self.inner.text()
    }

    #[getter]
    fn filename(&self) -> String {
        self.inner.filename().to_string()
    }

    #[getter]
    fn index(&self) -> usize {
        self.inner.index()
    }

    fn to_parse(&self) -> String {
        self.inner.to_parse()
    }

    fn pretty(&self) -> String {
        self.inner.to_pretty_parse()
    }

    fn __str__(&self) -> String {
        self.inner.to_parse()
    }

    fn __repr__(&self) -> String {
        let n = self.inner.token_count();
        if n == 0 {
            return "<Tree (empty)>".to_string();
        }

        let words: Vec<&str> = self
            .inner
            .tokens()
            .take(3)
            .filter_map(|t| t.word())
            .collect();

        if n > 3 {
            format!("<Tree len={} words='{} ...'>", n, words.join(" "))
        } else {
            format!("<Tree len={} words='{}'>", n, words.join(" "))
        }
    }
}

#[pyclass(name = "Node")]
#[derive(Clone)]
pub struct PyNode {
    tree: Arc<RustTree>,
    id: NodeId,
}

impl PyNode {
    fn node(&self) -> NodeRef<'_> {
        self.tree.node(self.id)
    }

    fn wrap(&self, node: NodeRef<'_>) -> PyNode {
        PyNode {
            tree: Arc::clone(&self.tree),
            id: node.id(),
        }
    }
}

#[pymethods]
impl PyNode {
    #[getter]
    fn id(&self) -> NodeId {
        self.id
    }

    #[getter]
    fn pos(&self) -> String {
        self.node().pos().to_string()
    }

    #[getter]
    fn label(&self) -> String {
        self.node().raw_label().to_string()
    }

    #[getter]
    fn word(&self) -> Option<String> {
        self.node().word().map(str::to_string)
    }

    #[getter]
    fn function_tags(&self) -> Vec<String> {
        self.node().function_tags().map(str::to_string).collect()
    }

    fn has_function_tag(&self, tag: &str) -> bool {
        self.node().has_function_tag(tag)
    }

    /// (index, "chain" | "gap") pairs
    #[getter]
    fn coindices(&self) -> Vec<(u32, &'static str)> {
        self.node()
            .coindices()
            .iter()
            .map(|c| {
                let kind = match c.kind {
                    CoindexKind::Chain => "chain",
                    CoindexKind::Gap => "gap",
                };
                (c.id, kind)
            })
            .collect()
    }

    #[getter]
    fn terminal_index(&self) -> Option<usize> {
        self.node().terminal_index()
    }

    #[getter]
    fn token_index(&self) -> Option<usize> {
        self.node().token_index()
    }

    fn is_terminal(&self) -> bool {
        self.node().is_terminal()
    }

    fn is_token(&self) -> bool {
        self.node().is_token()
    }

    fn is_ec(&self) -> bool {
        self.node().is_ec()
    }

    fn parent(&self) -> Option<PyNode> {
        self.node().parent().map(|n| self.wrap(n))
    }

    fn children(&self) -> Vec<PyNode> {
        self.node().children().map(|n| self.wrap(n)).collect()
    }

    fn head(&self) -> Option<PyNode> {
        self.node().head().map(|n| self.wrap(n))
    }

    fn indexing_node(&self) -> Option<PyNode> {
        self.node().indexing_node().map(|n| self.wrap(n))
    }

    fn constituent_by_head(&self) -> PyNode {
        self.wrap(self.node().constituent_by_head())
    }

    fn depth(&self) -> usize {
        self.node().depth()
    }

    fn lowest_common_ancestor(&self, other: &PyNode) -> Option<PyNode> {
        if !Arc::ptr_eq(&self.tree, &other.tree) {
            return None;
        }
        Some(PyNode {
            tree: Arc::clone(&self.tree),
            id: self.tree.lowest_common_ancestor(self.id, other.id),
        })
    }

    fn path_to(&self, other: &PyNode) -> Option<String> {
        Arc::ptr_eq(&self.tree, &other.tree).then(|| self.tree.path_string(self.id, other.id))
    }

    fn tokens(&self) -> Vec<PyNode> {
        self.node().tokens().into_iter().map(|n| self.wrap(n)).collect()
    }

    fn to_parse(&self) -> String {
        self.node().to_parse()
    }

    fn __eq__(&self, other: &PyNode) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && self.id == other.id
    }

    fn __hash__(&self) -> u64 {
        (Arc::as_ptr(&self.tree) as u64) ^ (self.id as u64).rotate_left(32)
    }

    fn __repr__(&self) -> String {
        let node = self.node();
        match node.word() {
            Some(word) => format!(
                "<Node id={} label='{}' word='{}'>",
                self.id,
                node.raw_label(),
                word
            ),
            None => format!("<Node id={} label='{}'>", self.id, node.raw_label()),
        }
    }
}

/// Head-percolation rule table.
///
/// HeadRules() is the built-in English table; HeadRules(text) parses a table.
#[pyclass(name = "HeadRules")]
#[derive(Clone)]
pub struct PyHeadRules {
    inner: RustHeadRules,
}

#[pymethods]
impl PyHeadRules {
    #[new]
    #[pyo3(signature = (text=None))]
    fn new(text: Option<&str>) -> PyResult<Self> {
        let inner = match text {
            Some(text) => RustHeadRules::parse(text)?,
            None => RustHeadRules::english(),
        };
        Ok(PyHeadRules { inner })
    }

    #[staticmethod]
    fn from_file(path: &str) -> PyResult<Self> {
        Ok(PyHeadRules {
            inner: RustHeadRules::from_file(path)?,
        })
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!("<HeadRules categories={}>", self.inner.len())
    }
}

/// Iterator over trees from a treebank file.
#[pyclass(name = "TreeIterator", unsendable)]
struct PyTreeIterator {
    inner: Box<dyn Iterator<Item = Result<RustTree, TreebankError>> + Send>,
    head_rules: Option<RustHeadRules>,
}

#[pymethods]
impl PyTreeIterator {
    fn __iter__(slf: PyRef<Self>) -> PyRef<Self> {
        slf
    }

    fn __next__(&mut self) -> PyResult<Option<PyTree>> {
        match self.inner.next() {
            Some(Ok(mut tree)) => {
                if let Some(rules) = &self.head_rules {
                    tree.find_heads(rules);
                }
                Ok(Some(PyTree {
                    inner: Arc::new(tree),
                }))
            }
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }
}

/// Read trees from a bracketed treebank file (plain or gzip).
///
/// Malformed trees are skipped with a warning.
///
/// Args:
///     path: Path to the treebank file
///     head_rules: If given, heads are computed for every tree
///
/// Returns:
///     Iterator over Tree objects
#[pyfunction]
#[pyo3(signature = (path, head_rules=None))]
fn read_trees(path: &str, head_rules: Option<&PyHeadRules>) -> PyResult<PyTreeIterator> {
    let trees = Treebank::from_file(path).threaded_trees()?;
    Ok(PyTreeIterator {
        inner: Box::new(trees),
        head_rules: head_rules.map(|r| r.inner.clone()),
    })
}

/// Parse a single tree from bracket text.
#[pyfunction]
fn parse_tree(text: &str) -> PyResult<PyTree> {
    let tree: RustTree = text.parse()?;
    Ok(PyTree {
        inner: Arc::new(tree),
    })
}

#[pyfunction]
fn __version__() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pymodule]
fn tbtree(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTree>()?;
    m.add_class::<PyNode>()?;
    m.add_class::<PyHeadRules>()?;
    m.add_class::<PyTreeIterator>()?;

    m.add_function(wrap_pyfunction!(read_trees, m)?)?;
    m.add_function(wrap_pyfunction!(parse_tree, m)?)?;
    m.add_function(wrap_pyfunction!(__version__, m)?)?;

    Ok(())
}
