//! Constituency tree data structures
//!
//! Nodes live in a per-tree arena and refer to each other by [`NodeId`].
//! Ids are handed out in document (pre-)order while parsing, so the root is
//! always 0, every child has a larger id than its parent, and leaves appear
//! in the arena from left to right.
//!
//! [`NodeRef`] is the consumer-facing handle. It compares and hashes by
//! identity (same tree object, same id), never by label text.

use crate::label::{Coindex, trace_index};
use crate::pool::{StringPool, Sym};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Index of a node in its tree's arena
pub type NodeId = usize;

/// A constituent or terminal
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) raw_label: Sym,
    pub(crate) pos: Sym,
    pub(crate) function_tags: Vec<Sym>,
    pub(crate) coindices: Vec<Coindex>,
    pub(crate) word: Option<Sym>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) child_index: usize,
    pub(crate) terminal_index: Option<usize>,
    pub(crate) token_index: Option<usize>,
    pub(crate) head: Option<NodeId>,
    pub(crate) indexing_node: Option<NodeId>,
    pub(crate) empty_category: bool,
}

impl Node {
    pub(crate) fn new(
        raw_label: Sym,
        pos: Sym,
        function_tags: Vec<Sym>,
        coindices: Vec<Coindex>,
        empty_category: bool,
    ) -> Self {
        Self {
            raw_label,
            pos,
            function_tags,
            coindices,
            word: None,
            parent: None,
            children: Vec::new(),
            child_index: 0,
            terminal_index: None,
            token_index: None,
            head: None,
            indexing_node: None,
            empty_category,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }
}

/// A parsed bracket group
#[derive(Debug, Clone)]
pub struct Tree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) pool: StringPool,
    pub(crate) filename: Arc<str>,
    pub(crate) index: usize,
    pub(crate) terminals: Vec<NodeId>,
    pub(crate) tokens: Vec<NodeId>,
}

impl Tree {
    pub(crate) fn from_nodes(
        nodes: Vec<Node>,
        pool: StringPool,
        filename: Arc<str>,
        index: usize,
    ) -> Self {
        let mut tree = Self {
            nodes,
            pool,
            filename,
            index,
            terminals: Vec::new(),
            tokens: Vec::new(),
        };
        tree.build_indices();
        tree.link_coindices();
        tree
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { tree: self, id: 0 }
    }

    /// Handle for a node id. Panics if the id is out of range.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id < self.nodes.len(), "node id {} out of range", id);
        NodeRef { tree: self, id }
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    /// Number of nodes (constituents and terminals)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Ordinal of this tree within its source
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn string_pool(&self) -> &StringPool {
        &self.pool
    }

    /// All leaves, including empty categories, left to right
    pub fn terminals(&self) -> impl ExactSizeIterator<Item = NodeRef<'_>> + '_ {
        self.terminals.iter().map(move |&id| NodeRef { tree: self, id })
    }

    /// Leaves that carry a real word, left to right
    pub fn tokens(&self) -> impl ExactSizeIterator<Item = NodeRef<'_>> + '_ {
        self.tokens.iter().map(move |&id| NodeRef { tree: self, id })
    }

    pub fn terminal_ids(&self) -> &[NodeId] {
        &self.terminals
    }

    pub fn token_ids(&self) -> &[NodeId] {
        &self.tokens
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn terminal(&self, terminal_index: usize) -> Option<NodeRef<'_>> {
        let id = *self.terminals.get(terminal_index)?;
        Some(NodeRef { tree: self, id })
    }

    pub fn token(&self, token_index: usize) -> Option<NodeRef<'_>> {
        let id = *self.tokens.get(token_index)?;
        Some(NodeRef { tree: self, id })
    }

    /// All nodes in document order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = NodeRef<'_>> + '_ {
        (0..self.nodes.len()).map(move |id| NodeRef { tree: self, id })
    }

    /// Surface text: token words separated by spaces
    pub fn text(&self) -> String {
        let words: Vec<&str> = self.tokens().filter_map(|n| n.word()).collect();
        words.join(" ")
    }

    /// Single-line bracket notation for the whole tree
    pub fn to_parse(&self) -> String {
        self.root().to_parse()
    }

    /// Indented bracket notation, one constituent per line
    pub fn to_pretty_parse(&self) -> String {
        let mut out = String::new();
        // (node, depth, closing?)
        let mut stack: Vec<(NodeId, usize, bool)> = vec![(0, 0, false)];
        while let Some((id, depth, closing)) = stack.pop() {
            if closing {
                out.push(')');
                continue;
            }
            let node = &self.nodes[id];
            if depth > 0 {
                out.push('\n');
                out.extend(std::iter::repeat_n(' ', depth * 2));
            }
            if let Some(word) = node.word {
                out.push('(');
                out.push_str(self.pool.resolve(node.raw_label));
                out.push(' ');
                out.push_str(self.pool.resolve(word));
                out.push(')');
                continue;
            }
            out.push('(');
            out.push_str(self.pool.resolve(node.raw_label));
            stack.push((id, depth, true));
            for &child in node.children.iter().rev() {
                stack.push((child, depth + 1, false));
            }
        }
        out
    }

    #[inline]
    pub(crate) fn resolve(&self, sym: Sym) -> &str {
        self.pool.resolve(sym)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_parse())
    }
}

/// Borrowed handle to a node of a particular tree
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    #[inline]
    fn data(&self) -> &'a Node {
        &self.tree.nodes[self.id]
    }

    #[inline]
    fn at(&self, id: NodeId) -> NodeRef<'a> {
        NodeRef {
            tree: self.tree,
            id,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// Base category, e.g. `NP` for `NP-SBJ-1`
    pub fn pos(&self) -> &'a str {
        self.tree.resolve(self.data().pos)
    }

    /// Label exactly as it appeared in the bracket text
    pub fn raw_label(&self) -> &'a str {
        self.tree.resolve(self.data().raw_label)
    }

    pub fn word(&self) -> Option<&'a str> {
        self.data().word.map(|w| self.tree.resolve(w))
    }

    pub fn function_tags(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        let tree = self.tree;
        self.data()
            .function_tags
            .iter()
            .map(move |&sym| tree.resolve(sym))
    }

    /// Case-insensitive function tag lookup
    pub fn has_function_tag(&self, tag: &str) -> bool {
        self.function_tags().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn coindices(&self) -> &'a [Coindex] {
        &self.data().coindices
    }

    /// Coindex a trace points at: `*T*-1`, or a coindex on the `-NONE-` label
    pub fn trace_index(&self) -> Option<u32> {
        if !self.is_ec() {
            return None;
        }
        self.word()
            .and_then(trace_index)
            .or_else(|| self.coindices().first().map(|c| c.id))
    }

    pub fn children(&self) -> impl ExactSizeIterator<Item = NodeRef<'a>> + use<'a> {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    pub fn child_ids(&self) -> &'a [NodeId] {
        &self.data().children
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'a>> {
        self.data().children.get(index).map(|&id| self.at(id))
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|id| self.at(id))
    }

    /// Position among the parent's children
    pub fn child_index(&self) -> usize {
        self.data().child_index
    }

    pub fn prev_sibling(&self) -> Option<NodeRef<'a>> {
        let index = self.child_index().checked_sub(1)?;
        self.parent()?.child(index)
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.parent()?.child(self.child_index() + 1)
    }

    pub fn is_root(&self) -> bool {
        self.data().parent.is_none()
    }

    pub fn is_terminal(&self) -> bool {
        self.data().is_terminal()
    }

    /// Terminal carrying a real word
    pub fn is_token(&self) -> bool {
        self.data().token_index.is_some()
    }

    /// Empty-category terminal (`-NONE-`)
    pub fn is_ec(&self) -> bool {
        self.data().empty_category && self.is_terminal()
    }

    pub fn terminal_index(&self) -> Option<usize> {
        self.data().terminal_index
    }

    pub fn token_index(&self) -> Option<usize> {
        self.data().token_index
    }

    /// Lexical head terminal, once heads have been computed
    pub fn head(&self) -> Option<NodeRef<'a>> {
        self.data().head.map(|id| self.at(id))
    }

    pub fn head_word(&self) -> Option<&'a str> {
        self.head()?.word()
    }

    /// The other end of a trace/antecedent or gap/antecedent link
    pub fn indexing_node(&self) -> Option<NodeRef<'a>> {
        self.data().indexing_node.map(|id| self.at(id))
    }

    /// Leaves under this node, including empty categories
    pub fn terminals(&self) -> Vec<NodeRef<'a>> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.id];
        while let Some(id) = stack.pop() {
            let node = &self.tree.nodes[id];
            if node.is_terminal() {
                leaves.push(self.at(id));
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    /// Leaves under this node that carry a real word
    pub fn tokens(&self) -> Vec<NodeRef<'a>> {
        self.terminals()
            .into_iter()
            .filter(|n| n.is_token())
            .collect()
    }

    /// First and last token index covered by this node
    pub fn token_span(&self) -> Option<(usize, usize)> {
        let tokens = self.tokens();
        let first = tokens.first()?.token_index()?;
        let last = tokens.last()?.token_index()?;
        Some((first, last))
    }

    /// Single-line bracket notation for the subtree rooted here
    pub fn to_parse(&self) -> String {
        let tree = self.tree;
        let mut out = String::new();
        // (node, closing?)
        let mut stack: Vec<(NodeId, bool)> = vec![(self.id, false)];
        while let Some((id, closing)) = stack.pop() {
            if closing {
                out.push(')');
                continue;
            }
            let node = &tree.nodes[id];
            if !out.is_empty() {
                out.push(' ');
            }
            out.push('(');
            out.push_str(tree.resolve(node.raw_label));
            match node.word {
                Some(word) => {
                    out.push(' ');
                    out.push_str(tree.resolve(word));
                    out.push(')');
                }
                None => {
                    stack.push((id, true));
                    for &child in node.children.iter().rev() {
                        stack.push((child, false));
                    }
                }
            }
        }
        out
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl Hash for NodeRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.tree, state);
        self.id.hash(state);
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("NodeRef");
        s.field("id", &self.id).field("label", &self.raw_label());
        if let Some(word) = self.word() {
            s.field("word", &word);
        }
        s.finish()
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_parse())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const DOG_TREE: &str =
        "(TOP (S (NP-SBJ (DT The) (NN dog)) (VP (VBD chased) (NP (DT the) (NN cat))) (. .)))";

    #[test]
    fn test_tree_structure() {
        let tree: Tree = DOG_TREE.parse().unwrap();
        let root = tree.root();

        assert_eq!(root.pos(), "TOP");
        assert!(root.is_root());
        assert_eq!(root.child_count(), 1);

        let s = root.child(0).unwrap();
        assert_eq!(s.pos(), "S");
        assert_eq!(s.parent(), Some(root));
        assert_eq!(s.children().len(), 3);

        let subject = s.child(0).unwrap();
        assert_eq!(subject.raw_label(), "NP-SBJ");
        assert_eq!(subject.pos(), "NP");
        assert!(subject.has_function_tag("sbj"));
        assert_eq!(subject.function_tags().collect::<Vec<_>>(), vec!["SBJ"]);

        let vp = s.child(1).unwrap();
        assert_eq!(vp.child_index(), 1);
        assert_eq!(vp.prev_sibling(), Some(subject));
        assert_eq!(vp.next_sibling().map(|n| n.pos()), Some("."));
        assert_eq!(subject.prev_sibling(), None);
    }

    #[test]
    fn test_parent_child_invariant() {
        let tree: Tree = DOG_TREE.parse().unwrap();
        for node in tree.iter() {
            if let Some(parent) = node.parent() {
                assert_eq!(parent.child(node.child_index()), Some(node));
                assert!(parent.id() < node.id());
            } else {
                assert_eq!(node.id(), 0);
            }
        }
    }

    #[test]
    fn test_terminals_and_tokens() {
        let tree: Tree = "(TOP (S (NP-SBJ (-NONE- *PRO*)) (VP (TO to) (VP (VB go)))))"
            .parse()
            .unwrap();

        assert_eq!(tree.terminal_count(), 3);
        assert_eq!(tree.token_count(), 2);

        let ec = tree.terminal(0).unwrap();
        assert!(ec.is_ec());
        assert!(!ec.is_token());
        assert_eq!(ec.word(), Some("*PRO*"));
        assert_eq!(ec.terminal_index(), Some(0));
        assert_eq!(ec.token_index(), None);

        let to = tree.token(0).unwrap();
        assert_eq!(to.word(), Some("to"));
        assert_eq!(to.terminal_index(), Some(1));
        assert_eq!(to.token_index(), Some(0));

        assert_eq!(tree.text(), "to go");
        assert_eq!(tree.root().token_span(), Some((0, 1)));
        assert!(tree.root().child(0).unwrap().child(0).unwrap().token_span().is_none());
    }

    #[test]
    fn test_subtree_terminals() {
        let tree: Tree = DOG_TREE.parse().unwrap();
        let vp = tree.root().child(0).unwrap().child(1).unwrap();
        let words: Vec<_> = vp.terminals().iter().filter_map(|n| n.word()).collect();
        assert_eq!(words, vec!["chased", "the", "cat"]);
        assert_eq!(vp.token_span(), Some((2, 4)));
    }

    #[test]
    fn test_to_parse_round_trip() {
        let tree: Tree = DOG_TREE.parse().unwrap();
        assert_eq!(tree.to_parse(), DOG_TREE);
        assert_eq!(tree.to_string(), DOG_TREE);

        let vp = tree.root().child(0).unwrap().child(1).unwrap();
        assert_eq!(vp.to_parse(), "(VP (VBD chased) (NP (DT the) (NN cat)))");
    }

    #[test]
    fn test_to_pretty_parse() {
        let tree: Tree = "(TOP (S (NP (NN it)) (VP (VBZ works))))".parse().unwrap();
        let pretty = tree.to_pretty_parse();
        assert_eq!(
            pretty,
            "(TOP\n  (S\n    (NP\n      (NN it))\n    (VP\n      (VBZ works))))"
        );
        let reparsed: Tree = pretty.parse().unwrap();
        assert_eq!(reparsed.to_parse(), tree.to_parse());
    }

    #[test]
    fn test_identity_equality() {
        let first: Tree = DOG_TREE.parse().unwrap();
        let second: Tree = DOG_TREE.parse().unwrap();

        let nodes: HashSet<NodeRef> = first.iter().collect();
        assert_eq!(nodes.len(), first.len());

        // Nodes produced by the parser are found
        for token in first.tokens() {
            assert!(nodes.contains(&token));
        }

        // Identical text parsed separately gives distinct nodes
        for token in second.tokens() {
            assert!(!nodes.contains(&token));
        }
        assert_ne!(first.root(), second.root());
        assert_eq!(first.root().raw_label(), second.root().raw_label());

        // Two leaves with the same label and word are still distinct
        let the1 = first.token(0).unwrap();
        let the2 = first.token(3).unwrap();
        assert!(the1.word().unwrap().eq_ignore_ascii_case(the2.word().unwrap()));
        assert_ne!(the1, the2);
    }

    #[test]
    fn test_get_out_of_range() {
        let tree: Tree = DOG_TREE.parse().unwrap();
        assert!(tree.get(tree.len()).is_none());
        assert!(tree.get(0).is_some());
        assert!(tree.terminal(100).is_none());
        assert!(tree.token(100).is_none());
    }
}
