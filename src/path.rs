//! Tree paths and common ancestors
//!
//! Root paths run from a node up to the root, inclusive. Everything else
//! here (lowest common ancestor, up/down path strings, counting constituents
//! between two branches) is built from them with plain loops.

use crate::tree::{NodeId, NodeRef, Tree};

/// Marker for a step towards the root
pub const UP: &str = "↑";
/// Marker for a step away from the root
pub const DOWN: &str = "↓";

impl Tree {
    /// `id`, its parent, ..., the root
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Number of edges between `id` and the root
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Deepest node dominating both `a` and `b` (either may be the answer)
    pub fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> NodeId {
        let path_a = self.path_to_root(a);
        let path_b = self.path_to_root(b);
        path_a
            .iter()
            .rev()
            .zip(path_b.iter().rev())
            .take_while(|(x, y)| x == y)
            .last()
            .map_or(0, |(&lca, _)| lca)
    }

    /// Labels and direction markers from `a` to `b` through their LCA
    ///
    /// `NN ↑ NP ↑ S ↓ VP ↓ NP ↓ NN`, one marker per edge.
    pub fn path_tokens(&self, a: NodeId, b: NodeId) -> Vec<&str> {
        let lca = self.lowest_common_ancestor(a, b);
        let pos = |id: NodeId| self.resolve(self.nodes[id].pos);

        let mut tokens = Vec::new();
        for &id in self.path_to_root(a).iter().take_while(|&&id| id != lca) {
            tokens.push(pos(id));
            tokens.push(UP);
        }
        tokens.push(pos(lca));

        let down = self.path_to_root(b);
        let below = down.iter().position(|&id| id == lca).unwrap_or(down.len());
        for &id in down[..below].iter().rev() {
            tokens.push(DOWN);
            tokens.push(pos(id));
        }
        tokens
    }

    /// [`Tree::path_tokens`] joined into one string, e.g. `NN↑NP↑S↓VP↓NP↓NN`
    pub fn path_string(&self, a: NodeId, b: NodeId) -> String {
        self.path_tokens(a, b).concat()
    }

    /// Count constituents between two branches below `lca`
    ///
    /// `from_path` and `to_path` are root paths. The branch points are the
    /// children of `lca` on each path; the subtrees of the children strictly
    /// between them are searched for nodes whose category starts with
    /// `prefix`, at most `max_depth` levels below each such child (0 looks at
    /// the child alone). Returns 0 when either path has no branch point
    /// below `lca`.
    pub fn count_constituents(
        &self,
        prefix: &str,
        from_path: &[NodeId],
        to_path: &[NodeId],
        lca: NodeId,
        max_depth: usize,
    ) -> usize {
        let (Some(from), Some(to)) = (branch_point(from_path, lca), branch_point(to_path, lca))
        else {
            return 0;
        };

        let from = self.nodes[from].child_index;
        let to = self.nodes[to].child_index;
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };

        let mut count = 0;
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        for &child in self.nodes[lca].children.iter().take(hi).skip(lo + 1) {
            stack.push((child, 0));
            while let Some((id, depth)) = stack.pop() {
                let node = &self.nodes[id];
                if self.resolve(node.pos).starts_with(prefix) {
                    count += 1;
                }
                if depth < max_depth {
                    stack.extend(node.children.iter().map(|&c| (c, depth + 1)));
                }
            }
        }
        count
    }
}

// Child of `lca` on a root path, if the path passes below it
fn branch_point(path: &[NodeId], lca: NodeId) -> Option<NodeId> {
    let at = path.iter().position(|&id| id == lca)?;
    at.checked_sub(1).map(|i| path[i])
}

impl<'a> NodeRef<'a> {
    /// This node, its parent, ..., the root
    pub fn path_to_root(&self) -> Vec<NodeRef<'a>> {
        let tree = self.tree();
        tree.path_to_root(self.id())
            .into_iter()
            .map(|id| tree.node(id))
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.tree().depth(self.id())
    }

    /// Ancestor `levels` steps up (0 is the node itself)
    pub fn ancestor(&self, levels: usize) -> Option<NodeRef<'a>> {
        let mut current = *self;
        for _ in 0..levels {
            current = current.parent()?;
        }
        Some(current)
    }

    /// True if `other` is a proper ancestor of this node
    pub fn is_descendant_of(&self, other: &NodeRef<'_>) -> bool {
        if !std::ptr::eq(self.tree(), other.tree()) {
            return false;
        }
        let mut current = self.parent();
        while let Some(node) = current {
            if node.id() == other.id() {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// `None` when the nodes belong to different trees
    pub fn lowest_common_ancestor(&self, other: &NodeRef<'_>) -> Option<NodeRef<'a>> {
        let tree = self.tree();
        if !std::ptr::eq(tree, other.tree()) {
            return None;
        }
        Some(tree.node(tree.lowest_common_ancestor(self.id(), other.id())))
    }

    /// Path string to `other`, `None` across trees
    pub fn path_string(&self, other: &NodeRef<'_>) -> Option<String> {
        let tree = self.tree();
        std::ptr::eq(tree, other.tree()).then(|| tree.path_string(self.id(), other.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOG_TREE: &str =
        "(TOP (S (NP-SBJ (DT The) (NN dog)) (VP (VBD chased) (NP (DT the) (NN cat))) (. .)))";

    #[test]
    fn test_path_to_root() {
        let tree: Tree = DOG_TREE.parse().unwrap();
        let cat = tree.token(4).unwrap();
        let labels: Vec<_> = cat.path_to_root().iter().map(|n| n.pos()).collect();
        assert_eq!(labels, vec!["NN", "NP", "VP", "S", "TOP"]);
        assert_eq!(cat.depth(), 4);
        assert_eq!(tree.root().depth(), 0);
        assert_eq!(tree.root().path_to_root(), vec![tree.root()]);
    }

    #[test]
    fn test_ancestor_and_descendant() {
        let tree: Tree = DOG_TREE.parse().unwrap();
        let cat = tree.token(4).unwrap();
        assert_eq!(cat.ancestor(0), Some(cat));
        assert_eq!(cat.ancestor(2).map(|n| n.pos()), Some("VP"));
        assert_eq!(cat.ancestor(4), Some(tree.root()));
        assert_eq!(cat.ancestor(5), None);

        let vp = cat.ancestor(2).unwrap();
        assert!(cat.is_descendant_of(&vp));
        assert!(cat.is_descendant_of(&tree.root()));
        assert!(!vp.is_descendant_of(&cat));
        assert!(!cat.is_descendant_of(&cat));

        let other: Tree = DOG_TREE.parse().unwrap();
        assert!(!cat.is_descendant_of(&other.root()));
    }

    #[test]
    fn test_lowest_common_ancestor() {
        let tree: Tree = DOG_TREE.parse().unwrap();
        let dog = tree.token(1).unwrap();
        let cat = tree.token(4).unwrap();
        let the = tree.token(3).unwrap();

        assert_eq!(dog.lowest_common_ancestor(&cat).unwrap().pos(), "S");
        assert_eq!(the.lowest_common_ancestor(&cat).unwrap().pos(), "NP");
        assert_eq!(cat.lowest_common_ancestor(&cat), Some(cat));

        let vp = cat.ancestor(2).unwrap();
        assert_eq!(cat.lowest_common_ancestor(&vp), Some(vp));
        assert_eq!(vp.lowest_common_ancestor(&cat), Some(vp));

        let other: Tree = DOG_TREE.parse().unwrap();
        assert_eq!(cat.lowest_common_ancestor(&other.token(4).unwrap()), None);
    }

    #[test]
    fn test_path_string() {
        let tree: Tree = DOG_TREE.parse().unwrap();
        let dog = tree.token(1).unwrap().id();
        let cat = tree.token(4).unwrap().id();

        assert_eq!(tree.path_string(dog, cat), "NN↑NP↑S↓VP↓NP↓NN");
        assert_eq!(tree.path_string(cat, dog), "NN↑NP↑VP↑S↓NP↓NN");
        assert_eq!(tree.path_string(cat, cat), "NN");

        let vp = tree.token(2).unwrap().parent().unwrap().id();
        assert_eq!(tree.path_string(vp, cat), "VP↓NP↓NN");
        assert_eq!(tree.path_string(cat, vp), "NN↑NP↑VP");
    }

    #[test]
    fn test_path_tokens_well_formed() {
        let tree: Tree = DOG_TREE.parse().unwrap();
        for a in tree.iter() {
            for b in tree.iter() {
                let tokens = tree.path_tokens(a.id(), b.id());
                let lca = tree.lowest_common_ancestor(a.id(), b.id());

                // Labels and markers alternate, starting and ending on a label
                assert_eq!(tokens.len() % 2, 1);
                for (i, token) in tokens.iter().enumerate() {
                    let is_marker = *token == UP || *token == DOWN;
                    assert_eq!(is_marker, i % 2 == 1);
                }

                let markers = tokens.iter().filter(|t| **t == UP || **t == DOWN).count();
                assert_eq!(markers, a.depth() + b.depth() - 2 * tree.depth(lca));

                // Every up-step precedes every down-step
                let first_down = tokens.iter().position(|t| *t == DOWN).unwrap_or(tokens.len());
                assert!(tokens[first_down..].iter().all(|t| *t != UP));

                assert_eq!(tokens.first(), Some(&a.pos()));
                assert_eq!(tokens.last(), Some(&b.pos()));
            }
        }
    }

    #[test]
    fn test_count_constituents() {
        let tree: Tree = "(TOP (S (NP-SBJ (PRP He)) (VP (VBD put) (NP (DT the) (NN book)) \
                          (PP (IN on) (NP (DT the) (NN shelf))) (ADVP (RB quickly)))))"
            .parse()
            .unwrap();

        let put = tree.token(1).unwrap().id();
        let quickly = tree.token(7).unwrap().id();
        let from = tree.path_to_root(put);
        let to = tree.path_to_root(quickly);
        let lca = tree.lowest_common_ancestor(put, quickly);
        assert_eq!(tree.node(lca).pos(), "VP");

        // Between VBD and ADVP: NP and PP
        assert_eq!(tree.count_constituents("NP", &from, &to, lca, 0), 1);
        assert_eq!(tree.count_constituents("NP", &from, &to, lca, 1), 2);
        assert_eq!(tree.count_constituents("N", &from, &to, lca, 2), 4);
        assert_eq!(tree.count_constituents("PP", &from, &to, lca, 5), 1);
        assert_eq!(tree.count_constituents("", &from, &to, lca, 0), 2);

        // Order of the two paths does not matter
        assert_eq!(tree.count_constituents("NP", &to, &from, lca, 1), 2);

        // Adjacent branches have nothing between them
        let book = tree.token(3).unwrap().id();
        let book_path = tree.path_to_root(book);
        assert_eq!(tree.count_constituents("", &from, &book_path, lca, 10), 0);
    }

    #[test]
    fn test_count_constituents_dominating() {
        let tree: Tree = DOG_TREE.parse().unwrap();
        let cat = tree.token(4).unwrap().id();
        let vp = tree.token(2).unwrap().parent().unwrap().id();
        let from = tree.path_to_root(vp);
        let to = tree.path_to_root(cat);
        // vp dominates cat, so it is its own LCA and has no branch point
        assert_eq!(tree.count_constituents("", &from, &to, vp, 5), 0);
    }
}
