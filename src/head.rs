//! Head percolation
//!
//! Every constituent gets a lexical head: the terminal reached by following
//! head children down from it. Which child is the head child is decided by a
//! [`HeadRules`] table passed in by the caller.

use crate::rules::{HeadRules, SearchDirection};
use crate::tree::{NodeId, NodeRef, Tree};

impl HeadRules {
    /// Child of `node` that carries its head, or `None` for a terminal
    ///
    /// Empty categories are passed over unless every child is one.
    pub fn head_child<'a>(&self, node: NodeRef<'a>) -> Option<NodeRef<'a>> {
        let children = node.child_ids();
        if children.is_empty() {
            return None;
        }

        let tree = node.tree();
        let all_empty = children.iter().all(|&id| tree.node(id).is_ec());
        let candidate = |id: NodeId| all_empty || !tree.node(id).is_ec();

        let pos = node.pos();
        if let Some(rule) = self.get(pos) {
            for (direction, pattern) in &rule.priorities {
                let found = scan(children, *direction, |id| {
                    candidate(id) && pattern.matches(tree.node(id).pos())
                });
                if let Some(id) = found {
                    return Some(tree.node(id));
                }
            }
        }

        scan(children, self.default_direction(pos), candidate).map(|id| tree.node(id))
    }

    /// Head terminal of `node`, computed without touching the tree
    pub fn find_head<'a>(&self, node: NodeRef<'a>) -> NodeRef<'a> {
        let mut current = node;
        while let Some(child) = self.head_child(current) {
            current = child;
        }
        current
    }
}

fn scan(
    children: &[NodeId],
    direction: SearchDirection,
    mut accept: impl FnMut(NodeId) -> bool,
) -> Option<NodeId> {
    match direction {
        SearchDirection::LeftToRight => children.iter().copied().find(|&id| accept(id)),
        SearchDirection::RightToLeft => children.iter().rev().copied().find(|&id| accept(id)),
    }
}

impl Tree {
    /// Set the head of every node
    ///
    /// Terminals head themselves; a constituent takes the head of its head
    /// child. Children always have larger ids than their parents, so one
    /// pass over the arena in reverse sees every child before its parent.
    pub fn find_heads(&mut self, rules: &HeadRules) {
        for id in (0..self.nodes.len()).rev() {
            if self.nodes[id].is_terminal() {
                self.nodes[id].head = Some(id);
                continue;
            }
            let child = rules.head_child(self.node(id)).map(|c| c.id());
            self.nodes[id].head = child.and_then(|c| self.nodes[c].head);
        }
    }

    /// Whether [`Tree::find_heads`] has run
    pub fn has_heads(&self) -> bool {
        self.nodes.first().is_some_and(|root| root.head.is_some())
    }
}

impl<'a> NodeRef<'a> {
    /// Highest ancestor (or self) whose head is this node
    ///
    /// For a terminal this is its maximal projection. Returns the node
    /// itself when heads have not been computed.
    pub fn constituent_by_head(&self) -> NodeRef<'a> {
        let mut current = *self;
        while let Some(parent) = current.parent() {
            if parent.head() != Some(*self) {
                break;
            }
            current = parent;
        }
        current
    }
}
