//! Terminal and token indices
//!
//! Two dense index spaces over the leaves of a finished tree: terminal
//! indices count every leaf (empty categories included), token indices count
//! only leaves with a real word. The flat id arrays on [`Tree`] are filled in
//! the same pass for constant-time positional lookup.

use crate::tree::Tree;

impl Tree {
    /// Assign terminal/token indices and cache the leaf arrays
    ///
    /// Relies on the arena being in document order, so leaves are visited
    /// left to right by walking ids in increasing order.
    pub(crate) fn build_indices(&mut self) {
        self.terminals.clear();
        self.tokens.clear();

        for (id, node) in self.nodes.iter_mut().enumerate() {
            if !node.is_terminal() {
                node.terminal_index = None;
                node.token_index = None;
                continue;
            }

            node.terminal_index = Some(self.terminals.len());
            self.terminals.push(id);

            if node.empty_category {
                node.token_index = None;
            } else {
                node.token_index = Some(self.tokens.len());
                self.tokens.push(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::Tree;

    #[test]
    fn test_index_contiguity() {
        let tree: Tree = "(TOP (S (NP-SBJ-1 (NNP John)) (VP (VBD tried) (S (NP-SBJ (-NONE- *-1)) \
                          (VP (TO to) (VP (VB leave) (NP (-NONE- *T*-2))))))))"
            .parse()
            .unwrap();

        let terminals: Vec<_> = tree.terminals().collect();
        let tokens: Vec<_> = tree.tokens().collect();

        assert_eq!(terminals.len(), 6);
        assert_eq!(tokens.len(), 4);

        for (i, node) in terminals.iter().enumerate() {
            assert_eq!(node.terminal_index(), Some(i));
            assert!(node.is_terminal());
        }
        for (i, node) in tokens.iter().enumerate() {
            assert_eq!(node.token_index(), Some(i));
            assert!(!node.is_ec());
        }

        // Strictly increasing in left-to-right order
        assert!(terminals.windows(2).all(|w| w[0].id() < w[1].id()));

        let words: Vec<_> = tokens.iter().filter_map(|n| n.word()).collect();
        assert_eq!(words, vec!["John", "tried", "to", "leave"]);

        // Non-terminals carry no index
        assert_eq!(tree.root().terminal_index(), None);
        assert_eq!(tree.root().token_index(), None);
    }

    #[test]
    fn test_empty_category_with_label_index_is_not_a_token() {
        let tree: Tree = "(TOP (S (NP (-NONE--1 *)) (VP (VBZ works))))"
            .parse()
            .unwrap();
        assert_eq!(tree.terminal_count(), 2);
        assert_eq!(tree.token_count(), 1);
        assert_eq!(tree.token(0).and_then(|n| n.word()), Some("works"));
    }
}
