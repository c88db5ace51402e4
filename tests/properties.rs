//! Property-based tests over generated bracket trees
//!
//! Generated text is already in the single-line form `to_parse` writes, so
//! printing a parsed tree must give back exactly the input.

use proptest::prelude::*;
use tbtree::path::{DOWN, UP};
use tbtree::{HeadRules, Tree};

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (
            prop::sample::select(vec!["NN", "NNS", "VB", "VBD", "DT", "JJ", "IN", "."]),
            "[a-z]{1,6}",
        )
            .prop_map(|(tag, word)| format!("({} {})", tag, word)),
        1 => Just("(-NONE- *)".to_string()),
    ]
}

fn constituent() -> impl Strategy<Value = String> {
    leaf().prop_recursive(5, 48, 4, |inner| {
        (
            prop::sample::select(vec!["S", "NP", "NP-SBJ", "VP", "PP", "PP-LOC", "SBAR", "ADJP"]),
            prop::collection::vec(inner, 1..4),
        )
            .prop_map(|(label, children)| format!("({} {})", label, children.join(" ")))
    })
}

fn tree_text() -> impl Strategy<Value = String> {
    constituent().prop_map(|body| format!("(TOP {})", body))
}

proptest! {
    #[test]
    fn prop_to_parse_reproduces_input(text in tree_text()) {
        let tree: Tree = text.parse().unwrap();
        prop_assert_eq!(tree.to_parse(), text);
    }

    #[test]
    fn prop_pretty_parse_round_trips(text in tree_text()) {
        let tree: Tree = text.parse().unwrap();
        let again: Tree = tree.to_pretty_parse().parse().unwrap();
        prop_assert_eq!(again.to_parse(), tree.to_parse());
        prop_assert_eq!(again.len(), tree.len());
    }

    #[test]
    fn prop_leaf_indices_are_contiguous(text in tree_text()) {
        let tree: Tree = text.parse().unwrap();

        for (i, terminal) in tree.terminals().enumerate() {
            prop_assert_eq!(terminal.terminal_index(), Some(i));
            prop_assert!(terminal.is_terminal());
        }
        for (i, token) in tree.tokens().enumerate() {
            prop_assert_eq!(token.token_index(), Some(i));
            prop_assert!(!token.is_ec());
        }

        let ecs = tree.terminals().filter(|n| n.is_ec()).count();
        prop_assert_eq!(tree.token_count() + ecs, tree.terminal_count());
        prop_assert_eq!(tree.terminal_count(), count_leaves(&text));
    }

    #[test]
    fn prop_paths_are_well_formed(text in tree_text()) {
        let tree: Tree = text.parse().unwrap();
        let nodes: Vec<_> = tree.iter().collect();

        for a in nodes.iter().step_by(3) {
            for b in nodes.iter().step_by(2) {
                let lca = a.lowest_common_ancestor(b).unwrap();
                prop_assert!(lca == *a || a.is_descendant_of(&lca));
                prop_assert!(lca == *b || b.is_descendant_of(&lca));

                let path = a.path_string(b).unwrap();
                prop_assert!(path.starts_with(a.pos()));
                prop_assert!(path.ends_with(b.pos()));
                prop_assert_eq!(path.matches(UP).count(), a.depth() - lca.depth());
                prop_assert_eq!(path.matches(DOWN).count(), b.depth() - lca.depth());
            }
        }
    }

    #[test]
    fn prop_heads_are_dominated_terminals(text in tree_text()) {
        let mut tree: Tree = text.parse().unwrap();
        tree.find_heads(&HeadRules::english());
        prop_assert!(tree.has_heads());

        for node in tree.iter() {
            let head = node.head().unwrap();
            prop_assert!(head.is_terminal());
            if node.is_terminal() {
                prop_assert_eq!(head, node);
            } else {
                prop_assert!(head.is_descendant_of(&node));
            }
        }
    }
}

// A leaf is the only bracket that closes right after a word
fn count_leaves(text: &str) -> usize {
    let bytes = text.as_bytes();
    (1..bytes.len())
        .filter(|&i| bytes[i] == b')' && bytes[i - 1] != b')')
        .count()
}
