//! Read a treebank file and print a summary of each tree
//!
//! ```text
//! RUST_LOG=tbtree=debug cargo run --example read_corpus -- tests/data/wsj_sample.mrg
//! ```

use std::env;
use std::process::ExitCode;
use tbtree::{HeadRules, Treebank};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: read_corpus <file.mrg[.gz]> [head-rules]");
        return ExitCode::FAILURE;
    };

    let rules = match env::args().nth(2) {
        Some(rules_path) => match HeadRules::from_file(&rules_path) {
            Ok(rules) => rules,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => HeadRules::english(),
    };

    let mut trees = match Treebank::from_file(&path).threaded_trees() {
        Ok(trees) => trees,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let (mut count, mut tokens, mut links) = (0, 0, 0);
    for result in trees.by_ref() {
        let mut tree = match result {
            Ok(tree) => tree,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        };
        tree.find_heads(&rules);

        let root = tree.root();
        let first = tree.token(0);
        let last = tree.token_count().checked_sub(1).and_then(|i| tree.token(i));
        let path = match (first, last) {
            (Some(a), Some(b)) => a.path_string(&b).unwrap_or_default(),
            _ => String::new(),
        };
        println!(
            "{:>4}  head={:<12} {}",
            tree.index(),
            root.head_word().unwrap_or("-"),
            path
        );

        count += 1;
        tokens += tree.token_count();
        links += tree.iter().filter(|n| n.indexing_node().is_some()).count();
    }

    println!(
        "{} trees, {} tokens, {} coindexed nodes, {} skipped",
        count,
        tokens,
        links,
        trees.skipped()
    );
    ExitCode::SUCCESS
}
