use std::collections::HashSet;

use chess_study::{
    merge::{merge, merge_all, MergeConfig},
    pgn, NodeId, TreeError, VariationTree,
};

fn assert_unique_siblings(tree: &VariationTree) {
    for node in tree.nodes() {
        let positions: HashSet<String> = node
            .children()
            .iter()
            .map(|&c| tree.node(c).expect("child").position().short_fen())
            .collect();
        assert_eq!(positions.len(), node.children().len(), "duplicate after {}", node.move_text());
    }
}

/// Every leaf, as the sequence of moves leading to it.
fn leaves(tree: &VariationTree) -> HashSet<Vec<String>> {
    tree.nodes()
        .filter(|n| n.children().is_empty())
        .map(|leaf| {
            tree.path_to(leaf.id())
                .expect("live node")
                .into_iter()
                .skip(1)
                .map(|id| tree.node(id).expect("live node").san().to_owned())
                .collect()
        })
        .collect()
}

#[test]
fn test_merge_pgn_repertoires() {
    let open = pgn::read("[Title \"Open\"]\n\n1. e4 e5 (1... c5) 2. Nf3 *").expect("valid pgn");
    let sicilian = pgn::read("1. e4 {King pawn} c5 2. Nf3 (2. Nc3) *").expect("valid pgn");

    let merged = merge(&open, &sicilian, &MergeConfig::default()).expect("same root");
    assert_unique_siblings(&merged);
    assert_eq!(merged.title(), Some("Open"));
    assert_eq!(
        pgn::write(&merged),
        concat!(
            "[Title \"Open\"]\n",
            "[Result \"*\"]\n",
            "\n",
            "1. e4 {King pawn} e5 ( 1... c5 2. Nf3 ( 2. Nc3 ) ) 2. Nf3 *\n",
            "\n",
        )
    );

    for node in merged.nodes() {
        assert!(merged.select_line(node.line_id()).contains(&node.id()));
    }
}

#[test]
fn test_merge_is_idempotent() {
    let tree = pgn::read("1. d4 d5 (1... Nf6 2. c4 e6 (2... g6)) 2. c4 *").expect("valid pgn");
    let merged = merge(&tree, &tree, &MergeConfig::default()).expect("same root");
    assert_eq!(merged.node_count(), tree.node_count());
    assert_eq!(leaves(&merged), leaves(&tree));
    assert_eq!(pgn::write(&merged), pgn::write(&tree));
}

#[test]
fn test_merge_from_position() {
    let fen = "[FEN \"rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2\"]\n\n";
    let a = pgn::read(&format!("{fen}2. Nf3 d6 *")).expect("valid pgn");
    let b = pgn::read(&format!("{fen}2. Nc3 Nc6 *")).expect("valid pgn");
    let merged = merge_all([&a, &b], &MergeConfig::default())
        .expect("same root")
        .expect("non-empty");

    let expected: HashSet<Vec<String>> = [vec!["Nf3", "d6"], vec!["Nc3", "Nc6"]]
        .into_iter()
        .map(|line| line.into_iter().map(str::to_owned).collect())
        .collect();
    assert_eq!(leaves(&merged), expected);
    assert_eq!(merged.root().position(), a.root().position());

    let start = VariationTree::new();
    assert_eq!(
        merge(&start, &a, &MergeConfig::default()).map(|t| t.node_count()),
        Err(TreeError::DifferentRoots)
    );
    assert!(merged.node(NodeId::ROOT).is_ok());
}

#[test]
fn test_merge_all_puts_popular_lines_first() {
    let trees = [
        pgn::read("1. e4 e5 2. Nf3 *").expect("valid pgn"),
        pgn::read("1. e4 c5 2. Nf3 d6 *").expect("valid pgn"),
        pgn::read("1. e4 c5 2. Nc3 *").expect("valid pgn"),
    ];
    let config = MergeConfig {
        reorder_lines: true,
        ..MergeConfig::default()
    };
    let merged = merge_all(&trees, &config).expect("same root").expect("non-empty");
    assert_unique_siblings(&merged);
    assert_eq!(
        pgn::write(&merged),
        concat!(
            "[Result \"*\"]\n",
            "\n",
            "1. e4 c5 ( 1... e5 2. Nf3 ) 2. Nf3 ( 2. Nc3 ) 2... d6 *\n",
            "\n",
        )
    );

    // Without reordering the first tree's reply stays in front.
    let merged = merge_all(&trees, &MergeConfig::default()).expect("same root").expect("non-empty");
    let e4 = merged.root().children()[0];
    let first_reply = merged.node(e4).expect("e4").children()[0];
    assert_eq!(merged.node(first_reply).expect("reply").san(), "e5");
}
