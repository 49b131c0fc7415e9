use chess_study::{
    pgn,
    tree::{BookmarkConfig, TreeError},
    NodeId, VariationTree,
};

const LINES: &str = "1. e4 e5 (1... c5 2. Nf3 (2. Nc3 Nc6) 2... d6) (1... e6 2. d4 d5) \
                     2. Nf3 Nc6 3. Bb5 (3. Bc4 Bc5) 3... a6 *";

fn sans(tree: &VariationTree, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .skip(1)
        .map(|&id| tree.node(id).expect("node").san().to_owned())
        .collect()
}

fn check_line_ids(tree: &VariationTree) {
    for node in tree.nodes() {
        let line = tree.select_line(node.line_id());
        assert!(line.contains(&node.id()), "{} not on line {}", node.id(), node.line_id());
    }
    for id in tree.main_line() {
        let node = tree.node(id).expect("main line node");
        assert!(node.is_main_line(), "{} has line id {}", id, node.line_id());
    }
}

#[test]
fn test_line_ids_select_their_nodes() {
    let tree = pgn::read(LINES).expect("valid pgn");
    check_line_ids(&tree);

    assert_eq!(sans(&tree, &tree.select_line("1.2.2")), ["e4", "c5", "Nc3", "Nc6"]);
    assert_eq!(sans(&tree, &tree.select_line("1.3")), ["e4", "e6", "d4", "d5"]);
    assert_eq!(
        sans(&tree, &tree.select_line("1.1.2")),
        ["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"]
    );
}

#[test]
fn test_promote_line() {
    let mut tree = pgn::read(LINES).expect("valid pgn");
    let nc3 = tree.select_line("1.2.2")[3];
    assert_eq!(tree.node(nc3).expect("Nc3").san(), "Nc3");

    // The nearest fork where Nc3 is not in front is after c5.
    assert!(tree.promote_line(nc3).expect("known node"));
    assert_eq!(sans(&tree, &tree.select_line("1.2")), ["e4", "c5", "Nc3", "Nc6"]);
    check_line_ids(&tree);

    // Then c5 moves in front of e5.
    assert!(tree.promote_line(nc3).expect("known node"));
    assert_eq!(sans(&tree, &tree.main_line()), ["e4", "c5", "Nc3", "Nc6"]);
    check_line_ids(&tree);

    assert!(!tree.promote_line(nc3).expect("known node"));
    assert_eq!(tree.promote_line(NodeId(999)), Err(TreeError::UnknownNode(NodeId(999))));
}

#[test]
fn test_delete_subtree_drops_bookmarks() {
    let mut tree = pgn::read("1. e4 e5 (1... c5 {[%chf-bkm]} 2. Nf3 {[%chf-bkm]}) 2. Nf3 *")
        .expect("valid pgn");
    assert_eq!(tree.bookmarks().len(), 2);

    let c5 = tree.select_line("1.2")[2];
    let removed = tree.delete_subtree(c5).expect("known node");
    assert_eq!(removed.len(), 2);
    assert!(tree.bookmarks().is_empty());
    assert!(tree.node(c5).is_err());
    assert_eq!(sans(&tree, &tree.main_line()), ["e4", "e5", "Nf3"]);

    // Without the fork the line ids collapse to the main line.
    check_line_ids(&tree);
    assert!(tree.nodes().all(|n| n.line_id() == "1"));

    assert_eq!(tree.delete_subtree(NodeId::ROOT), Err(TreeError::RootHasNoParent));
}

#[test]
fn test_generated_bookmarks() {
    let mut tree = pgn::read("[TrainingSide \"white\"]\n\n1. e4 e5 (1... c5) (1... e6) *")
        .expect("valid pgn");
    assert!(tree.bookmarks().is_empty());

    tree.generate_bookmarks(&BookmarkConfig::default());
    let marked: Vec<&str> = tree
        .bookmarks()
        .iter()
        .map(|&id| tree.node(id).expect("bookmark").san())
        .collect();
    assert_eq!(marked, ["e5", "c5", "e6"]);
    assert!(tree.bookmarks().iter().all(|&id| tree.is_bookmarked(id)));

    tree.clear_bookmarks();
    assert!(tree.nodes().all(|n| !n.is_bookmark()));
}

#[test]
fn test_insert_subtree() {
    let mut tree = pgn::read("1. e4 e5 *").expect("valid pgn");
    let other = pgn::read("1. e4 c5 2. Nf3 *").expect("valid pgn");

    let e4 = tree.main_line()[1];
    let other_e4 = other.main_line()[1];
    let inserted = tree.insert_subtree(e4, &other, other_e4).expect("same position");
    assert_eq!(inserted.len(), 1);
    assert_eq!(sans(&tree, &tree.select_line("1.2")), ["e4", "c5", "Nf3"]);
    check_line_ids(&tree);

    let e5 = tree.main_line()[2];
    assert_eq!(
        tree.insert_subtree(e5, &other, other_e4),
        Err(TreeError::DifferentRoots)
    );
}
