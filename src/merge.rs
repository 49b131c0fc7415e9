// This file is part of the chess-study library.
// Copyright (C) 2017-2025 Niklas Fiekas <niklas.fiekas@backscattering.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Union of variation trees.
//!
//! Two trees starting from the same position are merged by walking both
//! in parallel. Children are matched by position (FEN without move
//! counters). A continuation found in both trees appears once, with the
//! comments of both. A continuation found in only one tree is copied over
//! with everything that follows it.
//!
//! When merging a list of trees with [`merge_all()`], the lines at each
//! fork can be reordered by how many of the input trees reach them.
//!
//! # Examples
//!
//! ```
//! use chess_study::{merge::{merge, MergeConfig}, tree::VariationTree, NodeId};
//!
//! let mut a = VariationTree::new();
//! let e4 = a.add_move(NodeId::ROOT, "e4")?;
//! a.add_move(e4, "e5")?;
//!
//! let mut b = VariationTree::new();
//! let e4 = b.add_move(NodeId::ROOT, "e4")?;
//! b.add_move(e4, "c5")?;
//!
//! let merged = merge(&a, &b, &MergeConfig::default())?;
//! assert_eq!(merged.node_count(), 4);
//! # Ok::<_, chess_study::tree::TreeError>(())
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::{
    node::{NodeId, TreeNode},
    tree::{TreeError, VariationTree},
};

/// Options for [`merge()`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MergeConfig {
    /// Moves more than this many plies from the root are left out of the
    /// result. `None`, the default, keeps everything.
    pub max_depth: Option<usize>,
    /// After [`merge_all()`], order the children of every fork by how often
    /// their positions occur in the input trees, most frequent first.
    pub reorder_lines: bool,
}

/// Positions are counted and reordered up to this move number.
const FREQUENCY_DEPTH: u32 = 15;

fn join_comments(target: &mut Option<String>, other: Option<&str>) {
    let Some(other) = other.filter(|c| !c.is_empty()) else {
        return;
    };
    match target.as_mut() {
        Some(comment) if *comment == other => (),
        Some(comment) if !comment.is_empty() => {
            comment.push_str("; ");
            comment.push_str(other);
        }
        _ => *target = Some(other.to_owned()),
    }
}

/// Combines the annotations of a node of the second tree into the merged
/// copy of the matching node of the first tree.
fn absorb(target: &mut TreeNode, other: &TreeNode) {
    join_comments(&mut target.comment, other.comment.as_deref());
    join_comments(
        &mut target.comment_before_move,
        other.comment_before_move.as_deref(),
    );
    if target.nags.is_empty() {
        target.nags.clone_from(&other.nags);
    }
    if target.engine_evaluation.is_none() {
        target.engine_evaluation.clone_from(&other.engine_evaluation);
    }
    if target.assessment.is_none() {
        target.assessment.clone_from(&other.assessment);
    }
}

/// Merges two trees that start from the same position.
///
/// The result starts with a copy of the root of `a` and carries the
/// headers of `a`. Continuations keep the order of `a`, followed by those
/// only found in `b`.
///
/// # Errors
///
/// Returns [`TreeError::DifferentRoots`] if the roots hold different
/// positions.
pub fn merge(
    a: &VariationTree,
    b: &VariationTree,
    config: &MergeConfig,
) -> Result<VariationTree, TreeError> {
    if a.root().position().short_fen() != b.root().position().short_fen() {
        return Err(TreeError::DifferentRoots);
    }

    let mut merged = VariationTree::from_position(a.root().position().clone());
    *merged.headers_mut() = a.headers().clone();
    {
        let root = merged.node_mut(NodeId::ROOT)?;
        let line_id = std::mem::take(&mut root.line_id);
        *root = a.root().detached_copy(NodeId::ROOT, None);
        root.line_id = line_id;
        absorb(root, b.root());
    }

    let mut stack = vec![(NodeId::ROOT, NodeId::ROOT, NodeId::ROOT, 0)];
    while let Some((at, in_a, in_b, depth)) = stack.pop() {
        if config.max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        let remaining = config.max_depth.map(|max| max - depth);

        let b_children: Vec<(String, NodeId)> = b
            .node(in_b)?
            .children()
            .iter()
            .filter_map(|&c| b.get(c))
            .map(|n| (n.position().short_fen(), n.id()))
            .collect();
        let mut matched = Vec::with_capacity(b_children.len());

        for &child_a in a.node(in_a)?.children() {
            let node_a = a.node(child_a)?;
            let key = node_a.position().short_fen();
            match b_children.iter().find(|(k, _)| *k == key) {
                Some(&(_, child_b)) => {
                    matched.push(child_b);
                    let Some(shared) = merged.graft(at, a, child_a, Some(1))? else {
                        continue;
                    };
                    absorb(merged.node_mut(shared)?, b.node(child_b)?);
                    debug!(a = %child_a, b = %child_b, merged = %shared, "merged shared move");
                    stack.push((shared, child_a, child_b, depth + 1));
                }
                None => {
                    if let Some(copy) = merged.graft(at, a, child_a, remaining)? {
                        debug!(from = %child_a, merged = %copy, "copied line of first tree");
                    }
                }
            }
        }

        for (_, child_b) in b_children {
            if !matched.contains(&child_b) {
                if let Some(copy) = merged.graft(at, b, child_b, remaining)? {
                    debug!(from = %child_b, merged = %copy, "copied line of second tree");
                }
            }
        }
    }

    merged.build_lines();
    Ok(merged)
}

/// Merges a list of trees, from left to right. Returns `None` for an empty
/// list.
///
/// # Errors
///
/// Returns [`TreeError::DifferentRoots`] if not all trees start from the
/// same position.
pub fn merge_all<'a, I>(trees: I, config: &MergeConfig) -> Result<Option<VariationTree>, TreeError>
where
    I: IntoIterator<Item = &'a VariationTree>,
{
    let mut trees = trees.into_iter();
    let Some(first) = trees.next() else {
        return Ok(None);
    };
    let mut counts = HashMap::new();
    if config.reorder_lines {
        count_positions(first, config.max_depth, &mut counts);
    }
    let mut merged = first.clone();
    for tree in trees {
        if config.reorder_lines {
            count_positions(tree, config.max_depth, &mut counts);
        }
        merged = merge(&merged, tree, config)?;
    }
    if config.reorder_lines {
        order_by_frequency(&mut merged, &counts);
        merged.build_lines();
    }
    Ok(Some(merged))
}

fn count_positions(tree: &VariationTree, max_depth: Option<usize>, counts: &mut HashMap<String, u32>) {
    let mut stack = vec![(NodeId::ROOT, 0)];
    while let Some((id, depth)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        if max_depth.is_some_and(|max| depth > max) || node.move_number() > FREQUENCY_DEPTH {
            continue;
        }
        *counts.entry(node.position().short_fen()).or_insert(0) += 1;
        stack.extend(node.children().iter().map(|&c| (c, depth + 1)));
    }
}

fn order_by_frequency(tree: &mut VariationTree, counts: &HashMap<String, u32>) {
    let mut stack = vec![NodeId::ROOT];
    while let Some(id) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        if node.move_number() >= FREQUENCY_DEPTH {
            continue;
        }
        let mut keyed: Vec<(u32, NodeId)> = node
            .children()
            .iter()
            .filter_map(|&c| tree.get(c))
            .map(|c| (counts.get(&c.position().short_fen()).copied().unwrap_or(0), c.id()))
            .collect();
        stack.extend(keyed.iter().map(|&(_, c)| c));
        if keyed.len() > 1 {
            // Stable, so ties keep the merge order.
            keyed.sort_by(|x, y| y.0.cmp(&x.0));
            if let Some(node) = tree.get_mut(id) {
                node.children = keyed.into_iter().map(|(_, c)| c).collect();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::BoardPosition;

    fn tree_with(lines: &[&[&str]]) -> VariationTree {
        let mut tree = VariationTree::new();
        for line in lines {
            let mut at = NodeId::ROOT;
            for san in *line {
                at = tree.add_move(at, san).expect("legal");
            }
        }
        tree
    }

    /// Every line of the tree, as space separated moves.
    fn lines(tree: &VariationTree) -> HashSet<String> {
        tree.nodes()
            .filter(|n| n.children().is_empty())
            .map(|leaf| {
                tree.path_to(leaf.id())
                    .expect("path")
                    .into_iter()
                    .skip(1)
                    .map(|id| tree.node(id).expect("node").san().to_owned())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    /// Every node's line id, keyed by the moves leading to it.
    fn line_ids(tree: &VariationTree) -> HashSet<(String, String)> {
        tree.nodes()
            .map(|node| {
                let path = tree
                    .path_to(node.id())
                    .expect("path")
                    .into_iter()
                    .skip(1)
                    .map(|id| tree.node(id).expect("node").san().to_owned())
                    .collect::<Vec<_>>()
                    .join(" ");
                (path, node.line_id().to_owned())
            })
            .collect()
    }

    fn assert_no_duplicate_children(tree: &VariationTree) {
        for node in tree.nodes() {
            let keys: HashSet<String> = node
                .children()
                .iter()
                .map(|&c| tree.node(c).expect("child").position().short_fen())
                .collect();
            assert_eq!(keys.len(), node.children().len());
        }
    }

    #[test]
    fn test_merge_with_itself() {
        let tree = tree_with(&[
            &["e4", "e5", "Nf3", "Nc6"],
            &["e4", "c5", "Nf3", "d6"],
            &["d4", "d5"],
        ]);
        let merged = merge(&tree, &tree, &MergeConfig::default()).expect("same root");
        assert_eq!(merged.node_count(), tree.node_count());
        assert_eq!(lines(&merged), lines(&tree));
        assert_eq!(line_ids(&merged), line_ids(&tree));
    }

    #[test]
    fn test_merge_union() {
        let a = tree_with(&[&["e4", "e5", "Nf3"], &["d4"]]);
        let b = tree_with(&[&["e4", "c5"], &["e4", "e5", "Bc4"], &["c4"]]);
        let merged = merge(&a, &b, &MergeConfig::default()).expect("same root");

        let expected: HashSet<String> = ["e4 e5 Nf3", "e4 e5 Bc4", "e4 c5", "d4", "c4"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(lines(&merged), expected);
        assert_no_duplicate_children(&merged);

        // Order of the first tree, then the rest of the second.
        let order: Vec<&str> = merged
            .root()
            .children()
            .iter()
            .map(|&c| merged.node(c).expect("child").san())
            .collect();
        assert_eq!(order, ["e4", "d4", "c4"]);
    }

    #[test]
    fn test_merge_matches_siblings_only() {
        // Both reach the same position after three plies, by different
        // first moves.
        let a = tree_with(&[&["Nf3", "Nf6", "d4"]]);
        let b = tree_with(&[&["d4", "Nf6", "Nf3", "d5"]]);
        let merged = merge(&a, &b, &MergeConfig::default()).expect("same root");
        let expected: HashSet<String> = ["Nf3 Nf6 d4", "d4 Nf6 Nf3 d5"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(lines(&merged), expected);
    }

    #[test]
    fn test_merge_comments() {
        let mut a = tree_with(&[&["e4"]]);
        let mut b = tree_with(&[&["e4"]]);
        let e4_a = a.root().children()[0];
        let e4_b = b.root().children()[0];
        a.node_mut(e4_a).expect("e4").comment = Some("best by test".to_owned());
        b.node_mut(e4_b).expect("e4").comment = Some("king pawn".to_owned());
        b.node_mut(NodeId::ROOT).expect("root").comment = Some("intro".to_owned());

        let merged = merge(&a, &b, &MergeConfig::default()).expect("same root");
        let e4 = merged.root().children()[0];
        assert_eq!(
            merged.node(e4).expect("e4").comment.as_deref(),
            Some("best by test; king pawn")
        );
        assert_eq!(merged.root().comment.as_deref(), Some("intro"));
    }

    #[test]
    fn test_merge_max_depth() {
        let a = tree_with(&[&["e4", "e5", "Nf3"]]);
        let b = tree_with(&[&["e4", "c5", "Nf3"], &["d4", "d5"]]);
        let config = MergeConfig {
            max_depth: Some(2),
            ..MergeConfig::default()
        };
        let merged = merge(&a, &b, &config).expect("same root");
        let expected: HashSet<String> = ["e4 e5", "e4 c5", "d4 d5"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(lines(&merged), expected);
    }

    #[test]
    fn test_different_roots() {
        let a = VariationTree::new();
        let mut pos = BoardPosition::new();
        pos.play_san("e4").expect("legal");
        let b = VariationTree::from_position(pos);
        assert_eq!(
            merge(&a, &b, &MergeConfig::default()).map(|t| t.node_count()),
            Err(TreeError::DifferentRoots)
        );
    }

    #[test]
    fn test_merge_all() {
        let trees = [
            tree_with(&[&["e4"]]),
            tree_with(&[&["d4"]]),
            tree_with(&[&["e4", "e5"]]),
        ];
        let merged = merge_all(&trees, &MergeConfig::default())
            .expect("same root")
            .expect("non-empty");
        let expected: HashSet<String> =
            ["e4 e5", "d4"].into_iter().map(str::to_owned).collect();
        assert_eq!(lines(&merged), expected);
        assert!(merge_all(&[] as &[VariationTree], &MergeConfig::default()).expect("empty").is_none());
    }

    #[test]
    fn test_merge_all_reorders_by_frequency() {
        let trees = [
            tree_with(&[&["e4", "e5"], &["d4"]]),
            tree_with(&[&["d4", "d5"]]),
            tree_with(&[&["d4", "Nf6"], &["e4", "c5"]]),
        ];
        let root_order = |tree: &VariationTree| -> Vec<String> {
            tree.root()
                .children()
                .iter()
                .map(|&c| tree.node(c).expect("child").san().to_owned())
                .collect()
        };

        let plain = merge_all(&trees, &MergeConfig::default())
            .expect("same root")
            .expect("non-empty");
        assert_eq!(root_order(&plain), ["e4", "d4"]);

        let config = MergeConfig {
            reorder_lines: true,
            ..MergeConfig::default()
        };
        let reordered = merge_all(&trees, &config).expect("same root").expect("non-empty");
        assert_eq!(root_order(&reordered), ["d4", "e4"]);
        assert_eq!(lines(&reordered), lines(&plain));
        let d4 = reordered.root().children()[0];
        assert_eq!(reordered.node(d4).expect("d4").line_id(), "1.1");
    }
}
