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

//! A tree of moves with variations, annotations and bookmarks.
//!
//! Nodes live in an arena indexed by [`NodeId`]. The root is the starting
//! position of the study and has id `0`. Every other node holds the
//! position after one move and links to its parent and its ordered
//! children. The first child continues the current line, further children
//! are alternatives.
//!
//! # Examples
//!
//! ```
//! use chess_study::{tree::VariationTree, NodeId};
//!
//! let mut tree = VariationTree::new();
//! let e4 = tree.add_move(NodeId::ROOT, "e4")?;
//! let e5 = tree.add_move(e4, "e5")?;
//! let c5 = tree.add_move(e4, "c5")?;
//!
//! assert_eq!(tree.node(e5)?.line_id(), "1.1");
//! assert_eq!(tree.node(c5)?.line_id(), "1.2");
//!
//! tree.promote_line(c5)?;
//! assert_eq!(tree.node(c5)?.line_id(), "1.1");
//! # Ok::<_, chess_study::tree::TreeError>(())
//! ```

use std::{error::Error, fmt};

use rand::{seq::IndexedRandom, Rng};
use tracing::debug;

use crate::{
    errors::{MoveError, MoveErrorKind},
    node::{NodeId, TreeNode},
    san::SanPlus,
    uci::Uci,
    BoardPosition, Color, Move,
};

/// Error when looking up or editing nodes of a [`VariationTree`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TreeError {
    /// No live node has the given id.
    UnknownNode(NodeId),
    /// The operation needs a parent, but was applied to the root.
    RootHasNoParent,
    /// The move could not be resolved or is illegal.
    Move(MoveError),
    /// Two trees (or subtrees) do not start from the same position.
    DifferentRoots,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TreeError::UnknownNode(id) => write!(f, "unknown node {id}"),
            TreeError::RootHasNoParent => f.write_str("root has no parent"),
            TreeError::Move(ref err) => write!(f, "{err}"),
            TreeError::DifferentRoots => f.write_str("trees start from different positions"),
        }
    }
}

impl Error for TreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            TreeError::Move(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<MoveError> for TreeError {
    fn from(err: MoveError) -> TreeError {
        TreeError::Move(err)
    }
}

/// Header tags of a study, in insertion order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub const TITLE: &'static str = "Title";
    pub const TRAINING_SIDE: &'static str = "TrainingSide";
    pub const RESULT: &'static str = "Result";
    pub const FEN: &'static str = "FEN";

    pub fn new() -> Headers {
        Headers::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a header, keeping its original place if it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Limits for [`VariationTree::generate_bookmarks()`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BookmarkConfig {
    /// Stop adding bookmarks once the tree has this many. Default `9`.
    pub max_bookmarks: usize,
}

impl Default for BookmarkConfig {
    fn default() -> BookmarkConfig {
        BookmarkConfig { max_bookmarks: 9 }
    }
}

/// A study: a tree of moves from a starting position, with headers and
/// bookmarks.
#[derive(Clone, Debug)]
pub struct VariationTree {
    nodes: Vec<Option<TreeNode>>,
    headers: Headers,
    bookmarks: Vec<NodeId>,
}

impl Default for VariationTree {
    fn default() -> VariationTree {
        VariationTree::new()
    }
}

impl VariationTree {
    /// A tree rooted at the standard starting position.
    pub fn new() -> VariationTree {
        VariationTree::from_position(BoardPosition::new())
    }

    pub fn from_position(position: BoardPosition) -> VariationTree {
        let mut root = TreeNode::new(NodeId::ROOT, None, position);
        root.line_id = "1".to_owned();
        VariationTree {
            nodes: vec![Some(root)],
            headers: Headers::new(),
            bookmarks: Vec::new(),
        }
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn title(&self) -> Option<&str> {
        self.headers.get(Headers::TITLE)
    }

    /// The side the user trains, from the `TrainingSide` header.
    pub fn training_side(&self) -> Option<Color> {
        let side = self.headers.get(Headers::TRAINING_SIDE)?;
        if side.eq_ignore_ascii_case("white") {
            Some(Color::White)
        } else if side.eq_ignore_ascii_case("black") {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn set_training_side(&mut self, side: Option<Color>) {
        let value = match side {
            Some(Color::White) => "white",
            Some(Color::Black) => "black",
            None => "none",
        };
        self.headers.set(Headers::TRAINING_SIDE, value);
    }

    pub fn result(&self) -> Option<&str> {
        self.headers.get(Headers::RESULT)
    }

    pub fn root(&self) -> &TreeNode {
        match self.nodes.first() {
            Some(Some(root)) => root,
            _ => unreachable!("the root is never removed"),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Looks up a node by id.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if there is no such node, or it
    /// was deleted.
    pub fn node(&self, id: NodeId) -> Result<&TreeNode, TreeError> {
        self.get(id).ok_or(TreeError::UnknownNode(id))
    }

    /// Looks up a node by id, for editing its annotations.
    ///
    /// # Errors
    ///
    /// See [`VariationTree::node()`].
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode, TreeError> {
        self.get_mut(id).ok_or(TreeError::UnknownNode(id))
    }

    /// Iterates over all live nodes in order of their ids.
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        self.nodes.iter().flatten()
    }

    /// The number of live nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len() as u32)
    }

    /// Appends a node as the last child of `parent`, without recomputing
    /// line ids.
    fn attach(
        &mut self,
        parent: NodeId,
        make: impl FnOnce(NodeId) -> TreeNode,
    ) -> Result<NodeId, TreeError> {
        let id = self.next_id();
        self.node_mut(parent)?.children.push(id);
        self.nodes.push(Some(make(id)));
        Ok(id)
    }

    /// Adds a resolved legal move as the last child of `parent`, without
    /// looking for an existing child and without recomputing line ids.
    pub(crate) fn push_move(&mut self, parent: NodeId, m: Move) -> Result<NodeId, TreeError> {
        let mut position = self.node(parent)?.position.clone();
        let san = SanPlus::from_move_and_play_unchecked(&mut position, m);
        self.attach(parent, |id| {
            let mut node = TreeNode::new(id, Some(parent), position);
            node.last_move = Some(m);
            node.san = san.to_string();
            node
        })
    }

    /// Adds a move as a child of `parent`. If `parent` already has a child
    /// with that move, no node is created and the existing child is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Move`] if the move is not legal.
    pub fn add(&mut self, parent: NodeId, m: Move) -> Result<NodeId, TreeError> {
        let node = self.node(parent)?;
        if let Some(&existing) = node
            .children
            .iter()
            .find(|&&c| self.get(c).and_then(TreeNode::last_move) == Some(m))
        {
            return Ok(existing);
        }
        if !m.is_null() && !node.position.is_legal(m) {
            let kind = if m.is_castle() {
                MoveErrorKind::IllegalCastling
            } else {
                MoveErrorKind::NoSuchMove
            };
            return Err(MoveError::new(kind, Uci::from_move(m).to_string())
                .with_parent(node.move_text())
                .into());
        }
        let id = self.push_move(parent, m)?;
        self.build_lines();
        Ok(id)
    }

    /// Adds a move in algebraic notation as a child of `parent`, like
    /// [`VariationTree::add()`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Move`] if the notation is invalid or does not
    /// resolve to exactly one legal move.
    pub fn add_move(&mut self, parent: NodeId, san: &str) -> Result<NodeId, TreeError> {
        let node = self.node(parent)?;
        let m = SanPlus::from_ascii(san.as_bytes())
            .map_err(|_| MoveError::new(MoveErrorKind::InvalidNotation, san))
            .and_then(|parsed| parsed.san.to_move(&node.position))
            .map_err(|err| {
                MoveError {
                    notation: san.to_owned(),
                    ..err
                }
                .with_parent(node.move_text())
            })?;
        self.add(parent, m)
    }

    /// Adds a move in engine notation, like `e7e8q`, as a child of
    /// `parent`.
    ///
    /// # Errors
    ///
    /// See [`VariationTree::add_move()`].
    pub fn add_uci(&mut self, parent: NodeId, uci: &str) -> Result<NodeId, TreeError> {
        let node = self.node(parent)?;
        let m = uci
            .parse::<Uci>()
            .map_err(|_| MoveError::new(MoveErrorKind::InvalidNotation, uci))
            .and_then(|parsed| parsed.to_move(&node.position))
            .map_err(|err| err.with_parent(node.move_text()))?;
        self.add(parent, m)
    }

    /// Recomputes the line id of every node. A node with a single child
    /// passes its line id on, the children of a fork get the fork's id
    /// with their 1-based index appended.
    pub fn build_lines(&mut self) {
        let mut stack = vec![(NodeId::ROOT, "1".to_owned())];
        while let Some((id, line_id)) = stack.pop() {
            let Some(node) = self.get_mut(id) else {
                continue;
            };
            match node.children[..] {
                [] => (),
                [only] => stack.push((only, line_id.clone())),
                ref children => {
                    for (i, &child) in children.iter().enumerate() {
                        stack.push((child, format!("{line_id}.{}", i + 1)));
                    }
                }
            }
            node.line_id = line_id;
        }
    }

    /// The main line: the root and every first child after it.
    pub fn main_line(&self) -> Vec<NodeId> {
        self.follow_first_children(NodeId::ROOT)
    }

    fn follow_first_children(&self, from: NodeId) -> Vec<NodeId> {
        let mut line = Vec::new();
        let mut current = self.get(from);
        while let Some(node) = current {
            line.push(node.id);
            current = node.children.first().and_then(|&c| self.get(c));
        }
        line
    }

    /// The nodes from the root up to, not including, the first fork.
    pub fn stem(&self) -> Vec<NodeId> {
        let mut stem = Vec::new();
        let mut current = Some(self.root());
        while let Some(node) = current {
            if node.children.len() > 1 {
                break;
            }
            stem.push(node.id);
            current = node.children.first().and_then(|&c| self.get(c));
        }
        stem
    }

    /// The nodes from the root down to `id`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if there is no such node.
    pub fn path_to(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut path = Vec::new();
        let mut current = Some(self.node(id)?);
        while let Some(node) = current {
            path.push(node.id);
            current = node.parent.and_then(|p| self.get(p));
        }
        path.reverse();
        Ok(path)
    }

    /// The node `id` and all its descendants, in depth-first order.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if there is no such node.
    pub fn subtree(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        self.node(id)?;
        let mut nodes = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                nodes.push(id);
                stack.extend(node.children.iter().rev());
            }
        }
        Ok(nodes)
    }

    /// The nodes of the line with the given id, from the root to the end of
    /// the line. Past the last component of `line_id` the line continues
    /// with first children.
    pub fn select_line(&self, line_id: &str) -> Vec<NodeId> {
        let mut choices = line_id.split('.').skip(1);
        let mut line = Vec::new();
        let mut current = Some(self.root());
        while let Some(node) = current {
            line.push(node.id);
            let index = if node.children.len() > 1 {
                match choices.next().map(str::parse::<usize>) {
                    Some(Ok(i)) if i >= 1 => i - 1,
                    Some(_) => break,
                    None => 0,
                }
            } else {
                0
            };
            current = node.children.get(index).and_then(|&c| self.get(c));
        }
        line
    }

    /// The line id of the leaf reached from `id` by first children, i.e.
    /// the id that identifies the line `id` is on.
    pub fn default_line_id(&self, id: NodeId) -> Option<&str> {
        let leaf = *self.follow_first_children(id).last()?;
        self.get(leaf).map(TreeNode::line_id)
    }

    /// Moves the line through `id` to the front at the nearest fork where
    /// it is not yet the first child. Returns `false` if the node is
    /// already on the main line.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if there is no such node.
    pub fn promote_line(&mut self, id: NodeId) -> Result<bool, TreeError> {
        let mut current = self.node(id)?;
        while let Some(parent_id) = current.parent {
            let child = current.id;
            let parent = self.node_mut(parent_id)?;
            if let Some(index) = parent.children.iter().position(|&c| c == child) {
                if index > 0 {
                    parent.children[..=index].rotate_right(1);
                    debug!(node = %id, fork = %parent_id, from = index, "promoted line");
                    self.build_lines();
                    return Ok(true);
                }
            }
            current = self.node(parent_id)?;
        }
        Ok(false)
    }

    /// Deletes a node with all its descendants. Returns the ids of the
    /// removed nodes.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::RootHasNoParent`] for the root, and
    /// [`TreeError::UnknownNode`] if there is no such node.
    pub fn delete_subtree(&mut self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let parent = self.node(id)?.parent.ok_or(TreeError::RootHasNoParent)?;
        let removed = self.subtree(id)?;
        self.node_mut(parent)?.children.retain(|&c| c != id);
        for &gone in &removed {
            self.nodes[gone.index()] = None;
        }
        self.bookmarks.retain(|b| !removed.contains(b));
        self.build_lines();
        Ok(removed)
    }

    /// Copies the node `from` of `other` and its descendants below `at`,
    /// with fresh ids, without recomputing line ids. At most `max_plies`
    /// levels are copied. Returns the id of the copy of `from`.
    pub(crate) fn graft(
        &mut self,
        at: NodeId,
        other: &VariationTree,
        from: NodeId,
        max_plies: Option<usize>,
    ) -> Result<Option<NodeId>, TreeError> {
        if max_plies == Some(0) {
            return Ok(None);
        }
        other.node(from)?;
        let mut top = None;
        let mut stack = vec![(from, at, 1)];
        while let Some((source, parent, depth)) = stack.pop() {
            let Some(node) = other.get(source) else {
                continue;
            };
            let copy = self.attach(parent, |id| node.detached_copy(id, Some(parent)))?;
            top.get_or_insert(copy);
            if max_plies.is_none_or(|max| depth < max) {
                for &child in node.children.iter().rev() {
                    stack.push((child, copy, depth + 1));
                }
            }
        }
        Ok(top)
    }

    /// Copies the continuations of `from` in `other` below `at`: every
    /// child subtree of `from` becomes a new child subtree of `at`, with
    /// fresh ids. Returns the ids of the new children.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DifferentRoots`] if `at` and `from` do not hold
    /// the same position, or [`TreeError::UnknownNode`] if either does not
    /// exist.
    pub fn insert_subtree(
        &mut self,
        at: NodeId,
        other: &VariationTree,
        from: NodeId,
    ) -> Result<Vec<NodeId>, TreeError> {
        let source = other.node(from)?;
        if self.node(at)?.position.short_fen() != source.position.short_fen() {
            return Err(TreeError::DifferentRoots);
        }
        let mut inserted = Vec::with_capacity(source.children.len());
        for &child in &source.children {
            if let Some(copy) = self.graft(at, other, child, None)? {
                inserted.push(copy);
            }
        }
        self.build_lines();
        Ok(inserted)
    }

    /// Tests if any node was added during training.
    pub fn has_training_moves(&self) -> bool {
        self.nodes().any(|n| n.is_new_training_move)
    }

    pub fn clear_training_flags(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.is_new_training_move = false;
        }
    }

    /// Deletes every move added during training, with everything that
    /// follows it. Returns the number of removed nodes.
    pub fn remove_training_moves(&mut self) -> usize {
        let tops: Vec<NodeId> = self
            .nodes()
            .filter(|n| n.is_new_training_move)
            .filter(|n| {
                n.parent
                    .and_then(|p| self.get(p))
                    .is_none_or(|p| !p.is_new_training_move)
            })
            .map(TreeNode::id)
            .collect();

        let mut removed = 0;
        for id in tops {
            if let Ok(gone) = self.delete_subtree(id) {
                removed += gone.len();
            }
        }
        removed
    }

    /// Picks one of the children of `id` at random.
    pub fn select_random_child<R: Rng + ?Sized>(&self, id: NodeId, rng: &mut R) -> Option<NodeId> {
        self.get(id)?.children.choose(rng).copied()
    }

    /// Finds another child of the parent of `id` with the same move.
    pub fn find_identical_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        let notation = node.engine_notation()?;
        let parent = self.get(node.parent?)?;
        parent
            .children
            .iter()
            .copied()
            .filter(|&c| c != id)
            .find(|&c| {
                self.get(c)
                    .and_then(TreeNode::engine_notation)
                    .is_some_and(|n| n == notation)
            })
    }

    /// Finds a child of `parent` that leads to `position`, comparing
    /// everything but the move counters.
    pub fn find_existing_child(&self, parent: NodeId, position: &BoardPosition) -> Option<NodeId> {
        let key = position.short_fen();
        self.get(parent)?
            .children
            .iter()
            .copied()
            .find(|&c| self.get(c).is_some_and(|n| n.position.short_fen() == key))
    }

    pub fn bookmarks(&self) -> &[NodeId] {
        &self.bookmarks
    }

    pub fn is_bookmarked(&self, id: NodeId) -> bool {
        self.bookmarks.contains(&id)
    }

    /// Bookmarks a node. Returns `false` if it already was bookmarked.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if there is no such node.
    pub fn add_bookmark(&mut self, id: NodeId) -> Result<bool, TreeError> {
        self.node(id)?;
        let added = !self.bookmarks.contains(&id);
        self.mark_bookmark(id);
        Ok(added)
    }

    /// Bookmarks a live node, once.
    fn mark_bookmark(&mut self, id: NodeId) {
        let Some(node) = self.get_mut(id) else {
            return;
        };
        node.is_bookmark = true;
        if !self.bookmarks.contains(&id) {
            self.bookmarks.push(id);
        }
    }

    pub fn remove_bookmark(&mut self, id: NodeId) -> bool {
        if let Some(node) = self.get_mut(id) {
            node.is_bookmark = false;
        }
        let before = self.bookmarks.len();
        self.bookmarks.retain(|&b| b != id);
        self.bookmarks.len() != before
    }

    pub fn clear_bookmarks(&mut self) {
        for id in std::mem::take(&mut self.bookmarks) {
            if let Some(node) = self.get_mut(id) {
                node.is_bookmark = false;
            }
        }
    }

    fn next_fork(&self, from: NodeId) -> Option<NodeId> {
        let mut node = self.get(from)?;
        loop {
            match node.children[..] {
                [] => return None,
                [only] => node = self.get(only)?,
                _ => return Some(node.id),
            }
        }
    }

    fn bookmark_children(&mut self, id: NodeId, max: usize) {
        let children = self.get(id).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            if self.bookmarks.len() >= max {
                break;
            }
            self.mark_bookmark(child);
        }
    }

    /// Bookmarks positions where the training side is to move, near the
    /// first forks of the tree.
    ///
    /// At the first fork, if the opponent of the training side is to move,
    /// its children are bookmarked. Otherwise the children of the move
    /// before the fork are bookmarked. The same is done once more for the
    /// next fork in each continuation. If that yields nothing, the last
    /// node with the training side to move (or the root) is bookmarked.
    pub fn generate_bookmarks(&mut self, config: &BookmarkConfig) {
        let side = self.training_side();
        let max = config.max_bookmarks;

        if let Some(fork) = self.next_fork(NodeId::ROOT) {
            let (turn, parent) = self.turn_and_parent(fork);
            if turn != side {
                self.bookmark_children(fork, max);
            } else if let Some(parent) = parent.filter(|&p| p != NodeId::ROOT) {
                self.bookmark_children(parent, max);
            }

            let children = self.get(fork).map(|n| n.children.clone()).unwrap_or_default();
            for child in children {
                if let Some(next) = self.next_fork(child) {
                    let (turn, parent) = self.turn_and_parent(next);
                    if turn != side {
                        self.bookmark_children(next, max);
                    } else if let Some(parent) = parent {
                        self.bookmark_children(parent, max);
                    }
                }
            }
        }

        if self.bookmarks.is_empty() {
            let fallback = self
                .nodes()
                .filter(|n| n.is_root() || Some(n.turn()) == side)
                .map(TreeNode::id)
                .last();
            if let Some(id) = fallback {
                self.mark_bookmark(id);
            }
        }

        debug!(count = self.bookmarks.len(), "generated bookmarks");
    }

    fn turn_and_parent(&self, id: NodeId) -> (Option<Color>, Option<NodeId>) {
        self.get(id)
            .map_or((None, None), |n| (Some(n.turn()), n.parent))
    }

    /// Recomputes check, checkmate and stalemate flags of every position.
    pub fn update_status(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.position.update_status();
        }
    }
}
