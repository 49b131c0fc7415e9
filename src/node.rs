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

use std::{fmt, num::ParseIntError, str::FromStr};

use crate::{uci::Uci, BoardPosition, Color, Move, Nag};

/// Identifies a node within one [`VariationTree`](crate::tree::VariationTree).
///
/// Ids are handed out in increasing order, starting with `0` for the root,
/// and are never reused by the same tree.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The id of every tree's root.
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<NodeId, ParseIntError> {
        s.parse().map(NodeId)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for NodeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for NodeId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<NodeId, D::Error> {
        u32::deserialize(deserializer).map(NodeId)
    }
}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for NodeId {}

/// One ply of a [`VariationTree`](crate::tree::VariationTree): the position
/// after a move, together with the annotations attached to that move.
///
/// Structure (parent, children, line id) is owned by the tree. Annotation
/// fields are public and may be edited freely.
#[derive(Clone, Debug)]
pub struct TreeNode {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) line_id: String,
    pub(crate) position: BoardPosition,
    pub(crate) last_move: Option<Move>,
    pub(crate) san: String,
    pub(crate) nags: String,
    pub(crate) is_bookmark: bool,

    pub comment: Option<String>,
    /// A comment shown before the move, typically opening a variation.
    pub comment_before_move: Option<String>,
    pub engine_evaluation: Option<String>,
    pub assessment: Option<String>,
    /// Arrows in `%cal` syntax, e.g. `Ge2e4,Rd7d5`.
    pub arrows: Option<String>,
    /// Circles in `%csl` syntax, e.g. `Ge4,Rd5`.
    pub circles: Option<String>,
    pub quiz_points: Option<i32>,
    pub best_response: Option<String>,
    /// Article references, joined by `|`.
    pub article_refs: Option<String>,
    pub is_thumbnail: bool,
    pub is_diagram: bool,
    /// Set on moves added during a training session.
    pub is_new_training_move: bool,
    /// Embedded commands that are not understood, kept verbatim (without
    /// brackets) so they can be written back.
    pub unprocessed_commands: Vec<String>,
}

impl TreeNode {
    pub(crate) fn new(id: NodeId, parent: Option<NodeId>, position: BoardPosition) -> TreeNode {
        TreeNode {
            id,
            parent,
            children: Vec::new(),
            line_id: String::new(),
            position,
            last_move: None,
            san: String::new(),
            nags: String::new(),
            is_bookmark: false,
            comment: None,
            comment_before_move: None,
            engine_evaluation: None,
            assessment: None,
            arrows: None,
            circles: None,
            quiz_points: None,
            best_response: None,
            article_refs: None,
            is_thumbnail: false,
            is_diagram: false,
            is_new_training_move: false,
            unprocessed_commands: Vec::new(),
        }
    }

    /// A copy of the node with new structure: annotations and position are
    /// kept, children and bookmark flag are dropped.
    pub(crate) fn detached_copy(&self, id: NodeId, parent: Option<NodeId>) -> TreeNode {
        TreeNode {
            id,
            parent,
            children: Vec::new(),
            line_id: String::new(),
            is_bookmark: false,
            ..self.clone()
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Dot separated 1-based child indices from the root, e.g. `1.2.1`.
    #[inline]
    pub fn line_id(&self) -> &str {
        &self.line_id
    }

    #[inline]
    pub fn position(&self) -> &BoardPosition {
        &self.position
    }

    /// The move that led to this node. `None` for the root.
    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn move_number(&self) -> u32 {
        self.position.move_number()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_bookmark(&self) -> bool {
        self.is_bookmark
    }

    /// Tests if the line id consists only of ones, i.e. the node is reached
    /// by always taking the first child.
    pub fn is_main_line(&self) -> bool {
        self.line_id.split('.').all(|part| part == "1")
    }

    /// The move in algebraic notation, with check or checkmate sign, like
    /// `Nbd2` or `Qh4#`. Empty for the root.
    #[inline]
    pub fn san(&self) -> &str {
        &self.san
    }

    /// The move with the glyphs of its NAGs appended, like `Nbd2?!` or
    /// `e4±`. NAGs without a glyph are left out.
    pub fn san_with_nags(&self) -> String {
        let mut text = self.san.clone();
        for glyph in self.nag_list().filter_map(Nag::glyph) {
            text.push_str(glyph);
        }
        text
    }

    /// The move in engine notation, like `e7e8q`.
    pub fn engine_notation(&self) -> Option<String> {
        self.last_move.map(|m| Uci::from_move(m).to_string())
    }

    /// The NAGs of this move, each preceded by a space, e.g. ` $1 $14`.
    #[inline]
    pub fn nags(&self) -> &str {
        &self.nags
    }

    pub fn nag_list(&self) -> impl Iterator<Item = Nag> + '_ {
        self.nags
            .split_ascii_whitespace()
            .filter_map(|token| Nag::from_ascii(token.as_bytes()).ok())
    }

    pub fn add_nag(&mut self, nag: Nag) {
        self.nags.push_str(&format!(" {nag}"));
    }

    /// Replaces all NAGs with the `$n` items of a space separated list.
    /// Anything else in the list is ignored.
    pub fn set_nags(&mut self, nags: &str) {
        self.nags.clear();
        for token in nags.split_ascii_whitespace() {
            if token.starts_with('$') {
                if let Ok(nag) = Nag::from_ascii(token.as_bytes()) {
                    self.add_nag(nag);
                }
            }
        }
    }

    pub fn add_article_reference(&mut self, reference: &str) {
        if reference.is_empty() {
            return;
        }
        match self.article_refs {
            Some(ref mut refs) if !refs.is_empty() => {
                refs.push('|');
                refs.push_str(reference);
            }
            _ => self.article_refs = Some(reference.to_owned()),
        }
    }

    /// Removes an article reference. Returns `false` if it was not there.
    pub fn remove_article_reference(&mut self, reference: &str) -> bool {
        let Some(ref refs) = self.article_refs else {
            return false;
        };
        if reference.is_empty() || !refs.split('|').any(|r| r == reference) {
            return false;
        }
        let rest: Vec<&str> = refs.split('|').filter(|&r| r != reference).collect();
        self.article_refs = if rest.is_empty() {
            None
        } else {
            Some(rest.join("|"))
        };
        true
    }

    /// The move with its number, as used in messages: `8.f4` or
    /// `7...Be7`. Empty for the root.
    pub fn move_text(&self) -> String {
        if self.last_move.is_none() {
            return String::new();
        }
        match self.turn() {
            Color::Black => format!("{}.{}", self.move_number(), self.san),
            Color::White => format!("{}...{}", self.move_number(), self.san),
        }
    }
}
