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

use std::{error::Error, fmt};

/// Why a notated move could not be played.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MoveErrorKind {
    /// The text is not algebraic notation.
    InvalidNotation,
    /// No piece can legally make the move.
    NoSuchMove,
    /// More than one piece can legally make the move.
    AmbiguousMove,
    /// Castling without rights, out of or through check, or with pieces in
    /// the way.
    IllegalCastling,
}

impl fmt::Display for MoveErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MoveErrorKind::InvalidNotation => "invalid notation",
            MoveErrorKind::NoSuchMove => "could not identify the moving piece",
            MoveErrorKind::AmbiguousMove => "ambiguous move",
            MoveErrorKind::IllegalCastling => "illegal castling",
        })
    }
}

/// Error when parsing, resolving or playing a notated move.
///
/// Carries the offending notation and, where the caller knows it, the last
/// move that was played successfully before it (e.g. `7...Be7`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MoveError {
    pub kind: MoveErrorKind,
    pub notation: String,
    pub parent: Option<String>,
}

impl MoveError {
    pub fn new(kind: MoveErrorKind, notation: impl Into<String>) -> MoveError {
        MoveError {
            kind,
            notation: notation.into(),
            parent: None,
        }
    }

    /// Attaches the text of the last successfully resolved move. Empty text,
    /// as for the start of the game, leaves the parent unset.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> MoveError {
        let parent = parent.into();
        self.parent = (!parent.is_empty()).then_some(parent);
        self
    }

    pub fn kind(&self) -> MoveErrorKind {
        self.kind
    }
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.notation)?;
        if let Some(ref parent) = self.parent {
            write!(f, " (after {parent})")?;
        }
        Ok(())
    }
}

impl Error for MoveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = MoveError::new(MoveErrorKind::AmbiguousMove, "Nf3").with_parent("7...Be7");
        assert_eq!(err.to_string(), "ambiguous move: Nf3 (after 7...Be7)");
        assert_eq!(
            MoveError::new(MoveErrorKind::NoSuchMove, "Ke5").to_string(),
            "could not identify the moving piece: Ke5"
        );
    }
}
