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

use std::fmt;

pub use crate::role::Role;
use crate::{color::Color, square::Square};

/// A piece with [`Color`] and [`Role`].
#[allow(missing_docs)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Piece {
    pub color: Color,
    pub role: Role,
}

impl Piece {
    /// The FEN letter of the piece: uppercase for white, lowercase for
    /// black.
    pub fn char(self) -> char {
        self.color.fold(self.role.upper_char(), self.role.char())
    }

    pub fn from_char(ch: char) -> Option<Piece> {
        Role::from_char(ch).map(|role| role.of(Color::from_white(ch.is_ascii_uppercase())))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// The squares touched by the move that led to a position, so that a
/// board view can animate it. Castling moves two pieces: the king goes
/// `from` → `to`, the rook goes along the secondary squares.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct LastMove {
    pub from: Square,
    pub to: Square,
    pub secondary: Option<(Square, Square)>,
    pub promotion: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_char() {
        assert_eq!(Piece::from_char('K'), Some(Color::White.king()));
        assert_eq!(Piece::from_char('p'), Some(Color::Black.pawn()));
        assert_eq!(Piece::from_char('x'), None);
        assert_eq!(Role::Queen.of(Color::Black).char(), 'q');
    }
}
