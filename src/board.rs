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

use std::{
    fmt,
    fmt::{Display, Write as _},
};

use crate::{Color, File, Piece, Rank, Role, Square};

/// Piece positions on an 8×8 board, indexed by [`Square`].
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Board {
    /// The standard chess starting position.
    pub fn new() -> Board {
        let mut board = Board::empty();
        let back = [
            Role::Rook,
            Role::Knight,
            Role::Bishop,
            Role::Queen,
            Role::King,
            Role::Bishop,
            Role::Knight,
            Role::Rook,
        ];
        for (file, role) in File::ALL.into_iter().zip(back) {
            for color in Color::ALL {
                board.set_piece_at(Square::from_coords(file, color.backrank()), role.of(color));
                board.set_piece_at(Square::from_coords(file, color.pawn_rank()), color.pawn());
            }
        }
        board
    }

    pub const fn empty() -> Board {
        Board {
            squares: [None; 64],
        }
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    #[inline]
    pub fn color_at(&self, sq: Square) -> Option<Color> {
        self.piece_at(sq).map(|piece| piece.color)
    }

    #[inline]
    pub fn role_at(&self, sq: Square) -> Option<Role> {
        self.piece_at(sq).map(|piece| piece.role)
    }

    #[inline]
    pub fn is_occupied(&self, sq: Square) -> bool {
        self.squares[sq.index()].is_some()
    }

    #[inline]
    pub fn set_piece_at(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.index()] = Some(piece);
    }

    #[inline]
    pub fn remove_piece_at(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()].take()
    }

    /// Iterates over all occupied squares, from `a1` to `h8`.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::ALL
            .into_iter()
            .filter_map(|sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }

    /// Squares holding the given piece, from `a1` to `h8`.
    pub fn squares_of(&self, piece: Piece) -> impl Iterator<Item = Square> + '_ {
        self.pieces()
            .filter(move |&(_, p)| p == piece)
            .map(|(sq, _)| sq)
    }

    /// The square of the king of the given color. If there is more than one
    /// king of that color, the one closest to `a1` is returned.
    pub fn king_of(&self, color: Color) -> Option<Square> {
        self.squares_of(color.king()).next()
    }

    pub fn count(&self, piece: Piece) -> usize {
        self.squares_of(piece).count()
    }

    /// The board part of a FEN, e.g. `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR`.
    pub fn board_fen(&self) -> String {
        let mut fen = String::with_capacity(64);
        for rank in Rank::ALL.into_iter().rev() {
            let mut empty = 0u8;
            for file in File::ALL {
                match self.piece_at(Square::from_coords(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(piece.char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if rank > Rank::First {
                fen.push('/');
            }
        }
        fen
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.into_iter().rev() {
            for file in File::ALL {
                f.write_char(
                    self.piece_at(Square::from_coords(file, rank))
                        .map_or('.', Piece::char),
                )?;
                f.write_char(if file < File::H { ' ' } else { '\n' })?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.board_fen())
    }
}
