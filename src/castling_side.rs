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

use std::ops;

use bitflags::bitflags;

use crate::{Color, File, Square};

/// `KingSide` (O-O) or `QueenSide` (O-O-O).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum CastlingSide {
    KingSide,
    QueenSide,
}

impl CastlingSide {
    #[inline]
    pub const fn is_queen_side(self) -> bool {
        matches!(self, CastlingSide::QueenSide)
    }

    #[inline]
    pub const fn is_king_side(self) -> bool {
        matches!(self, CastlingSide::KingSide)
    }

    pub const fn king_to_file(self) -> File {
        match self {
            CastlingSide::KingSide => File::G,
            CastlingSide::QueenSide => File::C,
        }
    }

    pub const fn rook_to_file(self) -> File {
        match self {
            CastlingSide::KingSide => File::F,
            CastlingSide::QueenSide => File::D,
        }
    }

    pub const fn rook_from_file(self) -> File {
        match self {
            CastlingSide::KingSide => File::H,
            CastlingSide::QueenSide => File::A,
        }
    }

    /// Home square of the king, `e1` or `e8`.
    pub fn king_from(color: Color) -> Square {
        Square::from_coords(File::E, color.backrank())
    }

    pub fn king_to(self, color: Color) -> Square {
        Square::from_coords(self.king_to_file(), color.backrank())
    }

    pub fn rook_from(self, color: Color) -> Square {
        Square::from_coords(self.rook_from_file(), color.backrank())
    }

    pub fn rook_to(self, color: Color) -> Square {
        Square::from_coords(self.rook_to_file(), color.backrank())
    }

    /// Squares the king stands on, passes over and lands on. None of them
    /// may be attacked.
    pub fn king_path(self, color: Color) -> [Square; 3] {
        let rank = color.backrank();
        let files = match self {
            CastlingSide::KingSide => [File::E, File::F, File::G],
            CastlingSide::QueenSide => [File::E, File::D, File::C],
        };
        files.map(|file| Square::from_coords(file, rank))
    }

    /// Squares between king and rook. All of them must be empty.
    pub fn empty_path(self, color: Color) -> &'static [Square] {
        match (self, color) {
            (CastlingSide::KingSide, Color::White) => &[Square::F1, Square::G1],
            (CastlingSide::QueenSide, Color::White) => &[Square::D1, Square::C1, Square::B1],
            (CastlingSide::KingSide, Color::Black) => &[Square::F8, Square::G8],
            (CastlingSide::QueenSide, Color::Black) => &[Square::D8, Square::C8, Square::B8],
        }
    }

    /// Recognizes the castling side of a king move given in coordinates,
    /// either as king-to-destination (`e1g1`) or king-takes-rook (`e1h1`).
    pub fn from_king_move(color: Color, from: Square, to: Square) -> Option<CastlingSide> {
        if from != CastlingSide::king_from(color) || to.rank() != color.backrank() {
            return None;
        }
        match to.file() {
            File::G | File::H => Some(CastlingSide::KingSide),
            File::C | File::A => Some(CastlingSide::QueenSide),
            _ => None,
        }
    }

    #[must_use]
    #[inline]
    pub const fn other(self) -> CastlingSide {
        match self {
            CastlingSide::KingSide => CastlingSide::QueenSide,
            CastlingSide::QueenSide => CastlingSide::KingSide,
        }
    }

    /// `KingSide` and `QueenSide`, in this order.
    pub const ALL: [CastlingSide; 2] = [CastlingSide::KingSide, CastlingSide::QueenSide];
}

impl ops::Not for CastlingSide {
    type Output = CastlingSide;

    #[inline]
    fn not(self) -> CastlingSide {
        self.other()
    }
}

bitflags! {
    /// Castling rights of both sides. The bit order matches the FEN field
    /// order `KQkq`.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct CastlingRights: u8 {
        const WHITE_KING_SIDE = 1 << 3;
        const WHITE_QUEEN_SIDE = 1 << 2;
        const BLACK_KING_SIDE = 1 << 1;
        const BLACK_QUEEN_SIDE = 1;
    }
}

impl Default for CastlingRights {
    fn default() -> CastlingRights {
        CastlingRights::all()
    }
}

impl CastlingRights {
    pub fn flag(color: Color, side: CastlingSide) -> CastlingRights {
        match (color, side) {
            (Color::White, CastlingSide::KingSide) => CastlingRights::WHITE_KING_SIDE,
            (Color::White, CastlingSide::QueenSide) => CastlingRights::WHITE_QUEEN_SIDE,
            (Color::Black, CastlingSide::KingSide) => CastlingRights::BLACK_KING_SIDE,
            (Color::Black, CastlingSide::QueenSide) => CastlingRights::BLACK_QUEEN_SIDE,
        }
    }

    pub fn of_color(color: Color) -> CastlingRights {
        CastlingRights::flag(color, CastlingSide::KingSide)
            | CastlingRights::flag(color, CastlingSide::QueenSide)
    }

    #[inline]
    pub fn has(self, color: Color, side: CastlingSide) -> bool {
        self.contains(CastlingRights::flag(color, side))
    }

    #[inline]
    pub fn has_color(self, color: Color) -> bool {
        self.intersects(CastlingRights::of_color(color))
    }

    pub fn discard_color(&mut self, color: Color) {
        self.remove(CastlingRights::of_color(color));
    }

    /// Drops the right that belongs to a rook on the given home square, if
    /// any.
    pub fn discard_rook(&mut self, sq: Square) {
        for color in Color::ALL {
            for side in CastlingSide::ALL {
                if side.rook_from(color) == sq {
                    self.remove(CastlingRights::flag(color, side));
                }
            }
        }
    }

    /// Parses the castling field of a FEN. Letters other than `KQkq` are
    /// ignored, so `-` yields no rights.
    pub fn from_ascii(s: &[u8]) -> CastlingRights {
        s.iter().fold(CastlingRights::empty(), |rights, ch| {
            rights
                | match ch {
                    b'K' => CastlingRights::WHITE_KING_SIDE,
                    b'Q' => CastlingRights::WHITE_QUEEN_SIDE,
                    b'k' => CastlingRights::BLACK_KING_SIDE,
                    b'q' => CastlingRights::BLACK_QUEEN_SIDE,
                    _ => CastlingRights::empty(),
                }
        })
    }

    /// Writes the castling field of a FEN, `-` if there are no rights.
    pub fn fen(self) -> String {
        let mut fen = String::with_capacity(4);
        for (flag, ch) in [
            (CastlingRights::WHITE_KING_SIDE, 'K'),
            (CastlingRights::WHITE_QUEEN_SIDE, 'Q'),
            (CastlingRights::BLACK_KING_SIDE, 'k'),
            (CastlingRights::BLACK_QUEEN_SIDE, 'q'),
        ] {
            if self.contains(flag) {
                fen.push(ch);
            }
        }
        if fen.is_empty() {
            fen.push('-');
        }
        fen
    }
}
