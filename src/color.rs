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

use std::{error::Error, fmt, ops, str::FromStr};

use crate::{
    square::Rank,
    types::{Piece, Role},
};

/// `White` or `Black`.
#[allow(missing_docs)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Color {
    Black = 0,
    White = 1,
}

impl Color {
    /// Parses the side-to-move field of a FEN. Accepts either case.
    pub fn from_char(ch: char) -> Option<Color> {
        match ch {
            'w' | 'W' => Some(Color::White),
            'b' | 'B' => Some(Color::Black),
            _ => None,
        }
    }

    #[inline]
    pub fn from_white(white: bool) -> Color {
        if white {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline]
    pub fn fold<T>(self, white: T, black: T) -> T {
        match self {
            Color::White => white,
            Color::Black => black,
        }
    }

    #[inline]
    pub fn is_white(self) -> bool {
        self == Color::White
    }

    #[inline]
    pub fn is_black(self) -> bool {
        self == Color::Black
    }

    /// The rank the pieces of this color start on.
    #[inline]
    pub fn backrank(self) -> Rank {
        self.fold(Rank::First, Rank::Eighth)
    }

    /// The rank pawns of this color start on.
    #[inline]
    pub fn pawn_rank(self) -> Rank {
        self.fold(Rank::Second, Rank::Seventh)
    }

    /// Rank delta of a single pawn push.
    #[inline]
    pub fn forward(self) -> i32 {
        self.fold(1, -1)
    }

    pub fn char(self) -> char {
        self.fold('w', 'b')
    }

    #[inline]
    pub fn pawn(self) -> Piece {
        Role::Pawn.of(self)
    }

    #[inline]
    pub fn king(self) -> Piece {
        Role::King.of(self)
    }

    #[inline]
    pub fn rook(self) -> Piece {
        Role::Rook.of(self)
    }

    /// `White` and `Black`, in this order.
    pub const ALL: [Color; 2] = [Color::White, Color::Black];
}

impl ops::Not for Color {
    type Output = Color;

    #[inline]
    fn not(self) -> Color {
        self.fold(Color::Black, Color::White)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fold("white", "black"))
    }
}

/// Error when parsing an invalid color name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseColorError;

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid color")
    }
}

impl Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parses `white` or `black`, ignoring case and surrounding whitespace,
    /// as found in a `TrainingSide` header.
    fn from_str(s: &str) -> Result<Color, ParseColorError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("white") {
            Ok(Color::White)
        } else if s.eq_ignore_ascii_case("black") {
            Ok(Color::Black)
        } else {
            Err(ParseColorError)
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
