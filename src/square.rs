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

use std::{error::Error, fmt, str::FromStr};

use crate::color::Color;

/// A file of the chessboard.
#[allow(missing_docs)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    /// Gets the file with the given zero-based index, if in range.
    #[inline]
    pub fn from_index(index: i32) -> Option<File> {
        usize::try_from(index).ok().and_then(|i| File::ALL.get(i).copied())
    }

    pub fn from_char(ch: char) -> Option<File> {
        if ('a'..='h').contains(&ch) {
            File::from_index(i32::from(ch as u8 - b'a'))
        } else {
            None
        }
    }

    #[inline]
    pub fn index(self) -> i32 {
        i32::from(self as u8)
    }

    pub fn char(self) -> char {
        char::from(b'a' + self as u8)
    }

    #[inline]
    pub fn offset(self, delta: i32) -> Option<File> {
        File::from_index(self.index() + delta)
    }

    /// `A`, ..., `H`.
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// A rank of the chessboard.
#[allow(missing_docs)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
#[repr(u8)]
pub enum Rank {
    First = 0,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Eighth,
}

impl Rank {
    /// Gets the rank with the given zero-based index, if in range.
    #[inline]
    pub fn from_index(index: i32) -> Option<Rank> {
        usize::try_from(index).ok().and_then(|i| Rank::ALL.get(i).copied())
    }

    pub fn from_char(ch: char) -> Option<Rank> {
        if ('1'..='8').contains(&ch) {
            Rank::from_index(i32::from(ch as u8 - b'1'))
        } else {
            None
        }
    }

    #[inline]
    pub fn index(self) -> i32 {
        i32::from(self as u8)
    }

    pub fn char(self) -> char {
        char::from(b'1' + self as u8)
    }

    #[inline]
    pub fn offset(self, delta: i32) -> Option<Rank> {
        Rank::from_index(self.index() + delta)
    }

    /// The rank as seen from the given side, e.g. `Rank::Seventh` is the
    /// second rank for black.
    #[inline]
    pub fn relative_to(self, color: Color) -> Rank {
        match color {
            Color::White => self,
            Color::Black => Rank::ALL[7 - self as usize],
        }
    }

    /// `First`, ..., `Eighth`.
    pub const ALL: [Rank; 8] = [
        Rank::First,
        Rank::Second,
        Rank::Third,
        Rank::Fourth,
        Rank::Fifth,
        Rank::Sixth,
        Rank::Seventh,
        Rank::Eighth,
    ];
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// Error when parsing an invalid square name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseSquareError;

impl fmt::Display for ParseSquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid square name")
    }
}

impl Error for ParseSquareError {}

/// A square of the chessboard, indexed from `A1` (0) to `H8` (63).
#[rustfmt::skip]
#[allow(missing_docs)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(u8)]
pub enum Square {
    A1 = 0, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// Tries to get a square from its index (`A1` is 0, `H8` is 63).
    #[inline]
    pub fn from_index(index: usize) -> Option<Square> {
        Square::ALL.get(index).copied()
    }

    #[inline]
    pub fn from_coords(file: File, rank: Rank) -> Square {
        Square::ALL[usize::from(rank as u8) * 8 + usize::from(file as u8)]
    }

    /// Parses a square name like `e4`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSquareError`] if the input is not exactly a file
    /// letter followed by a rank digit.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_study::Square;
    ///
    /// assert_eq!(Square::from_ascii(b"e4"), Ok(Square::E4));
    /// assert!(Square::from_ascii(b"i9").is_err());
    /// ```
    pub fn from_ascii(s: &[u8]) -> Result<Square, ParseSquareError> {
        match *s {
            [file, rank] => Ok(Square::from_coords(
                File::from_char(char::from(file)).ok_or(ParseSquareError)?,
                Rank::from_char(char::from(rank)).ok_or(ParseSquareError)?,
            )),
            _ => Err(ParseSquareError),
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        usize::from(self as u8)
    }

    #[inline]
    pub fn file(self) -> File {
        File::ALL[self.index() & 7]
    }

    #[inline]
    pub fn rank(self) -> Rank {
        Rank::ALL[self.index() >> 3]
    }

    /// Moves the square by a file and rank delta, if that stays on the
    /// board.
    #[inline]
    pub fn offset(self, file_delta: i32, rank_delta: i32) -> Option<Square> {
        let file = self.file().offset(file_delta)?;
        let rank = self.rank().offset(rank_delta)?;
        Some(Square::from_coords(file, rank))
    }

    /// Tests whether the square is light (like `h1`) or dark (like `a1`).
    #[inline]
    pub fn is_light(self) -> bool {
        (self.file().index() + self.rank().index()) % 2 == 1
    }

    /// All squares, from `A1` to `H8`.
    #[rustfmt::skip]
    pub const ALL: [Square; 64] = [
        Square::A1, Square::B1, Square::C1, Square::D1, Square::E1, Square::F1, Square::G1, Square::H1,
        Square::A2, Square::B2, Square::C2, Square::D2, Square::E2, Square::F2, Square::G2, Square::H2,
        Square::A3, Square::B3, Square::C3, Square::D3, Square::E3, Square::F3, Square::G3, Square::H3,
        Square::A4, Square::B4, Square::C4, Square::D4, Square::E4, Square::F4, Square::G4, Square::H4,
        Square::A5, Square::B5, Square::C5, Square::D5, Square::E5, Square::F5, Square::G5, Square::H5,
        Square::A6, Square::B6, Square::C6, Square::D6, Square::E6, Square::F6, Square::G6, Square::H6,
        Square::A7, Square::B7, Square::C7, Square::D7, Square::E7, Square::F7, Square::G7, Square::H7,
        Square::A8, Square::B8, Square::C8, Square::D8, Square::E8, Square::F8, Square::G8, Square::H8,
    ];
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Square, ParseSquareError> {
        Square::from_ascii(s.as_bytes())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file().char(), self.rank().char())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Square {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Square {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Square, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
