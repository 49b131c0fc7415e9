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

//! Parse and write moves in engine coordinate notation, as spoken by
//! engines over the Universal Chess Interface.
//!
//! # Examples
//!
//! Parsing UCIs:
//!
//! ```
//! use chess_study::{uci::Uci, Square};
//!
//! let uci: Uci = "g1f3".parse()?;
//!
//! assert_eq!(uci, Uci::Normal {
//!     from: Square::G1,
//!     to: Square::F3,
//!     promotion: None,
//! });
//! # Ok::<_, chess_study::uci::ParseUciError>(())
//! ```
//!
//! Converting to a legal move and to algebraic notation in the context of a
//! position:
//!
//! ```
//! use chess_study::{uci::Uci, BoardPosition, Color, Role, Square};
//!
//! let mut pos = BoardPosition::new();
//! let uci: Uci = "g1f3".parse().expect("valid uci");
//! assert_eq!(uci.to_san(&pos)?.to_string(), "Nf3");
//!
//! let m = uci.to_move(&pos)?;
//! pos.play(m)?;
//! assert_eq!(pos.board().piece_at(Square::F3), Some(Role::Knight.of(Color::White)));
//! # Ok::<_, chess_study::MoveError>(())
//! ```

use std::{error::Error, fmt, str::FromStr};

use crate::{
    errors::{MoveError, MoveErrorKind},
    san::SanPlus,
    BoardPosition, CastlingSide, Move, Rank, Role, Square,
};

/// Error when parsing an invalid UCI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseUciError;

impl fmt::Display for ParseUciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid uci")
    }
}

impl Error for ParseUciError {}

/// A move as represented in the UCI protocol.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Uci {
    Normal {
        from: Square,
        to: Square,
        promotion: Option<Role>,
    },
    Null,
}

impl FromStr for Uci {
    type Err = ParseUciError;

    fn from_str(uci: &str) -> Result<Uci, ParseUciError> {
        Uci::from_ascii(uci.as_bytes())
    }
}

impl fmt::Display for Uci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Uci::Normal {
                from,
                to,
                promotion: None,
            } => write!(f, "{from}{to}"),
            Uci::Normal {
                from,
                to,
                promotion: Some(promotion),
            } => write!(f, "{from}{to}{}", promotion.char()),
            Uci::Null => f.write_str("0000"),
        }
    }
}

impl Uci {
    /// Parses a move like `e2e4`, `e7e8q` or `0000`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseUciError`] if `uci` is not 4 or 5 characters of
    /// coordinate notation.
    pub fn from_ascii(uci: &[u8]) -> Result<Uci, ParseUciError> {
        if uci == b"0000" {
            return Ok(Uci::Null);
        }
        if uci.len() != 4 && uci.len() != 5 {
            return Err(ParseUciError);
        }

        let from = Square::from_ascii(&uci[0..2]).map_err(|_| ParseUciError)?;
        let to = Square::from_ascii(&uci[2..4]).map_err(|_| ParseUciError)?;
        let promotion = match uci.get(4) {
            Some(&ch) => Some(
                Role::from_char(char::from(ch))
                    .filter(|r| r.is_promotion())
                    .ok_or(ParseUciError)?,
            ),
            None => None,
        };

        Ok(Uci::Normal {
            from,
            to,
            promotion,
        })
    }

    /// Engine notation of a move. Castling is written as the king's move to
    /// its destination, e.g. `e1g1`.
    pub fn from_move(m: Move) -> Uci {
        match m {
            Move::Normal {
                from,
                to,
                promotion,
                ..
            } => Uci::Normal {
                from,
                to,
                promotion,
            },
            Move::EnPassant { from, to } => Uci::Normal {
                from,
                to,
                promotion: None,
            },
            Move::Castle { king, .. } => match m.to() {
                Some(to) => Uci::Normal {
                    from: king,
                    to,
                    promotion: None,
                },
                None => Uci::Null,
            },
            Move::Null => Uci::Null,
        }
    }

    /// Tries to convert the `Uci` to a legal `Move` in the context of a
    /// position. A king moving two squares from its home square, or onto
    /// its own rook's corner (`e1g1`, `e1h1`, `e1c1`, `e1a1`), castles. A
    /// pawn reaching the last rank without a promotion piece promotes to a
    /// queen.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] if the move is not legal.
    pub fn to_move(&self, pos: &BoardPosition) -> Result<Move, MoveError> {
        let illegal = |kind| MoveError::new(kind, self.to_string());

        let (from, to, promotion) = match *self {
            Uci::Normal {
                from,
                to,
                promotion,
            } => (from, to, promotion),
            Uci::Null => return Ok(Move::Null),
        };

        let turn = pos.turn();
        let piece = pos
            .board()
            .piece_at(from)
            .filter(|p| p.color == turn)
            .ok_or_else(|| illegal(MoveErrorKind::NoSuchMove))?;

        if piece.role == Role::King {
            if let Some(side) = CastlingSide::from_king_move(turn, from, to) {
                let two_squares = (to.file().index() - from.file().index()).abs() == 2;
                let takes_rook = pos.board().piece_at(to) == Some(turn.rook());
                if two_squares || takes_rook {
                    return if pos.is_castling_legal(side) {
                        Ok(Move::Castle {
                            king: from,
                            rook: side.rook_from(turn),
                        })
                    } else {
                        Err(illegal(MoveErrorKind::IllegalCastling))
                    };
                }
            }
        }

        let candidate = if piece.role == Role::Pawn
            && from.file() != to.file()
            && !pos.board().is_occupied(to)
        {
            Move::EnPassant { from, to }
        } else {
            let promotes = piece.role == Role::Pawn
                && to.rank() == Rank::Eighth.relative_to(turn);
            Move::Normal {
                role: piece.role,
                from,
                capture: pos.board().role_at(to),
                to,
                promotion: if promotes {
                    Some(promotion.unwrap_or(Role::Queen))
                } else {
                    promotion
                },
            }
        };

        if pos.is_legal(candidate) {
            Ok(candidate)
        } else {
            Err(illegal(MoveErrorKind::NoSuchMove))
        }
    }

    /// Converts engine notation to algebraic notation, with check and
    /// checkmate suffixes.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] if the move is not legal.
    pub fn to_san(&self, pos: &BoardPosition) -> Result<SanPlus, MoveError> {
        let m = self.to_move(pos)?;
        Ok(SanPlus::from_move(pos, m))
    }
}

impl From<Move> for Uci {
    fn from(m: Move) -> Uci {
        Uci::from_move(m)
    }
}
