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

use std::hash::{Hash, Hasher};

use crate::{
    attacks,
    errors::{MoveError, MoveErrorKind},
    san::{San, SanPlus},
    Board, CastlingRights, CastlingSide, Color, LastMove, Move, Role, Square,
};

/// Cached outcome flags of a position, refreshed by
/// [`BoardPosition::update_status()`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Status {
    pub check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub insufficient_material: bool,
}

/// A chess position: the board, the side to move, castling rights, en
/// passant squares, move counters and a few cached flags.
///
/// The move number is the number of the move that led to the position. It
/// is `0` in the starting position, `1` after `1. e4` and still `1` after
/// `1... e5`. The full move number of a FEN is one higher when White is to
/// move.
///
/// Two positions compare equal if they agree on every FEN field. Cached
/// flags, the last move and the inherited en passant square are ignored.
#[derive(Clone, Debug)]
pub struct BoardPosition {
    pub(crate) board: Board,
    pub(crate) turn: Color,
    pub(crate) castles: CastlingRights,
    pub(crate) ep_square: Option<Square>,
    pub(crate) inherited_ep_square: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) move_number: u32,
    pub(crate) status: Status,
    pub(crate) last_move: Option<LastMove>,
}

impl Default for BoardPosition {
    fn default() -> BoardPosition {
        BoardPosition::new()
    }
}

impl PartialEq for BoardPosition {
    fn eq(&self, other: &BoardPosition) -> bool {
        self.board == other.board
            && self.turn == other.turn
            && self.castles == other.castles
            && self.ep_square == other.ep_square
            && self.halfmove_clock == other.halfmove_clock
            && self.move_number == other.move_number
    }
}

impl Eq for BoardPosition {}

impl Hash for BoardPosition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.board.hash(state);
        self.turn.hash(state);
        self.castles.hash(state);
        self.ep_square.hash(state);
        self.halfmove_clock.hash(state);
        self.move_number.hash(state);
    }
}

impl BoardPosition {
    /// The standard starting position.
    pub fn new() -> BoardPosition {
        BoardPosition::from_board(Board::new(), Color::White, CastlingRights::all())
    }

    /// A position with no pieces and no castling rights.
    pub fn empty() -> BoardPosition {
        BoardPosition::from_board(Board::empty(), Color::White, CastlingRights::empty())
    }

    pub fn from_board(board: Board, turn: Color, castles: CastlingRights) -> BoardPosition {
        BoardPosition {
            board,
            turn,
            castles,
            ep_square: None,
            inherited_ep_square: None,
            halfmove_clock: 0,
            move_number: 0,
            status: Status::default(),
            last_move: None,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn set_turn(&mut self, turn: Color) {
        self.turn = turn;
    }

    #[inline]
    pub fn castles(&self) -> CastlingRights {
        self.castles
    }

    pub fn set_castles(&mut self, castles: CastlingRights) {
        self.castles = castles;
    }

    /// The square behind a pawn that just made a double step, i.e. the
    /// square the side to move could capture on en passant.
    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    pub fn set_ep_square(&mut self, ep_square: Option<Square>) {
        self.ep_square = ep_square;
    }

    /// The en passant square that was in force when the move leading to
    /// this position was made.
    #[inline]
    pub fn inherited_ep_square(&self) -> Option<Square> {
        self.inherited_ep_square
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn set_halfmove_clock(&mut self, halfmove_clock: u32) {
        self.halfmove_clock = halfmove_clock;
    }

    #[inline]
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    pub fn set_move_number(&mut self, move_number: u32) {
        self.move_number = move_number;
    }

    /// The full move number as written in a FEN.
    pub fn fullmoves(&self) -> u32 {
        self.move_number + self.turn.fold(1, 0)
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_check(&self) -> bool {
        self.status.check
    }

    pub fn is_checkmate(&self) -> bool {
        self.status.checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.status.stalemate
    }

    #[inline]
    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    /// The square of the king of the given color.
    pub fn king_of(&self, color: Color) -> Option<Square> {
        self.board.king_of(color)
    }

    /// Tests that the king of `color` is not attacked. Boards without such a
    /// king are considered safe.
    pub fn king_safe(&self, color: Color) -> bool {
        self.king_of(color)
            .is_none_or(|king| !attacks::is_attacked(&self.board, king, !color))
    }

    /// Tests whether the side to move is in check, without looking at the
    /// cached flags.
    pub fn in_check(&self) -> bool {
        !self.king_safe(self.turn)
    }

    /// Neither side can possibly mate: bare kings, a single minor piece, or
    /// one bishop each on squares of the same color.
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = Vec::with_capacity(2);
        for (sq, piece) in self.board.pieces() {
            match piece.role {
                Role::King => (),
                Role::Knight | Role::Bishop => {
                    minors.push((sq, piece));
                    if minors.len() > 2 {
                        return false;
                    }
                }
                _ => return false,
            }
        }

        match minors[..] {
            [] | [_] => true,
            [(a, pa), (b, pb)] => {
                pa.role == Role::Bishop
                    && pb.role == Role::Bishop
                    && pa.color != pb.color
                    && a.is_light() == b.is_light()
            }
            _ => false,
        }
    }

    /// Recomputes check, checkmate, stalemate and insufficient material.
    pub fn update_status(&mut self) {
        let check = self.in_check();
        let has_move = self.has_legal_move();
        let insufficient_material = !check && has_move && self.is_insufficient_material();
        self.status = Status {
            check,
            checkmate: check && !has_move,
            stalemate: !check && !has_move,
            insufficient_material,
        };
    }

    /// Drops every castling right whose king or rook is not on its home
    /// square.
    pub fn correct_castling_rights(&mut self) {
        for color in Color::ALL {
            if self.board.piece_at(CastlingSide::king_from(color)) != Some(color.king()) {
                self.castles.discard_color(color);
                continue;
            }
            for side in CastlingSide::ALL {
                if self.board.piece_at(side.rook_from(color)) != Some(color.rook()) {
                    self.castles.remove(CastlingRights::flag(color, side));
                }
            }
        }
    }

    /// Grants every castling right the piece placement allows. Used for
    /// setups that come without castling information.
    pub fn guess_castling_rights(&mut self) {
        self.castles = CastlingRights::all();
        self.correct_castling_rights();
    }

    /// Plays a move without checking its legality. Cached flags are reset
    /// and need to be refreshed with [`BoardPosition::update_status()`].
    pub fn play_unchecked(&mut self, m: Move) {
        let color = self.turn;

        self.inherited_ep_square = self.ep_square.take();
        self.status = Status::default();

        if m.is_zeroing() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        self.last_move = match m {
            Move::Normal {
                role,
                from,
                capture,
                to,
                promotion,
            } => {
                if capture.is_some() || self.board.is_occupied(to) {
                    self.castles.discard_rook(to);
                }
                match role {
                    Role::King => self.castles.discard_color(color),
                    Role::Rook => self.castles.discard_rook(from),
                    Role::Pawn if (to.rank().index() - from.rank().index()).abs() == 2 => {
                        self.ep_square = from.offset(0, color.forward());
                    }
                    _ => (),
                }

                self.board.remove_piece_at(from);
                self.board.set_piece_at(to, promotion.unwrap_or(role).of(color));

                Some(LastMove {
                    from,
                    to,
                    secondary: None,
                    promotion,
                })
            }
            Move::EnPassant { from, to } => {
                self.board.remove_piece_at(Square::from_coords(to.file(), from.rank()));
                self.board.remove_piece_at(from);
                self.board.set_piece_at(to, color.pawn());

                Some(LastMove {
                    from,
                    to,
                    secondary: None,
                    promotion: None,
                })
            }
            Move::Castle { king, rook } => {
                let side = if king < rook {
                    CastlingSide::KingSide
                } else {
                    CastlingSide::QueenSide
                };
                let king_to = side.king_to(color);
                let rook_to = side.rook_to(color);

                self.board.remove_piece_at(king);
                self.board.remove_piece_at(rook);
                self.board.set_piece_at(king_to, color.king());
                self.board.set_piece_at(rook_to, color.rook());
                self.castles.discard_color(color);

                Some(LastMove {
                    from: king,
                    to: king_to,
                    secondary: Some((rook, rook_to)),
                    promotion: None,
                })
            }
            Move::Null => {
                self.inherited_ep_square = None;
                None
            }
        };

        if color.is_white() {
            self.move_number += 1;
        }
        self.turn = !color;
    }

    /// Validates and plays a move, then refreshes the cached flags.
    ///
    /// # Errors
    ///
    /// Returns [`MoveErrorKind::IllegalCastling`] for castling moves that
    /// are not allowed, and [`MoveErrorKind::NoSuchMove`] for any other
    /// illegal move.
    pub fn play(&mut self, m: Move) -> Result<(), MoveError> {
        if !m.is_null() && !self.is_legal(m) {
            let kind = if m.is_castle() {
                MoveErrorKind::IllegalCastling
            } else {
                MoveErrorKind::NoSuchMove
            };
            return Err(MoveError::new(kind, m.to_string()));
        }
        self.play_unchecked(m);
        self.update_status();
        Ok(())
    }

    /// Returns a copy of the position after a legal move.
    ///
    /// # Errors
    ///
    /// See [`BoardPosition::play()`].
    pub fn played(&self, m: Move) -> Result<BoardPosition, MoveError> {
        let mut pos = self.clone();
        pos.play(m)?;
        Ok(pos)
    }

    /// Parses a move in algebraic notation, resolves it against this
    /// position and plays it.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] if the notation is invalid, or does not resolve
    /// to exactly one legal move.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_study::BoardPosition;
    ///
    /// let mut pos = BoardPosition::new();
    /// pos.play_san("e4")?;
    /// assert_eq!(
    ///     pos.fen(),
    ///     "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
    /// );
    /// # Ok::<_, chess_study::MoveError>(())
    /// ```
    pub fn play_san(&mut self, text: &str) -> Result<Move, MoveError> {
        let san = SanPlus::from_ascii(text.as_bytes())
            .map_err(|_| MoveError::new(MoveErrorKind::InvalidNotation, text))?
            .san;
        let m = san.to_move(self).map_err(|err| MoveError {
            notation: text.to_owned(),
            ..err
        })?;
        self.play_unchecked(m);
        self.update_status();
        Ok(m)
    }

    /// Like [`BoardPosition::play_san()`], for an already parsed move.
    ///
    /// # Errors
    ///
    /// See [`BoardPosition::play_san()`].
    pub fn play_parsed(&mut self, san: &San) -> Result<Move, MoveError> {
        let m = san.to_move(self)?;
        self.play_unchecked(m);
        self.update_status();
        Ok(m)
    }
}
