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

//! Legal move generation.
//!
//! Candidate moves are produced per piece from its movement pattern, then
//! every candidate is played on a copy of the position and kept only if the
//! mover's king is not attacked afterwards.

use crate::{
    attacks, BoardPosition, CastlingSide, Move, MoveList, Piece, Rank, Role, Square,
};

impl BoardPosition {
    /// Tests whether the side to move may castle to the given side right
    /// now: the right is held, king and rook are on their home squares, the
    /// squares between them are empty, and the king neither stands on, nor
    /// passes over, nor lands on an attacked square.
    pub fn is_castling_legal(&self, side: CastlingSide) -> bool {
        let color = self.turn;
        self.castles.has(color, side)
            && self.board.piece_at(CastlingSide::king_from(color)) == Some(color.king())
            && self.board.piece_at(side.rook_from(color)) == Some(color.rook())
            && side
                .empty_path(color)
                .iter()
                .all(|&sq| !self.board.is_occupied(sq))
            && side
                .king_path(color)
                .iter()
                .all(|&sq| !attacks::is_attacked(&self.board, sq, !color))
    }

    /// Tests whether the mover's king is safe after playing `m`.
    pub(crate) fn is_safe(&self, m: Move) -> bool {
        let mut after = self.clone();
        after.play_unchecked(m);
        after.king_safe(self.turn)
    }

    fn push_pawn_move(&self, moves: &mut MoveList, from: Square, to: Square) {
        let capture = self.board.role_at(to);
        if to.rank() == Rank::Eighth.relative_to(self.turn) {
            for promotion in Role::PROMOTIONS {
                moves.push(Move::Normal {
                    role: Role::Pawn,
                    from,
                    capture,
                    to,
                    promotion: Some(promotion),
                });
            }
        } else {
            moves.push(Move::Normal {
                role: Role::Pawn,
                from,
                capture,
                to,
                promotion: None,
            });
        }
    }

    fn pawn_candidates(&self, moves: &mut MoveList, from: Square) {
        let color = self.turn;
        let forward = color.forward();

        if let Some(one) = from.offset(0, forward) {
            if !self.board.is_occupied(one) {
                self.push_pawn_move(moves, from, one);
                if from.rank() == color.pawn_rank() {
                    if let Some(two) = one.offset(0, forward) {
                        if !self.board.is_occupied(two) {
                            self.push_pawn_move(moves, from, two);
                        }
                    }
                }
            }
        }

        for df in [-1, 1] {
            if let Some(to) = from.offset(df, forward) {
                if self.board.color_at(to) == Some(!color) {
                    self.push_pawn_move(moves, from, to);
                } else if self.ep_square == Some(to)
                    && self.board.piece_at(Square::from_coords(to.file(), from.rank()))
                        == Some((!color).pawn())
                {
                    moves.push(Move::EnPassant { from, to });
                }
            }
        }
    }

    fn push_targets(&self, moves: &mut MoveList, from: Square, piece: Piece, targets: &[Square]) {
        for &to in targets {
            let capture = self.board.piece_at(to);
            if capture.is_none_or(|c| c.color != piece.color) {
                moves.push(Move::Normal {
                    role: piece.role,
                    from,
                    capture: capture.map(|c| c.role),
                    to,
                    promotion: None,
                });
            }
        }
    }

    fn candidates(&self, moves: &mut MoveList, from: Square, piece: Piece) {
        match piece.role {
            Role::Pawn => self.pawn_candidates(moves, from),
            Role::Knight => self.push_targets(moves, from, piece, attacks::knight_targets(from)),
            Role::King => {
                self.push_targets(moves, from, piece, attacks::king_targets(from));
                if from == CastlingSide::king_from(piece.color) {
                    for side in CastlingSide::ALL {
                        if self.is_castling_legal(side) {
                            moves.push(Move::Castle {
                                king: from,
                                rook: side.rook_from(piece.color),
                            });
                        }
                    }
                }
            }
            Role::Bishop | Role::Rook | Role::Queen => {
                let targets = attacks::slider_targets(&self.board, from, piece.role);
                self.push_targets(moves, from, piece, &targets);
            }
        }
    }

    /// Generates legal moves of the piece of the side to move on `from`.
    /// With `stop_at_first`, generation ends as soon as one legal move is
    /// found.
    fn generate(&self, moves: &mut MoveList, from: Square, stop_at_first: bool) {
        let Some(piece) = self.board.piece_at(from).filter(|p| p.color == self.turn) else {
            return;
        };

        let start = moves.len();
        self.candidates(moves, from, piece);

        let mut i = start;
        while i < moves.len() {
            if self.is_safe(moves[i]) {
                if stop_at_first {
                    moves.truncate(i + 1);
                    moves.drain(start..i);
                    return;
                }
                i += 1;
            } else {
                moves.remove(i);
            }
        }
    }

    /// Generates all legal moves of the side to move.
    ///
    /// # Panics
    ///
    /// Panics if the moves do not fit a [`MoveList`]. That cannot happen
    /// within the material limits checked by [`fen::parse()`](crate::fen::parse),
    /// but can for boards built piece by piece.
    pub fn legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        for sq in Square::ALL {
            self.generate(&mut moves, sq, false);
        }
        moves
    }

    /// Generates the legal moves of the piece on `from`. Empty if `from`
    /// does not hold a piece of the side to move.
    pub fn legal_moves_from(&self, from: Square) -> MoveList {
        let mut moves = MoveList::new();
        self.generate(&mut moves, from, false);
        moves
    }

    /// Tests whether the side to move has at least one legal move.
    pub fn has_legal_move(&self) -> bool {
        let mut moves = MoveList::new();
        for sq in Square::ALL {
            self.generate(&mut moves, sq, true);
            if !moves.is_empty() {
                return true;
            }
        }
        false
    }

    /// Tests a move for legality.
    pub fn is_legal(&self, m: Move) -> bool {
        m.from()
            .is_some_and(|from| self.legal_moves_from(from).contains(&m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn pos(fen: &str) -> BoardPosition {
        BoardPosition::from_fen(fen, false).expect("valid fen")
    }

    #[test]
    fn test_starting_moves() {
        let pos = BoardPosition::new();
        assert_eq!(pos.legal_moves().len(), 20);
        assert_eq!(pos.legal_moves_from(Square::G1).len(), 2);
        assert!(pos.legal_moves_from(Square::E7).is_empty());
        assert!(pos.has_legal_move());
    }

    #[test]
    fn test_pinned_piece() {
        // The knight on d2 shields its king from the bishop on b4.
        let pos = pos("4k3/8/8/8/1b6/8/3N4/4K3 w - - 0 1");
        assert!(pos.legal_moves_from(Square::D2).is_empty());
    }

    #[test]
    fn test_castling_through_check() {
        let mut p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(p.is_castling_legal(CastlingSide::KingSide));
        assert!(p.is_castling_legal(CastlingSide::QueenSide));

        // Rook on f8 covers f1, so O-O is out.
        p.board_mut().set_piece_at(Square::F8, Color::Black.rook());
        assert!(!p.is_castling_legal(CastlingSide::KingSide));

        // b1 is not passed by the king, so an attack there does not matter,
        // but the square must be empty.
        p.board_mut().set_piece_at(Square::B8, Color::Black.rook());
        assert!(p.is_castling_legal(CastlingSide::QueenSide));
        p.board_mut().set_piece_at(Square::B1, Color::White.pawn());
        assert!(!p.is_castling_legal(CastlingSide::QueenSide));
    }

    #[test]
    fn test_castling_out_of_check() {
        let p = pos("r3k2r/8/8/8/8/8/4q3/R3K2R w KQkq - 0 1");
        assert!(!p.is_castling_legal(CastlingSide::KingSide));
        assert!(!p.is_castling_legal(CastlingSide::QueenSide));
    }

    #[test]
    fn test_en_passant_generation() {
        let p = pos("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let moves = p.legal_moves_from(Square::E5);
        assert!(moves.contains(&Move::EnPassant {
            from: Square::E5,
            to: Square::D6
        }));
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn test_promotions() {
        let p = pos("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        assert_eq!(p.legal_moves_from(Square::E7).len(), 4);
    }

    #[test]
    fn test_checkmate_has_no_moves() {
        let p = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(!p.has_legal_move());
        assert!(p.legal_moves().is_empty());
        assert!(p.is_checkmate());
    }
}
