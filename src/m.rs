use std::{
    fmt,
    fmt::{Display, Write as _},
};

use arrayvec::ArrayVec;

use crate::{CastlingSide, Role, Square};

/// A fully resolved move.
///
/// # Display
///
/// `Move` implements [`Display`] using long algebraic notation. If a position
/// is available for context, it is more common to use [SAN](crate::san)
/// (for human interfaces) or [UCI](crate::uci) (for engines).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Move {
    /// A normal move, e.g., `Bd3xh7`.
    Normal {
        role: Role,
        from: Square,
        capture: Option<Role>,
        to: Square,
        promotion: Option<Role>,
    },
    /// An en passant capture, e.g., `e5xd6`.
    EnPassant { from: Square, to: Square },
    /// A castling move, `O-O` or `O-O-O`, given by the home squares of king
    /// and rook.
    Castle { king: Square, rook: Square },
    /// A null move (`--` or `Z0`), passing the turn.
    Null,
}

impl Move {
    /// Gets the role of the moved piece, or `None` for null moves.
    pub const fn role(self) -> Option<Role> {
        match self {
            Move::Normal { role, .. } => Some(role),
            Move::EnPassant { .. } => Some(Role::Pawn),
            Move::Castle { .. } => Some(Role::King),
            Move::Null => None,
        }
    }

    /// Gets the origin square. For castling moves this is the king square.
    pub const fn from(self) -> Option<Square> {
        match self {
            Move::Normal { from, .. } | Move::EnPassant { from, .. } => Some(from),
            Move::Castle { king, .. } => Some(king),
            Move::Null => None,
        }
    }

    /// Gets the square the moving piece ends up on. For castling moves this
    /// is the destination of the king.
    pub fn to(self) -> Option<Square> {
        match self {
            Move::Normal { to, .. } | Move::EnPassant { to, .. } => Some(to),
            Move::Castle { king, .. } => {
                let side = self.castling_side()?;
                Some(Square::from_coords(side.king_to_file(), king.rank()))
            }
            Move::Null => None,
        }
    }

    /// Gets the role of the captured piece or `None`.
    pub const fn capture(self) -> Option<Role> {
        match self {
            Move::Normal { capture, .. } => capture,
            Move::EnPassant { .. } => Some(Role::Pawn),
            _ => None,
        }
    }

    pub const fn is_capture(self) -> bool {
        matches!(
            self,
            Move::Normal {
                capture: Some(_),
                ..
            } | Move::EnPassant { .. }
        )
    }

    pub const fn is_en_passant(self) -> bool {
        matches!(self, Move::EnPassant { .. })
    }

    /// Checks if the move resets the half-move clock.
    pub const fn is_zeroing(self) -> bool {
        matches!(
            self,
            Move::Normal {
                role: Role::Pawn,
                ..
            } | Move::Normal {
                capture: Some(_),
                ..
            } | Move::EnPassant { .. }
        )
    }

    pub fn castling_side(self) -> Option<CastlingSide> {
        match self {
            Move::Castle { king, rook } => Some(if king < rook {
                CastlingSide::KingSide
            } else {
                CastlingSide::QueenSide
            }),
            _ => None,
        }
    }

    pub const fn is_castle(self) -> bool {
        matches!(self, Move::Castle { .. })
    }

    pub const fn is_null(self) -> bool {
        matches!(self, Move::Null)
    }

    pub const fn promotion(self) -> Option<Role> {
        match self {
            Move::Normal { promotion, .. } => promotion,
            _ => None,
        }
    }

    pub const fn is_promotion(self) -> bool {
        matches!(
            self,
            Move::Normal {
                promotion: Some(_),
                ..
            }
        )
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Move::Normal {
                role,
                from,
                capture,
                to,
                promotion,
            } => {
                if role != Role::Pawn {
                    f.write_char(role.upper_char())?;
                }

                write!(
                    f,
                    "{}{}{}",
                    from,
                    if capture.is_some() { 'x' } else { '-' },
                    to
                )?;

                if let Some(p) = promotion {
                    write!(f, "={}", p.upper_char())?;
                }

                Ok(())
            }
            Move::EnPassant { from, to } => write!(f, "{from}x{to}"),
            Move::Castle { king, rook } => f.write_str(if king < rook { "O-O" } else { "O-O-O" }),
            Move::Null => f.write_str("--"),
        }
    }
}

/// A container for moves that can be stored inline on the stack.
///
/// The capacity is enough to hold the legal moves of any chess position.
///
/// # Example
///
/// ```
/// use chess_study::{BoardPosition, Role};
///
/// let pos = BoardPosition::default();
/// let mut moves = pos.legal_moves();
/// moves.retain(|m| m.role() == Some(Role::Pawn));
/// assert_eq!(moves.len(), 16);
/// ```
pub type MoveList = ArrayVec<Move, 256>;
