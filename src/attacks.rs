//! Attack queries and ray tables.
//!
//! # Examples
//!
//! ```
//! use chess_study::{attacks, Board, Color, Square};
//!
//! let board = Board::new();
//! let attackers = attacks::attackers(&board, Square::F3, Color::White);
//! assert!(attackers.contains(&Square::G1)); // knight
//! assert!(attackers.contains(&Square::E2)); // pawn
//! assert!(attackers.contains(&Square::G2)); // pawn
//! assert_eq!(attackers.len(), 3);
//! ```

use std::array;

use arrayvec::ArrayVec;
use once_cell::sync::Lazy;

use crate::{Board, Color, File, Rank, Role, Square};

/// Squares of the pieces found by a query. A side never has more than 16
/// pieces.
pub type Squares = ArrayVec<Square, 16>;

/// Orthogonal directions first, then diagonals.
const DIRECTIONS: [(i32, i32); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

const KNIGHT_DELTAS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

fn step_targets(deltas: &[(i32, i32); 8]) -> [ArrayVec<Square, 8>; 64] {
    array::from_fn(|index| {
        let sq = Square::ALL[index];
        deltas
            .iter()
            .filter_map(|&(df, dr)| sq.offset(df, dr))
            .collect()
    })
}

static KNIGHT_TARGETS: Lazy<[ArrayVec<Square, 8>; 64]> = Lazy::new(|| step_targets(&KNIGHT_DELTAS));

static KING_TARGETS: Lazy<[ArrayVec<Square, 8>; 64]> = Lazy::new(|| step_targets(&DIRECTIONS));

/// For every square and direction, the squares up to the edge of the board,
/// nearest first.
static RAYS: Lazy<[[ArrayVec<Square, 7>; 8]; 64]> = Lazy::new(|| {
    array::from_fn(|index| {
        let origin = Square::ALL[index];
        array::from_fn(|dir| {
            let (df, dr) = DIRECTIONS[dir];
            let mut ray = ArrayVec::new();
            let mut sq = origin;
            while let Some(next) = sq.offset(df, dr) {
                ray.push(next);
                sq = next;
            }
            ray
        })
    })
});

/// Squares a knight on `sq` jumps to.
pub fn knight_targets(sq: Square) -> &'static [Square] {
    &KNIGHT_TARGETS[sq.index()]
}

/// Squares adjacent to `sq`.
pub fn king_targets(sq: Square) -> &'static [Square] {
    &KING_TARGETS[sq.index()]
}

/// Squares from `sq` towards the edge, in one of the eight directions.
/// Directions `0..4` are orthogonal, `4..8` diagonal.
pub fn ray(sq: Square, dir: usize) -> &'static [Square] {
    &RAYS[sq.index()][dir]
}

/// Tests whether a slider of the given role moves along direction `dir`.
pub fn slides_along(role: Role, dir: usize) -> bool {
    match role {
        Role::Rook => dir < 4,
        Role::Bishop => dir >= 4,
        Role::Queen => true,
        _ => false,
    }
}

/// Squares a slider on `from` reaches, stopping at (and including) the
/// first occupied square in each direction.
pub fn slider_targets(board: &Board, from: Square, role: Role) -> ArrayVec<Square, 27> {
    let mut targets = ArrayVec::new();
    for dir in (0..8).filter(|&dir| slides_along(role, dir)) {
        for &sq in ray(from, dir) {
            targets.push(sq);
            if board.is_occupied(sq) {
                break;
            }
        }
    }
    targets
}

/// Which pieces of one color reach a target square.
///
/// By default, pawns are considered to attack diagonally only, which is the
/// right question for check detection. With [`AttackQuery::pawn_moves`],
/// pawns are instead matched by how they would move to the target: straight
/// pushes onto an empty square (including the double step from the start
/// rank) and diagonal captures onto an enemy piece or the en passant square.
/// That is the question asked when resolving the origin of a notated move.
///
/// Whether moving the piece would expose its own king is not considered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttackQuery {
    pub target: Square,
    pub color: Color,
    pub role: Option<Role>,
    pub file: Option<File>,
    pub rank: Option<Rank>,
    pub pawn_moves: bool,
    pub ep_square: Option<Square>,
}

impl AttackQuery {
    pub fn new(target: Square, color: Color) -> AttackQuery {
        AttackQuery {
            target,
            color,
            role: None,
            file: None,
            rank: None,
            pawn_moves: false,
            ep_square: None,
        }
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> AttackQuery {
        self.role = Some(role);
        self
    }

    /// Restricts origins to a file and/or a rank.
    #[must_use]
    pub fn hints(mut self, file: Option<File>, rank: Option<Rank>) -> AttackQuery {
        self.file = file;
        self.rank = rank;
        self
    }

    #[must_use]
    pub fn pawn_moves(mut self, ep_square: Option<Square>) -> AttackQuery {
        self.pawn_moves = true;
        self.ep_square = ep_square;
        self
    }

    fn accepts(&self, board: &Board, sq: Square, role: Role) -> bool {
        self.role.is_none_or(|r| r == role)
            && self.file.is_none_or(|f| f == sq.file())
            && self.rank.is_none_or(|r| r == sq.rank())
            && board.piece_at(sq) == Some(role.of(self.color))
    }

    /// Runs the query on a board.
    pub fn run(&self, board: &Board) -> Squares {
        let mut found = Squares::new();

        if board.color_at(self.target) == Some(self.color) {
            return found;
        }

        let push = |sq: Square, found: &mut Squares| {
            if !found.contains(&sq) {
                found.push(sq);
            }
        };

        // Sliders, looking outwards from the target.
        for dir in 0..8 {
            if let Some(&sq) = ray(self.target, dir).iter().find(|&&sq| board.is_occupied(sq)) {
                if let Some(role) = board.role_at(sq) {
                    if slides_along(role, dir) && self.accepts(board, sq, role) {
                        push(sq, &mut found);
                    }
                }
            }
        }

        for &sq in knight_targets(self.target) {
            if self.accepts(board, sq, Role::Knight) {
                push(sq, &mut found);
            }
        }

        for &sq in king_targets(self.target) {
            if self.accepts(board, sq, Role::King) {
                push(sq, &mut found);
            }
        }

        let back = -self.color.forward();
        let diagonal = !self.pawn_moves
            || board.color_at(self.target) == Some(!self.color)
            || self.ep_square == Some(self.target);
        if diagonal {
            for df in [-1, 1] {
                if let Some(sq) = self.target.offset(df, back) {
                    if self.accepts(board, sq, Role::Pawn) {
                        push(sq, &mut found);
                    }
                }
            }
        }

        if self.pawn_moves && !board.is_occupied(self.target) {
            if let Some(one) = self.target.offset(0, back) {
                if self.accepts(board, one, Role::Pawn) {
                    push(one, &mut found);
                } else if !board.is_occupied(one)
                    && self.target.rank() == Rank::Fourth.relative_to(self.color)
                {
                    if let Some(two) = one.offset(0, back) {
                        if self.accepts(board, two, Role::Pawn) {
                            push(two, &mut found);
                        }
                    }
                }
            }
        }

        found
    }
}

/// Squares of all pieces of `color` attacking `target`.
pub fn attackers(board: &Board, target: Square, color: Color) -> Squares {
    AttackQuery::new(target, color).run(board)
}

/// Tests whether any piece of `color` attacks `target`.
pub fn is_attacked(board: &Board, target: Square, color: Color) -> bool {
    !attackers(board, target, color).is_empty()
}
