//! Parse and write Forsyth-Edwards-Notation.
//!
//! # Examples
//!
//! Parse and write FENs:
//!
//! ```
//! use chess_study::{fen, BoardPosition};
//!
//! let pos = fen::parse("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1", false)?;
//! assert_eq!(pos.move_number(), 1);
//! assert_eq!(
//!     fen::short_fen(&pos),
//!     "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3"
//! );
//! # Ok::<_, chess_study::fen::ParseFenError>(())
//! ```

use std::{error::Error, fmt, str::FromStr};

use crate::{Board, BoardPosition, CastlingRights, Color, File, Piece, Rank, Role, Square};

/// The part of a FEN that could not be parsed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ParseFenErrorKind {
    /// Fewer than six space separated fields.
    FieldCount,
    /// Not exactly 8 ranks, a rank not totalling 8 files, or an unknown
    /// piece letter.
    Board,
    /// More than 16 pieces of one color, or more pawns and promoted pieces
    /// than eight pawns can account for.
    TooMuchMaterial,
    Turn,
    HalfmoveClock,
    Fullmoves,
}

/// Error when parsing a malformed FEN.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseFenError {
    pub kind: ParseFenErrorKind,
    pub fen: String,
}

impl ParseFenError {
    fn new(kind: ParseFenErrorKind, fen: &str) -> ParseFenError {
        ParseFenError {
            kind,
            fen: fen.to_owned(),
        }
    }
}

impl fmt::Display for ParseFenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = match self.kind {
            ParseFenErrorKind::FieldCount => "too few fields",
            ParseFenErrorKind::Board => "invalid board part",
            ParseFenErrorKind::TooMuchMaterial => "too much material",
            ParseFenErrorKind::Turn => "invalid turn part",
            ParseFenErrorKind::HalfmoveClock => "invalid halfmove clock",
            ParseFenErrorKind::Fullmoves => "invalid fullmove number",
        };
        write!(f, "malformed fen ({part}): {:?}", self.fen)
    }
}

impl Error for ParseFenError {}

/// Tests that each side has at most 16 pieces and no more pawns plus
/// promoted pieces than eight. This also bounds the number of moves to
/// what fits a [`MoveList`](crate::MoveList).
fn material_fits(board: &Board) -> bool {
    Color::ALL.into_iter().all(|color| {
        let count = |role| board.count(Piece { color, role });
        let promoted = count(Role::Queen).saturating_sub(1)
            + count(Role::Rook).saturating_sub(2)
            + count(Role::Bishop).saturating_sub(2)
            + count(Role::Knight).saturating_sub(2);
        board.pieces().filter(|(_, piece)| piece.color == color).count() <= 16
            && count(Role::Pawn) + promoted <= 8
    })
}

fn parse_board(board_part: &str) -> Option<Board> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return None;
    }

    let mut board = Board::empty();
    for (rank, text) in Rank::ALL.into_iter().rev().zip(ranks) {
        let mut file = 0;
        for ch in text.chars() {
            if let Some(empty) = ch.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += empty as i32;
            } else {
                let piece = Piece::from_char(ch)?;
                board.set_piece_at(Square::from_coords(File::from_index(file)?, rank), piece);
                file += 1;
            }
            if file > 8 {
                return None;
            }
        }
        if file != 8 {
            return None;
        }
    }

    Some(board)
}

/// Parses a FEN.
///
/// With `position_only`, only the board field is required and read: White
/// is to move, there are no castling rights and the counters start at zero.
/// Otherwise all six fields must be present. Unknown castling letters are
/// ignored and an en passant field that is not a square counts as `-`.
///
/// The full move number is stored one ply behind the FEN when White is to
/// move (see [`BoardPosition::move_number()`]).
///
/// # Errors
///
/// Returns [`ParseFenError`] for malformed input.
pub fn parse(fen: &str, position_only: bool) -> Result<BoardPosition, ParseFenError> {
    let fields: Vec<&str> = fen.split_ascii_whitespace().collect();
    if fields.len() < 6 && !position_only {
        return Err(ParseFenError::new(ParseFenErrorKind::FieldCount, fen));
    }

    let board = parse_board(fields.first().copied().unwrap_or_default())
        .ok_or_else(|| ParseFenError::new(ParseFenErrorKind::Board, fen))?;
    if !material_fits(&board) {
        return Err(ParseFenError::new(ParseFenErrorKind::TooMuchMaterial, fen));
    }

    let mut pos = BoardPosition::from_board(board, Color::White, CastlingRights::empty());

    if !position_only {
        pos.turn = match fields[1].as_bytes() {
            [ch] => Color::from_char(char::from(*ch)),
            _ => None,
        }
        .ok_or_else(|| ParseFenError::new(ParseFenErrorKind::Turn, fen))?;

        pos.castles = CastlingRights::from_ascii(fields[2].as_bytes());

        pos.ep_square = Square::from_ascii(fields[3].as_bytes()).ok();

        pos.halfmove_clock = btoi::btou(fields[4].as_bytes())
            .map_err(|_| ParseFenError::new(ParseFenErrorKind::HalfmoveClock, fen))?;

        let fullmoves: u32 = btoi::btou(fields[5].as_bytes())
            .map_err(|_| ParseFenError::new(ParseFenErrorKind::Fullmoves, fen))?;
        pos.move_number = match pos.turn {
            Color::White => fullmoves.saturating_sub(1),
            Color::Black => fullmoves,
        };
    }

    pos.update_status();
    Ok(pos)
}

/// Writes the FEN of a position, such as
/// `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`.
pub fn fen(pos: &BoardPosition) -> String {
    format!(
        "{} {} {}",
        short_fen(pos),
        pos.halfmove_clock(),
        pos.fullmoves()
    )
}

/// Writes the first four fields of a FEN, such as
/// `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -`. Positions that
/// differ only in their move counters have the same short FEN.
pub fn short_fen(pos: &BoardPosition) -> String {
    format!(
        "{} {} {} {}",
        pos.board().board_fen(),
        pos.turn().char(),
        pos.castles().fen(),
        pos.ep_square().map_or_else(|| "-".to_owned(), |sq| sq.to_string())
    )
}

impl BoardPosition {
    /// See [`parse()`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseFenError`] for malformed input.
    pub fn from_fen(fen: &str, position_only: bool) -> Result<BoardPosition, ParseFenError> {
        parse(fen, position_only)
    }

    /// See [`fen()`].
    pub fn fen(&self) -> String {
        fen(self)
    }

    /// See [`short_fen()`].
    pub fn short_fen(&self) -> String {
        short_fen(self)
    }
}

impl FromStr for BoardPosition {
    type Err = ParseFenError;

    fn from_str(fen: &str) -> Result<BoardPosition, ParseFenError> {
        parse(fen, false)
    }
}

impl fmt::Display for BoardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&fen(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_starting_position() {
        let pos = parse(START, false).expect("valid fen");
        assert_eq!(pos, BoardPosition::new());
        assert_eq!(fen(&pos), START);
    }

    #[test]
    fn test_field_count() {
        let err = parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -", false)
            .expect_err("too few fields");
        assert_eq!(err.kind, ParseFenErrorKind::FieldCount);
        assert!(parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR", true).is_ok());
    }

    #[test]
    fn test_invalid_board() {
        for board in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR/8",
            "rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR",
            "rnbqkbnr/pppppppp/44/8/8/8/PPPPPPPP/RNBQKBNX",
        ] {
            let err = parse(board, true).expect_err("invalid board");
            assert_eq!(err.kind, ParseFenErrorKind::Board, "{board}");
        }
    }

    #[test]
    fn test_lenient_fields() {
        let pos = parse("8/8/8/4k3/8/8/8/4K3 B KQxq e9 12 40", false).expect("lenient");
        assert_eq!(pos.turn(), Color::Black);
        assert_eq!(pos.castles().fen(), "KQq");
        assert_eq!(pos.ep_square(), None);
        assert_eq!(pos.move_number(), 40);
        assert_eq!(fen(&pos), "8/8/8/4k3/8/8/8/4K3 b KQq - 12 40");
    }

    #[test]
    fn test_invalid_counters() {
        let err = parse("8/8/8/4k3/8/8/8/4K3 w - - x 1", false).expect_err("halfmoves");
        assert_eq!(err.kind, ParseFenErrorKind::HalfmoveClock);
        let err = parse("8/8/8/4k3/8/8/8/4K3 w - - 0 -1", false).expect_err("fullmoves");
        assert_eq!(err.kind, ParseFenErrorKind::Fullmoves);
        let err = parse("8/8/8/4k3/8/8/8/4K3 x - - 0 1", false).expect_err("turn");
        assert_eq!(err.kind, ParseFenErrorKind::Turn);
    }

    #[test]
    fn test_too_much_material() {
        // Too many pieces, then too many promoted pieces for the pawns.
        for board in ["QQQQQQQQ/QQQQQQQQ/QQ6/8/8/8/8/k6K", "QQQQQ3/QQQQQ3/8/8/8/8/PP6/k6K"] {
            let err = parse(board, true).expect_err("too much material");
            assert_eq!(err.kind, ParseFenErrorKind::TooMuchMaterial, "{board}");
        }

        // Nine queens are fine without pawns.
        let pos = parse("R6R/3Q4/1Q4Q1/4Q3/2Q4Q/Q4Q2/pp1Q4/kBNN1KB1 w - - 0 1", false)
            .expect("valid fen");
        assert_eq!(pos.legal_moves().len(), 218);
    }

    #[test]
    fn test_extra_whitespace() {
        let pos = parse(" 8/8/8/4k3/8/8/8/4K3  b\t-  -  3 20\n", false).expect("valid");
        assert_eq!(fen(&pos), "8/8/8/4k3/8/8/8/4K3 b - - 3 20");
        let err = parse("", true).expect_err("empty");
        assert_eq!(err.kind, ParseFenErrorKind::Board);
    }

    #[test]
    fn test_short_fen_ignores_counters() {
        let a = parse("8/8/8/4k3/8/8/8/4K3 w - - 0 1", false).expect("valid");
        let b = parse("8/8/8/4k3/8/8/8/4K3 w - - 7 33", false).expect("valid");
        assert_ne!(a, b);
        assert_eq!(a.short_fen(), b.short_fen());
    }
}
