//! Read and write Standard Algebraic Notation.
//!
//! The reader is forgiving, as moves typed by people tend to be: `0-0` is
//! castling, the capture marker may be missing or misplaced, the origin may
//! be given as a file, a rank or a full square, `e8Q` is a promotion and
//! trailing text after the move is ignored.
//!
//! # Examples
//!
//! Parse and write SANs:
//!
//! ```
//! use chess_study::san::San;
//!
//! let san: San = "Nf3".parse()?;
//! assert_eq!(san.to_string(), "Nf3");
//! # Ok::<_, chess_study::san::ParseSanError>(())
//! ```
//!
//! Converting to a move and back:
//!
//! ```
//! use chess_study::{san::San, BoardPosition, Move, Role, Square};
//!
//! let pos = BoardPosition::new();
//! let san: San = "Ng1f3".parse().expect("valid san");
//! let m = san.to_move(&pos)?;
//!
//! assert_eq!(m, Move::Normal {
//!     role: Role::Knight,
//!     from: Square::G1,
//!     capture: None,
//!     to: Square::F3,
//!     promotion: None,
//! });
//! assert_eq!(San::from_move(&pos, m).to_string(), "Nf3");
//! # Ok::<_, chess_study::MoveError>(())
//! ```

use std::{borrow::Cow, error::Error, fmt, str::FromStr};

use crate::{
    attacks::AttackQuery,
    errors::{MoveError, MoveErrorKind},
    BoardPosition, CastlingSide, File, Move, Nag, Rank, Role, Square,
};

/// Error when parsing a syntactically invalid SAN.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseSanError;

impl fmt::Display for ParseSanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid san")
    }
}

impl Error for ParseSanError {}

/// A move in Standard Algebraic Notation.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum San {
    Normal {
        role: Role,
        file: Option<File>,
        rank: Option<Rank>,
        capture: bool,
        to: Square,
        promotion: Option<Role>,
    },
    Castle(CastlingSide),
    Null,
}

fn file_at(s: &[u8], i: usize) -> Option<File> {
    s.get(i).and_then(|&ch| File::from_char(char::from(ch)))
}

fn rank_at(s: &[u8], i: usize) -> Option<Rank> {
    s.get(i).and_then(|&ch| Rank::from_char(char::from(ch)))
}

fn strip_castling(s: &[u8]) -> Option<(CastlingSide, &[u8])> {
    for (token, side) in [
        (&b"O-O-O"[..], CastlingSide::QueenSide),
        (b"0-0-0", CastlingSide::QueenSide),
        (b"O-O", CastlingSide::KingSide),
        (b"0-0", CastlingSide::KingSide),
    ] {
        if let Some(rest) = s.strip_prefix(token) {
            return Some((side, rest));
        }
    }
    None
}

/// Reads the piece, origin hints and destination of a normal move. Returns
/// the move and whatever follows the destination square.
fn parse_normal(s: &[u8]) -> Result<(San, &[u8]), ParseSanError> {
    let first = *s.first().ok_or(ParseSanError)?;
    let (role, body) = if first.is_ascii_lowercase() {
        (Role::Pawn, s)
    } else {
        (
            Role::from_upper_char(char::from(first)).ok_or(ParseSanError)?,
            &s[1..],
        )
    };

    // A capture marker sits between the origin hints (at most two) and the
    // destination file.
    let marker = body
        .iter()
        .take(3)
        .position(|&ch| ch == b'x')
        .filter(|&i| file_at(body, i + 1).is_some());
    let coords: Cow<'_, [u8]> = match marker {
        Some(i) => Cow::Owned([&body[..i], &body[i + 1..]].concat()),
        None => Cow::Borrowed(body),
    };

    // Take the longest origin prefix that still leaves a destination.
    let (file, rank, to_file, consumed) = if let Some(rank) = rank_at(&coords, 0) {
        (None, Some(rank), file_at(&coords, 1), 2)
    } else {
        let origin = file_at(&coords, 0).ok_or(ParseSanError)?;
        if rank_at(&coords, 1).is_none() {
            (Some(origin), None, file_at(&coords, 1), 2)
        } else if file_at(&coords, 2).is_some() && rank_at(&coords, 3).is_some() {
            (Some(origin), rank_at(&coords, 1), file_at(&coords, 2), 3)
        } else {
            (None, None, Some(origin), 1)
        }
    };
    if marker.is_some_and(|i| i + 1 != consumed) {
        return Err(ParseSanError);
    }

    let to_file = to_file.ok_or(ParseSanError)?;
    let to_rank = rank_at(&coords, consumed).ok_or(ParseSanError)?;
    // Offset of the rest in `body`, accounting for a removed marker.
    let mut rest = &body[consumed + 1 + usize::from(marker.is_some())..];

    let promotion = match *rest {
        [b'=', ch, ..] => {
            rest = &rest[2..];
            Some(Role::from_char(char::from(ch)).ok_or(ParseSanError)?)
        }
        [ch, ..] if ch.is_ascii_uppercase() => {
            rest = &rest[1..];
            Some(Role::from_upper_char(char::from(ch)).ok_or(ParseSanError)?)
        }
        _ => None,
    };
    if promotion.is_some_and(|p| !p.is_promotion()) {
        return Err(ParseSanError);
    }

    Ok((
        San::Normal {
            role,
            file,
            rank,
            capture: marker.is_some(),
            to: Square::from_coords(to_file, to_rank),
            promotion,
        },
        rest,
    ))
}

impl San {
    /// Parses a SAN. Ignores a possible check or checkmate suffix, an
    /// annotation glyph and any trailing text.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSanError`] if `san` is not syntactically valid.
    pub fn from_ascii(san: &[u8]) -> Result<San, ParseSanError> {
        SanPlus::from_ascii(san).map(|san_plus| san_plus.san)
    }

    /// Converts a move to Standard Algebraic Notation, with as little
    /// origin information as needed to tell it apart from the other legal
    /// moves of pieces of the same type to the same square.
    pub fn from_move(pos: &BoardPosition, m: Move) -> San {
        match m {
            Move::Normal {
                role: Role::Pawn,
                from,
                capture,
                to,
                promotion,
            } => San::Normal {
                role: Role::Pawn,
                file: capture.map(|_| from.file()),
                rank: None,
                capture: capture.is_some(),
                to,
                promotion,
            },
            Move::Normal {
                role,
                from,
                capture,
                to,
                promotion,
            } => {
                let others: Vec<Square> = AttackQuery::new(to, pos.turn())
                    .role(role)
                    .run(pos.board())
                    .into_iter()
                    .filter(|&sq| {
                        sq != from
                            && pos.is_safe(Move::Normal {
                                role,
                                from: sq,
                                capture,
                                to,
                                promotion,
                            })
                    })
                    .collect();

                let (file, rank) = if others.is_empty() {
                    (None, None)
                } else if others.iter().all(|sq| sq.file() != from.file()) {
                    (Some(from.file()), None)
                } else if others.iter().all(|sq| sq.rank() != from.rank()) {
                    (None, Some(from.rank()))
                } else {
                    (Some(from.file()), Some(from.rank()))
                };

                San::Normal {
                    role,
                    file,
                    rank,
                    capture: capture.is_some(),
                    to,
                    promotion,
                }
            }
            Move::EnPassant { from, to } => San::Normal {
                role: Role::Pawn,
                file: Some(from.file()),
                rank: None,
                capture: true,
                to,
                promotion: None,
            },
            Move::Castle { king, rook } if rook < king => San::Castle(CastlingSide::QueenSide),
            Move::Castle { .. } => San::Castle(CastlingSide::KingSide),
            Move::Null => San::Null,
        }
    }

    /// Tries to convert the `San` to a legal move in the context of a
    /// position.
    ///
    /// Origins are looked up with an [`AttackQuery`] for the moving piece
    /// type, narrowed by the given file and rank, and kept only if the move
    /// does not leave the own king in check. A pawn reaching the last rank
    /// without a promotion piece promotes to a queen. The capture marker is
    /// not checked, except that a pawn changing files needs either the
    /// marker or its origin file.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] with kind [`MoveErrorKind::NoSuchMove`] or
    /// [`MoveErrorKind::AmbiguousMove`] if there is no unique matching legal
    /// move, and [`MoveErrorKind::IllegalCastling`] if castling is not
    /// allowed.
    pub fn to_move(&self, pos: &BoardPosition) -> Result<Move, MoveError> {
        let turn = pos.turn();
        match *self {
            San::Null => Ok(Move::Null),
            San::Castle(side) => {
                if pos.is_castling_legal(side) {
                    Ok(Move::Castle {
                        king: CastlingSide::king_from(turn),
                        rook: side.rook_from(turn),
                    })
                } else {
                    Err(MoveError::new(
                        MoveErrorKind::IllegalCastling,
                        self.to_string(),
                    ))
                }
            }
            San::Normal {
                role,
                file,
                rank,
                capture,
                to,
                promotion,
            } => {
                let no_such_move = || MoveError::new(MoveErrorKind::NoSuchMove, self.to_string());

                let last_rank = Rank::Eighth.relative_to(turn);
                let promotes = role == Role::Pawn && to.rank() == last_rank;
                if promotion.is_some() && !promotes {
                    return Err(no_such_move());
                }

                let origins = AttackQuery::new(to, turn)
                    .role(role)
                    .hints(file, rank)
                    .pawn_moves(pos.ep_square())
                    .run(pos.board());

                let mut found = None;
                for from in origins {
                    if role == Role::Pawn && from.file() != to.file() && !capture && file.is_none()
                    {
                        continue;
                    }

                    let m = if role == Role::Pawn
                        && from.file() != to.file()
                        && !pos.board().is_occupied(to)
                    {
                        if pos.board().piece_at(Square::from_coords(to.file(), from.rank()))
                            != Some((!turn).pawn())
                        {
                            continue;
                        }
                        Move::EnPassant { from, to }
                    } else {
                        Move::Normal {
                            role,
                            from,
                            capture: pos.board().role_at(to),
                            to,
                            promotion: if promotes {
                                Some(promotion.unwrap_or(Role::Queen))
                            } else {
                                None
                            },
                        }
                    };

                    if pos.is_safe(m) {
                        if found.is_some() {
                            return Err(MoveError::new(
                                MoveErrorKind::AmbiguousMove,
                                self.to_string(),
                            ));
                        }
                        found = Some(m);
                    }
                }

                found.ok_or_else(no_such_move)
            }
        }
    }

    /// Test if the `San` can match the `Move` (in any position). Origin
    /// hints that are not given match any origin.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_study::{san::San, Move, Role, Square};
    ///
    /// let m = Move::Normal {
    ///     role: Role::Knight,
    ///     from: Square::G1,
    ///     to: Square::F3,
    ///     capture: None,
    ///     promotion: None,
    /// };
    ///
    /// assert!(San::from_ascii(b"Nf3")?.matches(m));
    /// assert!(San::from_ascii(b"Ng1f3")?.matches(m));
    /// assert!(!San::from_ascii(b"Nef3")?.matches(m));
    /// # Ok::<_, chess_study::san::ParseSanError>(())
    /// ```
    pub fn matches(&self, m: Move) -> bool {
        match *self {
            San::Normal {
                role,
                file,
                rank,
                to,
                promotion,
                ..
            } => {
                m.role() == Some(role)
                    && m.to() == Some(to)
                    && m.from().is_some_and(|from| {
                        file.is_none_or(|f| f == from.file())
                            && rank.is_none_or(|r| r == from.rank())
                    })
                    && promotion.is_none_or(|p| m.promotion() == Some(p))
            }
            San::Castle(side) => m.castling_side() == Some(side),
            San::Null => m.is_null(),
        }
    }
}

impl FromStr for San {
    type Err = ParseSanError;

    fn from_str(san: &str) -> Result<San, ParseSanError> {
        San::from_ascii(san.as_bytes())
    }
}

impl fmt::Display for San {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            San::Normal {
                role,
                file,
                rank,
                capture,
                to,
                promotion,
            } => {
                if role != Role::Pawn {
                    write!(f, "{}", role.upper_char())?;
                }
                if let Some(file) = file {
                    write!(f, "{}", file.char())?;
                }
                if let Some(rank) = rank {
                    write!(f, "{}", rank.char())?;
                }
                if capture {
                    write!(f, "x")?;
                }
                write!(f, "{to}")?;
                if let Some(promotion) = promotion {
                    write!(f, "={}", promotion.upper_char())?;
                }
                Ok(())
            }
            San::Castle(CastlingSide::KingSide) => write!(f, "O-O"),
            San::Castle(CastlingSide::QueenSide) => write!(f, "O-O-O"),
            San::Null => write!(f, "--"),
        }
    }
}

/// Check (`+`) or checkmate (`#`) suffix.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Suffix {
    Check,
    Checkmate,
}

impl Suffix {
    pub const fn char(self) -> char {
        match self {
            Suffix::Check => '+',
            Suffix::Checkmate => '#',
        }
    }

    pub const fn from_char(ch: char) -> Option<Suffix> {
        match ch {
            '+' => Some(Suffix::Check),
            '#' => Some(Suffix::Checkmate),
            _ => None,
        }
    }

    /// The suffix deserved by the move that led to `pos`, going by its
    /// cached status flags.
    pub fn from_position(pos: &BoardPosition) -> Option<Suffix> {
        if pos.is_checkmate() {
            Some(Suffix::Checkmate)
        } else if pos.is_check() {
            Some(Suffix::Check)
        } else {
            None
        }
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// A [`San`] with possible check or checkmate suffix and move glyph.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct SanPlus {
    pub san: San,
    pub suffix: Option<Suffix>,
    /// A move glyph like `!?`, see [`Nag::from_move_glyph()`].
    pub nag: Option<Nag>,
}

impl SanPlus {
    /// Parses a SAN, a possible check or checkmate suffix and a possible
    /// move glyph.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSanError`] if `san` is not syntactically valid.
    pub fn from_ascii(san: &[u8]) -> Result<SanPlus, ParseSanError> {
        let san = san.trim_ascii();

        let (result, mut rest) = if let Some((side, rest)) = strip_castling(san) {
            (San::Castle(side), rest)
        } else if let Some(rest) = san.strip_prefix(b"--").or_else(|| san.strip_prefix(b"Z0")) {
            (San::Null, rest)
        } else {
            parse_normal(san)?
        };

        let suffix = match rest.first().and_then(|&ch| Suffix::from_char(char::from(ch))) {
            Some(suffix) => {
                rest = &rest[1..];
                if suffix == Suffix::Check && rest.first() == Some(&b'+') {
                    // ++ is an old way to write mate.
                    rest = &rest[1..];
                    Some(Suffix::Checkmate)
                } else {
                    Some(suffix)
                }
            }
            None => None,
        };

        Ok(SanPlus {
            san: result,
            suffix,
            nag: Nag::from_move_glyph(rest.trim_ascii()),
        })
    }

    /// Converts a move to Standard Algebraic Notation including possible
    /// check and checkmate suffixes. Also plays the move.
    ///
    /// It is the callers responsibility to ensure the move is legal.
    pub fn from_move_and_play_unchecked(pos: &mut BoardPosition, m: Move) -> SanPlus {
        let san = San::from_move(pos, m);
        pos.play_unchecked(m);
        pos.update_status();
        SanPlus {
            san,
            suffix: Suffix::from_position(pos),
            nag: None,
        }
    }

    /// Converts a legal move to Standard Algebraic Notation including
    /// possible check and checkmate suffixes.
    pub fn from_move(pos: &BoardPosition, m: Move) -> SanPlus {
        SanPlus::from_move_and_play_unchecked(&mut pos.clone(), m)
    }
}

impl FromStr for SanPlus {
    type Err = ParseSanError;

    fn from_str(san: &str) -> Result<SanPlus, ParseSanError> {
        SanPlus::from_ascii(san.as_bytes())
    }
}

impl fmt::Display for SanPlus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.san)?;
        if let Some(suffix) = self.suffix {
            write!(f, "{suffix}")?;
        }
        if let Some(glyph) = self.nag.and_then(Nag::glyph) {
            f.write_str(glyph)?;
        }
        Ok(())
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
    fn test_read_write() {
        for san in [
            "a1", "a8", "h1", "h8", "e4", "b6", "e8=Q", "f1=N#", "hxg7", "bxc1", "axe4", "bxc1+",
            "bxa8=R+", "Nf3", "Ba5", "Qh8", "Kh1", "Bba5", "N2c4", "Red3", "d1=N", "Ra1a8", "--",
            "O-O", "O-O-O+", "Nf3!?", "Qxf7#??",
        ] {
            let result = san.parse::<SanPlus>().expect("valid san").to_string();
            assert_eq!(san, result, "read {san} write {result}");
        }
    }

    #[test]
    fn test_lenient_forms() {
        for (input, canonical) in [
            ("0-0", "O-O"),
            ("0-0-0+", "O-O-O+"),
            ("Z0", "--"),
            ("e8Q", "e8=Q"),
            ("e8=q", "e8=Q"),
            ("Nf3++", "Nf3#"),
            ("exd6e.p.", "exd6"),
            (" Nf3 ", "Nf3"),
            ("Qh4xe1", "Qh4xe1"),
            ("Pe4", "e4"),
        ] {
            let san: SanPlus = input.parse().expect("lenient san");
            assert_eq!(san.to_string(), canonical, "{input}");
        }
    }

    #[test]
    fn test_origin_prefixes() {
        assert_eq!(
            San::from_ascii(b"N5f3"),
            Ok(San::Normal {
                role: Role::Knight,
                file: None,
                rank: Some(Rank::Fifth),
                capture: false,
                to: Square::F3,
                promotion: None,
            })
        );
        assert_eq!(
            San::from_ascii(b"Ngf3"),
            Ok(San::Normal {
                role: Role::Knight,
                file: Some(File::G),
                rank: None,
                capture: false,
                to: Square::F3,
                promotion: None,
            })
        );
        assert_eq!(
            San::from_ascii(b"Ng1xf3"),
            Ok(San::Normal {
                role: Role::Knight,
                file: Some(File::G),
                rank: Some(Rank::First),
                capture: true,
                to: Square::F3,
                promotion: None,
            })
        );
    }

    #[test]
    fn test_capture_marker() {
        let capture = |san: &str| match san.parse::<San>() {
            Ok(San::Normal { capture, to, .. }) => Some((capture, to)),
            _ => None,
        };
        assert_eq!(capture("Nxf3"), Some((true, Square::F3)));
        assert_eq!(capture("Ngxf3"), Some((true, Square::F3)));
        assert_eq!(capture("exd6e.p."), Some((true, Square::D6)));
        // Trailing text is not part of the move.
        assert_eq!(capture("Nf3x"), Some((false, Square::F3)));
        assert_eq!(capture("Nf3 xx"), Some((false, Square::F3)));
        // A marker must come right before the destination.
        assert_eq!(capture("Nfx3"), None);
        assert_eq!(capture("Nf3xd"), None);
    }

    #[test]
    fn test_invalid() {
        for san in ["", "X", "Nf", "Nz3", "e9", "Ke", "e8=K", "Jf3", "!"] {
            assert_eq!(san.parse::<San>(), Err(ParseSanError), "{san}");
        }
    }

    #[test]
    fn test_glyph() {
        let san: SanPlus = "Rxe8+!!".parse().expect("valid san");
        assert_eq!(san.suffix, Some(Suffix::Check));
        assert_eq!(san.nag, Some(Nag::BRILLIANT_MOVE));
        let san: SanPlus = "e4 {junk}".parse().expect("valid san");
        assert_eq!(san.nag, None);
    }

    #[test]
    fn test_to_move_errors() {
        let p = BoardPosition::new();
        let err = "Nd4".parse::<San>().expect("parses").to_move(&p);
        assert_eq!(err.map_err(|e| e.kind), Err(MoveErrorKind::NoSuchMove));

        let err = "O-O".parse::<San>().expect("parses").to_move(&p);
        assert_eq!(err.map_err(|e| e.kind), Err(MoveErrorKind::IllegalCastling));

        let p = pos("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1");
        let err = "Nd2".parse::<San>().expect("parses").to_move(&p);
        assert_eq!(err.map_err(|e| e.kind), Err(MoveErrorKind::AmbiguousMove));
        assert!("Nbd2".parse::<San>().expect("parses").to_move(&p).is_ok());

        // A pawn cannot promote on the fourth rank.
        let err = "e4=Q".parse::<San>().expect("parses").to_move(&BoardPosition::new());
        assert_eq!(err.map_err(|e| e.kind), Err(MoveErrorKind::NoSuchMove));
    }

    #[test]
    fn test_pinned_piece_is_not_ambiguous() {
        // The knight on c3 is pinned, so Ne2 can only be the g1 knight.
        let p = pos("4k3/8/8/b7/8/2N5/8/4K1N1 w - - 0 1");
        let m = "Ne2".parse::<San>().expect("parses").to_move(&p).expect("legal");
        assert_eq!(m.from(), Some(Square::G1));
        assert_eq!(San::from_move(&p, m).to_string(), "Ne2");
    }

    #[test]
    fn test_default_promotion() {
        let p = pos("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        let m = "e8".parse::<San>().expect("parses").to_move(&p).expect("legal");
        assert_eq!(m.promotion(), Some(Role::Queen));
        let m = "e8=N".parse::<San>().expect("parses").to_move(&p).expect("legal");
        assert_eq!(m.promotion(), Some(Role::Knight));
    }

    #[test]
    fn test_pawn_capture_without_file() {
        let san = "f6".parse::<San>().expect("valid san");
        let p = pos("4k3/8/5p2/4P3/8/8/8/4K3 w - - 0 1");
        assert!(san.to_move(&p).is_err());
        let p = pos("4k3/8/8/4Pp2/8/8/8/4K3 w - f6 0 2");
        assert!(san.to_move(&p).is_err());
        assert!("exf6".parse::<San>().expect("valid san").to_move(&p).is_ok());
        assert!("ef6".parse::<San>().expect("valid san").to_move(&p).is_ok());
    }

    #[test]
    fn test_disambiguation() {
        // Knights on g1 and d2 both reach f3: the file is enough.
        let p = pos("4k3/8/8/8/8/8/3N4/4K1N1 w - - 0 1");
        let m = "Ndf3".parse::<San>().expect("parses").to_move(&p).expect("legal");
        assert_eq!(San::from_move(&p, m).to_string(), "Ndf3");

        // Knights on g1 and g5 share the file: the rank is needed.
        let p = pos("4k3/8/8/6N1/8/8/8/4K1N1 w - - 0 1");
        let m = "N5f3".parse::<San>().expect("parses").to_move(&p).expect("legal");
        assert_eq!(San::from_move(&p, m).to_string(), "N5f3");

        // Knights on g1, g5 and e1 after the king stepped away: g1 shares
        // the file with g5 and the rank with e1.
        let p = pos("4k3/8/8/6N1/8/8/3K4/4N1N1 w - - 0 1");
        let m = "Ng1f3".parse::<San>().expect("parses").to_move(&p).expect("legal");
        assert_eq!(San::from_move(&p, m).to_string(), "Ng1f3");
        let m = "Nef3".parse::<San>().expect("parses").to_move(&p).expect("legal");
        assert_eq!(San::from_move(&p, m).to_string(), "Nef3");
    }

    #[test]
    fn test_suffix_from_move() {
        let mut p = BoardPosition::new();
        for san in ["f3", "e5", "g4"] {
            p.play_san(san).expect("legal");
        }
        let m = "Qh4".parse::<San>().expect("parses").to_move(&p).expect("legal");
        assert_eq!(SanPlus::from_move(&p, m).to_string(), "Qh4#");
        assert_eq!(p.turn(), Color::Black);
    }
}
