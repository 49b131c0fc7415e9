//! Read and write games with variations, comments and annotations.
//!
//! # Examples
//!
//! ```
//! use chess_study::pgn;
//!
//! let tree = pgn::read("1. e4 e5 (1... c5 {Sicilian}) 2. Nf3 *")?;
//! assert_eq!(tree.main_line().len(), 4);
//!
//! let text = pgn::write(&tree);
//! assert!(text.contains("1. e4 e5 ( 1... c5 {Sicilian} ) 2. Nf3 *"));
//! # Ok::<_, chess_study::pgn::PgnError>(())
//! ```

mod comment;
mod config;
mod reader;
mod tag;
mod writer;

use std::{error::Error, fmt};

pub use comment::{CommandKind, Comment, RawCommand};
pub use config::{ReaderConfig, WriterConfig};
pub use reader::{read, read_with};
pub use tag::{encode, RawTag};
pub use writer::{write, write_with, Writer};

use crate::{errors::MoveError, fen::ParseFenError, tree::TreeError};

/// Error when reading a game.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PgnError {
    /// A move that could not be parsed or resolved.
    Move(MoveError),
    /// A move number that does not fit any earlier move, e.g. `5... Nf6`
    /// right after `1... e5`.
    MissingMove { token: String, parent: String },
    /// The `FEN` header is not valid.
    MalformedInput(ParseFenError),
    InvalidMoveNumber { token: String, parent: String },
    /// Variations nested deeper than
    /// [`ReaderConfig::max_depth`](ReaderConfig::max_depth).
    TooDeep { depth: usize },
    Tree(TreeError),
}

impl fmt::Display for PgnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PgnError::Move(err) => fmt::Display::fmt(err, f),
            PgnError::MissingMove { token, parent } if parent.is_empty() => {
                write!(f, "missing move before {token}")
            }
            PgnError::MissingMove { token, parent } => {
                write!(f, "missing move between {parent} and {token}")
            }
            PgnError::MalformedInput(err) => write!(f, "invalid FEN header: {err}"),
            PgnError::InvalidMoveNumber { token, .. } => write!(f, "invalid move number: {token}"),
            PgnError::TooDeep { depth } => write!(f, "variations nested too deeply ({depth})"),
            PgnError::Tree(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl Error for PgnError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PgnError::Move(err) => Some(err),
            PgnError::MalformedInput(err) => Some(err),
            PgnError::Tree(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MoveError> for PgnError {
    fn from(err: MoveError) -> PgnError {
        PgnError::Move(err)
    }
}

impl From<ParseFenError> for PgnError {
    fn from(err: ParseFenError) -> PgnError {
        PgnError::MalformedInput(err)
    }
}

impl From<TreeError> for PgnError {
    fn from(err: TreeError) -> PgnError {
        match err {
            TreeError::Move(err) => PgnError::Move(err),
            err => PgnError::Tree(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MoveErrorKind;

    #[test]
    fn test_display() {
        let err = PgnError::MissingMove {
            token: "5...Nf6".to_owned(),
            parent: "1...e5".to_owned(),
        };
        assert_eq!(err.to_string(), "missing move between 1...e5 and 5...Nf6");

        let err = PgnError::from(TreeError::Move(
            MoveError::new(MoveErrorKind::AmbiguousMove, "Nd2").with_parent("7.f4"),
        ));
        assert_eq!(err.to_string(), "ambiguous move: Nd2 (after 7.f4)");
        assert!(err.source().is_some());
    }
}
