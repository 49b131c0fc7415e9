//! Chess rules, notation and variation trees for study and training tools.
//!
//! # Examples
//!
//! Generate legal moves in the starting position:
//!
//! ```
//! use chess_study::BoardPosition;
//!
//! let pos = BoardPosition::new();
//! let legals = pos.legal_moves();
//! assert_eq!(legals.len(), 20);
//! ```
//!
//! Play moves in algebraic notation:
//!
//! ```
//! use chess_study::{BoardPosition, Role, Square};
//!
//! let mut pos = BoardPosition::new();
//! for san in ["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6", "Qxf7#"] {
//!     pos.play_san(san)?;
//! }
//! assert!(pos.is_checkmate());
//! assert_eq!(pos.board().role_at(Square::F7), Some(Role::Queen));
//! # Ok::<_, chess_study::MoveError>(())
//! ```
//!
//! Build a tree of variations and merge it with another one:
//!
//! ```
//! use chess_study::{merge::{merge, MergeConfig}, pgn};
//!
//! let open = pgn::read("1. e4 e5 2. Nf3 *")?;
//! let sicilian = pgn::read("1. e4 c5 *")?;
//! let repertoire = merge(&open, &sicilian, &MergeConfig::default())?;
//!
//! let e4 = repertoire.root().children()[0];
//! assert_eq!(repertoire.node(e4)?.children().len(), 2);
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! Also supports [FEN](fen), [SAN](san) and [UCI](uci) formats for
//! positions and moves, and reading and writing [PGN](pgn) with comments,
//! annotations and embedded commands.
//!
//! # Feature flags
//!
//! * `serde`: Implements [`serde::Serialize`](https://docs.rs/serde/1/serde/trait.Serialize.html)
//!   and [`serde::Deserialize`](https://docs.rs/serde/1/serde/trait.Deserialize.html) for
//!   types with unique natural representations.
//! * `nohash-hasher`: Implements
//!   [`nohash_hasher::IsEnabled`](https://docs.rs/nohash-hasher/0.2/nohash_hasher/trait.IsEnabled.html)
//!   for sensible types.

#![doc(html_root_url = "https://docs.rs/chess-study/0.1.0")]
#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]
#![cfg_attr(docs_rs, feature(doc_auto_cfg))]

mod castling_side;
mod color;
mod errors;
mod m;
mod movegen;
mod nag;
mod node;
mod perft;
mod position;
mod role;
mod square;
mod types;

pub mod attacks;
pub mod board;
pub mod fen;
pub mod merge;
pub mod pgn;
pub mod san;
pub mod tree;
pub mod uci;

pub use board::Board;
pub use castling_side::{CastlingRights, CastlingSide};
pub use color::{Color, ParseColorError};
pub use errors::{MoveError, MoveErrorKind};
pub use m::{Move, MoveList};
pub use nag::{InvalidNag, Nag};
pub use node::{NodeId, TreeNode};
pub use perft::perft;
pub use position::{BoardPosition, Status};
pub use role::Role;
pub use square::{File, ParseSquareError, Rank, Square};
pub use tree::{TreeError, VariationTree};
pub use types::{LastMove, Piece};

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for File {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Rank {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Square {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Role {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Color {}
