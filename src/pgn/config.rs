/// Options for reading movetext with [`read_with()`](super::read_with).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReaderConfig {
    /// How deeply variations may be nested. Deeper nesting fails with
    /// [`PgnError::TooDeep`](super::PgnError::TooDeep).
    ///
    /// Defaults to `64`.
    pub max_depth: usize,
    /// Whether to look for the right parent of a move when its move number
    /// does not fit the preceding move (for example `7... Be7 7... Nf6`). If
    /// `false`, such input fails with
    /// [`PgnError::MissingMove`](super::PgnError::MissingMove).
    ///
    /// Defaults to `true`.
    pub repair_move_numbers: bool,
}

impl Default for ReaderConfig {
    fn default() -> ReaderConfig {
        ReaderConfig {
            max_depth: 64,
            repair_move_numbers: true,
        }
    }
}

/// Options for the [`Writer`](super::Writer).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WriterConfig {
    /// Whether to write comment text, including comments before moves.
    ///
    /// Defaults to `true`.
    pub comments: bool,
    /// Defaults to `true`.
    pub nags: bool,
    /// Whether to write embedded commands like `[%cal Ge2e4]` and
    /// `[%chf-bkm 1]` into comments.
    ///
    /// Defaults to `true`.
    pub commands: bool,
    /// Whether to write alternatives to the main line.
    ///
    /// Defaults to `true`.
    pub variations: bool,
}

impl WriterConfig {
    /// Only the main line, without any annotations.
    pub const MAIN_LINE: WriterConfig = WriterConfig {
        comments: false,
        nags: false,
        commands: false,
        variations: false,
    };
}

impl Default for WriterConfig {
    fn default() -> WriterConfig {
        WriterConfig {
            comments: true,
            nags: true,
            commands: true,
            variations: true,
        }
    }
}
