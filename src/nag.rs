use std::{error::Error, fmt, str::FromStr};

use once_cell::sync::Lazy;

/// A numeric annotation glyph like `?`, `!!`, `±` or `$42`.
///
/// NAGs `1` to `6` judge a move, NAGs `11` to `19` judge the resulting
/// position.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Nag(pub u8);

static GLYPHS: Lazy<[(Nag, &'static str); 15]> = Lazy::new(|| {
    [
        (Nag::GOOD_MOVE, "!"),
        (Nag::MISTAKE, "?"),
        (Nag::BRILLIANT_MOVE, "!!"),
        (Nag::BLUNDER, "??"),
        (Nag::SPECULATIVE_MOVE, "!?"),
        (Nag::DUBIOUS_MOVE, "?!"),
        (Nag::DRAWISH, "="),
        (Nag(12), "="),
        (Nag::UNCLEAR, "∞"),
        (Nag::WHITE_SLIGHT_ADVANTAGE, "⩲"),
        (Nag::BLACK_SLIGHT_ADVANTAGE, "⩱"),
        (Nag::WHITE_MODERATE_ADVANTAGE, "±"),
        (Nag::BLACK_MODERATE_ADVANTAGE, "∓"),
        (Nag::WHITE_DECISIVE_ADVANTAGE, "+-"),
        (Nag::BLACK_DECISIVE_ADVANTAGE, "-+"),
    ]
});

impl Nag {
    /// Tries to parse a NAG from ASCII.
    ///
    /// # Examples
    ///
    /// ```
    /// use chess_study::Nag;
    ///
    /// assert_eq!(Nag::from_ascii(b"??"), Ok(Nag(4)));
    /// assert_eq!(Nag::from_ascii(b"$24"), Ok(Nag(24)));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidNag`] error if the input is neither a move glyph
    /// (`?!`, `!`, ...) nor a valid numeric annotation (`$0`, ..., `$255`).
    pub fn from_ascii(s: &[u8]) -> Result<Nag, InvalidNag> {
        if s.len() > 1 && s[0] == b'$' {
            btoi::btou(&s[1..]).ok().map(Nag).ok_or(InvalidNag)
        } else {
            Nag::from_move_glyph(s).ok_or(InvalidNag)
        }
    }

    /// Recognizes the move glyphs `!`, `?`, `!!`, `??`, `!?` and `?!`.
    pub fn from_move_glyph(s: &[u8]) -> Option<Nag> {
        GLYPHS
            .iter()
            .take(6)
            .find(|(_, glyph)| glyph.as_bytes() == s)
            .map(|&(nag, _)| nag)
    }

    /// Recognizes any move or position glyph, like `!?` or `±`. `=` is read
    /// as [`Nag::DRAWISH`].
    pub fn from_glyph(s: &str) -> Option<Nag> {
        GLYPHS
            .iter()
            .find(|&&(_, glyph)| glyph == s)
            .map(|&(nag, _)| nag)
    }

    /// The symbol of a move or position NAG, if it has one.
    pub fn glyph(self) -> Option<&'static str> {
        GLYPHS
            .iter()
            .find(|&&(nag, _)| nag == self)
            .map(|&(_, glyph)| glyph)
    }

    /// Judges the move itself.
    pub fn is_move_nag(self) -> bool {
        (1..=6).contains(&self.0)
    }

    /// Judges the position after the move.
    pub fn is_position_nag(self) -> bool {
        (11..=19).contains(&self.0)
    }

    /// A good move (`!`).
    pub const GOOD_MOVE: Nag = Nag(1);

    /// A mistake (`?`).
    pub const MISTAKE: Nag = Nag(2);

    /// A brilliant move (`!!`).
    pub const BRILLIANT_MOVE: Nag = Nag(3);

    /// A blunder (`??`).
    pub const BLUNDER: Nag = Nag(4);

    /// A speculative move (`!?`).
    pub const SPECULATIVE_MOVE: Nag = Nag(5);

    /// A dubious move (`?!`).
    pub const DUBIOUS_MOVE: Nag = Nag(6);

    /// Equal position (`=`).
    pub const DRAWISH: Nag = Nag(11);

    /// Unclear position (`∞`).
    pub const UNCLEAR: Nag = Nag(13);

    pub const WHITE_SLIGHT_ADVANTAGE: Nag = Nag(14);
    pub const BLACK_SLIGHT_ADVANTAGE: Nag = Nag(15);
    pub const WHITE_MODERATE_ADVANTAGE: Nag = Nag(16);
    pub const BLACK_MODERATE_ADVANTAGE: Nag = Nag(17);
    pub const WHITE_DECISIVE_ADVANTAGE: Nag = Nag(18);
    pub const BLACK_DECISIVE_ADVANTAGE: Nag = Nag(19);
}

impl fmt::Display for Nag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

impl From<u8> for Nag {
    fn from(nag: u8) -> Nag {
        Nag(nag)
    }
}

impl From<Nag> for u8 {
    fn from(Nag(nag): Nag) -> u8 {
        nag
    }
}

impl FromStr for Nag {
    type Err = InvalidNag;

    fn from_str(s: &str) -> Result<Nag, InvalidNag> {
        Nag::from_ascii(s.as_bytes())
    }
}

/// Error when parsing an invalid NAG.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct InvalidNag;

impl fmt::Display for InvalidNag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid nag")
    }
}

impl Error for InvalidNag {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nag() {
        assert_eq!(Nag::from_ascii(b"$1"), Ok(Nag(1)));
        assert_eq!(Nag::from_ascii(b"$12"), Ok(Nag(12)));
        assert_eq!(Nag::from_ascii(b"$123"), Ok(Nag(123)));
        assert_eq!(Nag::from_ascii(b"$1234"), Err(InvalidNag));
        assert_eq!(Nag::from_ascii(b"!?"), Ok(Nag::SPECULATIVE_MOVE));
        assert_eq!(Nag::from_ascii(b"+-"), Err(InvalidNag));
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(Nag(16).glyph(), Some("±"));
        assert_eq!(Nag(12).glyph(), Some("="));
        assert_eq!(Nag(6).glyph(), Some("?!"));
        assert_eq!(Nag(42).glyph(), None);
        assert!(Nag(3).is_move_nag());
        assert!(Nag(19).is_position_nag());
        assert!(!Nag(10).is_position_nag());
        assert_eq!(Nag::from_glyph("∓"), Some(Nag::BLACK_MODERATE_ADVANTAGE));
        assert_eq!(Nag::from_glyph("="), Some(Nag::DRAWISH));
        assert_eq!(Nag::from_glyph("?!"), Some(Nag::DUBIOUS_MOVE));
        assert_eq!(Nag::from_glyph("!!!"), None);
    }
}
