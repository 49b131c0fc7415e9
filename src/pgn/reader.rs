use tracing::{debug, trace, warn};

use super::{
    comment::annotate,
    config::ReaderConfig,
    tag::read_headers,
    PgnError,
};
use crate::{
    errors::{MoveError, MoveErrorKind},
    node::{NodeId, TreeNode},
    san::SanPlus,
    tree::{Headers, VariationTree},
    BoardPosition, Color, Nag,
};

/// Game termination markers, longest first.
const RESULTS: [&str; 7] = ["1/2-1/2", "1/2", "1-0", "0-1", "1\u{2013}0", "0\u{2013}1", "*"];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Token<'a> {
    MoveNumber(&'a str),
    Move(&'a str),
    Nag(Nag),
    Comment(&'a str),
    StartVariation,
    EndVariation,
    Result(&'a str),
}

fn is_delimiter(ch: u8) -> bool {
    ch.is_ascii_whitespace() || matches!(ch, b'(' | b')' | b'{' | b'}' | b';')
}

struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str) -> Tokenizer<'a> {
        Tokenizer { text, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    fn skip_whitespace(&mut self) {
        while self.bytes().get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    fn result(&self) -> Option<&'a str> {
        let rest = &self.text[self.pos..];
        RESULTS.into_iter().find(|marker| {
            rest.starts_with(marker)
                && rest
                    .as_bytes()
                    .get(marker.len())
                    .is_none_or(|&ch| is_delimiter(ch))
        })
    }

    fn comment(&mut self) -> &'a str {
        let start = self.pos + 1;
        match memchr::memchr(b'}', &self.bytes()[start..]) {
            Some(len) => {
                self.pos = start + len + 1;
                &self.text[start..start + len]
            }
            None => {
                warn!(comment = &self.text[start..], "unterminated comment");
                self.pos = self.text.len();
                &self.text[start..]
            }
        }
    }

    fn line_comment(&mut self) -> &'a str {
        let start = self.pos + 1;
        let end = memchr::memchr(b'\n', &self.bytes()[start..]).map_or(self.text.len(), |i| start + i);
        self.pos = end;
        &self.text[start..end]
    }

    fn word(&mut self) -> &'a str {
        let start = self.pos;
        let bytes = self.bytes();
        while self.pos < bytes.len()
            && !is_delimiter(bytes[self.pos])
            && bytes[self.pos] != b'.'
            && (self.pos == start || bytes[self.pos] != b'$')
        {
            self.pos += 1;
        }
        while bytes.get(self.pos) == Some(&b'.') {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            self.skip_whitespace();
            let &ch = self.bytes().get(self.pos)?;

            match ch {
                b'{' => return Some(Token::Comment(self.comment())),
                b';' => return Some(Token::Comment(self.line_comment())),
                b'(' => {
                    self.pos += 1;
                    return Some(Token::StartVariation);
                }
                b')' => {
                    self.pos += 1;
                    return Some(Token::EndVariation);
                }
                b'}' => {
                    warn!("unmatched closing brace");
                    self.pos += 1;
                    continue;
                }
                _ => (),
            }

            if let Some(result) = self.result() {
                self.pos += result.len();
                return Some(Token::Result(result));
            }

            let word = self.word();
            let first = word.as_bytes()[0];
            if first == b'.' {
                continue;
            } else if let Some(nag) = Nag::from_glyph(word) {
                return Some(Token::Nag(nag));
            } else if first.is_ascii_digit() && first != b'0' {
                return Some(Token::MoveNumber(word));
            } else if first.is_ascii_alphabetic() || first == b'0' || first == b'-' {
                return Some(Token::Move(word));
            } else if first == b'$' {
                match Nag::from_ascii(word.as_bytes()) {
                    Ok(nag) => return Some(Token::Nag(nag)),
                    Err(_) => warn!(token = word, "invalid nag"),
                }
            } else {
                warn!(token = word, "unexpected token");
            }
        }
    }
}

/// A comment like `{$14}` that only holds a NAG.
fn lone_nag(comment: &str) -> Option<Nag> {
    let comment = comment.trim();
    if comment.starts_with('$') {
        Nag::from_ascii(comment.as_bytes()).ok()
    } else {
        None
    }
}

enum Flow {
    /// The variation was closed with `)`.
    Closed,
    /// The game ended, with a result marker or the end of input.
    Finished,
}

struct Parser<'a> {
    tokens: Tokenizer<'a>,
    tree: VariationTree,
    config: &'a ReaderConfig,
}

impl Parser<'_> {
    fn node(&self, id: NodeId) -> Result<&TreeNode, PgnError> {
        Ok(self.tree.node(id)?)
    }

    fn parse_branch(&mut self, start: NodeId, depth: usize) -> Result<Flow, PgnError> {
        let mut current = start;
        let mut started = false;
        let mut move_number = None;
        let mut before_move = Vec::new();

        loop {
            let Some(token) = self.tokens.next() else {
                if depth > 0 {
                    warn!(depth, "unterminated variation");
                }
                return Ok(Flow::Finished);
            };
            trace!(?token, depth);

            match token {
                Token::Result(result) => {
                    if depth == 0 {
                        if !self.tree.headers().contains(Headers::RESULT) {
                            self.tree.headers_mut().set(Headers::RESULT, result);
                        }
                        return Ok(Flow::Finished);
                    }
                    warn!(result, depth, "result inside variation");
                }
                Token::EndVariation => {
                    if depth > 0 {
                        return Ok(Flow::Closed);
                    }
                    warn!("unmatched closing parenthesis");
                }
                Token::StartVariation => {
                    if depth + 1 > self.config.max_depth {
                        return Err(PgnError::TooDeep { depth: depth + 1 });
                    }
                    let parent = self.node(current)?.parent().unwrap_or(current);
                    if let Flow::Finished = self.parse_branch(parent, depth + 1)? {
                        return Ok(Flow::Finished);
                    }
                    move_number = None;
                }
                Token::Comment(comment) => {
                    if depth > 0 && !started {
                        before_move.push(comment);
                    } else if let Some(nag) = lone_nag(comment) {
                        if started {
                            self.tree.node_mut(current)?.add_nag(nag);
                        } else {
                            warn!(%nag, "nag before the first move");
                        }
                    } else {
                        annotate(self.tree.node_mut(current)?, comment, false);
                    }
                }
                Token::Nag(nag) => {
                    if started {
                        self.tree.node_mut(current)?.add_nag(nag);
                    } else {
                        warn!(%nag, "nag before the first move");
                    }
                }
                Token::MoveNumber(number) => move_number = Some(number),
                Token::Move(token) => {
                    let parent = match move_number.take() {
                        Some(number) => self.parent_for_number(current, number, token)?,
                        None => current,
                    };
                    let id = self.play(parent, token)?;
                    let node = self.tree.node_mut(id)?;
                    for comment in before_move.drain(..) {
                        annotate(node, comment, true);
                    }
                    trace!(san = node.san(), line = %id, "move");
                    started = true;
                    current = id;
                }
            }
        }
    }

    /// Resolves a move token in the position of `parent` and adds it to the
    /// tree, unless `parent` already has a child with that move.
    fn play(&mut self, parent: NodeId, token: &str) -> Result<NodeId, PgnError> {
        let node = self.node(parent)?;
        let san_plus = SanPlus::from_ascii(token.as_bytes()).map_err(|_| {
            MoveError::new(MoveErrorKind::InvalidNotation, token).with_parent(node.move_text())
        })?;
        let m = san_plus.san.to_move(node.position()).map_err(|err| {
            MoveError {
                notation: token.to_owned(),
                ..err
            }
            .with_parent(node.move_text())
        })?;

        let existing = node
            .children()
            .iter()
            .copied()
            .find(|&child| self.tree.get(child).and_then(TreeNode::last_move) == Some(m));
        let id = match existing {
            Some(id) => id,
            None => self.tree.push_move(parent, m)?,
        };
        if let Some(nag) = san_plus.nag {
            self.tree.node_mut(id)?.add_nag(nag);
        }
        Ok(id)
    }

    /// Checks the move number in front of `token` against the presumed
    /// parent and, if they disagree, looks for the parent the number refers
    /// to.
    fn parent_for_number(
        &self,
        presumed: NodeId,
        number: &str,
        token: &str,
    ) -> Result<NodeId, PgnError> {
        let node = self.node(presumed)?;
        let digits = number.trim_end_matches('.');
        let dots = number.len() - digits.len();
        let stated: u32 = btoi::btou(digits.as_bytes()).map_err(|_| PgnError::InvalidMoveNumber {
            token: number.to_owned(),
            parent: node.move_text(),
        })?;
        let color = if dots >= 3 { Color::Black } else { Color::White };

        if node.turn() == color {
            return Ok(presumed);
        }

        let missing = || PgnError::MissingMove {
            token: format!("{number}{token}"),
            parent: node.move_text(),
        };
        if !self.config.repair_move_numbers {
            return Err(missing());
        }

        // Plies between the presumed parent and the stated move, plus one.
        let distance = (i64::from(stated) - i64::from(node.move_number())) * 2;

        let repaired = if distance == 2 {
            node.children().first().copied()
        } else if distance <= 1 {
            let mut id = presumed;
            for _ in 0..(1 - distance) {
                match self.tree.get(id).and_then(TreeNode::parent) {
                    Some(parent) => id = parent,
                    None => return Err(missing()),
                }
            }
            Some(id)
        } else {
            None
        };

        debug!(
            presumed = %presumed,
            number,
            distance,
            repaired = ?repaired,
            "repairing move number"
        );
        repaired.ok_or_else(missing)
    }
}

/// Reads a game with headers and movetext into a [`VariationTree`], using
/// the default [`ReaderConfig`].
///
/// # Errors
///
/// See [`read_with()`].
pub fn read(pgn: &str) -> Result<VariationTree, PgnError> {
    read_with(pgn, &ReaderConfig::default())
}

/// Reads a game with headers and movetext into a [`VariationTree`].
///
/// Moves are stored in canonical notation. Comments are split into free
/// text and embedded commands, and nodes carrying a bookmark command are
/// registered as bookmarks of the tree.
///
/// # Errors
///
/// Fails on the first move that is not legal or ambiguous, on a `FEN`
/// header that cannot be parsed, on move numbers that do not fit any
/// earlier move, or on variations nested deeper than
/// [`ReaderConfig::max_depth`].
pub fn read_with(pgn: &str, config: &ReaderConfig) -> Result<VariationTree, PgnError> {
    let mut headers = Headers::new();
    let movetext = read_headers(pgn, &mut headers);

    let position = match headers.get(Headers::FEN) {
        Some(fen) => BoardPosition::from_fen(fen, false).map_err(PgnError::MalformedInput)?,
        None => BoardPosition::new(),
    };
    let mut tree = VariationTree::from_position(position);
    *tree.headers_mut() = headers;

    let mut parser = Parser {
        tokens: Tokenizer::new(movetext),
        tree,
        config,
    };
    parser.parse_branch(NodeId::ROOT, 0)?;

    let mut tree = parser.tree;
    tree.build_lines();
    let bookmarked: Vec<NodeId> = tree
        .nodes()
        .filter(|node| node.is_bookmark())
        .map(TreeNode::id)
        .collect();
    for id in bookmarked {
        tree.add_bookmark(id)?;
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token<'_>> {
        Tokenizer::new(text).collect()
    }

    fn sans(tree: &VariationTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .filter_map(|&id| tree.get(id))
            .filter(|node| !node.is_root())
            .map(|node| node.san().to_owned())
            .collect()
    }

    #[test]
    fn test_tokenizer() {
        assert_eq!(
            tokens("1.e4 {open} e5?! (1... c5 $14) 2. Nf3 !? ; rest\n1/2-1/2"),
            vec![
                Token::MoveNumber("1."),
                Token::Move("e4"),
                Token::Comment("open"),
                Token::Move("e5?!"),
                Token::StartVariation,
                Token::MoveNumber("1..."),
                Token::Move("c5"),
                Token::Nag(Nag(14)),
                Token::EndVariation,
                Token::MoveNumber("2."),
                Token::Move("Nf3"),
                Token::Nag(Nag::SPECULATIVE_MOVE),
                Token::Comment(" rest"),
                Token::Result("1/2-1/2"),
            ]
        );
        assert_eq!(
            tokens("0-0 1-0"),
            vec![Token::Move("0-0"), Token::Result("1-0")]
        );
        assert_eq!(
            tokens("7. ... Be7 -- +- 0\u{2013}1"),
            vec![
                Token::MoveNumber("7."),
                Token::Move("Be7"),
                Token::Move("--"),
                Token::Nag(Nag(18)),
                Token::Result("0\u{2013}1"),
            ]
        );
        assert_eq!(tokens("e4 {never closed"), vec![Token::Move("e4"), Token::Comment("never closed")]);
    }

    #[test]
    fn test_nag_attached_to_move() {
        assert_eq!(
            tokens("e4$1 e5!$14$2"),
            vec![
                Token::Move("e4"),
                Token::Nag(Nag(1)),
                Token::Move("e5!"),
                Token::Nag(Nag(14)),
                Token::Nag(Nag(2)),
            ]
        );

        let tree = read("1. e4$1 e5 *").expect("valid");
        let e4 = tree.main_line()[1];
        assert_eq!(tree.node(e4).expect("e4").san_with_nags(), "e4!");
        assert_eq!(sans(&tree, &tree.main_line()), ["e4", "e5"]);
    }

    #[test]
    fn test_read_variations() {
        let tree = read("1. e4 e5 (1... c5 2. Nf3) (1... e6) 2. Nf3 Nc6 *").expect("valid");
        assert_eq!(sans(&tree, &tree.main_line()), ["e4", "e5", "Nf3", "Nc6"]);
        let e4 = tree.root().children()[0];
        let replies: Vec<&str> = tree
            .node(e4)
            .expect("e4")
            .children()
            .iter()
            .map(|&id| tree.node(id).expect("reply").san())
            .collect();
        assert_eq!(replies, ["e5", "c5", "e6"]);
        assert_eq!(tree.result(), Some("*"));
    }

    #[test]
    fn test_read_comments_and_nags() {
        let tree = read(
            "{Start} 1. d4 $1 {[%cal Gd2d4] Solid} d5 {$6} ( {Also [%csl Rd5]} 1... Nf6! ) 2. c4 *",
        )
        .expect("valid");
        assert_eq!(tree.root().comment.as_deref(), Some("Start"));

        let d4 = tree.node(tree.root().children()[0]).expect("d4");
        assert_eq!(d4.nags(), " $1");
        assert_eq!(d4.comment.as_deref(), Some("Solid"));
        assert_eq!(d4.arrows.as_deref(), Some("Gd2d4"));

        let d5 = tree.node(d4.children()[0]).expect("d5");
        assert_eq!(d5.nags(), " $6");
        assert_eq!(d5.comment, None);

        let nf6 = tree.node(d4.children()[1]).expect("Nf6");
        assert_eq!(nf6.san(), "Nf6");
        assert_eq!(nf6.nags(), " $1");
        assert_eq!(nf6.comment_before_move.as_deref(), Some("Also"));
        assert_eq!(nf6.circles.as_deref(), Some("Rd5"));
    }

    #[test]
    fn test_canonical_san() {
        let tree = read("1. Ng1f3 d5 2. g3 Nf6 3. Bg2 e6 4. 0-0 Be7 5. d3 0-0").expect("valid");
        assert_eq!(
            sans(&tree, &tree.main_line()),
            ["Nf3", "d5", "g3", "Nf6", "Bg2", "e6", "O-O", "Be7", "d3", "O-O"]
        );
    }

    #[test]
    fn test_repair_move_numbers() {
        // Alternative written without parentheses.
        let tree = read("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 3... Nf6").expect("repairable");
        let bb5 = tree.main_line()[5];
        let replies = sans(&tree, tree.node(bb5).expect("Bb5").children());
        assert_eq!(replies, ["a6", "Nf6"]);

        // The number is stated, but not the color: e5 is replaced.
        let tree = read("1. e4 e5 1... c5").expect("repairable");
        let e4 = tree.root().children()[0];
        assert_eq!(sans(&tree, tree.node(e4).expect("e4").children()), ["e5", "c5"]);

        let tree = read("1. e4 1. d4").expect("repairable");
        assert_eq!(sans(&tree, tree.root().children()), ["e4", "d4"]);

        // Only the dots are checked, a wrong number is tolerated.
        let tree = read("1. e4 e5 7. Nf3").expect("valid");
        assert_eq!(sans(&tree, &tree.main_line()), ["e4", "e5", "Nf3"]);

        let err = read_with(
            "1. e4 1. d4",
            &ReaderConfig {
                repair_move_numbers: false,
                ..ReaderConfig::default()
            },
        );
        assert!(matches!(err, Err(PgnError::MissingMove { .. })));

        let err = read("1. e4 e5 5... Nf6").map(|_| ());
        assert_eq!(
            err,
            Err(PgnError::MissingMove {
                token: "5...Nf6".to_owned(),
                parent: "1...e5".to_owned(),
            })
        );
    }

    #[test]
    fn test_errors() {
        let err = read("1. e4 e5 2. Ke3").map(|_| ());
        match err {
            Err(PgnError::Move(err)) => {
                assert_eq!(err.kind, MoveErrorKind::NoSuchMove);
                assert_eq!(err.notation, "Ke3");
                assert_eq!(err.parent.as_deref(), Some("1...e5"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = read("[FEN \"not a fen\"]\n\n1. e4").map(|_| ());
        assert!(matches!(err, Err(PgnError::MalformedInput(_))));

        let deep = format!("1. e4 {}e5{}", "(1. d4 ".repeat(3), ")".repeat(3));
        assert!(read(&deep).is_ok());
        let err = read_with(
            &deep,
            &ReaderConfig {
                max_depth: 2,
                ..ReaderConfig::default()
            },
        )
        .map(|_| ());
        assert_eq!(err, Err(PgnError::TooDeep { depth: 3 }));
    }

    #[test]
    fn test_bookmarks_and_headers() {
        let pgn = "[Title \"Caro-Kann\"]\n[TrainingSide \"black\"]\n\n1. e4 c6 {[%chf-bkm]} 2. d4 d5 {[%bkm] [#]} 1-0";
        let tree = read(pgn).expect("valid");
        assert_eq!(tree.title(), Some("Caro-Kann"));
        assert_eq!(tree.training_side(), Some(Color::Black));
        assert_eq!(tree.result(), Some("1-0"));
        assert_eq!(tree.bookmarks().len(), 2);
        let d5 = *tree.main_line().last().expect("d5");
        assert!(tree.is_bookmarked(d5));
        assert!(tree.node(d5).expect("d5").is_diagram);
    }
}
