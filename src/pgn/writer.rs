use std::io::{self, Write};

use super::{comment::node_commands, config::WriterConfig, tag::encode};
use crate::{
    node::{NodeId, TreeNode},
    tree::{Headers, VariationTree},
    BoardPosition, Color,
};

/// Writes a [`VariationTree`] as PGN: headers, then the movetext with
/// numbered moves, nested variations, NAGs and comments.
///
/// Embedded commands are regenerated from the node fields, so that reading
/// the output gives back the same tree.
#[derive(Debug)]
pub struct Writer<W> {
    writer: W,
    config: WriterConfig,
}

impl<W: Write> Writer<W> {
    pub fn new(writer: W) -> Writer<W> {
        Writer::with_config(writer, WriterConfig::default())
    }

    pub fn with_config(writer: W, config: WriterConfig) -> Writer<W> {
        Writer { writer, config }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes one game, followed by an empty line.
    ///
    /// # Errors
    ///
    /// The only errors are from the underlying writer.
    pub fn write_tree(&mut self, tree: &VariationTree) -> io::Result<()> {
        for (name, value) in tree.headers().iter() {
            writeln!(self.writer, "[{} \"{}\"]", name, encode(value))?;
        }
        let root = tree.root();
        let fen_missing =
            !tree.headers().contains(Headers::FEN) && root.position() != &BoardPosition::new();
        if fen_missing {
            writeln!(self.writer, "[{} \"{}\"]", Headers::FEN, root.position().fen())?;
        }
        if fen_missing || !tree.headers().is_empty() {
            writeln!(self.writer)?;
        }

        let mut movetext = Movetext {
            config: &self.config,
            tree,
            tokens: Vec::new(),
        };
        movetext.comment(root, false);
        movetext.continuation(NodeId::ROOT, true);
        movetext
            .tokens
            .push(tree.result().unwrap_or("*").to_owned());

        writeln!(self.writer, "{}", movetext.tokens.join(" "))?;
        writeln!(self.writer)
    }
}

struct Movetext<'a> {
    config: &'a WriterConfig,
    tree: &'a VariationTree,
    tokens: Vec<String>,
}

impl Movetext<'_> {
    /// Writes the moves after `from`, always following the first child and
    /// opening a variation for each other child.
    fn continuation(&mut self, mut from: NodeId, mut force_number: bool) {
        let tree = self.tree;
        while let Some((&main, alternatives)) = tree
            .get(from)
            .and_then(|node| node.children().split_first())
        {
            self.node(main, force_number, false);
            force_number = false;

            if self.config.variations {
                for &alternative in alternatives {
                    self.tokens.push("(".to_owned());
                    self.node(alternative, true, true);
                    self.continuation(alternative, false);
                    self.tokens.push(")".to_owned());
                    force_number = true;
                }
            }

            from = main;
        }
    }

    fn node(&mut self, id: NodeId, force_number: bool, starts_variation: bool) {
        let tree = self.tree;
        let Some(node) = tree.get(id) else {
            return;
        };

        if starts_variation && self.config.comments {
            if let Some(ref before) = node.comment_before_move {
                self.tokens.push(format!("{{{before}}}"));
            }
        }

        match node.turn() {
            Color::Black => self.tokens.push(format!("{}.", node.move_number())),
            Color::White if force_number => self.tokens.push(format!("{}...", node.move_number())),
            Color::White => (),
        }
        self.tokens.push(node.san().to_owned());

        if self.config.nags {
            self.tokens.extend(node.nag_list().map(|nag| nag.to_string()));
        }
        self.comment(node, !starts_variation);
    }

    fn comment(&mut self, node: &TreeNode, with_before_move: bool) {
        let mut parts = Vec::new();
        if self.config.commands {
            if with_before_move {
                if let Some(ref before) = node.comment_before_move {
                    parts.push(format!("[%chf-cbm {before}]"));
                }
            }
            parts.extend(node_commands(node).into_iter().map(|command| format!("[{command}]")));
        }
        if self.config.comments {
            if let Some(ref text) = node.comment {
                parts.push(text.replace('}', ")"));
            }
        }
        if !parts.is_empty() {
            self.tokens.push(format!("{{{}}}", parts.join(" ")));
        }
    }
}

/// Writes a game to a string, using the default [`WriterConfig`].
pub fn write(tree: &VariationTree) -> String {
    write_with(tree, &WriterConfig::default())
}

/// Writes a game to a string.
pub fn write_with(tree: &VariationTree, config: &WriterConfig) -> String {
    let mut writer = Writer::with_config(Vec::new(), config.clone());
    // Writing to a `Vec` does not fail.
    let _ = writer.write_tree(tree);
    String::from_utf8_lossy(&writer.into_inner()).into_owned()
}
