use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::node::TreeNode;

/// The embedded commands that are stored in dedicated node fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Bookmark,
    EngineEvaluation,
    Assessment,
    Arrows,
    Circles,
    QuizPoints,
    BestResponse,
    CommentBeforeMove,
    Thumbnail,
    Diagram,
    ArticleRefs,
}

static COMMANDS: Lazy<HashMap<&'static str, CommandKind>> = Lazy::new(|| {
    HashMap::from([
        ("%chf-bkm", CommandKind::Bookmark),
        ("%bkm", CommandKind::Bookmark),
        ("%chf-eev", CommandKind::EngineEvaluation),
        ("%eval", CommandKind::EngineEvaluation),
        ("%chf-asmt", CommandKind::Assessment),
        ("%cal", CommandKind::Arrows),
        ("%csl", CommandKind::Circles),
        ("%chf-qpts", CommandKind::QuizPoints),
        ("%chf-bresp", CommandKind::BestResponse),
        ("%chf-cbm", CommandKind::CommentBeforeMove),
        ("%chf-thmb", CommandKind::Thumbnail),
        ("%chf-dgrm", CommandKind::Diagram),
        ("%chf-aref", CommandKind::ArticleRefs),
    ])
});

impl CommandKind {
    /// Looks up a command tag like `%cal` or `%chf-bkm`.
    pub fn from_tag(tag: &str) -> Option<CommandKind> {
        COMMANDS.get(tag).copied()
    }

    /// The tag written for this kind of command.
    pub const fn tag(self) -> &'static str {
        match self {
            CommandKind::Bookmark => "%chf-bkm",
            CommandKind::EngineEvaluation => "%chf-eev",
            CommandKind::Assessment => "%chf-asmt",
            CommandKind::Arrows => "%cal",
            CommandKind::Circles => "%csl",
            CommandKind::QuizPoints => "%chf-qpts",
            CommandKind::BestResponse => "%chf-bresp",
            CommandKind::CommentBeforeMove => "%chf-cbm",
            CommandKind::Thumbnail => "%chf-thmb",
            CommandKind::Diagram => "%chf-dgrm",
            CommandKind::ArticleRefs => "%chf-aref",
        }
    }
}

/// An embedded command like `[%cal Ge2e4,Rd7d5]`, without the brackets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawCommand<'a> {
    /// The full text between the brackets.
    pub raw: &'a str,
    /// The tag, like `%cal`.
    pub tag: &'a str,
    /// Everything after the tag, trimmed. May be empty.
    pub args: &'a str,
}

impl<'a> RawCommand<'a> {
    /// Splits the text between the brackets into tag and arguments.
    pub fn parse(raw: &'a str) -> RawCommand<'a> {
        let raw = raw.trim();
        let (tag, args) = raw
            .split_once(char::is_whitespace)
            .unwrap_or((raw, ""));
        RawCommand {
            raw,
            tag,
            args: args.trim(),
        }
    }

    pub fn kind(&self) -> Option<CommandKind> {
        CommandKind::from_tag(self.tag)
    }
}

/// A comment body, excluding the braces, split into its parts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comment<'a> {
    /// Free text with line breaks and surplus whitespace removed.
    pub text: String,
    pub commands: Vec<RawCommand<'a>>,
    /// Whether the comment contained the diagram marker `[#]`.
    pub diagram: bool,
}

impl<'a> Comment<'a> {
    pub fn parse(comment: &'a str) -> Comment<'a> {
        let mut text = String::with_capacity(comment.len());
        let mut commands = Vec::new();
        let mut diagram = false;

        let mut rest = comment;
        while let Some(open) = rest.find('[') {
            let after = &rest[open + 1..];
            if let Some(tail) = after.strip_prefix("#]") {
                text.push_str(&rest[..open]);
                text.push(' ');
                diagram = true;
                rest = tail;
            } else if let (true, Some(close)) = (after.starts_with('%'), after.find(']')) {
                text.push_str(&rest[..open]);
                text.push(' ');
                commands.push(RawCommand::parse(&after[..close]));
                rest = &after[close + 1..];
            } else {
                text.push_str(&rest[..=open]);
                rest = after;
            }
        }
        text.push_str(rest);

        Comment {
            text: text.split_whitespace().collect::<Vec<_>>().join(" "),
            commands,
            diagram,
        }
    }
}

fn append_text(target: &mut Option<String>, text: &str) {
    if text.is_empty() {
        return;
    }
    match target {
        Some(existing) if !existing.is_empty() => {
            existing.push(' ');
            existing.push_str(text);
        }
        _ => *target = Some(text.to_owned()),
    }
}

/// Stores a comment body on `node`: embedded commands go to their fields,
/// the free text is appended to the comment, or to the comment before the
/// move if `before_move` is set.
pub(crate) fn annotate(node: &mut TreeNode, comment: &str, before_move: bool) {
    let parsed = Comment::parse(comment);
    if parsed.diagram {
        node.is_diagram = true;
    }

    for command in parsed.commands {
        let args = command.args;
        match command.kind() {
            Some(CommandKind::Bookmark) => node.is_bookmark = true,
            Some(CommandKind::EngineEvaluation) => node.engine_evaluation = Some(args.to_owned()),
            Some(CommandKind::Assessment) => node.assessment = Some(args.to_owned()),
            Some(CommandKind::Arrows) => node.arrows = Some(args.to_owned()),
            Some(CommandKind::Circles) => node.circles = Some(args.to_owned()),
            Some(CommandKind::QuizPoints) => match args.parse() {
                Ok(points) => node.quiz_points = Some(points),
                Err(_) => {
                    warn!(command = command.raw, "invalid quiz points");
                    node.unprocessed_commands.push(command.raw.to_owned());
                }
            },
            Some(CommandKind::BestResponse) => node.best_response = Some(args.to_owned()),
            Some(CommandKind::CommentBeforeMove) => {
                append_text(&mut node.comment_before_move, args)
            }
            Some(CommandKind::Thumbnail) => node.is_thumbnail = true,
            Some(CommandKind::Diagram) => node.is_diagram = true,
            Some(CommandKind::ArticleRefs) => {
                for reference in args.split('|') {
                    node.add_article_reference(reference.trim());
                }
            }
            None => {
                warn!(command = command.raw, "unrecognized embedded command");
                node.unprocessed_commands.push(command.raw.to_owned());
            }
        }
    }

    if before_move {
        append_text(&mut node.comment_before_move, &parsed.text);
    } else {
        append_text(&mut node.comment, &parsed.text);
    }
}

/// The embedded commands describing `node`, without brackets. The comment
/// before the move is not included.
pub(crate) fn node_commands(node: &TreeNode) -> Vec<String> {
    let mut commands = Vec::new();
    let mut push = |kind: CommandKind, args: &str| {
        commands.push(if args.is_empty() {
            kind.tag().to_owned()
        } else {
            format!("{} {}", kind.tag(), args)
        });
    };

    if node.is_bookmark {
        push(CommandKind::Bookmark, "");
    }
    if let Some(ref eval) = node.engine_evaluation {
        push(CommandKind::EngineEvaluation, eval);
    }
    if let Some(ref assessment) = node.assessment {
        push(CommandKind::Assessment, assessment);
    }
    if let Some(ref arrows) = node.arrows {
        push(CommandKind::Arrows, arrows);
    }
    if let Some(ref circles) = node.circles {
        push(CommandKind::Circles, circles);
    }
    if let Some(points) = node.quiz_points {
        push(CommandKind::QuizPoints, &points.to_string());
    }
    if let Some(ref response) = node.best_response {
        push(CommandKind::BestResponse, response);
    }
    if node.is_thumbnail {
        push(CommandKind::Thumbnail, "");
    }
    if node.is_diagram {
        push(CommandKind::Diagram, "");
    }
    if let Some(ref refs) = node.article_refs {
        push(CommandKind::ArticleRefs, refs);
    }
    commands.extend(node.unprocessed_commands.iter().cloned());
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{node::NodeId, BoardPosition};

    fn root() -> TreeNode {
        TreeNode::new(NodeId::ROOT, None, BoardPosition::new())
    }

    #[test]
    fn test_parse_command() {
        let command = RawCommand::parse(" %cal  Ge2e4,Rd7d5 ");
        assert_eq!(command.tag, "%cal");
        assert_eq!(command.args, "Ge2e4,Rd7d5");
        assert_eq!(command.kind(), Some(CommandKind::Arrows));

        let command = RawCommand::parse("%chf-thmb");
        assert_eq!(command.args, "");
        assert_eq!(command.kind(), Some(CommandKind::Thumbnail));

        assert_eq!(RawCommand::parse("%clk 0:03:00").kind(), None);
    }

    #[test]
    fn test_split_comment() {
        let comment = Comment::parse("Sharp.\n[%cal Ge2e4] [#] Black [is] fine [%eval 0.3]");
        assert_eq!(comment.text, "Sharp. Black [is] fine");
        assert!(comment.diagram);
        assert_eq!(comment.commands.len(), 2);
        assert_eq!(comment.commands[1].tag, "%eval");

        let comment = Comment::parse("unterminated [%cal Ge2e4");
        assert_eq!(comment.text, "unterminated [%cal Ge2e4");
        assert!(comment.commands.is_empty());
    }

    #[test]
    fn test_annotate() {
        let mut node = root();
        annotate(
            &mut node,
            "[%chf-bkm] [%eval -1.2] [%csl Rd5] [%chf-qpts 3] [%chf-aref intro|ch2] [%clk 0:01] Good",
            false,
        );
        assert!(node.is_bookmark());
        assert_eq!(node.engine_evaluation.as_deref(), Some("-1.2"));
        assert_eq!(node.circles.as_deref(), Some("Rd5"));
        assert_eq!(node.quiz_points, Some(3));
        assert_eq!(node.article_refs.as_deref(), Some("intro|ch2"));
        assert_eq!(node.unprocessed_commands, vec!["%clk 0:01".to_owned()]);
        assert_eq!(node.comment.as_deref(), Some("Good"));

        annotate(&mut node, "Very good", false);
        assert_eq!(node.comment.as_deref(), Some("Good Very good"));

        annotate(&mut node, "[%chf-qpts many]", false);
        assert_eq!(node.quiz_points, Some(3));
        assert_eq!(node.unprocessed_commands.len(), 2);

        annotate(&mut node, "Instead:", true);
        assert_eq!(node.comment_before_move.as_deref(), Some("Instead:"));
    }

    #[test]
    fn test_node_commands() {
        let mut node = root();
        annotate(&mut node, "[%eval 0.5] [%chf-thmb] [%foo bar] [%chf-cbm before]", false);
        assert_eq!(
            node_commands(&node),
            vec!["%chf-eev 0.5".to_owned(), "%chf-thmb".to_owned(), "%foo bar".to_owned()]
        );
        assert_eq!(node.comment_before_move.as_deref(), Some("before"));
        assert_eq!(node.comment, None);
    }
}
