use smol_str::SmolStr;

pub use sqlcraft_lexer::CommentPlacement;

/// A comment tagged with its placement relative to the node that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedComment {
    pub placement: CommentPlacement,
    pub text: SmolStr,
    pub block: bool,
}

/// Comments attached to one AST node. `legacy` is the flattened ordered text list
/// (matches older consumers that only want comment bodies); `positioned` carries
/// the placement tag every new consumer should prefer. Both are kept in lockstep
/// by [`Trivia::push`] so they never drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trivia {
    pub legacy: Vec<SmolStr>,
    pub positioned: Vec<PositionedComment>,
}

impl Trivia {
    pub fn push(&mut self, comment: PositionedComment) {
        self.legacy.push(comment.text.clone());
        self.positioned.push(comment);
    }

    pub fn is_empty(&self) -> bool {
        self.positioned.is_empty()
    }

    pub fn before(&self) -> impl Iterator<Item = &PositionedComment> {
        self.positioned.iter().filter(|c| c.placement == CommentPlacement::Before)
    }

    pub fn after(&self) -> impl Iterator<Item = &PositionedComment> {
        self.positioned.iter().filter(|c| c.placement == CommentPlacement::After)
    }

    pub fn from_token(token: &sqlcraft_lexer::Token) -> Trivia {
        let mut trivia = Trivia::default();
        for comment in &token.comments {
            trivia.push(PositionedComment {
                placement: comment.placement,
                text: comment.text.clone(),
                block: comment.block,
            });
        }
        trivia
    }
}
