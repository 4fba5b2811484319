use thiserror::Error;

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    Unterminated,
    MalformedNumber,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind:?} at byte {}", span.start)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn unterminated(span: Span) -> Self {
        LexError { kind: LexErrorKind::Unterminated, span }
    }

    pub fn malformed_number(span: Span) -> Self {
        LexError { kind: LexErrorKind::MalformedNumber, span }
    }
}
