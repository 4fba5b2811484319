use smol_str::SmolStr;
use sqlcraft_lexer::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("lexical error: {0}")]
    Lex(#[from] sqlcraft_lexer::LexError),
    #[error("unexpected token {found:?} at byte {}; expected one of {expected:?}", span.start)]
    UnexpectedToken { found: SmolStr, expected: Vec<&'static str>, span: Span },
    #[error("unterminated construct starting at byte {}: {what}", span.start)]
    Unterminated { what: &'static str, span: Span },
    #[error("ambiguous grammar at byte {}: {detail}", span.start)]
    Ambiguous { detail: &'static str, span: Span },
    #[error("unsupported dialect feature at byte {}: {feature}", span.start)]
    UnsupportedFeature { feature: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(e) => e.span,
            ParseError::UnexpectedToken { span, .. }
            | ParseError::Unterminated { span, .. }
            | ParseError::Ambiguous { span, .. }
            | ParseError::UnsupportedFeature { span, .. } => *span,
        }
    }
}
