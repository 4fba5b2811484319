//! Lexical analysis: turns SQL source text into a flat, ordered token stream.
//!
//! Splits the work into a byte-level scanner and a typed [`Token`] the rest of
//! the toolchain consumes, with one ANSI-flavored keyword/type table rather
//! than a dialect-indexed set, since this crate targets a single grammar.

mod error;
mod keywords;
mod scanner;
mod span;
mod token;

pub use error::{LexError, LexErrorKind};
pub use span::{Position, Span};
pub use token::{Comment, CommentPlacement, Token, TokenKind, TokenKindSet};

/// Lex `source` into a complete token stream, or the first lexical error found.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    scanner::Scanner::new(source).run()
}
