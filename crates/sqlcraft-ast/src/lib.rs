//! Typed AST node variants: queries, clauses, and value expressions.
//!
//! Closed tagged-union `enum`s with exhaustive `match` dispatch, rather than a
//! generic `dyn` trait-object tree: the shape of a SQL statement is a known,
//! small, fixed set of cases, so a sum type lets every transformer get a
//! compile error the moment a new variant shows up unhandled.

mod query;
#[cfg(test)]
mod tests;
mod trivia;
mod value;

pub use query::*;
pub use sqlcraft_lexer::Span;
pub use trivia::{CommentPlacement, PositionedComment, Trivia};
pub use value::*;
