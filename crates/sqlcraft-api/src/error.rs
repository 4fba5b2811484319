use smol_str::SmolStr;
use thiserror::Error;

/// `DELETE`/`MERGE` construction failures: a requested column isn't part of
/// the source `SELECT`'s own projection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("columns not found in select projection: {missing:?}")]
    ColumnsNotFound { missing: Vec<SmolStr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateErrorKind {
    NotInitialized,
}

/// Reserved for stateful analyzer usage ("query an analyzer before its first
/// `analyze` pass"). This crate's analyzers (`sqlcraft_cte`, `sqlcraft_resolve`,
/// `sqlcraft_inject`) are all plain functions over an owned `Query`, so there is
/// no initialization phase to skip and this variant is unreachable through the
/// facade below; kept so the error taxonomy names every documented failure mode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("analyzer used before initialization")]
pub struct StateError {
    pub kind: StateErrorKind,
}

/// Unifies every per-crate error type behind one facade result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqlCraftError {
    #[error(transparent)]
    Lex(#[from] sqlcraft_lexer::LexError),
    #[error(transparent)]
    Parse(#[from] sqlcraft_parser::ParseError),
    #[error(transparent)]
    Resolve(#[from] sqlcraft_resolve::ResolveError),
    #[error(transparent)]
    Graph(#[from] sqlcraft_cte::GraphError),
    #[error(transparent)]
    Cte(#[from] sqlcraft_cte::CteError),
    #[error(transparent)]
    Inject(#[from] sqlcraft_inject::InjectError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Format(#[from] sqlcraft_printer::FormatError),
    #[error(transparent)]
    State(#[from] StateError),
}
