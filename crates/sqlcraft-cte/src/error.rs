use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("CTE dependency graph has a cycle")]
    Cycle,
    #[error("no CTE named {name}")]
    NotFound { name: SmolStr },
    #[error("query has no CTEs")]
    NoCtes,
}

/// Unifies the graph, printer, and parser failure modes that `decompose`,
/// `extract`, `compose`, and `synchronize` can surface, since each of those
/// operations re-parses and re-formats text on top of the pure graph queries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CteError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Format(#[from] sqlcraft_printer::FormatError),
    #[error(transparent)]
    Parse(#[from] sqlcraft_parser::ParseError),
}
