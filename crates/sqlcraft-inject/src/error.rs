use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InjectError {
    /// Reachable only from a hand-rolled [`ColumnCondition`](crate::ColumnCondition)
    /// constructor outside this crate; the closed enum itself can't name an
    /// operator this crate doesn't know about.
    #[error("unsupported condition operator {key}")]
    UnsupportedOperator { key: String },
    #[error("no upstream select exposes column {name}")]
    ColumnNotFound { name: SmolStr },
    #[error(transparent)]
    Walk(#[from] sqlcraft_walker::WalkError),
}
