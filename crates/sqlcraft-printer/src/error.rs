use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("select clause has no items")]
    EmptySelect,
    #[error("values clause has no rows")]
    EmptyValues,
    #[error("merge statement has no when clauses")]
    EmptyMerge,
}
