use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("wildcard expansion needs a schema resolver{}", target.as_ref().map(|t| format!(" (for {t})")).unwrap_or_default())]
    WildcardNeedsSchema { target: Option<SmolStr> },
    #[error("ambiguous column reference: {name}")]
    AmbiguousColumn { name: SmolStr },
}
