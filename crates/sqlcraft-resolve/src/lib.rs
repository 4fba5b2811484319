//! Column and source resolution: what a query selects, where each selected
//! column ultimately comes from, and which bound parameters it already uses.
//!
//! The collectors here never mutate a query; they're read-only passes that
//! downstream analyzers (dependency graphs, predicate injection) build on top
//! of to decide where a new condition can be pushed.

mod error;
mod resolver;
mod scope;

pub use error::ResolveError;
pub use resolver::SchemaResolver;

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;
use sqlcraft_ast::{ColumnRef, Query, SelectItem, SimpleSelect, ValueComponent};
use sqlcraft_walker::Observer;

use scope::{build_scope, cte_map, Scope, Source};

/// How duplicate column names collapse when the same name is exposed by more
/// than one source (common once `upstream` expansion pulls in base-table
/// columns alongside the explicit projection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    ColumnNameOnly,
    FullName,
    IgnoreCaseAndUnderscore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterableColumn {
    pub name: SmolStr,
    /// The alias/table this column is best attributed to, when known. `None`
    /// for a computed projection (`a + b AS total`) that only exists at this
    /// level.
    pub table_namespace: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterableParameter {
    pub name: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterableSet {
    pub columns: Vec<FilterableColumn>,
    pub parameters: Vec<FilterableParameter>,
}

/// Collects the columns a caller could filter on, and the parameters a query
/// already binds.
///
/// With `upstream` off, this is exactly the SELECT's own projection (minus
/// bare wildcards, which are always expanded or dropped, never emitted as a
/// literal `*`). With `upstream` on, it additionally pulls in every column
/// exposed by a FROM/JOIN source, even ones not explicitly projected — always
/// a superset of the non-upstream result.
pub struct FilterableItemCollector<'r> {
    resolver: Option<&'r dyn SchemaResolver>,
    upstream: bool,
    strict: bool,
    duplicates: DuplicatePolicy,
}

impl<'r> Default for FilterableItemCollector<'r> {
    fn default() -> Self {
        FilterableItemCollector { resolver: None, upstream: false, strict: false, duplicates: DuplicatePolicy::default() }
    }
}

impl<'r> FilterableItemCollector<'r> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(mut self, resolver: &'r dyn SchemaResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_upstream(mut self, upstream: bool) -> Self {
        self.upstream = upstream;
        self
    }

    /// When set, a wildcard whose source can't be resolved raises
    /// [`ResolveError::WildcardNeedsSchema`], and a column name claimed by two
    /// sources with different attribution raises
    /// [`ResolveError::AmbiguousColumn`]. Off by default: both cases instead
    /// resolve to an opaque empty/first-wins result.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn collect(&self, query: &Query) -> Result<FilterableSet, ResolveError> {
        let mut columns = Vec::new();
        self.collect_columns(query, &mut columns)?;
        let columns = dedup(columns, self.duplicates, self.strict)?;
        let parameters = collect_parameters(query);
        Ok(FilterableSet { columns, parameters })
    }

    fn collect_columns(&self, query: &Query, out: &mut Vec<FilterableColumn>) -> Result<(), ResolveError> {
        match query {
            Query::SimpleSelect(select) => self.collect_simple(select, out),
            Query::BinarySelect(binary) => {
                self.collect_columns(&binary.left, out)?;
                self.collect_columns(&binary.right, out)
            }
            Query::Values(_) | Query::Merge(_) | Query::Delete(_) => Ok(()),
        }
    }

    fn collect_simple(&self, select: &SimpleSelect, out: &mut Vec<FilterableColumn>) -> Result<(), ResolveError> {
        let ctes = cte_map(select.with.as_ref());
        let scope = build_scope(select.from.as_ref(), &ctes);

        for item in &select.select.items {
            match item {
                SelectItem::Expr { expr, alias, .. } => {
                    let name = alias.clone().or_else(|| expr.implicit_output_name().map(SmolStr::from));
                    if let Some(name) = name {
                        let table_namespace = match expr {
                            ValueComponent::Column(c) => self.column_namespace(c, &scope),
                            _ => None,
                        };
                        out.push(FilterableColumn { name, table_namespace });
                    }
                }
                SelectItem::Wildcard { namespaces, .. } => {
                    self.expand_wildcard(namespaces, &scope, out)?;
                }
            }
        }

        if self.upstream {
            for (alias, source) in &scope.sources {
                for name in self.source_columns(source)? {
                    out.push(FilterableColumn { name, table_namespace: Some(SmolStr::from(alias.as_str())) });
                }
            }
        }
        Ok(())
    }

    fn column_namespace(&self, column: &ColumnRef, scope: &Scope<'_>) -> Option<SmolStr> {
        if let Some(ns) = column.namespaces.last() {
            return Some(ns.clone());
        }
        if scope.sources.len() == 1 {
            return scope.sources.keys().next().map(|k| SmolStr::from(k.as_str()));
        }
        None
    }

    fn expand_wildcard(
        &self,
        namespaces: &[SmolStr],
        scope: &Scope<'_>,
        out: &mut Vec<FilterableColumn>,
    ) -> Result<(), ResolveError> {
        match namespaces.last() {
            None => {
                for (alias, source) in &scope.sources {
                    for name in self.source_columns(source)? {
                        out.push(FilterableColumn { name, table_namespace: Some(SmolStr::from(alias.as_str())) });
                    }
                }
                Ok(())
            }
            Some(ns) => match scope.sources.get(ns.to_ascii_lowercase().as_str()) {
                Some(source) => {
                    for name in self.source_columns(source)? {
                        out.push(FilterableColumn { name, table_namespace: Some(ns.clone()) });
                    }
                    Ok(())
                }
                None if self.strict => Err(ResolveError::WildcardNeedsSchema { target: Some(ns.clone()) }),
                None => Ok(()),
            },
        }
    }

    fn source_columns(&self, source: &Source) -> Result<Vec<SmolStr>, ResolveError> {
        match source {
            Source::Table(name) => match self.resolver {
                Some(resolver) => match resolver.columns(name) {
                    Some(cols) => Ok(cols),
                    None if self.strict => Err(ResolveError::WildcardNeedsSchema { target: Some(dotted(name)) }),
                    None => Ok(Vec::new()),
                },
                None => Err(ResolveError::WildcardNeedsSchema { target: Some(dotted(name)) }),
            },
            Source::Cte(query) | Source::Subquery(query) => {
                let nested = FilterableItemCollector {
                    resolver: self.resolver,
                    upstream: false,
                    strict: self.strict,
                    duplicates: self.duplicates,
                };
                Ok(nested.collect(query)?.columns.into_iter().map(|c| c.name).collect())
            }
        }
    }
}

fn dotted(name: &[SmolStr]) -> SmolStr {
    SmolStr::from(name.iter().map(SmolStr::as_str).collect::<Vec<_>>().join("."))
}

fn dedup_key(column: &FilterableColumn, policy: DuplicatePolicy) -> String {
    match policy {
        DuplicatePolicy::ColumnNameOnly => column.name.to_ascii_lowercase(),
        DuplicatePolicy::FullName => {
            let ns = column.table_namespace.as_deref().unwrap_or("").to_ascii_lowercase();
            format!("{ns}.{}", column.name.to_ascii_lowercase())
        }
        DuplicatePolicy::IgnoreCaseAndUnderscore => column.name.to_ascii_lowercase().replace('_', ""),
    }
}

/// First occurrence wins. In `strict` mode, a later occurrence of the same key
/// with different source attribution is reported as ambiguous rather than
/// silently dropped.
fn dedup(
    columns: Vec<FilterableColumn>,
    policy: DuplicatePolicy,
    strict: bool,
) -> Result<Vec<FilterableColumn>, ResolveError> {
    let mut seen: IndexMap<String, FilterableColumn> = IndexMap::new();
    for column in columns {
        let key = dedup_key(&column, policy);
        match seen.get(&key) {
            Some(existing) => {
                if strict && existing.table_namespace != column.table_namespace {
                    return Err(ResolveError::AmbiguousColumn { name: column.name });
                }
            }
            None => {
                seen.insert(key, column);
            }
        }
    }
    Ok(seen.into_values().collect())
}

struct ParamCollector {
    seen: IndexSet<SmolStr>,
    params: Vec<FilterableParameter>,
}

impl Observer for ParamCollector {
    fn visit_value(&mut self, value: &ValueComponent) {
        if let ValueComponent::Parameter(p) = value {
            if self.seen.insert(p.name.clone()) {
                self.params.push(FilterableParameter { name: p.name.clone() });
            }
        }
    }
}

fn collect_parameters(query: &Query) -> Vec<FilterableParameter> {
    let mut collector = ParamCollector { seen: IndexSet::new(), params: Vec::new() };
    let _ = collector.walk(query);
    collector.params
}

/// Plain projection-name listing, with no schema awareness: a bare wildcard is
/// never reported (per [`FilterableItemCollector`], it cannot appear as an
/// exported name), and set-operation branches take their names from the left
/// side, matching how SQL itself names a `UNION`'s output columns.
pub struct SelectableColumnCollector;

impl SelectableColumnCollector {
    pub fn collect(query: &Query) -> Vec<SmolStr> {
        let mut out = Vec::new();
        Self::collect_query(query, &mut out);
        out
    }

    fn collect_query(query: &Query, out: &mut Vec<SmolStr>) {
        match query {
            Query::SimpleSelect(select) => {
                for item in &select.select.items {
                    if let SelectItem::Expr { expr, alias, .. } = item {
                        if let Some(name) = alias.clone().or_else(|| expr.implicit_output_name().map(SmolStr::from)) {
                            out.push(name);
                        }
                    }
                }
            }
            Query::BinarySelect(binary) => Self::collect_query(&binary.left, out),
            Query::Values(_) | Query::Merge(_) | Query::Delete(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use sqlcraft_parser::parse;

    use super::*;

    struct FixedSchema;
    impl SchemaResolver for FixedSchema {
        fn columns(&self, table: &[SmolStr]) -> Option<Vec<SmolStr>> {
            match table.last().map(SmolStr::as_str) {
                Some("article") => Some(vec!["article_id".into(), "article_name".into(), "price".into()]),
                _ => None,
            }
        }
    }

    #[test]
    fn plain_projection_reports_qualified_table() {
        let query = parse("select a.article_id, a.price from article as a").unwrap();
        let set = FilterableItemCollector::new().collect(&query).unwrap();
        assert_eq!(set.columns.len(), 2);
        assert_eq!(set.columns[0].name, "article_id");
        assert_eq!(set.columns[0].table_namespace.as_deref(), Some("a"));
    }

    #[test]
    fn single_source_infers_namespace_for_unqualified_column() {
        let query = parse("select price from article as a").unwrap();
        let set = FilterableItemCollector::new().collect(&query).unwrap();
        assert_eq!(set.columns[0].table_namespace.as_deref(), Some("a"));
    }

    #[test]
    fn wildcard_without_resolver_errors() {
        let query = parse("select * from article as a").unwrap();
        let err = FilterableItemCollector::new().collect(&query).unwrap_err();
        assert_eq!(err, ResolveError::WildcardNeedsSchema { target: Some("article".into()) });
    }

    #[test]
    fn wildcard_expands_with_resolver() {
        let query = parse("select * from article as a").unwrap();
        let schema = FixedSchema;
        let set = FilterableItemCollector::new().with_resolver(&schema).collect(&query).unwrap();
        let names: Vec<_> = set.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["article_id", "article_name", "price"]);
    }

    #[test]
    fn upstream_is_a_superset_of_non_upstream() {
        let query = parse("select a.article_id from article as a").unwrap();
        let schema = FixedSchema;
        let narrow = FilterableItemCollector::new().with_resolver(&schema).collect(&query).unwrap();
        let wide = FilterableItemCollector::new().with_resolver(&schema).with_upstream(true).collect(&query).unwrap();
        let narrow_names: IndexSet<_> = narrow.columns.iter().map(|c| c.name.clone()).collect();
        let wide_names: IndexSet<_> = wide.columns.iter().map(|c| c.name.clone()).collect();
        assert!(narrow_names.is_subset(&wide_names));
        assert!(wide_names.contains("article_name"));
    }

    #[test]
    fn collects_named_parameters_once() {
        let query = parse("select id from t where a = :x and b = :x").unwrap();
        let set = FilterableItemCollector::new().collect(&query).unwrap();
        assert_eq!(set.parameters, vec![FilterableParameter { name: "x".into() }]);
    }

    #[test]
    fn selectable_columns_skip_wildcards() {
        let query = parse("select *, id from t").unwrap();
        let names = SelectableColumnCollector::collect(&query);
        assert_eq!(names, vec![SmolStr::from("id")]);
    }
}
