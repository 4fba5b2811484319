use indexmap::IndexMap;
use sqlcraft_ast::{FromClause, FromItem, Query, WithClause};

/// What an alias in a FROM/JOIN chain binds to.
pub(crate) enum Source<'a> {
    Table(&'a [smol_str::SmolStr]),
    Cte(&'a Query),
    Subquery(&'a Query),
}

/// Alias-to-source bindings visible while resolving one `SELECT`'s items.
///
/// Built fresh per query node: a subquery or CTE body gets its own scope, it
/// never inherits the enclosing one (SQL has no free column lookup across
/// scope boundaries without an explicit correlated reference, which this
/// collector doesn't chase).
pub(crate) struct Scope<'a> {
    pub sources: IndexMap<String, Source<'a>>,
}

pub(crate) fn cte_map(with: Option<&WithClause>) -> IndexMap<String, &Query> {
    let mut map = IndexMap::new();
    if let Some(with) = with {
        for cte in &with.ctes {
            map.insert(cte.name.to_ascii_lowercase(), cte.query.as_ref());
        }
    }
    map
}

pub(crate) fn build_scope<'a>(from: Option<&'a FromClause>, ctes: &IndexMap<String, &'a Query>) -> Scope<'a> {
    let mut sources = IndexMap::new();
    if let Some(from) = from {
        for item in &from.items {
            collect_from_item(item, ctes, &mut sources);
        }
    }
    Scope { sources }
}

fn collect_from_item<'a>(
    item: &'a FromItem,
    ctes: &IndexMap<String, &'a Query>,
    sources: &mut IndexMap<String, Source<'a>>,
) {
    match item {
        FromItem::Table { name, alias, .. } => {
            let Some(last) = name.last() else { return };
            let key = alias.as_deref().unwrap_or(last.as_str()).to_ascii_lowercase();
            match ctes.get(&last.to_ascii_lowercase()) {
                Some(cte_query) => {
                    sources.insert(key, Source::Cte(cte_query));
                }
                None => {
                    sources.insert(key, Source::Table(name));
                }
            }
        }
        FromItem::Subquery { query, alias, .. } => {
            let key = alias.as_deref().unwrap_or_default().to_ascii_lowercase();
            sources.insert(key, Source::Subquery(query));
        }
        FromItem::Join { left, right, .. } => {
            collect_from_item(left, ctes, sources);
            collect_from_item(right, ctes, sources);
        }
    }
}
