//! Dependency analysis over a query's `WITH` clause: cycle detection,
//! deterministic execution order, decomposition into standalone CTE bodies,
//! single-CTE extraction, and composition of user-edited bodies back into a
//! query. Also hosts the `WITH`-stripping skeleton rewriter.

mod error;
mod graph;
mod refs;

use indexmap::IndexSet;
use smol_str::SmolStr;
use sqlcraft_ast::{
    CteDefinition, FromClause, FromItem, Query, SelectClause, SelectItem, SimpleSelect, Span, Trivia,
    WithClause,
};
use sqlcraft_printer::PrinterOptions;
use sqlcraft_walker::{Rewriter, WalkError};

pub use error::{CteError, GraphError};
pub use graph::{CteGraph, MAIN_QUERY};

/// One CTE pulled out of a `WITH` clause and rendered as a standalone unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CteDecomposition {
    pub name: SmolStr,
    pub query_text: String,
    pub dependencies: Vec<SmolStr>,
    pub dependents: Vec<SmolStr>,
    pub is_recursive: bool,
}

/// One CTE extracted with just enough of its dependency closure to run on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct CteExtraction {
    pub name: SmolStr,
    pub executable_sql: String,
    pub dependencies: Vec<SmolStr>,
    pub warnings: Vec<String>,
}

/// A user-edited CTE body, keyed by the name it was declared under. `body` is
/// the bare query text the CTE would wrap in `AS ( ... )`, not the whole
/// `name AS (...)` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct EditedCte {
    pub name: SmolStr,
    pub body: String,
}

/// Every CTE in `query`'s `WITH` clause, each rendered on its own.
///
/// Non-recursive CTEs get a synthetic `WITH` containing exactly their
/// transitive dependencies, in execution order, wrapped around the CTE's own
/// body. Recursive CTEs (the whole clause is `WITH RECURSIVE`) are rendered
/// as `WITH RECURSIVE name AS ( ... ) SELECT * FROM name`, preserving the
/// self-reference rather than trying to unwrap it.
pub fn decompose(query: &Query, options: &PrinterOptions) -> Result<Vec<CteDecomposition>, CteError> {
    let with = query.with_clause().filter(|w| !w.ctes.is_empty()).ok_or(GraphError::NoCtes)?;
    let graph = CteGraph::build(query)?;

    let mut out = Vec::with_capacity(with.ctes.len());
    for cte in &with.ctes {
        let dependencies = graph.dependencies(&cte.name).unwrap_or_default();
        let dependents = graph.dependents(&cte.name).unwrap_or_default();
        let query_text = if with.recursive {
            render_recursive_envelope(cte, options)?
        } else {
            render_standalone(with, &graph, &cte.name, options)?
        };
        out.push(CteDecomposition {
            name: cte.name.clone(),
            query_text,
            dependencies,
            dependents,
            is_recursive: with.recursive,
        });
    }
    Ok(out)
}

fn render_recursive_envelope(cte: &CteDefinition, options: &PrinterOptions) -> Result<String, CteError> {
    let envelope =
        wrap_with(WithClause { recursive: true, ctes: vec![cte.clone()] }, select_star(&cte.name));
    Ok(sqlcraft_printer::format(&envelope, options)?.text)
}

fn render_standalone(
    with: &WithClause,
    graph: &CteGraph,
    name: &str,
    options: &PrinterOptions,
) -> Result<String, CteError> {
    let target = with.find(name).ok_or_else(|| GraphError::NotFound { name: name.into() })?;
    let deps = dependency_defs(with, graph, name)?;
    let body = (*target.query).clone();
    let body = wrap_with(WithClause { recursive: false, ctes: deps }, body);
    Ok(sqlcraft_printer::format(&body, options)?.text)
}

/// Every transitive dependency of `name` that still has a definition in
/// `with`, ordered so each one precedes the CTEs that depend on it.
fn dependency_defs(with: &WithClause, graph: &CteGraph, name: &str) -> Result<Vec<CteDefinition>, CteError> {
    let transitive = transitive_deps(graph, name);
    let order = graph.execution_order()?;
    let mut deps = Vec::new();
    for n in &order {
        if n.as_str() == MAIN_QUERY {
            continue;
        }
        if transitive.contains(&n.to_ascii_lowercase()) {
            if let Some(def) = with.find(n) {
                deps.push(def.clone());
            }
        }
    }
    Ok(deps)
}

fn transitive_deps(graph: &CteGraph, start: &str) -> IndexSet<String> {
    let mut seen = IndexSet::new();
    let mut stack = vec![start.to_ascii_lowercase()];
    while let Some(key) = stack.pop() {
        if let Some(direct) = graph.dependencies(&key) {
            for d in direct {
                let dk = d.to_ascii_lowercase();
                if seen.insert(dk.clone()) {
                    stack.push(dk);
                }
            }
        }
    }
    seen
}

/// Pulls `target_name` out of `query`'s `WITH` clause along with the minimal
/// set of CTEs it transitively depends on, so the result runs standalone.
pub fn extract(query: &Query, target_name: &str, options: &PrinterOptions) -> Result<CteExtraction, CteError> {
    let with = query.with_clause().filter(|w| !w.ctes.is_empty()).ok_or(GraphError::NoCtes)?;
    let target =
        with.find(target_name).ok_or_else(|| GraphError::NotFound { name: target_name.into() })?.clone();
    let graph = CteGraph::build(query)?;

    if with.recursive {
        let printed = sqlcraft_printer::format(query, options)?;
        return Ok(CteExtraction {
            name: target.name.clone(),
            executable_sql: printed.text,
            dependencies: graph.dependencies(&target.name).unwrap_or_default(),
            warnings: vec!["recursive CTE restoration requires the full query context".to_string()],
        });
    }

    let deps = dependency_defs(with, &graph, &target.name)?;
    let dependencies: Vec<SmolStr> = deps.iter().map(|d| d.name.clone()).collect();
    let mut ctes = deps;
    ctes.push(target.clone());

    let envelope = wrap_with(WithClause { recursive: false, ctes }, select_star(&target.name));
    let printed = sqlcraft_printer::format(&envelope, options)?;
    Ok(CteExtraction { name: target.name, executable_sql: printed.text, dependencies, warnings: vec![] })
}

/// Stitches user-edited CTE bodies and a root query back into one `Query`.
///
/// Each edited body is re-parsed independently; dependencies are re-derived
/// from its own FROM references rather than trusted from before the edit. An
/// inline `WITH` at the top of an edited body is preserved untouched unless
/// one of its own CTE names collides with a name known to this composition,
/// in which case it is stripped so the outer and inner definitions of that
/// name can't be confused with each other.
pub fn compose(edited_ctes: &[EditedCte], root_sql: &str) -> Result<Query, CteError> {
    let root = sqlcraft_parser::parse(root_sql)?;
    let known: IndexSet<String> = edited_ctes.iter().map(|c| c.name.to_ascii_lowercase()).collect();

    let mut defs = Vec::with_capacity(edited_ctes.len());
    for edited in edited_ctes {
        let mut body = sqlcraft_parser::parse(&edited.body)?;
        let collides = body
            .with_clause()
            .map(|w| w.ctes.iter().any(|c| known.contains(&c.name.to_ascii_lowercase())))
            .unwrap_or(false);
        if collides {
            if let Some(slot) = body.with_clause_mut() {
                *slot = None;
            }
        }
        defs.push(CteDefinition {
            name: edited.name.clone(),
            column_names: None,
            query: Box::new(body),
            span: Span::at(0),
            trivia: Trivia::default(),
        });
    }

    let probe = wrap_with(WithClause { recursive: false, ctes: defs.clone() }, root.clone());
    let graph = CteGraph::build(&probe)?;
    let order = graph.execution_order()?;

    let mut ordered = Vec::with_capacity(defs.len());
    for n in &order {
        if n.as_str() == MAIN_QUERY {
            continue;
        }
        if let Some(def) = defs.iter().find(|d| d.name.eq_ignore_ascii_case(n)) {
            ordered.push(def.clone());
        }
    }
    Ok(wrap_with(WithClause { recursive: false, ctes: ordered }, root))
}

/// `compose` followed by a format/re-parse round trip so the result is
/// guaranteed to be the AST an independent parse of its own text would yield,
/// rather than one that merely happens to have been built correctly.
pub fn synchronize(
    edited_ctes: &[EditedCte],
    root_sql: &str,
    options: &PrinterOptions,
) -> Result<Query, CteError> {
    let composed = compose(edited_ctes, root_sql)?;
    let printed = sqlcraft_printer::format(&composed, options)?;
    Ok(sqlcraft_parser::parse(&printed.text)?)
}

fn select_star(name: &SmolStr) -> Query {
    Query::SimpleSelect(Box::new(SimpleSelect {
        with: None,
        select: SelectClause {
            items: vec![SelectItem::Wildcard { namespaces: vec![], span: Span::at(0) }],
            distinct: false,
        },
        from: Some(FromClause {
            items: vec![FromItem::Table { name: vec![name.clone()], alias: None, span: Span::at(0) }],
        }),
        where_clause: None,
        group_by: vec![],
        having: None,
        windows: vec![],
        order_by: vec![],
        limit: None,
        span: Span::at(0),
        trivia: Trivia::default(),
    }))
}

/// Attaches `with` to `query`'s own `WITH` slot. `Values`/`Merge`/`Delete`
/// bodies have no such slot; a non-empty `with` is then simply dropped, with
/// a log line so a silently-incomplete decomposition doesn't pass unnoticed.
fn wrap_with(with: WithClause, mut query: Query) -> Query {
    if with.ctes.is_empty() {
        return query;
    }
    match query.with_clause_mut() {
        Some(slot) => *slot = Some(with),
        None => log::warn!("cannot attach a WITH clause to a {} body; dependencies dropped", shape_name(&query)),
    }
    query
}

fn shape_name(query: &Query) -> &'static str {
    match query {
        Query::SimpleSelect(_) => "SELECT",
        Query::BinarySelect(_) => "set-operation",
        Query::Values(_) => "VALUES",
        Query::Merge(_) => "MERGE",
        Query::Delete(_) => "DELETE",
    }
}

/// Strips every `WITH` clause from a query, at every nesting level, leaving
/// the surrounding `SELECT`s otherwise untouched. The resulting "skeleton"
/// may reference CTE names that no longer resolve to anything; that is the
/// point, not a defect.
pub struct CteDisabler;

impl Rewriter for CteDisabler {
    fn rewrite_query(&mut self, query: Query) -> Query {
        match query {
            Query::SimpleSelect(mut s) => {
                s.with = None;
                Query::SimpleSelect(s)
            }
            Query::BinarySelect(mut b) => {
                b.with = None;
                Query::BinarySelect(b)
            }
            other => other,
        }
    }
}

pub fn disable_ctes(query: Query) -> Result<Query, WalkError> {
    CteDisabler.walk(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diamond_dag_dependencies_and_order() {
        let query = sqlcraft_parser::parse(
            "WITH a AS (SELECT id FROM t), \
             b AS (SELECT id FROM a), \
             c AS (SELECT id FROM a), \
             d AS (SELECT id FROM b UNION ALL SELECT id FROM c) \
             SELECT * FROM d",
        )
        .unwrap();
        let graph = CteGraph::build(&query).unwrap();
        assert!(!graph.has_cycle());

        let mut d_deps = graph.dependencies("d").unwrap();
        d_deps.sort();
        assert_eq!(d_deps, vec![SmolStr::from("b"), SmolStr::from("c")]);
        assert_eq!(graph.dependencies("b").unwrap(), vec![SmolStr::from("a")]);
        assert_eq!(graph.dependencies("c").unwrap(), vec![SmolStr::from("a")]);

        let order = graph.execution_order().unwrap();
        let pos = |n: &str| order.iter().position(|x| x.eq_ignore_ascii_case(n)).unwrap();
        assert!(pos("a") < pos("b"));
        assert!(pos("a") < pos("c"));
        assert!(pos("b") < pos("d"));
        assert!(pos("c") < pos("d"));
        assert_eq!(order.last().unwrap(), &SmolStr::from(MAIN_QUERY));
        assert_eq!(order[order.len() - 2], SmolStr::from("d"));
    }

    #[test]
    fn mutual_reference_is_a_cycle() {
        let query =
            sqlcraft_parser::parse("WITH a AS (SELECT * FROM b), b AS (SELECT * FROM a) SELECT * FROM a")
                .unwrap();
        let graph = CteGraph::build(&query).unwrap();
        assert!(graph.has_cycle());
        assert_eq!(graph.execution_order(), Err(GraphError::Cycle));
    }

    #[test]
    fn self_loop_outside_recursive_with_is_a_cycle() {
        let query = sqlcraft_parser::parse("WITH a AS (SELECT * FROM a) SELECT * FROM a").unwrap();
        let graph = CteGraph::build(&query).unwrap();
        assert!(graph.has_cycle());
    }

    #[test]
    fn decompose_diamond_attaches_only_transitive_deps() {
        let query = sqlcraft_parser::parse(
            "WITH a AS (SELECT id FROM t), \
             b AS (SELECT id FROM a), \
             c AS (SELECT id FROM a), \
             d AS (SELECT id FROM b UNION ALL SELECT id FROM c) \
             SELECT * FROM d",
        )
        .unwrap();
        let decomposed = decompose(&query, &PrinterOptions::generic()).unwrap();

        let d = decomposed.iter().find(|c| c.name.as_str() == "d").unwrap();
        assert!(!d.is_recursive);
        assert!(d.query_text.contains("a as ("));
        assert!(d.query_text.contains("b as ("));
        assert!(d.query_text.contains("c as ("));

        let a = decomposed.iter().find(|c| c.name.as_str() == "a").unwrap();
        assert!(!a.query_text.contains(" as ("), "a has no dependencies to attach");
    }

    #[test]
    fn decompose_recursive_keeps_self_reference_envelope() {
        let query = sqlcraft_parser::parse(
            "WITH RECURSIVE a AS (SELECT 1 AS n UNION ALL SELECT n + 1 FROM a WHERE n < 10) SELECT * FROM a",
        )
        .unwrap();
        let decomposed = decompose(&query, &PrinterOptions::generic()).unwrap();
        let a = decomposed.iter().find(|c| c.name.as_str() == "a").unwrap();
        assert!(a.is_recursive);
        assert!(a.query_text.contains("recursive"));
        assert!(a.query_text.contains("a as ("));
    }

    #[test]
    fn extract_pulls_transitive_closure_only() {
        let query = sqlcraft_parser::parse(
            "WITH a AS (SELECT id FROM t), \
             b AS (SELECT id FROM a), \
             c AS (SELECT id FROM a), \
             d AS (SELECT id FROM b UNION ALL SELECT id FROM c) \
             SELECT * FROM d",
        )
        .unwrap();
        let extraction = extract(&query, "b", &PrinterOptions::generic()).unwrap();
        assert_eq!(extraction.name, SmolStr::from("b"));
        assert_eq!(extraction.dependencies, vec![SmolStr::from("a")]);
        assert!(extraction.executable_sql.contains("a as ("));
        assert!(extraction.executable_sql.contains("b as ("));
        assert!(!extraction.executable_sql.contains("c as ("));
        assert!(!extraction.executable_sql.contains("d as ("));
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn extract_recursive_returns_full_query_with_warning() {
        let query = sqlcraft_parser::parse(
            "WITH RECURSIVE a AS (SELECT 1 AS n UNION ALL SELECT n + 1 FROM a WHERE n < 10) SELECT * FROM a",
        )
        .unwrap();
        let extraction = extract(&query, "a", &PrinterOptions::generic()).unwrap();
        assert_eq!(extraction.warnings.len(), 1);
        assert!(extraction.executable_sql.contains("recursive"));
    }

    #[test]
    fn extract_missing_name_errors() {
        let query = sqlcraft_parser::parse("WITH a AS (SELECT 1) SELECT * FROM a").unwrap();
        let err = extract(&query, "nope", &PrinterOptions::generic()).unwrap_err();
        assert_eq!(err, CteError::Graph(GraphError::NotFound { name: "nope".into() }));
    }

    #[test]
    fn extract_without_ctes_errors() {
        let query = sqlcraft_parser::parse("SELECT 1").unwrap();
        let err = extract(&query, "a", &PrinterOptions::generic()).unwrap_err();
        assert_eq!(err, CteError::Graph(GraphError::NoCtes));
    }

    #[test]
    fn compose_reorders_ctes_topologically_regardless_of_input_order() {
        let edited = vec![
            EditedCte { name: SmolStr::from("b"), body: "SELECT id FROM a".to_string() },
            EditedCte { name: SmolStr::from("a"), body: "SELECT id FROM t".to_string() },
        ];
        let composed = compose(&edited, "SELECT * FROM b").unwrap();
        let with = composed.with_clause().unwrap();
        assert_eq!(with.ctes.len(), 2);
        assert_eq!(with.ctes[0].name, SmolStr::from("a"));
        assert_eq!(with.ctes[1].name, SmolStr::from("b"));
    }

    #[test]
    fn compose_preserves_non_colliding_inline_with() {
        let edited =
            vec![EditedCte { name: SmolStr::from("a"), body: "WITH x AS (SELECT 1) SELECT * FROM x".to_string() }];
        let composed = compose(&edited, "SELECT * FROM a").unwrap();
        let with = composed.with_clause().unwrap();
        let a_def = with.find("a").unwrap();
        assert!(a_def.query.with_clause().is_some());
    }

    #[test]
    fn compose_strips_colliding_inline_with() {
        let edited = vec![
            EditedCte { name: SmolStr::from("a"), body: "SELECT 1".to_string() },
            EditedCte { name: SmolStr::from("b"), body: "WITH a AS (SELECT 2) SELECT * FROM a".to_string() },
        ];
        let composed = compose(&edited, "SELECT * FROM b").unwrap();
        let with = composed.with_clause().unwrap();
        let b_def = with.find("b").unwrap();
        assert!(b_def.query.with_clause().is_none());
        assert_eq!(with.ctes[0].name, SmolStr::from("a"));
        assert_eq!(with.ctes[1].name, SmolStr::from("b"));
    }

    #[test]
    fn synchronize_round_trips_through_print_and_reparse() {
        let edited = vec![EditedCte { name: SmolStr::from("a"), body: "SELECT 1 AS one".to_string() }];
        let result = synchronize(&edited, "SELECT * FROM a", &PrinterOptions::generic()).unwrap();
        let with = result.with_clause().unwrap();
        assert_eq!(with.ctes.len(), 1);
        assert_eq!(with.ctes[0].name, SmolStr::from("a"));
    }

    #[test]
    fn disabler_strips_with_clauses_at_every_nesting_level() {
        let query = sqlcraft_parser::parse(
            "WITH a AS (SELECT 1) SELECT * FROM (WITH x AS (SELECT 2) SELECT * FROM x) AS sub",
        )
        .unwrap();
        let disabled = disable_ctes(query).unwrap();
        assert!(disabled.with_clause().is_none());

        let Query::SimpleSelect(outer) = &disabled else { panic!("expected simple select") };
        let from = outer.from.as_ref().unwrap();
        let FromItem::Subquery { query: inner, .. } = &from.items[0] else { panic!("expected subquery") };
        assert!(inner.with_clause().is_none());
    }
}
