//! Top-level facade over the pipeline: `parse`/`format`, plus the two
//! SELECT-to-statement builders (`to_delete`, `to_merge`) that turn a
//! projection into an executable `DELETE`/`MERGE` against a target table.

mod error;

use smol_str::SmolStr;
use sqlcraft_ast::{
    ColumnRef, DeleteQuery, Literal, LiteralKind, MergeAction, MergeMatchClass, MergeQuery, MergeWhen, Query,
    SelectClause, SelectItem, Span, TableRef, Trivia, ValueComponent,
};
use sqlcraft_printer::{Printed, PrinterOptions};
use sqlcraft_resolve::SelectableColumnCollector;

pub use error::{BuildError, SqlCraftError, StateError, StateErrorKind};

pub fn parse(text: &str) -> Result<Query, SqlCraftError> {
    Ok(sqlcraft_parser::parse(text)?)
}

pub fn format(query: &Query, options: &PrinterOptions) -> Result<Printed, SqlCraftError> {
    Ok(sqlcraft_printer::format(query, options)?)
}

#[derive(Debug, Clone)]
pub struct DeleteOptions {
    pub target: TableRef,
    pub primary_keys: Vec<SmolStr>,
    pub columns: Option<Vec<SmolStr>>,
    pub source_alias: Option<SmolStr>,
}

impl DeleteOptions {
    pub fn new(target: TableRef, primary_keys: Vec<SmolStr>) -> Self {
        DeleteOptions { target, primary_keys, columns: None, source_alias: None }
    }
}

/// Wraps `select` as the `USING` clause of a `DELETE FROM target`, joining
/// target to source on primary-key equality plus any extra `columns`. Any
/// `WITH` the select carries travels with it into the `USING` subquery —
/// `DeleteQuery` has no statement-level `WITH` slot of its own to hoist into.
pub fn to_delete(select: Query, options: &DeleteOptions) -> Query {
    let keys = dedup_case_insensitive(&options.primary_keys);
    let mut conjuncts: Vec<ValueComponent> =
        keys.iter().map(|k| column_eq(&options.target, k, options.source_alias.as_deref(), k)).collect();
    if let Some(extra) = &options.columns {
        conjuncts.extend(extra.iter().map(|c| column_eq(&options.target, c, options.source_alias.as_deref(), c)));
    }
    let where_clause = fold_and(conjuncts);
    let span = select.span();
    Query::Delete(Box::new(DeleteQuery {
        target: options.target.clone(),
        using: Some(Box::new(select)),
        where_clause,
        span,
        trivia: Trivia::default(),
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedActionKind {
    Update,
    Delete,
    DoNothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotMatchedActionKind {
    Insert,
    DoNothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotMatchedBySourceActionKind {
    Update,
    Delete,
    DoNothing,
}

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub target: TableRef,
    pub primary_keys: Vec<SmolStr>,
    /// Defaults to [`MatchedActionKind::Update`] when `None`.
    pub matched_action: Option<MatchedActionKind>,
    /// Defaults to [`NotMatchedActionKind::Insert`] when `None`.
    pub not_matched_action: Option<NotMatchedActionKind>,
    /// No `WHEN NOT MATCHED BY SOURCE` clause is emitted when `None`.
    pub not_matched_by_source_action: Option<NotMatchedBySourceActionKind>,
    pub update_columns: Option<Vec<SmolStr>>,
    pub insert_columns: Option<Vec<SmolStr>>,
    pub source_alias: Option<SmolStr>,
}

impl MergeOptions {
    pub fn new(target: TableRef, primary_keys: Vec<SmolStr>) -> Self {
        MergeOptions {
            target,
            primary_keys,
            matched_action: None,
            not_matched_action: None,
            not_matched_by_source_action: None,
            update_columns: None,
            insert_columns: None,
            source_alias: None,
        }
    }
}

/// Builds a `MERGE` that joins `target` to `select` on primary-key equality
/// and derives its `WHEN` actions from `select`'s own projected columns.
/// `update_columns`/`insert_columns`, when given, must each be a subset of
/// that projection.
pub fn to_merge(select: Query, options: &MergeOptions) -> Result<Query, SqlCraftError> {
    let projected = SelectableColumnCollector::collect(&select);
    let keys = dedup_case_insensitive(&options.primary_keys);

    let insert_cols = resolve_columns(options.insert_columns.as_deref(), &projected, |_| true)?;
    let update_cols = resolve_columns(options.update_columns.as_deref(), &projected, |c| {
        !keys.iter().any(|k| k.eq_ignore_ascii_case(c))
    })?;

    let on = fold_and(keys.iter().map(|k| column_eq(&options.target, k, options.source_alias.as_deref(), k)).collect())
        .unwrap_or_else(|| bool_literal(true));

    let span = select.span();
    let mut whens = Vec::new();

    match options.matched_action.unwrap_or(MatchedActionKind::Update) {
        MatchedActionKind::Update if !update_cols.is_empty() => whens.push(MergeWhen {
            match_class: MergeMatchClass::Matched,
            extra_predicate: None,
            action: MergeAction::Update(source_assignments(&update_cols, options.source_alias.as_deref())),
            span,
        }),
        MatchedActionKind::Update => {}
        MatchedActionKind::Delete => {
            whens.push(MergeWhen { match_class: MergeMatchClass::Matched, extra_predicate: None, action: MergeAction::Delete, span })
        }
        MatchedActionKind::DoNothing => whens.push(MergeWhen {
            match_class: MergeMatchClass::Matched,
            extra_predicate: None,
            action: MergeAction::DoNothing,
            span,
        }),
    }

    match options.not_matched_action.unwrap_or(NotMatchedActionKind::Insert) {
        NotMatchedActionKind::Insert => whens.push(MergeWhen {
            match_class: MergeMatchClass::NotMatched,
            extra_predicate: None,
            action: MergeAction::Insert {
                columns: insert_cols.clone(),
                values: insert_cols.iter().map(|c| source_column(c, options.source_alias.as_deref())).collect(),
            },
            span,
        }),
        NotMatchedActionKind::DoNothing => whens.push(MergeWhen {
            match_class: MergeMatchClass::NotMatched,
            extra_predicate: None,
            action: MergeAction::DoNothing,
            span,
        }),
    }

    if let Some(kind) = options.not_matched_by_source_action {
        let action = match kind {
            // No source row exists to read from; cleared rather than left stale.
            NotMatchedBySourceActionKind::Update => {
                MergeAction::Update(update_cols.iter().map(|c| (c.clone(), null_literal())).collect())
            }
            NotMatchedBySourceActionKind::Delete => MergeAction::Delete,
            NotMatchedBySourceActionKind::DoNothing => MergeAction::DoNothing,
        };
        whens.push(MergeWhen { match_class: MergeMatchClass::NotMatchedBySource, extra_predicate: None, action, span });
    }

    Ok(Query::Merge(Box::new(MergeQuery {
        target: options.target.clone(),
        source: Box::new(select),
        source_alias: options.source_alias.clone(),
        on,
        whens,
        span,
        trivia: Trivia::default(),
    })))
}

/// The `select count(*) as "count" from (...) as "__merge_action_rows"` shape
/// used to report how many rows a `MERGE` touched: one `select 1` per
/// non-`DoNothing` `WHEN`, unioned and counted.
pub fn merge_result_count_select(merge: &MergeQuery) -> Result<Query, SqlCraftError> {
    let branches: Vec<Query> = merge
        .whens
        .iter()
        .filter(|w| !matches!(w.action, MergeAction::DoNothing))
        .map(|_| select_one())
        .collect();
    if branches.is_empty() {
        return Err(sqlcraft_printer::FormatError::EmptySelect.into());
    }
    let mut branches = branches.into_iter();
    let unioned = branches.fold(None, |acc, next| {
        Some(match acc {
            None => next,
            Some(left) => sqlcraft_ast::Query::BinarySelect(Box::new(sqlcraft_ast::BinarySelect {
                with: None,
                left: Box::new(left),
                op: sqlcraft_ast::SetOperator { kind: sqlcraft_ast::SetOperatorKind::Union, all: true },
                right: Box::new(next),
                span: Span::at(0),
                trivia: Trivia::default(),
            })),
        })
    });
    let unioned = unioned.expect("at least one branch checked above");

    Ok(Query::SimpleSelect(Box::new(sqlcraft_ast::SimpleSelect {
        with: None,
        select: SelectClause {
            items: vec![SelectItem::Expr {
                expr: ValueComponent::Function {
                    name: "count".into(),
                    args: vec![ValueComponent::Wildcard { namespaces: vec![], span: Span::at(0), trivia: Trivia::default() }],
                    distinct: false,
                    over: None,
                    span: Span::at(0),
                    trivia: Trivia::default(),
                },
                alias: Some("count".into()),
                span: Span::at(0),
            }],
            distinct: false,
        },
        from: Some(sqlcraft_ast::FromClause {
            items: vec![sqlcraft_ast::FromItem::Subquery {
                query: Box::new(unioned),
                alias: Some("__merge_action_rows".into()),
                span: Span::at(0),
            }],
        }),
        where_clause: None,
        group_by: vec![],
        having: None,
        windows: vec![],
        order_by: vec![],
        limit: None,
        span: Span::at(0),
        trivia: Trivia::default(),
    })))
}

fn select_one() -> Query {
    Query::SimpleSelect(Box::new(sqlcraft_ast::SimpleSelect {
        with: None,
        select: SelectClause {
            items: vec![SelectItem::Expr { expr: int_literal(1), alias: None, span: Span::at(0) }],
            distinct: false,
        },
        from: None,
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

fn resolve_columns(
    requested: Option<&[SmolStr]>,
    projected: &[SmolStr],
    default_filter: impl Fn(&SmolStr) -> bool,
) -> Result<Vec<SmolStr>, SqlCraftError> {
    match requested {
        Some(cols) => {
            let missing: Vec<SmolStr> =
                cols.iter().filter(|c| !projected.iter().any(|p| p.eq_ignore_ascii_case(c))).cloned().collect();
            if !missing.is_empty() {
                return Err(BuildError::ColumnsNotFound { missing }.into());
            }
            Ok(cols.to_vec())
        }
        None => Ok(projected.iter().filter(|c| default_filter(c)).cloned().collect()),
    }
}

fn dedup_case_insensitive(names: &[SmolStr]) -> Vec<SmolStr> {
    let mut out: Vec<SmolStr> = Vec::with_capacity(names.len());
    for name in names {
        if !out.iter().any(|seen: &SmolStr| seen.eq_ignore_ascii_case(name)) {
            out.push(name.clone());
        }
    }
    out
}

fn source_assignments(columns: &[SmolStr], source_alias: Option<&str>) -> Vec<(SmolStr, ValueComponent)> {
    columns.iter().map(|c| (c.clone(), source_column(c, source_alias))).collect()
}

fn source_column(name: &str, source_alias: Option<&str>) -> ValueComponent {
    qualified_column(source_alias, name)
}

fn column_eq(target: &TableRef, target_col: &str, source_alias: Option<&str>, source_col: &str) -> ValueComponent {
    binary_eq(qualified_column(Some(target.effective_alias()), target_col), qualified_column(source_alias, source_col))
}

fn qualified_column(namespace: Option<&str>, name: &str) -> ValueComponent {
    let namespaces = namespace.map(|n| vec![SmolStr::from(n)]).unwrap_or_default();
    ValueComponent::Column(ColumnRef { namespaces, column: name.into(), span: Span::at(0), trivia: Trivia::default() })
}

fn binary_eq(left: ValueComponent, right: ValueComponent) -> ValueComponent {
    ValueComponent::Binary {
        op: sqlcraft_ast::BinaryOp::Eq,
        left: Box::new(left),
        right: Box::new(right),
        span: Span::at(0),
        trivia: Trivia::default(),
    }
}

fn fold_and(mut parts: Vec<ValueComponent>) -> Option<ValueComponent> {
    let mut parts = parts.drain(..);
    let first = parts.next()?;
    Some(parts.fold(first, |acc, next| ValueComponent::Binary {
        op: sqlcraft_ast::BinaryOp::And,
        left: Box::new(acc),
        right: Box::new(next),
        span: Span::at(0),
        trivia: Trivia::default(),
    }))
}

fn int_literal(n: i64) -> ValueComponent {
    ValueComponent::Literal(Literal { kind: LiteralKind::Number, raw: n.to_string().into(), span: Span::at(0), trivia: Trivia::default() })
}

fn null_literal() -> ValueComponent {
    ValueComponent::Literal(Literal { kind: LiteralKind::Null, raw: "null".into(), span: Span::at(0), trivia: Trivia::default() })
}

fn bool_literal(b: bool) -> ValueComponent {
    ValueComponent::Literal(Literal {
        kind: LiteralKind::Boolean,
        raw: if b { "true" } else { "false" }.into(),
        span: Span::at(0),
        trivia: Trivia::default(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn table(name: &str, alias: Option<&str>) -> TableRef {
        TableRef { name: vec![name.into()], alias: alias.map(SmolStr::from), span: Span::at(0) }
    }

    #[test]
    fn round_trips_through_parse_and_format() {
        let query = parse("select id from t").unwrap();
        let printed = format(&query, &PrinterOptions::generic()).unwrap();
        assert_eq!(printed.text, "select id\nfrom t");
    }

    #[test]
    fn to_delete_joins_on_deduped_primary_keys() {
        let select = parse("select a.id, a.id, a.region from staging as a").unwrap();
        let options = DeleteOptions {
            target: table("accounts", Some("t")),
            primary_keys: vec!["id".into(), "id".into()],
            columns: Some(vec!["region".into()]),
            source_alias: Some("a".into()),
        };
        let deleted = to_delete(select, &options);
        let printed = format(&deleted, &PrinterOptions::generic()).unwrap();
        assert!(printed.text.contains("delete from accounts as t"));
        assert!(printed.text.contains("where t.id = a.id and t.region = a.region"));
        assert!(!printed.text.contains("t.id = a.id and t.id = a.id"));
    }

    #[test]
    fn to_merge_defaults_update_and_insert() {
        let select = parse("select id, name, region from staging").unwrap();
        let options = MergeOptions::new(table("accounts", None), vec!["id".into()]);
        let merged = to_merge(select, &options).unwrap();
        let printed = format(&merged, &PrinterOptions::generic()).unwrap();
        assert!(printed.text.contains("when matched then"));
        assert!(printed.text.contains("update set name = name, region = region"));
        assert!(printed.text.contains("when not matched then"));
        assert!(printed.text.contains("insert (id, name, region) values (id, name, region)"));
    }

    #[test]
    fn to_merge_rejects_update_columns_outside_projection() {
        let select = parse("select id, name from staging").unwrap();
        let mut options = MergeOptions::new(table("accounts", None), vec!["id".into()]);
        options.update_columns = Some(vec!["missing_col".into()]);
        let err = to_merge(select, &options).unwrap_err();
        assert_eq!(err, SqlCraftError::Build(BuildError::ColumnsNotFound { missing: vec!["missing_col".into()] }));
    }

    #[test]
    fn merge_result_count_select_unions_one_branch_per_action() {
        let select = parse("select id, name from staging").unwrap();
        let mut options = MergeOptions::new(table("accounts", None), vec!["id".into()]);
        options.not_matched_by_source_action = Some(NotMatchedBySourceActionKind::Delete);
        let merged = to_merge(select, &options).unwrap();
        let Query::Merge(merge) = &merged else { panic!("expected merge") };
        let counted = merge_result_count_select(merge).unwrap();
        let printed = format(&counted, &PrinterOptions::generic()).unwrap();
        assert_eq!(
            printed.text,
            "select count(*) as count\nfrom (\n    select 1\n    union all\n    select 1\n    union all\n    select 1\n) as __merge_action_rows"
        );
    }
}
