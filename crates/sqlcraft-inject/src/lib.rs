//! Finds SELECT nodes that directly expose a set of named columns, and
//! rewrites a query so each one receives an extra `WHERE` conjunct for
//! every requested column it originates — a CTE's SELECT, one branch of a
//! `UNION`, a correlated subquery, wherever the column first comes from.

mod condition;
mod error;

use indexmap::IndexMap;
use smol_str::SmolStr;
use sqlcraft_ast::{
    BinaryOp, ColumnRef, FromItem, ParamRef, ParamStyle, Query, SelectItem, SimpleSelect, Span, Trivia,
    ValueComponent,
};
use sqlcraft_resolve::SchemaResolver;
use sqlcraft_walker::{Observer, Rewriter};

pub use condition::{ColumnCondition, Condition, InjectOptions, ScalarValue};
pub use error::InjectError;

/// Parameter name -> bound value, in first-insertion order.
pub type ParameterMap = IndexMap<SmolStr, ScalarValue>;

/// Every `SimpleSelect` in `query` (including inside CTE bodies, subqueries,
/// and each branch of a `UNION`/`INTERSECT`/`EXCEPT`) that projects every
/// name in `required_columns` under that exact output name.
pub fn find_upstream(
    query: &Query,
    required_columns: &[SmolStr],
    resolver: Option<&dyn SchemaResolver>,
    options: &InjectOptions,
) -> Vec<SimpleSelect> {
    struct Finder<'a> {
        required: &'a [SmolStr],
        resolver: Option<&'a dyn SchemaResolver>,
        options: &'a InjectOptions,
        found: Vec<SimpleSelect>,
    }

    impl Observer for Finder<'_> {
        fn visit_query(&mut self, query: &Query) {
            if let Query::SimpleSelect(select) = query {
                if self.required.iter().all(|c| exposes(select, c, self.resolver, self.options)) {
                    self.found.push((**select).clone());
                }
            }
        }
    }

    let mut finder = Finder { required: required_columns, resolver, options, found: Vec::new() };
    let _ = finder.walk(query);
    finder.found
}

fn exposes(select: &SimpleSelect, column: &str, resolver: Option<&dyn SchemaResolver>, options: &InjectOptions) -> bool {
    for item in &select.select.items {
        match item {
            SelectItem::Expr { .. } => {
                if let Some(name) = item.output_name() {
                    if names_match(name, column, options) {
                        return true;
                    }
                }
            }
            SelectItem::Wildcard { namespaces, .. } => {
                if let Some(resolver) = resolver {
                    if wildcard_exposes(select, namespaces, column, resolver) {
                        return true;
                    }
                }
            }
        }
    }
    false
}

fn wildcard_exposes(select: &SimpleSelect, namespaces: &[SmolStr], column: &str, resolver: &dyn SchemaResolver) -> bool {
    let Some(from) = &select.from else { return false };
    for item in &from.items {
        let FromItem::Table { name, alias, .. } = item else { continue };
        let label = alias.as_deref().or_else(|| name.last().map(SmolStr::as_str));
        let in_scope = namespaces.is_empty() || namespaces.last().zip(label).is_some_and(|(ns, l)| ns.eq_ignore_ascii_case(l));
        if in_scope {
            if let Some(cols) = resolver.columns(name) {
                if cols.iter().any(|c| c.eq_ignore_ascii_case(column)) {
                    return true;
                }
            }
        }
    }
    false
}

fn names_match(a: &str, b: &str, options: &InjectOptions) -> bool {
    if options.ignore_case_and_underscore {
        normalize(a) == normalize(b)
    } else {
        a == b
    }
}

fn normalize(s: &str) -> String {
    s.chars().filter(|c| *c != '_').flat_map(char::to_lowercase).collect()
}

/// The expression a predicate on `column` should actually filter on: the
/// select-item's own expression (so `source_col AS column` filters on
/// `source_col`, before aliasing), or a bare reference to `column` itself
/// when it's only exposed through an unexpanded wildcard.
fn source_expr(select: &SimpleSelect, column: &str, options: &InjectOptions) -> ValueComponent {
    for item in &select.select.items {
        if let SelectItem::Expr { expr, .. } = item {
            if let Some(name) = item.output_name() {
                if names_match(name, column, options) {
                    return expr.clone();
                }
            }
        }
    }
    ValueComponent::Column(ColumnRef::unqualified(column, Span::at(0)))
}

/// Rewrites `query` so every upstream SELECT originating a named column gets
/// an extra `WHERE` conjunct per condition targeting that column, and
/// returns the rewritten query alongside the parameter values those
/// conjuncts reference.
pub fn inject(
    query: &Query,
    conditions: &[Condition],
    resolver: Option<&dyn SchemaResolver>,
    options: &InjectOptions,
) -> Result<(Query, ParameterMap), InjectError> {
    let mut flat = Vec::new();
    flatten(conditions, &[], &mut flat);

    let mut by_column: IndexMap<String, Vec<(ColumnCondition, Vec<usize>)>> = IndexMap::new();
    for (name, cond, path) in flat {
        by_column.entry(name.to_string()).or_default().push((cond, path));
    }

    for name in by_column.keys() {
        let required = [SmolStr::from(name.as_str())];
        if find_upstream(query, &required, resolver, options).is_empty() {
            return Err(InjectError::ColumnNotFound { name: SmolStr::from(name.as_str()) });
        }
    }

    let mut params = ParameterMap::new();
    let rewritten = {
        let mut injector = Injector { by_column: &by_column, options, resolver, params: &mut params };
        injector.walk(query.clone())?
    };
    Ok((rewritten, params))
}

struct Injector<'a> {
    by_column: &'a IndexMap<String, Vec<(ColumnCondition, Vec<usize>)>>,
    options: &'a InjectOptions,
    resolver: Option<&'a dyn SchemaResolver>,
    params: &'a mut ParameterMap,
}

impl Rewriter for Injector<'_> {
    fn rewrite_query(&mut self, query: Query) -> Query {
        let Query::SimpleSelect(mut select) = query else { return query };

        let mut extra = Vec::new();
        for (column, specs) in self.by_column {
            if !exposes(&select, column, self.resolver, self.options) {
                continue;
            }
            let source = source_expr(&select, column, self.options);
            for (cond, path) in specs {
                let (expr, entries) = build_predicate(source.clone(), cond, column, path);
                extra.push(expr);
                for (name, value) in entries {
                    self.params.entry(name).or_insert(value);
                }
            }
        }

        if !extra.is_empty() {
            let combined = fold_and(extra);
            select.where_clause = Some(match select.where_clause.take() {
                Some(existing) => and(existing, combined),
                None => combined,
            });
        }
        Query::SimpleSelect(select)
    }
}

fn flatten(conditions: &[Condition], path: &[usize], out: &mut Vec<(SmolStr, ColumnCondition, Vec<usize>)>) {
    for cond in conditions {
        match cond {
            Condition::Column { name, condition } => out.push((name.clone(), condition.clone(), path.to_vec())),
            Condition::And(inner) => {
                for (j, sub) in inner.iter().enumerate() {
                    let mut child_path = path.to_vec();
                    child_path.push(j);
                    flatten(std::slice::from_ref(sub), &child_path, out);
                }
            }
        }
    }
}

fn param_name(column: &str, suffix: Option<&str>, and_path: &[usize]) -> SmolStr {
    let mut name = column.to_string();
    for idx in and_path {
        name.push_str(&format!("_and_{idx}"));
    }
    if let Some(suffix) = suffix {
        name.push('_');
        name.push_str(suffix);
    }
    SmolStr::from(name)
}

fn param_value(name: SmolStr) -> ValueComponent {
    ValueComponent::Parameter(ParamRef { style: ParamStyle::Named, name, span: Span::at(0), trivia: Trivia::default() })
}

fn binary(op: BinaryOp, left: ValueComponent, right: ValueComponent) -> ValueComponent {
    ValueComponent::Binary { op, left: Box::new(left), right: Box::new(right), span: Span::at(0), trivia: Trivia::default() }
}

fn and(left: ValueComponent, right: ValueComponent) -> ValueComponent {
    binary(BinaryOp::And, left, right)
}

fn fold_and(mut parts: Vec<ValueComponent>) -> ValueComponent {
    let mut parts = parts.drain(..);
    let first = parts.next().expect("build_predicate always yields at least one clause");
    parts.fold(first, and)
}

fn single(
    column_expr: ValueComponent,
    op: BinaryOp,
    column: &str,
    suffix: Option<&str>,
    value: &ScalarValue,
    and_path: &[usize],
) -> (ValueComponent, Vec<(SmolStr, ScalarValue)>) {
    let name = param_name(column, suffix, and_path);
    let expr = binary(op, column_expr, param_value(name.clone()));
    (expr, vec![(name, value.clone())])
}

fn build_predicate(
    column_expr: ValueComponent,
    cond: &ColumnCondition,
    column: &str,
    and_path: &[usize],
) -> (ValueComponent, Vec<(SmolStr, ScalarValue)>) {
    match cond {
        ColumnCondition::Eq(v) => single(column_expr, BinaryOp::Eq, column, None, v, and_path),
        ColumnCondition::NotEq(v) => single(column_expr, BinaryOp::NotEq, column, Some("ne"), v, and_path),
        ColumnCondition::Lt(v) => single(column_expr, BinaryOp::Lt, column, Some("lt"), v, and_path),
        ColumnCondition::Gt(v) => single(column_expr, BinaryOp::Gt, column, Some("gt"), v, and_path),
        ColumnCondition::LtEq(v) => single(column_expr, BinaryOp::LtEq, column, Some("le"), v, and_path),
        ColumnCondition::GtEq(v) => single(column_expr, BinaryOp::GtEq, column, Some("ge"), v, and_path),
        ColumnCondition::Like(v) => single(column_expr, BinaryOp::Like, column, Some("like"), v, and_path),
        ColumnCondition::ILike(v) => single(column_expr, BinaryOp::ILike, column, Some("ilike"), v, and_path),
        ColumnCondition::Range { min, max } => {
            let mut parts = Vec::new();
            let mut params = Vec::new();
            if let Some(v) = min {
                let (e, p) = single(column_expr.clone(), BinaryOp::GtEq, column, Some("min"), v, and_path);
                parts.push(e);
                params.extend(p);
            }
            if let Some(v) = max {
                let (e, p) = single(column_expr.clone(), BinaryOp::LtEq, column, Some("max"), v, and_path);
                parts.push(e);
                params.extend(p);
            }
            (fold_and(parts), params)
        }
        ColumnCondition::In(values) => {
            let mut items = Vec::with_capacity(values.len());
            let mut params = Vec::with_capacity(values.len());
            for (i, v) in values.iter().enumerate() {
                let name = param_name(column, Some(&format!("in_{i}")), and_path);
                items.push(param_value(name.clone()));
                params.push((name, v.clone()));
            }
            let list = ValueComponent::ValueList { items, span: Span::at(0), trivia: Trivia::default() };
            (binary(BinaryOp::In, column_expr, list), params)
        }
        ColumnCondition::Any(values) => {
            let name = param_name(column, Some("any"), and_path);
            let func = ValueComponent::Function {
                name: "any".into(),
                args: vec![param_value(name.clone())],
                distinct: false,
                over: None,
                span: Span::at(0),
                trivia: Trivia::default(),
            };
            let expr = binary(BinaryOp::Eq, column_expr, func);
            (expr, vec![(name, ScalarValue::Array(values.clone()))])
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sqlcraft_printer::PrinterOptions;

    use super::*;

    #[test]
    fn finds_select_projecting_all_required_columns() {
        let query = sqlcraft_parser::parse("SELECT article_id, article_name, price FROM article AS a").unwrap();
        let required = [SmolStr::from("price"), SmolStr::from("article_name")];
        let found = find_upstream(&query, &required, None, &InjectOptions::default());
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn skips_select_missing_a_required_column() {
        let query = sqlcraft_parser::parse("SELECT article_id FROM article").unwrap();
        let required = [SmolStr::from("price")];
        let found = find_upstream(&query, &required, None, &InjectOptions::default());
        assert!(found.is_empty());
    }

    #[test]
    fn range_and_like_injection_matches_expected_shape() {
        let query =
            sqlcraft_parser::parse("SELECT a.article_id, a.article_name, a.price FROM article AS a").unwrap();
        let conditions = vec![
            Condition::Column {
                name: "price".into(),
                condition: ColumnCondition::Range {
                    min: Some(ScalarValue::Int(10)),
                    max: Some(ScalarValue::Int(100)),
                },
            },
            Condition::Column {
                name: "article_name".into(),
                condition: ColumnCondition::Like(ScalarValue::Text("%super%".to_string())),
            },
        ];
        let (rewritten, params) = inject(&query, &conditions, None, &InjectOptions::default()).unwrap();

        assert_eq!(params.get("price_min"), Some(&ScalarValue::Int(10)));
        assert_eq!(params.get("price_max"), Some(&ScalarValue::Int(100)));
        assert_eq!(params.get("article_name_like"), Some(&ScalarValue::Text("%super%".to_string())));

        let printed = sqlcraft_printer::format(&rewritten, &PrinterOptions::generic()).unwrap();
        assert_eq!(
            printed.text,
            "select a.article_id, a.article_name, a.price\n\
             from article as a\n\
             where a.price >= :price_min and a.price <= :price_max and a.article_name like :article_name_like"
        );
    }

    #[test]
    fn injection_across_union_branches_uses_each_branchs_own_alias() {
        let query = sqlcraft_parser::parse(
            "SELECT id, fee AS amount FROM charges UNION ALL SELECT id, amount FROM refunds",
        )
        .unwrap();
        let conditions = vec![Condition::eq("amount", ScalarValue::Int(5))];
        let (rewritten, params) = inject(&query, &conditions, None, &InjectOptions::default()).unwrap();
        assert_eq!(params.get("amount"), Some(&ScalarValue::Int(5)));

        let printed = sqlcraft_printer::format(&rewritten, &PrinterOptions::generic()).unwrap();
        assert!(printed.text.contains("where fee = :amount"));
        assert!(printed.text.contains("where amount = :amount"));
    }

    #[test]
    fn missing_column_errors() {
        let query = sqlcraft_parser::parse("SELECT id FROM t").unwrap();
        let conditions = vec![Condition::eq("nope", ScalarValue::Int(1))];
        let err = inject(&query, &conditions, None, &InjectOptions::default()).unwrap_err();
        assert_eq!(err, InjectError::ColumnNotFound { name: "nope".into() });
    }

    #[test]
    fn in_condition_binds_one_parameter_per_element() {
        let query = sqlcraft_parser::parse("SELECT id FROM t").unwrap();
        let conditions = vec![Condition::Column {
            name: "id".into(),
            condition: ColumnCondition::In(vec![ScalarValue::Int(1), ScalarValue::Int(2), ScalarValue::Int(3)]),
        }];
        let (_, params) = inject(&query, &conditions, None, &InjectOptions::default()).unwrap();
        assert_eq!(params.get("id_in_0"), Some(&ScalarValue::Int(1)));
        assert_eq!(params.get("id_in_1"), Some(&ScalarValue::Int(2)));
        assert_eq!(params.get("id_in_2"), Some(&ScalarValue::Int(3)));
    }

    #[test]
    fn and_group_suffixes_parameter_names_by_position() {
        let query = sqlcraft_parser::parse("SELECT id FROM t").unwrap();
        let conditions = vec![Condition::And(vec![
            Condition::eq("id", ScalarValue::Int(1)),
            Condition::eq("id", ScalarValue::Int(2)),
        ])];
        let (_, params) = inject(&query, &conditions, None, &InjectOptions::default()).unwrap();
        assert_eq!(params.get("id_and_0"), Some(&ScalarValue::Int(1)));
        assert_eq!(params.get("id_and_1"), Some(&ScalarValue::Int(2)));
    }

    #[test]
    fn ignore_case_and_underscore_matches_across_naming_styles() {
        let query = sqlcraft_parser::parse("SELECT article_name AS ArticleName FROM t").unwrap();
        let options = InjectOptions { ignore_case_and_underscore: true };
        let conditions = vec![Condition::eq("articlename", ScalarValue::Text("x".to_string()))];
        let (rewritten, _) = inject(&query, &conditions, None, &options).unwrap();
        let printed = sqlcraft_printer::format(&rewritten, &PrinterOptions::generic()).unwrap();
        assert!(printed.text.contains("where article_name = :articlename"));
    }
}
