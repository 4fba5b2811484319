//! Collects every base-table name a query node mentions, recursing through
//! subqueries, joins, and `MERGE`/`DELETE` sources. Mirrors the shape of
//! `sqlcraft_walker`'s pre-order traversal but additionally exposes
//! `FromItem::Table` names, which a plain [`sqlcraft_walker::Observer`] never
//! visits directly.

use smol_str::SmolStr;
use sqlcraft_ast::{FromItem, MergeAction, Query, SelectItem, ValueComponent};

/// `include_with`: whether to recurse into this query's own `WITH` bindings.
/// Pass `false` for a query's main body when the CTE definitions are being
/// tracked as separate graph nodes; pass `true` everywhere else (nested
/// subqueries, CTE bodies) so inline `WITH`s inside them are still followed.
///
/// A table reference bound by an inner `WITH` clause (lowercase-compared,
/// matching the graph's own name keying) is never reported: it resolves to
/// that inner binding, not to a same-named CTE in an enclosing scope.
pub(crate) fn collect(query: &Query, include_with: bool, out: &mut Vec<SmolStr>) {
    let mut shadowed = Vec::new();
    collect_query(query, include_with, &mut shadowed, out);
}

fn push_if_visible(name: &SmolStr, shadowed: &[String], out: &mut Vec<SmolStr>) {
    if !shadowed.iter().any(|s| s == &name.to_ascii_lowercase()) {
        out.push(name.clone());
    }
}

fn collect_query(query: &Query, include_with: bool, shadowed: &mut Vec<String>, out: &mut Vec<SmolStr>) {
    match query {
        Query::SimpleSelect(s) => {
            let bound = if include_with { enter_with(s.with.as_ref(), shadowed, out) } else { 0 };
            for item in &s.select.items {
                if let SelectItem::Expr { expr, .. } = item {
                    collect_value(expr, shadowed, out);
                }
            }
            if let Some(from) = &s.from {
                for item in &from.items {
                    collect_from_item(item, shadowed, out);
                }
            }
            if let Some(w) = &s.where_clause {
                collect_value(w, shadowed, out);
            }
            for g in &s.group_by {
                collect_value(g, shadowed, out);
            }
            if let Some(h) = &s.having {
                collect_value(h, shadowed, out);
            }
            for w in &s.windows {
                for p in &w.spec.partition_by {
                    collect_value(p, shadowed, out);
                }
                for o in &w.spec.order_by {
                    collect_value(&o.expr, shadowed, out);
                }
            }
            for o in &s.order_by {
                collect_value(&o.expr, shadowed, out);
            }
            if let Some(limit) = &s.limit {
                if let Some(l) = &limit.limit {
                    collect_value(l, shadowed, out);
                }
                if let Some(o) = &limit.offset {
                    collect_value(o, shadowed, out);
                }
            }
            leave_with(shadowed, bound);
        }
        Query::BinarySelect(b) => {
            let bound = if include_with { enter_with(b.with.as_ref(), shadowed, out) } else { 0 };
            collect_query(&b.left, true, shadowed, out);
            collect_query(&b.right, true, shadowed, out);
            leave_with(shadowed, bound);
        }
        Query::Values(_) => {}
        Query::Merge(m) => {
            if let Some(last) = m.target.name.last() {
                push_if_visible(last, shadowed, out);
            }
            collect_query(&m.source, true, shadowed, out);
            collect_value(&m.on, shadowed, out);
            for when in &m.whens {
                if let Some(p) = &when.extra_predicate {
                    collect_value(p, shadowed, out);
                }
                match &when.action {
                    MergeAction::Update(sets) => {
                        for (_, v) in sets {
                            collect_value(v, shadowed, out);
                        }
                    }
                    MergeAction::Insert { values, .. } => {
                        for v in values {
                            collect_value(v, shadowed, out);
                        }
                    }
                    MergeAction::Delete | MergeAction::DoNothing => {}
                }
            }
        }
        Query::Delete(d) => {
            if let Some(last) = d.target.name.last() {
                push_if_visible(last, shadowed, out);
            }
            if let Some(using) = &d.using {
                collect_query(using, true, shadowed, out);
            }
            if let Some(w) = &d.where_clause {
                collect_value(w, shadowed, out);
            }
        }
    }
}

/// Pushes `with`'s CTE names onto the shadow stack (if any) and recurses into
/// each CTE body under that shadow, returning how many names to pop in
/// [`leave_with`] once the caller is done with this scope.
fn enter_with(with: Option<&sqlcraft_ast::WithClause>, shadowed: &mut Vec<String>, out: &mut Vec<SmolStr>) -> usize {
    let Some(with) = with else { return 0 };
    let names: Vec<String> = with.ctes.iter().map(|c| c.name.to_ascii_lowercase()).collect();
    let count = names.len();
    shadowed.extend(names);
    for cte in &with.ctes {
        collect_query(&cte.query, true, shadowed, out);
    }
    count
}

fn leave_with(shadowed: &mut Vec<String>, count: usize) {
    shadowed.truncate(shadowed.len() - count);
}

fn collect_from_item(item: &FromItem, shadowed: &mut Vec<String>, out: &mut Vec<SmolStr>) {
    match item {
        FromItem::Table { name, .. } => {
            if let Some(last) = name.last() {
                push_if_visible(last, shadowed, out);
            }
        }
        FromItem::Subquery { query, .. } => collect_query(query, true, shadowed, out),
        FromItem::Join { left, right, on, .. } => {
            collect_from_item(left, shadowed, out);
            collect_from_item(right, shadowed, out);
            if let Some(on) = on {
                collect_value(on, shadowed, out);
            }
        }
    }
}

fn collect_value(value: &ValueComponent, shadowed: &mut Vec<String>, out: &mut Vec<SmolStr>) {
    match value {
        ValueComponent::Literal(_) | ValueComponent::Parameter(_) | ValueComponent::Column(_) | ValueComponent::Wildcard { .. } => {}
        ValueComponent::Subquery { query, .. } => collect_query(query, true, shadowed, out),
        ValueComponent::Binary { left, right, .. } => {
            collect_value(left, shadowed, out);
            collect_value(right, shadowed, out);
        }
        ValueComponent::Unary { operand, .. } => collect_value(operand, shadowed, out),
        ValueComponent::Function { args, over, .. } => {
            for a in args {
                collect_value(a, shadowed, out);
            }
            if let Some(spec) = over {
                for p in &spec.partition_by {
                    collect_value(p, shadowed, out);
                }
                for o in &spec.order_by {
                    collect_value(&o.expr, shadowed, out);
                }
            }
        }
        ValueComponent::Cast { expr, .. } => collect_value(expr, shadowed, out),
        ValueComponent::Case { operand, whens, else_branch, .. } => {
            if let Some(o) = operand {
                collect_value(o, shadowed, out);
            }
            for (w, t) in whens {
                collect_value(w, shadowed, out);
                collect_value(t, shadowed, out);
            }
            if let Some(e) = else_branch {
                collect_value(e, shadowed, out);
            }
        }
        ValueComponent::ValueList { items, .. } | ValueComponent::Array { items, .. } => {
            for i in items {
                collect_value(i, shadowed, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_with_binding_shadows_outer_reference() {
        let query = sqlcraft_parser::parse(
            "with a as (with x as (select 1) select * from x), x as (select 2) select * from a, x",
        )
        .unwrap();
        let sqlcraft_ast::Query::SimpleSelect(s) = &query else { panic!("expected simple select") };
        let with = s.with.as_ref().unwrap();
        let cte_a = with.ctes.iter().find(|c| c.name.as_str() == "a").unwrap();

        let mut mentioned = Vec::new();
        collect(&cte_a.query, true, &mut mentioned);
        assert!(
            !mentioned.iter().any(|n| n.as_str() == "x"),
            "a's own nested x must not leak as a reference to the sibling x"
        );

        let mut main_refs = Vec::new();
        collect(&query, false, &mut main_refs);
        assert!(main_refs.iter().any(|n| n.as_str() == "a"));
        assert!(main_refs.iter().any(|n| n.as_str() == "x"));
    }
}
