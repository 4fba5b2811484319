use sqlcraft_ast::{
    CteDefinition, FromItem, MergeAction, Query, SelectItem, ValueComponent, WindowSpec, WithClause,
};

use crate::{enter_path, WalkError};

/// Tree-rebuilding visitor: returns a (possibly new) node to replace the one
/// visited, post-order (children are rewritten before the parent callback runs).
pub trait Rewriter {
    fn rewrite_query(&mut self, query: Query) -> Query {
        query
    }
    fn rewrite_value(&mut self, value: ValueComponent) -> ValueComponent {
        value
    }

    fn walk(&mut self, query: Query) -> Result<Query, WalkError>
    where
        Self: Sized,
    {
        let mut path = Vec::new();
        rewrite_query(self, query, &mut path)
    }
}

pub fn rewrite_query<R: Rewriter + ?Sized>(
    rew: &mut R,
    query: Query,
    path: &mut Vec<String>,
) -> Result<Query, WalkError> {
    enter_path(path, "query")?;

    let query = match query {
        Query::SimpleSelect(mut select) => {
            if let Some(with) = select.with.take() {
                let mut ctes = Vec::with_capacity(with.ctes.len());
                for cte in with.ctes {
                    let query = rewrite_query(rew, *cte.query, path)?;
                    ctes.push(CteDefinition { query: Box::new(query), ..cte });
                }
                select.with = Some(WithClause { recursive: with.recursive, ctes });
            }
            let mut items = Vec::with_capacity(select.select.items.len());
            for item in select.select.items {
                items.push(match item {
                    SelectItem::Expr { expr, alias, span } => {
                        SelectItem::Expr { expr: rewrite_value(rew, expr, path)?, alias, span }
                    }
                    wildcard => wildcard,
                });
            }
            select.select.items = items;
            if let Some(mut from) = select.from.take() {
                let mut items = Vec::with_capacity(from.items.len());
                for item in from.items {
                    items.push(rewrite_from_item(rew, item, path)?);
                }
                from.items = items;
                select.from = Some(from);
            }
            if let Some(w) = select.where_clause.take() {
                select.where_clause = Some(rewrite_value(rew, w, path)?);
            }
            let mut group_by = Vec::with_capacity(select.group_by.len());
            for g in select.group_by {
                group_by.push(rewrite_value(rew, g, path)?);
            }
            select.group_by = group_by;
            if let Some(h) = select.having.take() {
                select.having = Some(rewrite_value(rew, h, path)?);
            }
            let mut windows = Vec::with_capacity(select.windows.len());
            for window in select.windows {
                windows.push(sqlcraft_ast::NamedWindow {
                    name: window.name,
                    spec: rewrite_window(rew, window.spec, path)?,
                });
            }
            select.windows = windows;
            let mut order_by = Vec::with_capacity(select.order_by.len());
            for order in select.order_by {
                order_by.push(sqlcraft_ast::OrderItem {
                    expr: rewrite_value(rew, order.expr, path)?,
                    ..order
                });
            }
            select.order_by = order_by;
            if let Some(mut limit) = select.limit.take() {
                if let Some(l) = limit.limit.take() {
                    limit.limit = Some(rewrite_value(rew, l, path)?);
                }
                if let Some(o) = limit.offset.take() {
                    limit.offset = Some(rewrite_value(rew, o, path)?);
                }
                select.limit = Some(limit);
            }
            Query::SimpleSelect(select)
        }
        Query::BinarySelect(mut binary) => {
            if let Some(with) = binary.with.take() {
                let mut ctes = Vec::with_capacity(with.ctes.len());
                for cte in with.ctes {
                    let query = rewrite_query(rew, *cte.query, path)?;
                    ctes.push(CteDefinition { query: Box::new(query), ..cte });
                }
                binary.with = Some(WithClause { recursive: with.recursive, ctes });
            }
            let left = rewrite_query(rew, *binary.left, path)?;
            let right = rewrite_query(rew, *binary.right, path)?;
            binary.left = Box::new(left);
            binary.right = Box::new(right);
            Query::BinarySelect(binary)
        }
        Query::Values(mut values) => {
            let mut rows = Vec::with_capacity(values.rows.len());
            for row in values.rows {
                let mut new_row = Vec::with_capacity(row.len());
                for value in row {
                    new_row.push(rewrite_value(rew, value, path)?);
                }
                rows.push(new_row);
            }
            values.rows = rows;
            Query::Values(values)
        }
        Query::Merge(mut merge) => {
            merge.source = Box::new(rewrite_query(rew, *merge.source, path)?);
            merge.on = rewrite_value(rew, merge.on, path)?;
            let mut whens = Vec::with_capacity(merge.whens.len());
            for mut when in merge.whens {
                if let Some(pred) = when.extra_predicate.take() {
                    when.extra_predicate = Some(rewrite_value(rew, pred, path)?);
                }
                when.action = match when.action {
                    MergeAction::Update(sets) => {
                        let mut new_sets = Vec::with_capacity(sets.len());
                        for (col, v) in sets {
                            new_sets.push((col, rewrite_value(rew, v, path)?));
                        }
                        MergeAction::Update(new_sets)
                    }
                    MergeAction::Insert { columns, values } => {
                        let mut new_values = Vec::with_capacity(values.len());
                        for v in values {
                            new_values.push(rewrite_value(rew, v, path)?);
                        }
                        MergeAction::Insert { columns, values: new_values }
                    }
                    other => other,
                };
                whens.push(when);
            }
            merge.whens = whens;
            Query::Merge(merge)
        }
        Query::Delete(mut delete) => {
            if let Some(using) = delete.using.take() {
                delete.using = Some(Box::new(rewrite_query(rew, *using, path)?));
            }
            if let Some(w) = delete.where_clause.take() {
                delete.where_clause = Some(rewrite_value(rew, w, path)?);
            }
            Query::Delete(delete)
        }
    };

    path.pop();
    Ok(rew.rewrite_query(query))
}

fn rewrite_from_item<R: Rewriter + ?Sized>(
    rew: &mut R,
    item: FromItem,
    path: &mut Vec<String>,
) -> Result<FromItem, WalkError> {
    Ok(match item {
        FromItem::Table { .. } => item,
        FromItem::Subquery { query, alias, span } => {
            FromItem::Subquery { query: Box::new(rewrite_query(rew, *query, path)?), alias, span }
        }
        FromItem::Join { left, right, join_type, on, using, span } => FromItem::Join {
            left: Box::new(rewrite_from_item(rew, *left, path)?),
            right: Box::new(rewrite_from_item(rew, *right, path)?),
            join_type,
            on: match on {
                Some(o) => Some(rewrite_value(rew, o, path)?),
                None => None,
            },
            using,
            span,
        },
    })
}

fn rewrite_window<R: Rewriter + ?Sized>(
    rew: &mut R,
    mut spec: WindowSpec,
    path: &mut Vec<String>,
) -> Result<WindowSpec, WalkError> {
    let mut partition_by = Vec::with_capacity(spec.partition_by.len());
    for p in spec.partition_by {
        partition_by.push(rewrite_value(rew, p, path)?);
    }
    spec.partition_by = partition_by;
    let mut order_by = Vec::with_capacity(spec.order_by.len());
    for o in spec.order_by {
        order_by.push(sqlcraft_ast::OrderItem { expr: rewrite_value(rew, o.expr, path)?, ..o });
    }
    spec.order_by = order_by;
    Ok(spec)
}

pub fn rewrite_value<R: Rewriter + ?Sized>(
    rew: &mut R,
    value: ValueComponent,
    path: &mut Vec<String>,
) -> Result<ValueComponent, WalkError> {
    enter_path(path, "value")?;

    let value = match value {
        ValueComponent::Literal(_) | ValueComponent::Parameter(_) | ValueComponent::Column(_) => value,
        ValueComponent::Wildcard { .. } => value,
        ValueComponent::Binary { op, left, right, span, trivia } => ValueComponent::Binary {
            op,
            left: Box::new(rewrite_value(rew, *left, path)?),
            right: Box::new(rewrite_value(rew, *right, path)?),
            span,
            trivia,
        },
        ValueComponent::Unary { op, operand, span, trivia } => {
            ValueComponent::Unary { op, operand: Box::new(rewrite_value(rew, *operand, path)?), span, trivia }
        }
        ValueComponent::Function { name, args, distinct, over, span, trivia } => {
            let mut new_args = Vec::with_capacity(args.len());
            for a in args {
                new_args.push(rewrite_value(rew, a, path)?);
            }
            let over = match over {
                Some(spec) => Some(rewrite_window(rew, spec, path)?),
                None => None,
            };
            ValueComponent::Function { name, args: new_args, distinct, over, span, trivia }
        }
        ValueComponent::Cast { expr, type_name, span, trivia } => {
            ValueComponent::Cast { expr: Box::new(rewrite_value(rew, *expr, path)?), type_name, span, trivia }
        }
        ValueComponent::Case { operand, whens, else_branch, span, trivia } => {
            let operand = match operand {
                Some(o) => Some(Box::new(rewrite_value(rew, *o, path)?)),
                None => None,
            };
            let mut new_whens = Vec::with_capacity(whens.len());
            for (w, t) in whens {
                new_whens.push((rewrite_value(rew, w, path)?, rewrite_value(rew, t, path)?));
            }
            let else_branch = match else_branch {
                Some(e) => Some(Box::new(rewrite_value(rew, *e, path)?)),
                None => None,
            };
            ValueComponent::Case { operand, whens: new_whens, else_branch, span, trivia }
        }
        ValueComponent::Subquery { query, span, trivia } => {
            ValueComponent::Subquery { query: Box::new(rewrite_query(rew, *query, path)?), span, trivia }
        }
        ValueComponent::ValueList { items, span, trivia } => {
            let mut new_items = Vec::with_capacity(items.len());
            for i in items {
                new_items.push(rewrite_value(rew, i, path)?);
            }
            ValueComponent::ValueList { items: new_items, span, trivia }
        }
        ValueComponent::Array { items, span, trivia } => {
            let mut new_items = Vec::with_capacity(items.len());
            for i in items {
                new_items.push(rewrite_value(rew, i, path)?);
            }
            ValueComponent::Array { items: new_items, span, trivia }
        }
    };

    path.pop();
    Ok(rew.rewrite_value(value))
}

#[cfg(test)]
mod tests {
    use sqlcraft_ast::*;
    use sqlcraft_lexer::Span;

    use super::*;

    struct UpperLiterals;
    impl Rewriter for UpperLiterals {
        fn rewrite_value(&mut self, value: ValueComponent) -> ValueComponent {
            match value {
                ValueComponent::Literal(mut lit) if lit.kind == LiteralKind::String => {
                    lit.raw = lit.raw.to_uppercase().into();
                    ValueComponent::Literal(lit)
                }
                other => other,
            }
        }
    }

    #[test]
    fn rewrites_nested_literal() {
        let query = Query::SimpleSelect(Box::new(SimpleSelect {
            with: None,
            select: SelectClause {
                items: vec![SelectItem::Expr {
                    expr: ValueComponent::Literal(Literal {
                        kind: LiteralKind::String,
                        raw: "'abc'".into(),
                        span: Span::at(0),
                        trivia: Trivia::default(),
                    }),
                    alias: None,
                    span: Span::at(0),
                }],
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
        }));

        let rewritten = UpperLiterals.walk(query).unwrap();
        let Query::SimpleSelect(s) = rewritten else { unreachable!() };
        let SelectItem::Expr { expr, .. } = &s.select.items[0] else { unreachable!() };
        assert_eq!(expr, &ValueComponent::Literal(Literal {
            kind: LiteralKind::String,
            raw: "'ABC'".into(),
            span: Span::at(0),
            trivia: Trivia::default(),
        }));
    }
}
