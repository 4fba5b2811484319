use sqlcraft_ast::{FromItem, MergeAction, Query, SelectItem, ValueComponent};

use crate::{enter_path, WalkError};

/// Read-only visitor: accumulates results into `self` without altering the tree.
pub trait Observer {
    fn visit_query(&mut self, _query: &Query) {}
    fn visit_value(&mut self, _value: &ValueComponent) {}

    fn walk(&mut self, query: &Query) -> Result<(), WalkError>
    where
        Self: Sized,
    {
        let mut path = Vec::new();
        observe_query(self, query, &mut path)
    }
}

fn query_label(query: &Query) -> &'static str {
    match query {
        Query::SimpleSelect(_) => "select",
        Query::BinarySelect(_) => "binary_select",
        Query::Values(_) => "values",
        Query::Merge(_) => "merge",
        Query::Delete(_) => "delete",
    }
}

fn value_label(value: &ValueComponent) -> &'static str {
    match value {
        ValueComponent::Literal(_) => "literal",
        ValueComponent::Parameter(_) => "parameter",
        ValueComponent::Column(_) => "column",
        ValueComponent::Wildcard { .. } => "wildcard",
        ValueComponent::Binary { .. } => "binary",
        ValueComponent::Unary { .. } => "unary",
        ValueComponent::Function { .. } => "function",
        ValueComponent::Cast { .. } => "cast",
        ValueComponent::Case { .. } => "case",
        ValueComponent::Subquery { .. } => "subquery",
        ValueComponent::ValueList { .. } => "value_list",
        ValueComponent::Array { .. } => "array",
    }
}

pub fn observe_query<O: Observer + ?Sized>(
    obs: &mut O,
    query: &Query,
    path: &mut Vec<String>,
) -> Result<(), WalkError> {
    enter_path(path, query_label(query))?;
    obs.visit_query(query);

    match query {
        Query::SimpleSelect(select) => {
            if let Some(with) = &select.with {
                for cte in &with.ctes {
                    observe_query(obs, &cte.query, path)?;
                }
            }
            for item in &select.select.items {
                if let SelectItem::Expr { expr, .. } = item {
                    observe_value(obs, expr, path)?;
                }
            }
            if let Some(from) = &select.from {
                for item in &from.items {
                    observe_from_item(obs, item, path)?;
                }
            }
            if let Some(w) = &select.where_clause {
                observe_value(obs, w, path)?;
            }
            for g in &select.group_by {
                observe_value(obs, g, path)?;
            }
            if let Some(h) = &select.having {
                observe_value(obs, h, path)?;
            }
            for window in &select.windows {
                observe_window(obs, &window.spec, path)?;
            }
            for order in &select.order_by {
                observe_value(obs, &order.expr, path)?;
            }
            if let Some(limit) = &select.limit {
                if let Some(l) = &limit.limit {
                    observe_value(obs, l, path)?;
                }
                if let Some(o) = &limit.offset {
                    observe_value(obs, o, path)?;
                }
            }
        }
        Query::BinarySelect(binary) => {
            if let Some(with) = &binary.with {
                for cte in &with.ctes {
                    observe_query(obs, &cte.query, path)?;
                }
            }
            observe_query(obs, &binary.left, path)?;
            observe_query(obs, &binary.right, path)?;
        }
        Query::Values(values) => {
            for row in &values.rows {
                for value in row {
                    observe_value(obs, value, path)?;
                }
            }
        }
        Query::Merge(merge) => {
            observe_query(obs, &merge.source, path)?;
            observe_value(obs, &merge.on, path)?;
            for when in &merge.whens {
                if let Some(pred) = &when.extra_predicate {
                    observe_value(obs, pred, path)?;
                }
                match &when.action {
                    MergeAction::Update(sets) => {
                        for (_, v) in sets {
                            observe_value(obs, v, path)?;
                        }
                    }
                    MergeAction::Insert { values, .. } => {
                        for v in values {
                            observe_value(obs, v, path)?;
                        }
                    }
                    MergeAction::Delete | MergeAction::DoNothing => {}
                }
            }
        }
        Query::Delete(delete) => {
            if let Some(using) = &delete.using {
                observe_query(obs, using, path)?;
            }
            if let Some(w) = &delete.where_clause {
                observe_value(obs, w, path)?;
            }
        }
    }
    path.pop();
    Ok(())
}

fn observe_from_item<O: Observer + ?Sized>(
    obs: &mut O,
    item: &FromItem,
    path: &mut Vec<String>,
) -> Result<(), WalkError> {
    match item {
        FromItem::Table { .. } => Ok(()),
        FromItem::Subquery { query, .. } => observe_query(obs, query, path),
        FromItem::Join { left, right, on, .. } => {
            observe_from_item(obs, left, path)?;
            observe_from_item(obs, right, path)?;
            if let Some(on) = on {
                observe_value(obs, on, path)?;
            }
            Ok(())
        }
    }
}

fn observe_window<O: Observer + ?Sized>(
    obs: &mut O,
    spec: &sqlcraft_ast::WindowSpec,
    path: &mut Vec<String>,
) -> Result<(), WalkError> {
    for p in &spec.partition_by {
        observe_value(obs, p, path)?;
    }
    for o in &spec.order_by {
        observe_value(obs, &o.expr, path)?;
    }
    Ok(())
}

pub fn observe_value<O: Observer + ?Sized>(
    obs: &mut O,
    value: &ValueComponent,
    path: &mut Vec<String>,
) -> Result<(), WalkError> {
    enter_path(path, value_label(value))?;
    obs.visit_value(value);

    match value {
        ValueComponent::Literal(_)
        | ValueComponent::Parameter(_)
        | ValueComponent::Column(_)
        | ValueComponent::Wildcard { .. } => {}
        ValueComponent::Binary { left, right, .. } => {
            observe_value(obs, left, path)?;
            observe_value(obs, right, path)?;
        }
        ValueComponent::Unary { operand, .. } => observe_value(obs, operand, path)?,
        ValueComponent::Function { args, over, .. } => {
            for a in args {
                observe_value(obs, a, path)?;
            }
            if let Some(spec) = over {
                observe_window(obs, spec, path)?;
            }
        }
        ValueComponent::Cast { expr, .. } => observe_value(obs, expr, path)?,
        ValueComponent::Case { operand, whens, else_branch, .. } => {
            if let Some(o) = operand {
                observe_value(obs, o, path)?;
            }
            for (w, t) in whens {
                observe_value(obs, w, path)?;
                observe_value(obs, t, path)?;
            }
            if let Some(e) = else_branch {
                observe_value(obs, e, path)?;
            }
        }
        ValueComponent::Subquery { query, .. } => observe_query(obs, query, path)?,
        ValueComponent::ValueList { items, .. } | ValueComponent::Array { items, .. } => {
            for i in items {
                observe_value(obs, i, path)?;
            }
        }
    }
    path.pop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlcraft_ast::*;
    use sqlcraft_lexer::Span;

    use super::*;

    struct ColumnCounter(usize);
    impl Observer for ColumnCounter {
        fn visit_value(&mut self, value: &ValueComponent) {
            if matches!(value, ValueComponent::Column(_)) {
                self.0 += 1;
            }
        }
    }

    #[test]
    fn counts_nested_columns() {
        let query = Query::SimpleSelect(Box::new(SimpleSelect {
            with: None,
            select: SelectClause {
                items: vec![SelectItem::Expr {
                    expr: ValueComponent::Binary {
                        op: BinaryOp::Add,
                        left: Box::new(ValueComponent::Column(ColumnRef::unqualified("a", Span::at(0)))),
                        right: Box::new(ValueComponent::Column(ColumnRef::unqualified("b", Span::at(0)))),
                        span: Span::at(0),
                        trivia: Trivia::default(),
                    },
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

        let mut counter = ColumnCounter(0);
        counter.walk(&query).unwrap();
        assert_eq!(counter.0, 2);
    }
}
