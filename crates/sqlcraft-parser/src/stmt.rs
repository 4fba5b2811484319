use smol_str::SmolStr;
use sqlcraft_ast::{
    BinarySelect, CteDefinition, DeleteQuery, FromClause, FromItem, JoinType, LimitClause,
    MergeAction, MergeMatchClass, MergeQuery, MergeWhen, NamedWindow, Query, SelectClause,
    SelectItem, SetOperator, SetOperatorKind, SimpleSelect, TableRef, Trivia, ValueComponent,
    ValuesQuery, WithClause,
};
use sqlcraft_lexer::{Span, TokenKind};

use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::expr::{parse_expr, parse_expr_list, parse_order_items};

/// Entry point for one full statement: an optional `WITH` prefix, a chain of
/// `SELECT`/`VALUES` bodies joined by set operators, or a `MERGE`/`DELETE`.
pub fn parse_query(cur: &mut Cursor) -> Result<Query, ParseError> {
    if cur.at_word("merge") {
        return parse_merge(cur);
    }
    if cur.at_word("delete") {
        return parse_delete(cur);
    }

    let with = parse_with_clause(cur)?;
    let mut left = parse_select_or_values(cur)?;

    loop {
        let Some(set_op) = peek_set_operator(cur) else { break };
        let start = left.span().start;
        consume_set_operator(cur);
        let right = parse_select_or_values(cur)?;
        let span = Span::new(start, right.span().end);
        left = Query::BinarySelect(Box::new(BinarySelect {
            with: None,
            left: Box::new(left),
            op: set_op,
            right: Box::new(right),
            span,
            trivia: Trivia::default(),
        }));
    }

    if let Some(with) = with {
        match &mut left {
            Query::SimpleSelect(s) => s.with = Some(with),
            Query::BinarySelect(b) => b.with = Some(with),
            _ => {}
        }
    }

    Ok(left)
}

fn parse_with_clause(cur: &mut Cursor) -> Result<Option<WithClause>, ParseError> {
    if !cur.eat_word("with") {
        return Ok(None);
    }
    let recursive = cur.eat_word("recursive");
    let mut ctes = Vec::new();
    loop {
        let name_tok = cur.expect_kind(TokenKind::Identifier, "CTE name")?;
        let start = name_tok.span.start;
        let name = name_tok.value.clone();
        let column_names = if cur.at_kind(TokenKind::OpenParen) {
            cur.advance();
            let cols = parse_ident_list(cur)?;
            cur.expect_kind(TokenKind::CloseParen, ")")?;
            Some(cols)
        } else {
            None
        };
        cur.expect_word("as")?;
        cur.expect_kind(TokenKind::OpenParen, "(")?;
        let inner = parse_query(cur)?;
        let end = cur.expect_kind(TokenKind::CloseParen, ")")?.span.end;
        ctes.push(CteDefinition {
            name,
            column_names,
            query: Box::new(inner),
            span: Span::new(start, end),
            trivia: Trivia::default(),
        });
        if !cur.eat_kind(TokenKind::Comma) {
            break;
        }
    }
    Ok(Some(WithClause { recursive, ctes }))
}

fn parse_ident_list(cur: &mut Cursor) -> Result<Vec<SmolStr>, ParseError> {
    let mut names = vec![cur.expect_kind(TokenKind::Identifier, "identifier")?.value.clone()];
    while cur.eat_kind(TokenKind::Comma) {
        names.push(cur.expect_kind(TokenKind::Identifier, "identifier")?.value.clone());
    }
    Ok(names)
}

fn peek_set_operator(cur: &Cursor) -> Option<SetOperatorKind> {
    if cur.at_word("union") {
        Some(SetOperatorKind::Union)
    } else if cur.at_word("intersect") {
        Some(SetOperatorKind::Intersect)
    } else if cur.at_word("except") {
        Some(SetOperatorKind::Except)
    } else {
        None
    }
}

fn consume_set_operator(cur: &mut Cursor) -> SetOperator {
    let kind = peek_set_operator(cur).expect("caller checked");
    cur.advance();
    let all = cur.eat_word("all");
    if !all {
        cur.eat_word("distinct");
    }
    SetOperator { kind, all }
}

fn parse_select_or_values(cur: &mut Cursor) -> Result<Query, ParseError> {
    if cur.at_word("values") {
        return parse_values(cur);
    }
    if cur.at_kind(TokenKind::OpenParen) {
        cur.advance();
        let inner = parse_query(cur)?;
        cur.expect_kind(TokenKind::CloseParen, ")")?;
        return Ok(inner);
    }
    parse_simple_select(cur)
}

fn parse_simple_select(cur: &mut Cursor) -> Result<Query, ParseError> {
    let start = cur.expect_word("select")?.span.start;
    let distinct = cur.eat_word("distinct");
    if !distinct {
        cur.eat_word("all");
    }

    let items = parse_select_items(cur)?;
    let mut end = items.last().map(|i| i.span().end).unwrap_or(cur.peek().span.start);

    let from = if cur.eat_word("from") {
        let clause = parse_from_clause(cur)?;
        end = clause.items.last().map(from_item_span_end).unwrap_or(end);
        Some(clause)
    } else {
        None
    };

    let where_clause = if cur.eat_word("where") {
        let w = parse_expr(cur, 0)?;
        end = w.span().end;
        Some(w)
    } else {
        None
    };

    let group_by = if cur.eat_word("group") {
        cur.expect_word("by")?;
        let mut items = vec![parse_expr(cur, 0)?];
        while cur.eat_kind(TokenKind::Comma) {
            items.push(parse_expr(cur, 0)?);
        }
        end = items.last().unwrap().span().end;
        items
    } else {
        Vec::new()
    };

    let having = if cur.eat_word("having") {
        let h = parse_expr(cur, 0)?;
        end = h.span().end;
        Some(h)
    } else {
        None
    };

    let windows = if cur.eat_word("window") {
        let mut windows = Vec::new();
        loop {
            let name = cur.expect_kind(TokenKind::Identifier, "window name")?.value.clone();
            cur.expect_word("as")?;
            cur.expect_kind(TokenKind::OpenParen, "(")?;
            let spec = crate::expr::parse_window_spec(cur)?;
            end = cur.expect_kind(TokenKind::CloseParen, ")")?.span.end;
            windows.push(NamedWindow { name, spec });
            if !cur.eat_kind(TokenKind::Comma) {
                break;
            }
        }
        windows
    } else {
        Vec::new()
    };

    let order_by = if cur.eat_word("order") {
        cur.expect_word("by")?;
        let items = parse_order_items(cur)?;
        end = items.last().map(|i| i.expr.span().end).unwrap_or(end);
        items
    } else {
        Vec::new()
    };

    let limit = parse_limit_offset(cur, &mut end)?;

    Ok(Query::SimpleSelect(Box::new(SimpleSelect {
        with: None,
        select: SelectClause { items, distinct },
        from,
        where_clause,
        group_by,
        having,
        windows,
        order_by,
        limit,
        span: Span::new(start, end),
        trivia: Trivia::default(),
    })))
}

fn from_item_span_end(item: &FromItem) -> usize {
    match item {
        FromItem::Table { span, .. } | FromItem::Subquery { span, .. } | FromItem::Join { span, .. } => span.end,
    }
}

fn parse_select_items(cur: &mut Cursor) -> Result<Vec<SelectItem>, ParseError> {
    let mut items = Vec::new();
    loop {
        let expr = parse_expr(cur, 0)?;
        let item = if let ValueComponent::Wildcard { namespaces, span, .. } = expr {
            SelectItem::Wildcard { namespaces, span }
        } else {
            let expr_start = expr.span().start;
            let expr_end = expr.span().end;
            let alias = parse_optional_alias(cur)?;
            let end = if alias.is_some() { cur.last().span.end } else { expr_end };
            SelectItem::Expr { expr, alias, span: Span::new(expr_start, end) }
        };
        items.push(item);
        if !cur.eat_kind(TokenKind::Comma) {
            break;
        }
    }
    Ok(items)
}

/// An alias is either `AS name` or a bare trailing identifier. Clause-starting
/// keywords (`from`, `where`, ...) lex as `Command` tokens, so a bare
/// `Identifier` immediately after an expression is unambiguously an alias.
fn parse_optional_alias(cur: &mut Cursor) -> Result<Option<SmolStr>, ParseError> {
    if cur.eat_word("as") {
        return Ok(Some(cur.expect_kind(TokenKind::Identifier, "alias")?.value.clone()));
    }
    if cur.at_kind(TokenKind::Identifier) {
        return Ok(Some(cur.advance().value.clone()));
    }
    Ok(None)
}

fn parse_from_clause(cur: &mut Cursor) -> Result<FromClause, ParseError> {
    let mut items = vec![parse_from_item_chain(cur)?];
    while cur.eat_kind(TokenKind::Comma) {
        items.push(parse_from_item_chain(cur)?);
    }
    Ok(FromClause { items })
}

fn parse_from_item_chain(cur: &mut Cursor) -> Result<FromItem, ParseError> {
    let mut base = parse_single_from_item(cur)?;
    loop {
        let join_type = if cur.eat_word("cross") {
            cur.expect_word("join")?;
            Some(JoinType::Cross)
        } else if cur.eat_word("inner") {
            cur.expect_word("join")?;
            Some(JoinType::Inner)
        } else if cur.eat_word("left") {
            cur.eat_word("outer");
            cur.expect_word("join")?;
            Some(JoinType::Left)
        } else if cur.eat_word("right") {
            cur.eat_word("outer");
            cur.expect_word("join")?;
            Some(JoinType::Right)
        } else if cur.eat_word("full") {
            cur.eat_word("outer");
            cur.expect_word("join")?;
            Some(JoinType::Full)
        } else if cur.eat_word("join") {
            Some(JoinType::Inner)
        } else {
            None
        };
        let Some(join_type) = join_type else { break };

        let right = parse_single_from_item(cur)?;
        let (on, using) = if !matches!(join_type, JoinType::Cross) && cur.eat_word("on") {
            (Some(parse_expr(cur, 0)?), Vec::new())
        } else if cur.eat_word("using") {
            cur.expect_kind(TokenKind::OpenParen, "(")?;
            let cols = parse_ident_list(cur)?;
            cur.expect_kind(TokenKind::CloseParen, ")")?;
            (None, cols)
        } else {
            (None, Vec::new())
        };

        let span = Span::new(from_item_span_start(&base), from_item_span_end(&right));
        base = FromItem::Join { left: Box::new(base), right: Box::new(right), join_type, on, using, span };
    }
    Ok(base)
}

fn from_item_span_start(item: &FromItem) -> usize {
    match item {
        FromItem::Table { span, .. } | FromItem::Subquery { span, .. } | FromItem::Join { span, .. } => span.start,
    }
}

fn parse_single_from_item(cur: &mut Cursor) -> Result<FromItem, ParseError> {
    if cur.at_kind(TokenKind::OpenParen) {
        let start = cur.advance().span.start;
        let query = parse_query(cur)?;
        let close_end = cur.expect_kind(TokenKind::CloseParen, ")")?.span.end;
        let alias = parse_optional_alias(cur)?;
        let end = if alias.is_some() { cur.last().span.end } else { close_end };
        return Ok(FromItem::Subquery { query: Box::new(query), alias, span: Span::new(start, end) });
    }
    let start = cur.peek().span.start;
    let name = parse_dotted_name(cur)?;
    let name_end = cur.last().span.end;
    let alias = parse_optional_alias(cur)?;
    let end = if alias.is_some() { cur.last().span.end } else { name_end };
    Ok(FromItem::Table { name, alias, span: Span::new(start, end) })
}

fn parse_dotted_name(cur: &mut Cursor) -> Result<Vec<SmolStr>, ParseError> {
    let mut names = vec![cur.expect_kind(TokenKind::Identifier, "table name")?.value.clone()];
    while cur.at_kind(TokenKind::Dot) {
        cur.advance();
        names.push(cur.expect_kind(TokenKind::Identifier, "identifier")?.value.clone());
    }
    Ok(names)
}

fn parse_table_ref(cur: &mut Cursor) -> Result<TableRef, ParseError> {
    let start = cur.peek().span.start;
    let name = parse_dotted_name(cur)?;
    let name_end = cur.last().span.end;
    let alias = parse_optional_alias(cur)?;
    let end = if alias.is_some() { cur.last().span.end } else { name_end };
    Ok(TableRef { name, alias, span: Span::new(start, end) })
}

fn parse_limit_offset(cur: &mut Cursor, end: &mut usize) -> Result<Option<LimitClause>, ParseError> {
    let mut limit = None;
    let mut offset = None;
    loop {
        if limit.is_none() && cur.eat_word("limit") {
            let e = parse_expr(cur, 0)?;
            *end = e.span().end;
            limit = Some(e);
        } else if offset.is_none() && cur.eat_word("offset") {
            let e = parse_expr(cur, 0)?;
            *end = e.span().end;
            offset = Some(e);
        } else {
            break;
        }
    }
    Ok(if limit.is_none() && offset.is_none() { None } else { Some(LimitClause { limit, offset }) })
}

fn parse_values(cur: &mut Cursor) -> Result<Query, ParseError> {
    let start = cur.expect_word("values")?.span.start;
    let mut rows = Vec::new();
    let mut end = start;
    loop {
        cur.expect_kind(TokenKind::OpenParen, "(")?;
        let row = parse_expr_list(cur, TokenKind::CloseParen)?;
        end = cur.expect_kind(TokenKind::CloseParen, ")")?.span.end;
        rows.push(row);
        if !cur.eat_kind(TokenKind::Comma) {
            break;
        }
    }
    Ok(Query::Values(Box::new(ValuesQuery { rows, span: Span::new(start, end), trivia: Trivia::default() })))
}

/// Wraps a bare table reference as a trivial `SELECT * FROM <table>` so
/// `DELETE ... USING` and `MERGE ... USING` can hold either a subquery or a
/// plain table in the same `Box<Query>` slot.
fn wrap_table_as_query(table: TableRef) -> Query {
    let span = table.span;
    Query::SimpleSelect(Box::new(SimpleSelect {
        with: None,
        select: SelectClause {
            items: vec![SelectItem::Wildcard { namespaces: Vec::new(), span }],
            distinct: false,
        },
        from: Some(FromClause {
            items: vec![FromItem::Table { name: table.name, alias: None, span }],
        }),
        where_clause: None,
        group_by: Vec::new(),
        having: None,
        windows: Vec::new(),
        order_by: Vec::new(),
        limit: None,
        span,
        trivia: Trivia::default(),
    }))
}

fn parse_delete(cur: &mut Cursor) -> Result<Query, ParseError> {
    let start = cur.expect_word("delete")?.span.start;
    cur.expect_word("from")?;
    let target = parse_table_ref(cur)?;
    let mut end = target.span.end;

    let using = if cur.eat_word("using") {
        let q = if cur.at_kind(TokenKind::OpenParen) {
            cur.advance();
            let inner = parse_query(cur)?;
            cur.expect_kind(TokenKind::CloseParen, ")")?;
            inner
        } else {
            wrap_table_as_query(parse_table_ref(cur)?)
        };
        end = q.span().end;
        Some(Box::new(q))
    } else {
        None
    };

    let where_clause = if cur.eat_word("where") {
        let w = parse_expr(cur, 0)?;
        end = w.span().end;
        Some(w)
    } else {
        None
    };

    Ok(Query::Delete(Box::new(DeleteQuery { target, using, where_clause, span: Span::new(start, end), trivia: Trivia::default() })))
}

fn parse_merge(cur: &mut Cursor) -> Result<Query, ParseError> {
    let start = cur.expect_word("merge")?.span.start;
    cur.eat_word("into");
    let target = parse_table_ref(cur)?;

    cur.expect_word("using")?;
    let source = if cur.at_kind(TokenKind::OpenParen) {
        cur.advance();
        let inner = parse_query(cur)?;
        cur.expect_kind(TokenKind::CloseParen, ")")?;
        inner
    } else {
        wrap_table_as_query(parse_table_ref(cur)?)
    };
    let source_alias = parse_optional_alias(cur)?;

    cur.expect_word("on")?;
    let on = parse_expr(cur, 0)?;

    let mut whens = Vec::new();
    while cur.at_word("when") {
        let when_start = cur.advance().span.start;
        let match_class = if cur.eat_word("matched") {
            MergeMatchClass::Matched
        } else {
            cur.expect_word("not")?;
            cur.expect_word("matched")?;
            if cur.eat_word("by") {
                cur.expect_word("source")?;
                MergeMatchClass::NotMatchedBySource
            } else {
                MergeMatchClass::NotMatched
            }
        };
        let extra_predicate = if cur.eat_word("and") { Some(parse_expr(cur, 0)?) } else { None };
        cur.expect_word("then")?;
        let action = if cur.eat_word("update") {
            cur.expect_word("set")?;
            MergeAction::Update(parse_set_list(cur)?)
        } else if cur.eat_word("insert") {
            let columns = if cur.at_kind(TokenKind::OpenParen) {
                cur.advance();
                let cols = parse_ident_list(cur)?;
                cur.expect_kind(TokenKind::CloseParen, ")")?;
                cols
            } else {
                Vec::new()
            };
            cur.expect_word("values")?;
            cur.expect_kind(TokenKind::OpenParen, "(")?;
            let values = parse_expr_list(cur, TokenKind::CloseParen)?;
            cur.expect_kind(TokenKind::CloseParen, ")")?;
            MergeAction::Insert { columns, values }
        } else if cur.eat_word("delete") {
            MergeAction::Delete
        } else {
            cur.expect_word("do")?;
            cur.expect_word("nothing")?;
            MergeAction::DoNothing
        };
        let when_end = cur.last().span.end;
        whens.push(MergeWhen { match_class, extra_predicate, action, span: Span::new(when_start, when_end) });
    }

    let end = whens.last().map(|w| w.span.end).unwrap_or(on.span().end);
    Ok(Query::Merge(Box::new(MergeQuery {
        target,
        source: Box::new(source),
        source_alias,
        on,
        whens,
        span: Span::new(start, end),
        trivia: Trivia::default(),
    })))
}

fn parse_set_list(cur: &mut Cursor) -> Result<Vec<(SmolStr, ValueComponent)>, ParseError> {
    let mut sets = Vec::new();
    loop {
        let col = cur.expect_kind(TokenKind::Identifier, "column")?.value.clone();
        if cur.is(TokenKind::Operator) && cur.peek().value == "=" {
            cur.advance();
        } else {
            return Err(cur.unexpected(&["="]));
        }
        let value = parse_expr(cur, 0)?;
        sets.push((col, value));
        if !cur.eat_kind(TokenKind::Comma) {
            break;
        }
    }
    Ok(sets)
}
