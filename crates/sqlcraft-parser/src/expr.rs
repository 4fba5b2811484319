use smol_str::SmolStr;
use sqlcraft_ast::{
    BinaryOp, ColumnRef, Literal, LiteralKind, NullsOrder, OrderItem, ParamRef, ParamStyle, Trivia,
    UnaryOp, ValueComponent, WindowSpec,
};
use sqlcraft_lexer::{Span, TokenKind};

use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::stmt;

/// Binding powers for infix/postfix operators. Lower binds looser, so `OR` (1,2)
/// splits first and multiplication (12,13) splits last. `NOT` and unary `-` are
/// prefix operators handled directly in [`parse_prefix`].
fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    use BinaryOp::*;
    match op {
        Or => (1, 2),
        And => (3, 4),
        Eq | NotEq | Lt | Gt | LtEq | GtEq | Like | ILike | In | Is => (6, 7),
        Concat => (8, 9),
        Add | Sub => (10, 11),
        Mul | Div | Mod => (12, 13),
    }
}

const NOT_PREFIX_BP: u8 = 5;
const NEG_PREFIX_BP: u8 = 14;

pub fn parse_expr(cur: &mut Cursor, min_bp: u8) -> Result<ValueComponent, ParseError> {
    let prefix = parse_prefix(cur)?;
    let mut lhs = parse_postfix(cur, prefix)?;

    loop {
        let Some((op, width, negated)) = peek_binary_op(cur) else { break };
        let (lbp, rbp) = infix_binding_power(op);
        if lbp < min_bp {
            break;
        }
        let start = lhs.span();
        for _ in 0..width {
            cur.advance();
        }
        let rhs = parse_expr(cur, rbp)?;
        let span = Span::new(start.start, rhs.span().end);
        let binary = ValueComponent::Binary {
            op,
            left: Box::new(lhs),
            right: Box::new(rhs),
            span,
            trivia: Trivia::default(),
        };
        lhs = if negated {
            ValueComponent::Unary { op: UnaryOp::Not, operand: Box::new(binary), span, trivia: Trivia::default() }
        } else {
            binary
        };
    }

    Ok(lhs)
}

/// Looks at the current token(s) and decides whether they spell a binary
/// operator, returning how many tokens it consumes and whether the result
/// should be wrapped in a `NOT` (for `NOT LIKE`/`NOT IN`/`IS NOT`, since the
/// AST has no ternary "negated binary" shape of its own).
fn peek_binary_op(cur: &Cursor) -> Option<(BinaryOp, usize, bool)> {
    if cur.at_word("and") {
        return Some((BinaryOp::And, 1, false));
    }
    if cur.at_word("or") {
        return Some((BinaryOp::Or, 1, false));
    }
    if cur.at_word("like") {
        return Some((BinaryOp::Like, 1, false));
    }
    if cur.at_word("ilike") {
        return Some((BinaryOp::ILike, 1, false));
    }
    if cur.at_word("in") {
        return Some((BinaryOp::In, 1, false));
    }
    if cur.at_word("not") {
        if cur.peek_at(1).value.eq_ignore_ascii_case("like") {
            return Some((BinaryOp::Like, 2, true));
        }
        if cur.peek_at(1).value.eq_ignore_ascii_case("ilike") {
            return Some((BinaryOp::ILike, 2, true));
        }
        if cur.peek_at(1).value.eq_ignore_ascii_case("in") {
            return Some((BinaryOp::In, 2, true));
        }
        return None;
    }
    if cur.at_word("is") {
        if cur.peek_at(1).value.eq_ignore_ascii_case("not") {
            return Some((BinaryOp::Is, 2, true));
        }
        return Some((BinaryOp::Is, 1, false));
    }
    if cur.is(TokenKind::Operator) {
        let op = match cur.peek().value.as_str() {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "||" => BinaryOp::Concat,
            "=" => BinaryOp::Eq,
            "!=" | "<>" => BinaryOp::NotEq,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::LtEq,
            ">=" => BinaryOp::GtEq,
            _ => return None,
        };
        return Some((op, 1, false));
    }
    None
}

fn parse_prefix(cur: &mut Cursor) -> Result<ValueComponent, ParseError> {
    if cur.at_word("not") {
        let start = cur.peek().span;
        cur.advance();
        let operand = parse_expr(cur, NOT_PREFIX_BP)?;
        let span = Span::new(start.start, operand.span().end);
        return Ok(ValueComponent::Unary { op: UnaryOp::Not, operand: Box::new(operand), span, trivia: Trivia::default() });
    }
    if cur.is(TokenKind::Operator) && cur.peek().value == "-" {
        let start = cur.peek().span;
        cur.advance();
        let operand = parse_expr(cur, NEG_PREFIX_BP)?;
        let span = Span::new(start.start, operand.span().end);
        return Ok(ValueComponent::Unary { op: UnaryOp::Neg, operand: Box::new(operand), span, trivia: Trivia::default() });
    }
    parse_primary(cur)
}

/// Applies postfix `::type` casts, which bind tighter than any infix operator.
fn parse_postfix(cur: &mut Cursor, mut expr: ValueComponent) -> Result<ValueComponent, ParseError> {
    while cur.is(TokenKind::Operator) && cur.peek().value == "::" {
        let start = expr.span().start;
        cur.advance();
        let (type_name, end) = parse_type_name(cur)?;
        expr = ValueComponent::Cast { expr: Box::new(expr), type_name, span: Span::new(start, end), trivia: Trivia::default() };
    }
    Ok(expr)
}

/// Parses a type name, optionally followed by a parenthesized size/precision
/// spec (`varchar(255)`, `numeric(10, 2)`). Returns the name text and the byte
/// offset just past it for span bookkeeping.
fn parse_type_name(cur: &mut Cursor) -> Result<(SmolStr, usize), ParseError> {
    let tok = cur.expect_kind(TokenKind::Identifier, "type name")?;
    let mut name = tok.value.to_string();
    let mut end = tok.span.end;
    if cur.at_kind(TokenKind::OpenParen) {
        cur.advance();
        name.push('(');
        let mut first = true;
        while !cur.at_kind(TokenKind::CloseParen) {
            if !first {
                name.push_str(", ");
            }
            first = false;
            name.push_str(&cur.advance().value);
        }
        end = cur.expect_kind(TokenKind::CloseParen, ")")?.span.end;
        name.push(')');
    }
    Ok((SmolStr::new(name), end))
}

fn parse_primary(cur: &mut Cursor) -> Result<ValueComponent, ParseError> {
    if cur.at_word("case") {
        return parse_case(cur);
    }
    if cur.at_kind(TokenKind::OpenParen) {
        return parse_paren(cur);
    }
    if cur.at_kind(TokenKind::Parameter) {
        return Ok(parse_parameter(cur));
    }
    if cur.at_kind(TokenKind::Literal) {
        return Ok(parse_literal(cur));
    }
    if cur.is(TokenKind::Operator) && cur.peek().value == "*" {
        let span = cur.advance().span;
        return Ok(ValueComponent::Wildcard { namespaces: Vec::new(), span, trivia: Trivia::default() });
    }
    if cur.at_kind(TokenKind::Function) {
        return parse_function_call(cur);
    }
    if cur.at_kind(TokenKind::Identifier) {
        return parse_name_chain(cur);
    }
    Err(cur.unexpected(&["expression"]))
}

fn parse_parameter(cur: &mut Cursor) -> ValueComponent {
    let tok = cur.advance();
    let span = tok.span;
    let (style, name) = match tok.value.as_bytes().first() {
        Some(b':') => (ParamStyle::Named, tok.value[1..].to_string()),
        Some(b'$') => (ParamStyle::Positional, tok.value[1..].to_string()),
        _ => (ParamStyle::Anonymous, String::new()),
    };
    ValueComponent::Parameter(ParamRef { style, name: name.into(), span, trivia: Trivia::default() })
}

fn parse_literal(cur: &mut Cursor) -> ValueComponent {
    let tok = cur.advance();
    let span = tok.span;
    let raw = tok.value.clone();
    let kind = if raw.eq_ignore_ascii_case("null") {
        LiteralKind::Null
    } else if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false") {
        LiteralKind::Boolean
    } else if raw.starts_with('\'') {
        if tok.is(TokenKind::StringSpecifier) {
            LiteralKind::DialectString
        } else {
            LiteralKind::String
        }
    } else if raw.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        LiteralKind::DateTimeKeyword
    } else {
        LiteralKind::Number
    };
    ValueComponent::Literal(Literal { kind, raw, span, trivia: Trivia::default() })
}

/// Scans a dotted identifier chain (`a`, `a.b`, `a.b.c`), producing a
/// [`ValueComponent::Column`] or, when the chain ends in `.*`, a qualified
/// [`ValueComponent::Wildcard`].
fn parse_name_chain(cur: &mut Cursor) -> Result<ValueComponent, ParseError> {
    let first = cur.expect_kind(TokenKind::Identifier, "identifier")?;
    let start = first.span.start;
    let mut end = first.span.end;
    let mut names = vec![first.value.clone()];

    while cur.at_kind(TokenKind::Dot) {
        cur.advance();
        if cur.is(TokenKind::Operator) && cur.peek().value == "*" {
            let star = cur.advance();
            let namespaces = names;
            return Ok(ValueComponent::Wildcard {
                namespaces,
                span: Span::new(start, star.span.end),
                trivia: Trivia::default(),
            });
        }
        let tok = cur.expect_kind(TokenKind::Identifier, "identifier")?;
        end = tok.span.end;
        names.push(tok.value.clone());
    }

    let column = names.pop().unwrap();
    Ok(ValueComponent::Column(ColumnRef { namespaces: names, column, span: Span::new(start, end), trivia: Trivia::default() }))
}

fn parse_function_call(cur: &mut Cursor) -> Result<ValueComponent, ParseError> {
    let tok = cur.advance();
    let start = tok.span.start;
    let name = tok.value.clone();
    cur.expect_kind(TokenKind::OpenParen, "(")?;

    if name.eq_ignore_ascii_case("array") {
        let items = parse_expr_list(cur, TokenKind::CloseParen)?;
        let end = cur.expect_kind(TokenKind::CloseParen, ")")?.span.end;
        return Ok(ValueComponent::Array { items, span: Span::new(start, end), trivia: Trivia::default() });
    }
    if name.eq_ignore_ascii_case("cast") {
        let expr = parse_expr(cur, 0)?;
        cur.expect_word("as")?;
        let (type_name, _) = parse_type_name(cur)?;
        let end = cur.expect_kind(TokenKind::CloseParen, ")")?.span.end;
        return Ok(ValueComponent::Cast {
            expr: Box::new(expr),
            type_name,
            span: Span::new(start, end),
            trivia: Trivia::default(),
        });
    }

    let distinct = cur.eat_word("distinct");
    let args = if cur.at_kind(TokenKind::CloseParen) { Vec::new() } else { parse_expr_list(cur, TokenKind::CloseParen)? };
    let mut end = cur.expect_kind(TokenKind::CloseParen, ")")?.span.end;

    let over = if cur.eat_word("over") {
        cur.expect_kind(TokenKind::OpenParen, "(")?;
        let spec = parse_window_spec(cur)?;
        end = cur.expect_kind(TokenKind::CloseParen, ")")?.span.end;
        Some(spec)
    } else {
        None
    };

    Ok(ValueComponent::Function {
        name,
        args,
        distinct,
        over,
        span: Span::new(start, end),
        trivia: Trivia::default(),
    })
}

/// Parses the body of an `OVER (...)` or `WINDOW name AS (...)` spec, up to
/// (but not including) the closing paren, which the caller consumes.
pub fn parse_window_spec(cur: &mut Cursor) -> Result<WindowSpec, ParseError> {
    let start = cur.peek().span.start;
    let partition_by = if cur.eat_word("partition") {
        cur.expect_word("by")?;
        parse_expr_list_unbounded(cur)?
    } else {
        Vec::new()
    };
    let order_by = if cur.eat_word("order") {
        cur.expect_word("by")?;
        parse_order_items(cur)?
    } else {
        Vec::new()
    };
    let end = cur.last().span.end.max(start);
    Ok(WindowSpec { partition_by, order_by, span: Span::new(start, end) })
}

fn parse_case(cur: &mut Cursor) -> Result<ValueComponent, ParseError> {
    let start = cur.advance().span.start; // "case"
    let operand = if cur.at_word("when") { None } else { Some(Box::new(parse_expr(cur, 0)?)) };
    let mut whens = Vec::new();
    while cur.eat_word("when") {
        let cond = parse_expr(cur, 0)?;
        cur.expect_word("then")?;
        let result = parse_expr(cur, 0)?;
        whens.push((cond, result));
    }
    let else_branch = if cur.eat_word("else") { Some(Box::new(parse_expr(cur, 0)?)) } else { None };
    let end = cur.expect_word("end")?.span.end;
    Ok(ValueComponent::Case { operand, whens, else_branch, span: Span::new(start, end), trivia: Trivia::default() })
}

fn parse_paren(cur: &mut Cursor) -> Result<ValueComponent, ParseError> {
    let start = cur.advance().span.start; // "("
    if cur.at_word("select") || cur.at_word("with") || cur.at_word("values") {
        let query = stmt::parse_query(cur)?;
        let end = cur.expect_kind(TokenKind::CloseParen, ")")?.span.end;
        return Ok(ValueComponent::Subquery { query: Box::new(query), span: Span::new(start, end), trivia: Trivia::default() });
    }
    let mut items = vec![parse_expr(cur, 0)?];
    let mut saw_comma = false;
    while cur.eat_kind(TokenKind::Comma) {
        saw_comma = true;
        items.push(parse_expr(cur, 0)?);
    }
    let end = cur.expect_kind(TokenKind::CloseParen, ")")?.span.end;
    if saw_comma {
        Ok(ValueComponent::ValueList { items, span: Span::new(start, end), trivia: Trivia::default() })
    } else {
        Ok(items.pop().unwrap())
    }
}

pub fn parse_expr_list(cur: &mut Cursor, terminator: TokenKind) -> Result<Vec<ValueComponent>, ParseError> {
    let mut items = Vec::new();
    if cur.at_kind(terminator) {
        return Ok(items);
    }
    items.push(parse_expr(cur, 0)?);
    while cur.eat_kind(TokenKind::Comma) {
        items.push(parse_expr(cur, 0)?);
    }
    Ok(items)
}

fn parse_expr_list_unbounded(cur: &mut Cursor) -> Result<Vec<ValueComponent>, ParseError> {
    let mut items = vec![parse_expr(cur, 0)?];
    while cur.eat_kind(TokenKind::Comma) {
        items.push(parse_expr(cur, 0)?);
    }
    Ok(items)
}

pub fn parse_order_items(cur: &mut Cursor) -> Result<Vec<OrderItem>, ParseError> {
    let mut items = Vec::new();
    loop {
        let expr = parse_expr(cur, 0)?;
        let ascending = if cur.eat_word("desc") {
            false
        } else {
            cur.eat_word("asc");
            true
        };
        let nulls = if cur.eat_word("nulls") {
            if cur.eat_word("first") {
                NullsOrder::First
            } else {
                cur.expect_word("last")?;
                NullsOrder::Last
            }
        } else {
            NullsOrder::Default
        };
        items.push(OrderItem { expr, ascending, nulls });
        if !cur.eat_kind(TokenKind::Comma) {
            break;
        }
    }
    Ok(items)
}

