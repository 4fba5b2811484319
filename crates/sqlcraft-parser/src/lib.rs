//! Turns a token stream into a [`sqlcraft_ast::Query`] tree.
//!
//! The grammar is recursive descent for statement structure (`WITH`, `SELECT`,
//! set operators, `MERGE`, `DELETE`, `VALUES`) and Pratt/precedence-climbing
//! for value expressions, so `a + b * c` and `a AND b OR c` bind the way SQL
//! readers expect without a hand-written table per clause.

mod cursor;
mod error;
mod expr;
mod stmt;

pub use error::ParseError;
pub use sqlcraft_ast::Query;

use cursor::Cursor;

/// Parses one SQL statement. Any tokens left over once the statement grammar
/// is satisfied are a syntax error, not silently ignored input.
pub fn parse(text: &str) -> Result<Query, ParseError> {
    let tokens = sqlcraft_lexer::lex(text)?;
    let mut cur = Cursor::new(&tokens);
    let query = stmt::parse_query(&mut cur)?;
    if !cur.is_eof() {
        return Err(cur.unexpected(&["end of input"]));
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use sqlcraft_ast::*;

    use super::*;

    #[test]
    fn parses_simple_select() {
        let query = parse("select a, b from t where a = 1").unwrap();
        let Query::SimpleSelect(s) = query else { panic!("expected simple select") };
        assert_eq!(s.select.items.len(), 2);
        assert!(s.from.is_some());
        assert!(matches!(s.where_clause, Some(ValueComponent::Binary { op: BinaryOp::Eq, .. })));
    }

    #[test]
    fn parses_qualified_wildcard_and_alias() {
        let query = parse("select t.*, a.b as c from t, a").unwrap();
        let Query::SimpleSelect(s) = query else { panic!() };
        assert!(matches!(&s.select.items[0], SelectItem::Wildcard { namespaces, .. } if namespaces.len() == 1));
        assert_eq!(s.select.items[1].output_name(), Some("c"));
    }

    #[test]
    fn parses_join_chain() {
        let query = parse("select 1 from a join b on a.id = b.id left join c on b.id = c.id").unwrap();
        let Query::SimpleSelect(s) = query else { panic!() };
        let from = s.from.unwrap();
        assert_eq!(from.items.len(), 1);
        assert!(matches!(&from.items[0], FromItem::Join { join_type: JoinType::Left, .. }));
    }

    #[test]
    fn parses_cte_and_union() {
        let query = parse("with a as (select 1), b as (select 2) select * from a union all select * from b").unwrap();
        let Query::BinarySelect(b) = query else { panic!("expected binary select") };
        assert!(b.with.is_some());
        assert_eq!(b.with.as_ref().unwrap().ctes.len(), 2);
        assert!(b.op.all);
        assert_eq!(b.op.kind, SetOperatorKind::Union);
    }

    #[test]
    fn parses_recursive_cte() {
        let query = parse(
            "with recursive t as (select 1 as n union all select n + 1 from t where n < 10) select * from t",
        )
        .unwrap();
        let with = query.with_clause().unwrap();
        assert!(with.recursive);
        assert!(with.find("t").is_some());
    }

    #[test]
    fn parses_operator_precedence() {
        let query = parse("select 1 from t where a = 1 and b = 2 or c = 3").unwrap();
        let Query::SimpleSelect(s) = query else { panic!() };
        let where_clause = s.where_clause.unwrap();
        // top-level should be OR, since AND binds tighter
        assert!(matches!(where_clause, ValueComponent::Binary { op: BinaryOp::Or, .. }));
    }

    #[test]
    fn parses_not_like_and_is_not_null() {
        let query = parse("select 1 from t where a not like 'x%' and b is not null").unwrap();
        let Query::SimpleSelect(s) = query else { panic!() };
        let ValueComponent::Binary { op: BinaryOp::And, left, right, .. } = s.where_clause.unwrap() else {
            panic!("expected AND")
        };
        assert!(matches!(*left, ValueComponent::Unary { op: UnaryOp::Not, .. }));
        assert!(matches!(*right, ValueComponent::Unary { op: UnaryOp::Not, .. }));
    }

    #[test]
    fn parses_case_and_cast() {
        let query = parse("select case when a > 1 then cast(a as int) else 0 end from t").unwrap();
        let Query::SimpleSelect(s) = query else { panic!() };
        assert!(matches!(&s.select.items[0], SelectItem::Expr { expr: ValueComponent::Case { .. }, .. }));
    }

    #[test]
    fn parses_window_function() {
        let query = parse("select row_number() over (partition by a order by b desc) from t").unwrap();
        let Query::SimpleSelect(s) = query else { panic!() };
        let SelectItem::Expr { expr: ValueComponent::Function { over: Some(spec), .. }, .. } = &s.select.items[0]
        else {
            panic!("expected window function")
        };
        assert_eq!(spec.partition_by.len(), 1);
        assert_eq!(spec.order_by.len(), 1);
        assert!(!spec.order_by[0].ascending);
    }

    #[test]
    fn parses_in_value_list_and_subquery() {
        let query = parse("select 1 from t where a in (1, 2, 3)").unwrap();
        let Query::SimpleSelect(s) = query else { panic!() };
        assert!(matches!(s.where_clause, Some(ValueComponent::Binary { op: BinaryOp::In, .. })));

        let query = parse("select 1 from t where a in (select id from u)").unwrap();
        let Query::SimpleSelect(s) = query else { panic!() };
        let ValueComponent::Binary { right, .. } = s.where_clause.unwrap() else { panic!() };
        assert!(matches!(*right, ValueComponent::Subquery { .. }));
    }

    #[test]
    fn parses_values_statement() {
        let query = parse("values (1, 'a'), (2, 'b')").unwrap();
        let Query::Values(v) = query else { panic!("expected values") };
        assert_eq!(v.rows.len(), 2);
        assert_eq!(v.rows[0].len(), 2);
    }

    #[test]
    fn parses_delete_with_using() {
        let query = parse("delete from t using u where t.id = u.id").unwrap();
        let Query::Delete(d) = query else { panic!("expected delete") };
        assert_eq!(d.target.name.last().unwrap().as_str(), "t");
        assert!(d.using.is_some());
        assert!(d.where_clause.is_some());
    }

    #[test]
    fn parses_merge() {
        let query = parse(
            "merge into t using s on t.id = s.id \
             when matched then update set x = s.x \
             when not matched then insert (id, x) values (s.id, s.x) \
             when not matched by source then delete",
        )
        .unwrap();
        let Query::Merge(m) = query else { panic!("expected merge") };
        assert_eq!(m.whens.len(), 3);
        assert_eq!(m.whens[0].match_class, MergeMatchClass::Matched);
        assert!(matches!(m.whens[1].action, MergeAction::Insert { .. }));
        assert_eq!(m.whens[2].match_class, MergeMatchClass::NotMatchedBySource);
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse("select 1 from t select 2").is_err());
    }

    #[test]
    fn propagates_lex_errors() {
        assert!(matches!(parse("select 'unterminated"), Err(ParseError::Lex(_))));
    }
}
