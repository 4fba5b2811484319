#[cfg(test)]
mod tests {
    use sqlcraft_lexer::Span;

    use crate::*;

    fn col(name: &str) -> ColumnRef {
        ColumnRef::unqualified(name, Span::at(0))
    }

    #[test]
    fn output_name_prefers_alias() {
        let item = SelectItem::Expr {
            expr: ValueComponent::Column(col("price")),
            alias: Some("p".into()),
            span: Span::at(0),
        };
        assert_eq!(item.output_name(), Some("p"));
    }

    #[test]
    fn output_name_falls_back_to_column() {
        let item =
            SelectItem::Expr { expr: ValueComponent::Column(col("price")), alias: None, span: Span::at(0) };
        assert_eq!(item.output_name(), Some("price"));
    }

    #[test]
    fn wildcard_has_no_output_name() {
        let item = SelectItem::Wildcard { namespaces: vec![], span: Span::at(0) };
        assert_eq!(item.output_name(), None);
    }

    #[test]
    fn qualified_column_name_joins_namespaces() {
        let c = ColumnRef {
            namespaces: vec!["a".into(), "b".into()],
            column: "c".into(),
            span: Span::at(0),
            trivia: Trivia::default(),
        };
        assert_eq!(c.qualified_name(), "a.b.c");
    }

    #[test]
    fn with_clause_lookup_is_case_insensitive() {
        let with = WithClause {
            recursive: false,
            ctes: vec![CteDefinition {
                name: "MyCte".into(),
                column_names: None,
                query: Box::new(Query::Values(Box::new(ValuesQuery {
                    rows: vec![],
                    span: Span::at(0),
                    trivia: Trivia::default(),
                }))),
                span: Span::at(0),
                trivia: Trivia::default(),
            }],
        };
        assert!(with.find("mycte").is_some());
    }
}
