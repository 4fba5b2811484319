//! Turns a [`sqlcraft_ast::Query`] back into SQL text.
//!
//! The AST keeps no token stream, so this walks the tree directly rather than
//! replaying a preserved sequence of tokens: every node is responsible for
//! rendering itself plus whatever punctuation and spacing its children need.
//! Parenthesization around binary/unary expressions is derived from operator
//! precedence rather than stored, since the AST doesn't record which of the
//! source's parens were redundant.

mod comments;
mod error;
mod options;

pub use error::FormatError;
pub use options::{
    BooleanBreak, CommaStyle, CommentStyle, IdentifierEscape, KeywordCase, ParameterStyle, Preset, PrinterOptions,
};

use indexmap::IndexSet;
use smol_str::SmolStr;
use sqlcraft_ast::{
    BinaryOp, CteDefinition, DeleteQuery, FromClause, FromItem, JoinType, MergeAction, MergeMatchClass,
    MergeQuery, NullsOrder, OrderItem, Query, SelectClause, SelectItem, SimpleSelect, Trivia, UnaryOp,
    ValueComponent, WindowSpec, WithClause,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Printed {
    pub text: String,
    /// Distinct parameter names referenced, in first-emission order.
    pub parameters: Vec<SmolStr>,
}

pub fn format(query: &Query, options: &PrinterOptions) -> Result<Printed, FormatError> {
    let mut printer = Printer::new(options);
    printer.print_query(query, 0)?;
    Ok(Printed { text: printer.out, parameters: printer.params })
}

struct Printer<'o> {
    opts: &'o PrinterOptions,
    out: String,
    params: Vec<SmolStr>,
    seen_params: IndexSet<SmolStr>,
}

impl<'o> Printer<'o> {
    fn new(opts: &'o PrinterOptions) -> Self {
        Printer { opts, out: String::new(), params: Vec::new(), seen_params: IndexSet::new() }
    }

    fn kw(&self, word: &str) -> String {
        match self.opts.keyword_case {
            KeywordCase::Upper => word.to_ascii_uppercase(),
            KeywordCase::Lower => word.to_ascii_lowercase(),
            KeywordCase::Preserve => word.to_string(),
        }
    }

    fn push_kw(&mut self, word: &str) {
        self.out.push_str(&self.kw(word));
    }

    fn ident(&self, name: &str) -> String {
        match self.opts.identifier_escape {
            IdentifierEscape::None => name.to_string(),
            IdentifierEscape::DoubleQuote => format!("\"{}\"", name.replace('"', "\"\"")),
            IdentifierEscape::Backtick => format!("`{}`", name.replace('`', "``")),
            IdentifierEscape::Bracket => format!("[{}]", name.replace(']', "]]")),
        }
    }

    fn dotted(&self, parts: &[SmolStr]) -> String {
        parts.iter().map(|p| self.ident(p)).collect::<Vec<_>>().join(".")
    }

    fn indent(&self, depth: usize) -> String {
        self.opts.indent_unit().repeat(depth)
    }

    fn record_param(&mut self, name: &SmolStr) {
        if self.seen_params.insert(name.clone()) {
            self.params.push(name.clone());
        }
    }

    fn print_trivia_before(&mut self, trivia: &Trivia, depth: usize) {
        if !self.opts.export_comment {
            return;
        }
        for comment in trivia.before() {
            self.out.push_str(&self.indent(depth));
            self.out.push_str(&comments::render(&comment.text, comment.block, self.opts.comment_style));
            self.out.push_str(self.opts.newline);
        }
    }

    fn print_trivia_after(&mut self, trivia: &Trivia) {
        if !self.opts.export_comment {
            return;
        }
        for comment in trivia.after() {
            self.out.push(' ');
            self.out.push_str(&comments::render(&comment.text, comment.block, self.opts.comment_style));
        }
    }

    fn print_query(&mut self, query: &Query, depth: usize) -> Result<(), FormatError> {
        match query {
            Query::SimpleSelect(s) => self.print_simple_select(s, depth),
            Query::BinarySelect(b) => {
                if let Some(with) = &b.with {
                    self.print_with(with, depth)?;
                }
                self.print_query(&b.left, depth)?;
                self.out.push_str(self.opts.newline);
                self.out.push_str(&self.indent(depth));
                self.push_kw(match b.op.kind {
                    sqlcraft_ast::SetOperatorKind::Union => "union",
                    sqlcraft_ast::SetOperatorKind::Intersect => "intersect",
                    sqlcraft_ast::SetOperatorKind::Except => "except",
                });
                if b.op.all {
                    self.out.push(' ');
                    self.push_kw("all");
                }
                self.out.push_str(self.opts.newline);
                self.print_query(&b.right, depth)
            }
            Query::Values(v) => self.print_values(v, depth),
            Query::Merge(m) => self.print_merge(m, depth),
            Query::Delete(d) => self.print_delete(d, depth),
        }
    }

    fn print_with(&mut self, with: &WithClause, depth: usize) -> Result<(), FormatError> {
        self.out.push_str(&self.indent(depth));
        self.push_kw("with");
        if with.recursive {
            self.out.push(' ');
            self.push_kw("recursive");
        }
        self.out.push_str(self.opts.newline);
        for (i, cte) in with.ctes.iter().enumerate() {
            self.print_cte(cte, depth)?;
            if i + 1 < with.ctes.len() {
                self.out.push(',');
            }
            self.out.push_str(self.opts.newline);
        }
        Ok(())
    }

    fn print_cte(&mut self, cte: &CteDefinition, depth: usize) -> Result<(), FormatError> {
        self.print_trivia_before(&cte.trivia, depth);
        self.out.push_str(&self.indent(depth));
        self.out.push_str(&self.ident(&cte.name));
        if let Some(cols) = &cte.column_names {
            self.out.push_str(" (");
            self.out.push_str(&cols.iter().map(|c| self.ident(c)).collect::<Vec<_>>().join(", "));
            self.out.push(')');
        }
        self.out.push(' ');
        self.push_kw("as");
        self.out.push_str(" (");
        self.out.push_str(self.opts.newline);
        self.print_query(&cte.query, depth + 1)?;
        self.out.push_str(self.opts.newline);
        self.out.push_str(&self.indent(depth));
        self.out.push(')');
        self.print_trivia_after(&cte.trivia);
        Ok(())
    }

    fn print_simple_select(&mut self, s: &SimpleSelect, depth: usize) -> Result<(), FormatError> {
        if s.select.items.is_empty() {
            return Err(FormatError::EmptySelect);
        }
        self.print_trivia_before(&s.trivia, depth);
        if let Some(with) = &s.with {
            self.print_with(with, depth)?;
        }
        self.out.push_str(&self.indent(depth));
        self.print_select_clause(&s.select, depth)?;

        if let Some(from) = &s.from {
            self.out.push_str(self.opts.newline);
            self.print_from_clause(from, depth)?;
        }
        if let Some(w) = &s.where_clause {
            self.out.push_str(self.opts.newline);
            self.out.push_str(&self.indent(depth));
            self.push_kw("where");
            self.out.push(' ');
            let rendered = self.print_value(w, 0, false);
            self.out.push_str(&rendered);
        }
        if !s.group_by.is_empty() {
            self.out.push_str(self.opts.newline);
            self.out.push_str(&self.indent(depth));
            self.push_kw("group by");
            self.out.push(' ');
            let rendered =
                s.group_by.iter().map(|e| self.print_value(e, 0, false)).collect::<Vec<_>>().join(", ");
            self.out.push_str(&rendered);
        }
        if let Some(h) = &s.having {
            self.out.push_str(self.opts.newline);
            self.out.push_str(&self.indent(depth));
            self.push_kw("having");
            self.out.push(' ');
            let rendered = self.print_value(h, 0, false);
            self.out.push_str(&rendered);
        }
        for w in &s.windows {
            self.out.push_str(self.opts.newline);
            self.out.push_str(&self.indent(depth));
            self.push_kw("window");
            self.out.push(' ');
            self.out.push_str(&self.ident(&w.name));
            self.out.push(' ');
            self.push_kw("as");
            self.out.push_str(" (");
            let rendered = self.print_window_spec(&w.spec);
            self.out.push_str(&rendered);
            self.out.push(')');
        }
        if !s.order_by.is_empty() {
            self.out.push_str(self.opts.newline);
            self.out.push_str(&self.indent(depth));
            self.push_kw("order by");
            self.out.push(' ');
            let rendered = self.print_order_items(&s.order_by);
            self.out.push_str(&rendered);
        }
        if let Some(limit) = &s.limit {
            if let Some(l) = &limit.limit {
                self.out.push_str(self.opts.newline);
                self.out.push_str(&self.indent(depth));
                self.push_kw("limit");
                self.out.push(' ');
                let rendered = self.print_value(l, 0, false);
                self.out.push_str(&rendered);
            }
            if let Some(o) = &limit.offset {
                self.out.push_str(self.opts.newline);
                self.out.push_str(&self.indent(depth));
                self.push_kw("offset");
                self.out.push(' ');
                let rendered = self.print_value(o, 0, false);
                self.out.push_str(&rendered);
            }
        }
        self.print_trivia_after(&s.trivia);
        Ok(())
    }

    fn print_select_clause(&mut self, select: &SelectClause, depth: usize) -> Result<(), FormatError> {
        self.push_kw("select");
        if select.distinct {
            self.out.push(' ');
            self.push_kw("distinct");
        }
        self.out.push(' ');
        let sep = match self.opts.comma_break {
            CommaStyle::None => ", ".to_string(),
            CommaStyle::Before => format!("{}{}, ", self.opts.newline, self.indent(depth + 1)),
            CommaStyle::After => format!(",{}{}", self.opts.newline, self.indent(depth + 1)),
        };
        let rendered: Vec<String> = select.items.iter().map(|item| self.print_select_item(item)).collect();
        self.out.push_str(&rendered.join(&sep));
        Ok(())
    }

    fn print_select_item(&mut self, item: &SelectItem) -> String {
        match item {
            SelectItem::Expr { expr, alias, .. } => {
                let mut s = self.print_value(expr, 0, false);
                if let Some(alias) = alias {
                    s.push(' ');
                    s.push_str(&self.kw("as"));
                    s.push(' ');
                    s.push_str(&self.ident(alias));
                }
                s
            }
            SelectItem::Wildcard { namespaces, .. } => {
                if namespaces.is_empty() {
                    "*".to_string()
                } else {
                    format!("{}.*", self.dotted(namespaces))
                }
            }
        }
    }

    fn print_from_clause(&mut self, from: &FromClause, depth: usize) -> Result<(), FormatError> {
        self.out.push_str(&self.indent(depth));
        self.push_kw("from");
        self.out.push(' ');
        let rendered: Vec<String> =
            from.items.iter().map(|item| self.print_from_item(item, depth)).collect::<Result<_, _>>()?;
        self.out.push_str(&rendered.join(", "));
        Ok(())
    }

    fn print_from_item(&mut self, item: &FromItem, depth: usize) -> Result<String, FormatError> {
        Ok(match item {
            FromItem::Table { name, alias, .. } => {
                let mut s = self.dotted(name);
                if let Some(alias) = alias {
                    s.push(' ');
                    s.push_str(&self.kw("as"));
                    s.push(' ');
                    s.push_str(&self.ident(alias));
                }
                s
            }
            FromItem::Subquery { query, alias, .. } => {
                let mut sub = Printer::new(self.opts);
                sub.print_query(query, depth + 1)?;
                let mut s = format!("({}{}{}{})", self.opts.newline, sub.out, self.opts.newline, self.indent(depth));
                self.params.extend(sub.params.iter().filter(|p| self.seen_params.insert((*p).clone())).cloned());
                if let Some(alias) = alias {
                    s.push(' ');
                    s.push_str(&self.kw("as"));
                    s.push(' ');
                    s.push_str(&self.ident(alias));
                }
                s
            }
            FromItem::Join { left, right, join_type, on, using, .. } => {
                let left_s = self.print_from_item(left, depth)?;
                let right_s = self.print_from_item(right, depth)?;
                let joiner = match join_type {
                    JoinType::Inner => "join",
                    JoinType::Left => "left join",
                    JoinType::Right => "right join",
                    JoinType::Full => "full join",
                    JoinType::Cross => "cross join",
                };
                let sep = if self.opts.join_one_line { " ".to_string() } else { self.opts.newline.to_string() };
                let mut s = format!("{left_s}{sep}{} ", self.kw(joiner));
                s.push_str(&right_s);
                if let Some(on) = on {
                    s.push(' ');
                    s.push_str(&self.kw("on"));
                    s.push(' ');
                    s.push_str(&self.print_value(on, 0, false));
                } else if !using.is_empty() {
                    s.push(' ');
                    s.push_str(&self.kw("using"));
                    s.push_str(" (");
                    s.push_str(&using.iter().map(|c| self.ident(c)).collect::<Vec<_>>().join(", "));
                    s.push(')');
                }
                s
            }
        })
    }

    fn print_values(&mut self, values: &sqlcraft_ast::ValuesQuery, depth: usize) -> Result<(), FormatError> {
        if values.rows.is_empty() {
            return Err(FormatError::EmptyValues);
        }
        self.out.push_str(&self.indent(depth));
        self.push_kw("values");
        self.out.push(' ');
        let sep =
            if self.opts.values_comma_break { format!(",{}{}", self.opts.newline, self.indent(depth + 1)) } else { ", ".to_string() };
        let rows: Vec<String> = values
            .rows
            .iter()
            .map(|row| format!("({})", row.iter().map(|v| self.print_value(v, 0, false)).collect::<Vec<_>>().join(", ")))
            .collect();
        self.out.push_str(&rows.join(&sep));
        Ok(())
    }

    fn print_merge(&mut self, merge: &MergeQuery, depth: usize) -> Result<(), FormatError> {
        if merge.whens.is_empty() {
            return Err(FormatError::EmptyMerge);
        }
        self.out.push_str(&self.indent(depth));
        self.push_kw("merge into");
        self.out.push(' ');
        self.out.push_str(&self.dotted(&merge.target.name));
        if let Some(alias) = &merge.target.alias {
            self.out.push(' ');
            self.push_kw("as");
            self.out.push(' ');
            self.out.push_str(&self.ident(alias));
        }
        self.out.push_str(self.opts.newline);
        self.out.push_str(&self.indent(depth));
        self.push_kw("using");
        self.out.push_str(" (");
        self.out.push_str(self.opts.newline);
        self.print_query(&merge.source, depth + 1)?;
        self.out.push_str(self.opts.newline);
        self.out.push_str(&self.indent(depth));
        self.out.push(')');
        if let Some(alias) = &merge.source_alias {
            self.out.push(' ');
            self.push_kw("as");
            self.out.push(' ');
            self.out.push_str(&self.ident(alias));
        }
        self.out.push(' ');
        self.push_kw("on");
        self.out.push(' ');
        let rendered = self.print_value(&merge.on, 0, false);
        self.out.push_str(&rendered);
        for when in &merge.whens {
            let line_sep = if self.opts.when_one_line { " " } else { self.opts.newline };
            self.out.push_str(self.opts.newline);
            self.out.push_str(&self.indent(depth));
            self.push_kw("when");
            self.out.push(' ');
            self.push_kw(match when.match_class {
                MergeMatchClass::Matched => "matched",
                MergeMatchClass::NotMatched => "not matched",
                MergeMatchClass::NotMatchedBySource => "not matched by source",
            });
            if let Some(pred) = &when.extra_predicate {
                self.out.push(' ');
                self.push_kw("and");
                self.out.push(' ');
                let rendered = self.print_value(pred, 0, false);
                self.out.push_str(&rendered);
            }
            self.out.push(' ');
            self.push_kw("then");
            self.out.push_str(line_sep);
            match &when.action {
                MergeAction::Update(sets) => {
                    self.push_kw("update set");
                    self.out.push(' ');
                    let assignments: Vec<String> =
                        sets.iter().map(|(c, v)| format!("{} = {}", self.ident(c), self.print_value(v, 0, false))).collect();
                    self.out.push_str(&assignments.join(", "));
                }
                MergeAction::Insert { columns, values } => {
                    self.push_kw("insert");
                    if !columns.is_empty() {
                        let sep = if self.opts.insert_columns_one_line {
                            ", ".to_string()
                        } else {
                            format!(",{}{}", self.opts.newline, self.indent(depth + 1))
                        };
                        self.out.push_str(" (");
                        self.out.push_str(&columns.iter().map(|c| self.ident(c)).collect::<Vec<_>>().join(&sep));
                        self.out.push(')');
                    }
                    self.out.push(' ');
                    self.push_kw("values");
                    self.out.push_str(" (");
                    let rendered: Vec<String> =
                        values.iter().map(|v| self.print_value(v, 0, false)).collect();
                    self.out.push_str(&rendered.join(", "));
                    self.out.push(')');
                }
                MergeAction::Delete => self.push_kw("delete"),
                MergeAction::DoNothing => self.push_kw("do nothing"),
            }
        }
        Ok(())
    }

    fn print_delete(&mut self, delete: &DeleteQuery, depth: usize) -> Result<(), FormatError> {
        self.out.push_str(&self.indent(depth));
        self.push_kw("delete from");
        self.out.push(' ');
        self.out.push_str(&self.dotted(&delete.target.name));
        if let Some(alias) = &delete.target.alias {
            self.out.push(' ');
            self.push_kw("as");
            self.out.push(' ');
            self.out.push_str(&self.ident(alias));
        }
        if let Some(using) = &delete.using {
            self.out.push_str(self.opts.newline);
            self.out.push_str(&self.indent(depth));
            self.push_kw("using");
            self.out.push_str(" (");
            self.out.push_str(self.opts.newline);
            self.print_query(using, depth + 1)?;
            self.out.push_str(self.opts.newline);
            self.out.push_str(&self.indent(depth));
            self.out.push(')');
        }
        if let Some(w) = &delete.where_clause {
            self.out.push_str(self.opts.newline);
            self.out.push_str(&self.indent(depth));
            self.push_kw("where");
            self.out.push(' ');
            let rendered = self.print_value(w, 0, false);
            self.out.push_str(&rendered);
        }
        Ok(())
    }

    fn print_window_spec(&mut self, spec: &WindowSpec) -> String {
        let mut parts = Vec::new();
        if !spec.partition_by.is_empty() {
            parts.push(format!(
                "{} {}",
                self.kw("partition by"),
                spec.partition_by.iter().map(|e| self.print_value(e, 0, false)).collect::<Vec<_>>().join(", ")
            ));
        }
        if !spec.order_by.is_empty() {
            parts.push(format!("{} {}", self.kw("order by"), self.print_order_items(&spec.order_by)));
        }
        parts.join(" ")
    }

    fn print_order_items(&mut self, items: &[OrderItem]) -> String {
        items
            .iter()
            .map(|item| {
                let mut s = self.print_value(&item.expr, 0, false);
                if !item.ascending {
                    s.push(' ');
                    s.push_str(&self.kw("desc"));
                }
                match item.nulls {
                    NullsOrder::Default => {}
                    NullsOrder::First => {
                        s.push(' ');
                        s.push_str(&self.kw("nulls first"));
                    }
                    NullsOrder::Last => {
                        s.push(' ');
                        s.push_str(&self.kw("nulls last"));
                    }
                }
                s
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders a value expression, wrapping in parens when `parent_bp` demands
    /// it to preserve the original precedence grouping.
    fn print_value(&mut self, value: &ValueComponent, parent_bp: u8, is_right_of_left_assoc: bool) -> String {
        match value {
            // `raw` is already source-faithful (quotes and all) for every kind.
            ValueComponent::Literal(lit) => lit.raw.to_string(),
            ValueComponent::Parameter(p) => {
                self.record_param(&p.name);
                match self.opts.parameter_style {
                    ParameterStyle::Named => format!("{}{}", self.opts.parameter_symbol, p.name),
                    ParameterStyle::Positional => {
                        let n = self.seen_params.get_index_of(&p.name).expect("just recorded above") + 1;
                        format!("${n}")
                    }
                    ParameterStyle::Anonymous => "?".to_string(),
                }
            }
            ValueComponent::Column(c) => {
                if c.namespaces.is_empty() {
                    self.ident(&c.column)
                } else {
                    format!("{}.{}", self.dotted(&c.namespaces), self.ident(&c.column))
                }
            }
            ValueComponent::Wildcard { namespaces, .. } => {
                if namespaces.is_empty() {
                    "*".to_string()
                } else {
                    format!("{}.*", self.dotted(namespaces))
                }
            }
            ValueComponent::Binary { op, left, right, .. } => {
                let bp = binary_bp(*op);
                let left_s = self.print_value(left, bp, false);
                let right_s = self.print_value(right, bp, true);
                let kw = self.kw(binary_op_kw(*op));
                let breaks = matches!(op, BinaryOp::And | BinaryOp::Or) && matches!(self.opts.and_break, BooleanBreak::NewLine);
                let rendered =
                    if breaks { format!("{left_s}{}{kw} {right_s}", self.opts.newline) } else { format!("{left_s} {kw} {right_s}") };
                if bp < parent_bp || (bp == parent_bp && is_right_of_left_assoc) {
                    format!("({rendered})")
                } else {
                    rendered
                }
            }
            ValueComponent::Unary { op, operand, .. } => match op {
                UnaryOp::Not => {
                    let inner = self.print_value(operand, NOT_BP, false);
                    let rendered = format!("{} {inner}", self.kw("not"));
                    if NOT_BP < parent_bp {
                        format!("({rendered})")
                    } else {
                        rendered
                    }
                }
                UnaryOp::Neg => {
                    let inner = self.print_value(operand, NEG_BP, false);
                    let rendered = format!("-{inner}");
                    if NEG_BP < parent_bp {
                        format!("({rendered})")
                    } else {
                        rendered
                    }
                }
            },
            ValueComponent::Function { name, args, distinct, over, .. } => {
                let mut s = format!("{name}(");
                if *distinct {
                    s.push_str(&self.kw("distinct"));
                    s.push(' ');
                }
                s.push_str(&args.iter().map(|a| self.print_value(a, 0, false)).collect::<Vec<_>>().join(", "));
                s.push(')');
                if let Some(spec) = over {
                    s.push(' ');
                    s.push_str(&self.kw("over"));
                    s.push_str(" (");
                    s.push_str(&self.print_window_spec(spec));
                    s.push(')');
                }
                s
            }
            ValueComponent::Cast { expr, type_name, .. } => {
                format!("{}({} {} {type_name})", self.kw("cast"), self.print_value(expr, 0, false), self.kw("as"))
            }
            ValueComponent::Case { operand, whens, else_branch, .. } => {
                let mut s = self.kw("case");
                if let Some(o) = operand {
                    s.push(' ');
                    s.push_str(&self.print_value(o, 0, false));
                }
                for (cond, result) in whens {
                    s.push(' ');
                    s.push_str(&self.kw("when"));
                    s.push(' ');
                    s.push_str(&self.print_value(cond, 0, false));
                    s.push(' ');
                    s.push_str(&self.kw("then"));
                    s.push(' ');
                    s.push_str(&self.print_value(result, 0, false));
                }
                if let Some(e) = else_branch {
                    s.push(' ');
                    s.push_str(&self.kw("else"));
                    s.push(' ');
                    s.push_str(&self.print_value(e, 0, false));
                }
                s.push(' ');
                s.push_str(&self.kw("end"));
                s
            }
            ValueComponent::Subquery { query, .. } => {
                let mut sub = Printer::new(self.opts);
                let _ = sub.print_query(query, 1);
                self.params.extend(sub.params.iter().filter(|p| self.seen_params.insert((*p).clone())).cloned());
                format!("({}{}{})", self.opts.newline, sub.out, self.opts.newline)
            }
            ValueComponent::ValueList { items, .. } => {
                let sep = if self.opts.parentheses_one_line { ", ".to_string() } else { format!(",{}", self.opts.newline) };
                format!("({})", items.iter().map(|i| self.print_value(i, 0, false)).collect::<Vec<_>>().join(&sep))
            }
            ValueComponent::Array { items, .. } => {
                format!("array({})", items.iter().map(|i| self.print_value(i, 0, false)).collect::<Vec<_>>().join(", "))
            }
        }
    }
}

const NOT_BP: u8 = 5;
const NEG_BP: u8 = 14;

fn binary_bp(op: BinaryOp) -> u8 {
    use BinaryOp::*;
    match op {
        Or => 1,
        And => 3,
        Eq | NotEq | Lt | Gt | LtEq | GtEq | Like | ILike | In | Is => 6,
        Concat => 8,
        Add | Sub => 10,
        Mul | Div | Mod => 12,
    }
}

fn binary_op_kw(op: BinaryOp) -> &'static str {
    use BinaryOp::*;
    match op {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Mod => "%",
        Concat => "||",
        Eq => "=",
        NotEq => "<>",
        Lt => "<",
        Gt => ">",
        LtEq => "<=",
        GtEq => ">=",
        And => "and",
        Or => "or",
        Like => "like",
        ILike => "ilike",
        In => "in",
        Is => "is",
    }
}

#[cfg(test)]
mod tests {
    use sqlcraft_parser::parse;

    use super::*;

    #[test]
    fn renders_simple_select_lowercase() {
        let query = parse("SELECT a.id, a.name FROM article AS a WHERE a.price > 10").unwrap();
        let printed = format(&query, &PrinterOptions::generic()).unwrap();
        assert_eq!(printed.text, "select a.id, a.name\nfrom article as a\nwhere a.price > 10");
    }

    #[test]
    fn quotes_identifiers_in_postgres_preset() {
        let query = parse("select a.price from article as a").unwrap();
        let printed = format(&query, &PrinterOptions::postgres()).unwrap();
        assert_eq!(printed.text, "select \"a\".\"price\"\nfrom \"article\" as \"a\"");
    }

    #[test]
    fn preserves_precedence_with_parens() {
        let query = parse("select (a + b) * c from t").unwrap();
        let printed = format(&query, &PrinterOptions::generic()).unwrap();
        assert_eq!(printed.text, "select (a + b) * c\nfrom t");
    }

    #[test]
    fn drops_redundant_parens_around_equal_precedence_left_operand() {
        let query = parse("select (a - b) - c from t").unwrap();
        let printed = format(&query, &PrinterOptions::generic()).unwrap();
        assert_eq!(printed.text, "select a - b - c\nfrom t");
    }

    #[test]
    fn keeps_parens_needed_for_right_operand_of_non_associative_op() {
        let query = parse("select a - (b - c) from t").unwrap();
        let printed = format(&query, &PrinterOptions::generic()).unwrap();
        assert_eq!(printed.text, "select a - (b - c)\nfrom t");
    }

    #[test]
    fn named_parameters_are_collected_once() {
        let query = parse("select id from t where a = :x and b = :x").unwrap();
        let printed = format(&query, &PrinterOptions::generic()).unwrap();
        assert_eq!(printed.parameters, vec![SmolStr::from("x")]);
    }

    #[test]
    fn positional_style_renumbers_by_emission_order_ignoring_source_style() {
        let query = parse("select id from t where a = :x and b = :y").unwrap();
        let mut options = PrinterOptions::generic();
        options.parameter_style = ParameterStyle::Positional;
        let printed = format(&query, &options).unwrap();
        assert_eq!(printed.text, "select id\nfrom t\nwhere a = $1 and b = $2");
    }

    #[test]
    fn positional_style_reuses_number_for_a_repeated_name() {
        let query = parse("select id from t where a = :x and b = :x").unwrap();
        let mut options = PrinterOptions::generic();
        options.parameter_style = ParameterStyle::Positional;
        let printed = format(&query, &options).unwrap();
        assert_eq!(printed.text, "select id\nfrom t\nwhere a = $1 and b = $1");
    }

    #[test]
    fn anonymous_style_ignores_the_original_name() {
        let query = parse("select id from t where a = :x").unwrap();
        let mut options = PrinterOptions::generic();
        options.parameter_style = ParameterStyle::Anonymous;
        let printed = format(&query, &options).unwrap();
        assert_eq!(printed.text, "select id\nfrom t\nwhere a = ?");
    }

    #[test]
    fn and_break_new_line_breaks_before_the_keyword() {
        let query = parse("select id from t where a = 1 and b = 2").unwrap();
        let mut options = PrinterOptions::generic();
        options.and_break = BooleanBreak::NewLine;
        let printed = format(&query, &options).unwrap();
        assert_eq!(printed.text, "select id\nfrom t\nwhere a = 1\nand b = 2");
    }

    #[test]
    fn comma_break_after_breaks_right_after_the_comma() {
        let query = parse("select a, b, c from t").unwrap();
        let mut options = PrinterOptions::generic();
        options.comma_break = CommaStyle::After;
        let printed = format(&query, &options).unwrap();
        assert_eq!(printed.text, "select a,\n    b,\n    c\nfrom t");
    }

    #[test]
    fn comma_break_before_breaks_ahead_of_the_comma() {
        let query = parse("select a, b, c from t").unwrap();
        let mut options = PrinterOptions::generic();
        options.comma_break = CommaStyle::Before;
        let printed = format(&query, &options).unwrap();
        assert_eq!(printed.text, "select a\n    , b\n    , c\nfrom t");
    }

    #[test]
    fn insert_columns_one_line_false_breaks_the_column_list() {
        let query = parse("merge into t using (select 1 as id, 2 as x) s on t.id = s.id when not matched then insert (id, x) values (s.id, s.x)").unwrap();
        let mut options = PrinterOptions::generic();
        options.insert_columns_one_line = false;
        let printed = format(&query, &options).unwrap();
        assert!(printed.text.contains("insert (id,\n    x)"));
    }

    #[test]
    fn parentheses_one_line_false_breaks_a_value_list() {
        let query = parse("select id from t where a in (1, 2, 3)").unwrap();
        let mut options = PrinterOptions::generic();
        options.parentheses_one_line = false;
        let printed = format(&query, &options).unwrap();
        assert_eq!(printed.text, "select id\nfrom t\nwhere a in (1,\n2,\n3)");
    }

    #[test]
    fn separator_comment_round_trips_as_block() {
        use sqlcraft_ast::{CommentPlacement, PositionedComment};
        let mut query = parse("select id from t").unwrap();
        if let Query::SimpleSelect(s) = &mut query {
            s.trivia.push(PositionedComment { placement: CommentPlacement::Before, text: "----------".into(), block: false });
        }
        let printed = format(&query, &PrinterOptions::generic()).unwrap();
        assert!(printed.text.starts_with("/* ---------- */\n"));
    }
}
