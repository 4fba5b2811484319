use smol_str::SmolStr;

use crate::query::Query;
use crate::trivia::Trivia;
use crate::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    String,
    DialectString,
    Boolean,
    Null,
    DateTimeKeyword,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Source-faithful text (already lexer-normalized, e.g. `.5` -> `0.5`).
    pub raw: SmolStr,
    pub span: Span,
    pub trivia: Trivia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    Named,
    Positional,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamRef {
    pub style: ParamStyle,
    /// Name without its sigil (`name` for `:name`, `1` for `$1`, empty for `?`).
    pub name: SmolStr,
    pub span: Span,
    pub trivia: Trivia,
}

/// A (possibly namespace-qualified) column reference.
///
/// `namespaces` is either empty or a non-empty sequence of identifiers naming a
/// table, schema, or CTE alias; the final segment is always `column`, held
/// separately.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub namespaces: Vec<SmolStr>,
    pub column: SmolStr,
    pub span: Span,
    pub trivia: Trivia,
}

impl ColumnRef {
    pub fn unqualified(column: impl Into<SmolStr>, span: Span) -> Self {
        ColumnRef { namespaces: Vec::new(), column: column.into(), span, trivia: Trivia::default() }
    }

    pub fn qualified_name(&self) -> String {
        if self.namespaces.is_empty() {
            self.column.to_string()
        } else {
            format!("{}.{}", self.namespaces.join("."), self.column)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    Like,
    ILike,
    In,
    Is,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub partition_by: Vec<ValueComponent>,
    pub order_by: Vec<OrderItem>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    Default,
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expr: ValueComponent,
    pub ascending: bool,
    pub nulls: NullsOrder,
}

/// The sum type over every value-expression shape the parser can produce.
///
/// Kept as one flat enum (rather than a trait-object tree) so every transformer
/// gets exhaustive-match safety: adding a variant is a compile error everywhere
/// it isn't handled.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueComponent {
    Literal(Literal),
    Parameter(ParamRef),
    Column(ColumnRef),
    Wildcard { namespaces: Vec<SmolStr>, span: Span, trivia: Trivia },
    Binary { op: BinaryOp, left: Box<ValueComponent>, right: Box<ValueComponent>, span: Span, trivia: Trivia },
    Unary { op: UnaryOp, operand: Box<ValueComponent>, span: Span, trivia: Trivia },
    Function {
        name: SmolStr,
        args: Vec<ValueComponent>,
        distinct: bool,
        over: Option<WindowSpec>,
        span: Span,
        trivia: Trivia,
    },
    Cast { expr: Box<ValueComponent>, type_name: SmolStr, span: Span, trivia: Trivia },
    Case {
        operand: Option<Box<ValueComponent>>,
        whens: Vec<(ValueComponent, ValueComponent)>,
        else_branch: Option<Box<ValueComponent>>,
        span: Span,
        trivia: Trivia,
    },
    Subquery { query: Box<Query>, span: Span, trivia: Trivia },
    ValueList { items: Vec<ValueComponent>, span: Span, trivia: Trivia },
    Array { items: Vec<ValueComponent>, span: Span, trivia: Trivia },
}

impl ValueComponent {
    pub fn span(&self) -> Span {
        match self {
            ValueComponent::Literal(l) => l.span,
            ValueComponent::Parameter(p) => p.span,
            ValueComponent::Column(c) => c.span,
            ValueComponent::Wildcard { span, .. }
            | ValueComponent::Binary { span, .. }
            | ValueComponent::Unary { span, .. }
            | ValueComponent::Function { span, .. }
            | ValueComponent::Cast { span, .. }
            | ValueComponent::Case { span, .. }
            | ValueComponent::Subquery { span, .. }
            | ValueComponent::ValueList { span, .. }
            | ValueComponent::Array { span, .. } => *span,
        }
    }

    pub fn trivia(&self) -> &Trivia {
        match self {
            ValueComponent::Literal(l) => &l.trivia,
            ValueComponent::Parameter(p) => &p.trivia,
            ValueComponent::Column(c) => &c.trivia,
            ValueComponent::Wildcard { trivia, .. }
            | ValueComponent::Binary { trivia, .. }
            | ValueComponent::Unary { trivia, .. }
            | ValueComponent::Function { trivia, .. }
            | ValueComponent::Cast { trivia, .. }
            | ValueComponent::Case { trivia, .. }
            | ValueComponent::Subquery { trivia, .. }
            | ValueComponent::ValueList { trivia, .. }
            | ValueComponent::Array { trivia, .. } => trivia,
        }
    }

    /// The output name a bare projection of this expression would expose:
    /// the column name for a column reference, else `None` (callers fall back
    /// to an explicit `AS` alias, which lives on the owning `SelectItem`).
    pub fn implicit_output_name(&self) -> Option<&str> {
        match self {
            ValueComponent::Column(c) => Some(c.column.as_str()),
            _ => None,
        }
    }
}
