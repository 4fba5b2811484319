use smol_str::SmolStr;

use crate::trivia::Trivia;
use crate::value::{OrderItem, ValueComponent, WindowSpec};
use crate::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Expr { expr: ValueComponent, alias: Option<SmolStr>, span: Span },
    Wildcard { namespaces: Vec<SmolStr>, span: Span },
}

impl SelectItem {
    /// Explicit alias if present, else the bare column identifier. Wildcards
    /// have no output name.
    pub fn output_name(&self) -> Option<&str> {
        match self {
            SelectItem::Expr { expr, alias, .. } => {
                alias.as_deref().or_else(|| expr.implicit_output_name())
            }
            SelectItem::Wildcard { .. } => None,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            SelectItem::Expr { span, .. } | SelectItem::Wildcard { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectClause {
    pub items: Vec<SelectItem>,
    pub distinct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FromItem {
    Table { name: Vec<SmolStr>, alias: Option<SmolStr>, span: Span },
    Subquery { query: Box<Query>, alias: Option<SmolStr>, span: Span },
    Join {
        left: Box<FromItem>,
        right: Box<FromItem>,
        join_type: JoinType,
        on: Option<ValueComponent>,
        using: Vec<SmolStr>,
        span: Span,
    },
}

impl FromItem {
    pub fn alias(&self) -> Option<&str> {
        match self {
            FromItem::Table { alias, .. } | FromItem::Subquery { alias, .. } => alias.as_deref(),
            FromItem::Join { .. } => None,
        }
    }

    /// The final identifier in a table's dotted name, used when no alias is given.
    pub fn implicit_name(&self) -> Option<&str> {
        match self {
            FromItem::Table { name, .. } => name.last().map(SmolStr::as_str),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FromClause {
    pub items: Vec<FromItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimitClause {
    pub limit: Option<ValueComponent>,
    pub offset: Option<ValueComponent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedWindow {
    pub name: SmolStr,
    pub spec: WindowSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CteDefinition {
    pub name: SmolStr,
    pub column_names: Option<Vec<SmolStr>>,
    pub query: Box<Query>,
    pub span: Span,
    pub trivia: Trivia,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WithClause {
    pub recursive: bool,
    /// Insertion order preserved: dependency resolution and re-emission both
    /// rely on CTEs appearing in declaration order.
    pub ctes: Vec<CteDefinition>,
}

impl WithClause {
    pub fn find(&self, name: &str) -> Option<&CteDefinition> {
        self.ctes.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleSelect {
    pub with: Option<WithClause>,
    pub select: SelectClause,
    pub from: Option<FromClause>,
    pub where_clause: Option<ValueComponent>,
    pub group_by: Vec<ValueComponent>,
    pub having: Option<ValueComponent>,
    pub windows: Vec<NamedWindow>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<LimitClause>,
    pub span: Span,
    pub trivia: Trivia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperatorKind {
    Union,
    Intersect,
    Except,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOperator {
    pub kind: SetOperatorKind,
    pub all: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinarySelect {
    /// Present only when a `WITH` prefixes the whole set-operation chain rather
    /// than just one branch (e.g. `WITH a AS (...) SELECT ... UNION SELECT ...`).
    /// A `WITH` written inside one branch instead stays on that branch's own
    /// `SimpleSelect.with`.
    pub with: Option<WithClause>,
    pub left: Box<Query>,
    pub op: SetOperator,
    pub right: Box<Query>,
    pub span: Span,
    pub trivia: Trivia,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuesQuery {
    pub rows: Vec<Vec<ValueComponent>>,
    pub span: Span,
    pub trivia: Trivia,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: Vec<SmolStr>,
    pub alias: Option<SmolStr>,
    pub span: Span,
}

impl TableRef {
    pub fn effective_alias(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.name.last().map(SmolStr::as_str).unwrap_or(""))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMatchClass {
    Matched,
    NotMatched,
    NotMatchedBySource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeAction {
    Update(Vec<(SmolStr, ValueComponent)>),
    Insert { columns: Vec<SmolStr>, values: Vec<ValueComponent> },
    Delete,
    DoNothing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeWhen {
    pub match_class: MergeMatchClass,
    pub extra_predicate: Option<ValueComponent>,
    pub action: MergeAction,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeQuery {
    pub target: TableRef,
    pub source: Box<Query>,
    pub source_alias: Option<SmolStr>,
    pub on: ValueComponent,
    /// Declaration-order WHEN list: match classes can repeat with different
    /// extra predicates, so only the first one that matches fires.
    pub whens: Vec<MergeWhen>,
    pub span: Span,
    pub trivia: Trivia,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    pub target: TableRef,
    pub using: Option<Box<Query>>,
    pub where_clause: Option<ValueComponent>,
    pub span: Span,
    pub trivia: Trivia,
}

/// Top-level statement node: a plain `SELECT`, a set-operation chain, a bare
/// `VALUES` list, or a `MERGE`/`DELETE`.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    SimpleSelect(Box<SimpleSelect>),
    BinarySelect(Box<BinarySelect>),
    Values(Box<ValuesQuery>),
    Merge(Box<MergeQuery>),
    Delete(Box<DeleteQuery>),
}

impl Query {
    pub fn span(&self) -> Span {
        match self {
            Query::SimpleSelect(s) => s.span,
            Query::BinarySelect(s) => s.span,
            Query::Values(s) => s.span,
            Query::Merge(s) => s.span,
            Query::Delete(s) => s.span,
        }
    }

    /// The WITH clause attached directly to this query node, if any. `BinarySelect`
    /// branches carry their own WITH clauses independently; this does not recurse.
    pub fn with_clause(&self) -> Option<&WithClause> {
        match self {
            Query::SimpleSelect(s) => s.with.as_ref(),
            Query::BinarySelect(b) => b.with.as_ref(),
            _ => None,
        }
    }

    pub fn with_clause_mut(&mut self) -> Option<&mut WithClause> {
        match self {
            Query::SimpleSelect(s) => s.with.as_mut(),
            Query::BinarySelect(b) => b.with.as_mut(),
            _ => None,
        }
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Query::Values(_))
    }
}
