use smol_str::SmolStr;

/// A value bound to an injected parameter. Distinct from [`sqlcraft_ast::Literal`]:
/// this is the runtime value reported back in the parameter map, not SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Bound to a single `:col_any` parameter by [`ColumnCondition::Any`].
    Array(Vec<ScalarValue>),
}

/// The closed set of per-column predicate shapes `inject` can generate. Stands
/// in for a dynamic `{=, !=, <, ...}` operator map: invalid operators are a
/// compile error here rather than a runtime one.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnCondition {
    /// Scalar equality. Also what the `{col: value}` shorthand builds.
    Eq(ScalarValue),
    NotEq(ScalarValue),
    Lt(ScalarValue),
    Gt(ScalarValue),
    LtEq(ScalarValue),
    GtEq(ScalarValue),
    Like(ScalarValue),
    ILike(ScalarValue),
    /// One parameter per element, `:col_in_0`, `:col_in_1`, ...
    In(Vec<ScalarValue>),
    /// A single array-valued parameter, rendered as `col = any(:col_any)`.
    Any(Vec<ScalarValue>),
    /// `min`/`max` may appear independently or together; present keys are
    /// conjoined. At least one of the two must be `Some`.
    Range { min: Option<ScalarValue>, max: Option<ScalarValue> },
}

/// One node of the condition tree passed to `inject`. `And` groups are the
/// only form of explicit nesting; parameter names gain an `_and_<position>`
/// infix per level of nesting they sit under.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Column { name: SmolStr, condition: ColumnCondition },
    And(Vec<Condition>),
}

impl Condition {
    /// Shorthand for the common case: `col = value`.
    pub fn eq(name: impl Into<SmolStr>, value: ScalarValue) -> Condition {
        Condition::Column { name: name.into(), condition: ColumnCondition::Eq(value) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InjectOptions {
    pub ignore_case_and_underscore: bool,
}
