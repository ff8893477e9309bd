//! Field descriptors for building filter predicates.

use std::fmt;

use super::expression::Expression;

/// Comparison operators supported in `$filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl ComparisonOperator {
    /// OData token for this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "eq",
            ComparisonOperator::Ne => "ne",
            ComparisonOperator::Gt => "gt",
            ComparisonOperator::Ge => "ge",
            ComparisonOperator::Lt => "lt",
            ComparisonOperator::Le => "le",
        }
    }
}

/// A literal on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FilterValue {
    /// Strings are single-quoted (embedded quotes doubled); everything
    /// else is written bare.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            FilterValue::Int(n) => write!(f, "{}", n),
            FilterValue::Float(n) => write!(f, "{}", n),
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::String(s)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        FilterValue::Int(n.into())
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Int(n)
    }
}

impl From<u32> for FilterValue {
    fn from(n: u32) -> Self {
        FilterValue::Int(n.into())
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FilterValue::Null, Into::into)
    }
}

/// A named entity property used as the left-hand side of comparisons.
///
/// Literals are rendered from the value's own type, never the property's:
/// `Field::new("Id").equals(5)` is `Id eq 5` even when `Id` is an
/// `Edm.String`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<field> <op> <value>`
    pub fn compare(&self, op: ComparisonOperator, value: impl Into<FilterValue>) -> Expression {
        Expression::new(format!("{} {} {}", self.name, op.as_str(), value.into()))
    }

    pub fn equals(&self, value: impl Into<FilterValue>) -> Expression {
        self.compare(ComparisonOperator::Eq, value)
    }

    pub fn not_equals(&self, value: impl Into<FilterValue>) -> Expression {
        self.compare(ComparisonOperator::Ne, value)
    }

    pub fn greater_than(&self, value: impl Into<FilterValue>) -> Expression {
        self.compare(ComparisonOperator::Gt, value)
    }

    pub fn greater_or_equal(&self, value: impl Into<FilterValue>) -> Expression {
        self.compare(ComparisonOperator::Ge, value)
    }

    pub fn less_than(&self, value: impl Into<FilterValue>) -> Expression {
        self.compare(ComparisonOperator::Lt, value)
    }

    pub fn less_or_equal(&self, value: impl Into<FilterValue>) -> Expression {
        self.compare(ComparisonOperator::Le, value)
    }
}
