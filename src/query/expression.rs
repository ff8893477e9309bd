//! Filter expressions.
//!
//! An [`Expression`] is an opaque `$filter` predicate fragment. Combining
//! two expressions always parenthesizes both sides, so arbitrarily nested
//! `and`/`or` trees render with unambiguous grouping:
//!
//! ```text
//! a.and(b).or(c)  =>  ((a) and (b)) or (c)
//! ```

use std::fmt;

/// A boolean predicate in OData filter syntax.
///
/// Expressions are immutable; `and`/`or` borrow their operands and return
/// a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression(String);

impl Expression {
    /// Wrap a raw predicate, e.g. `"Name eq 'Foo'"`.
    ///
    /// The predicate is not validated.
    pub fn new(predicate: impl Into<String>) -> Self {
        Self(predicate.into())
    }

    /// Conjunction: `(<self>) and (<other>)`.
    pub fn and(&self, other: &Expression) -> Expression {
        Self::combine(self, "and", other)
    }

    /// Disjunction: `(<self>) or (<other>)`.
    pub fn or(&self, other: &Expression) -> Expression {
        Self::combine(self, "or", other)
    }

    /// Fold a list of expressions with `and`.
    ///
    /// Returns `None` for an empty list; a single expression is returned
    /// unchanged.
    pub fn all<'a>(exprs: impl IntoIterator<Item = &'a Expression>) -> Option<Expression> {
        exprs.into_iter().fold(None, |acc, expr| match acc {
            None => Some(expr.clone()),
            Some(prev) => Some(prev.and(expr)),
        })
    }

    /// The rendered predicate.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn combine(left: &Expression, op: &str, right: &Expression) -> Expression {
        Expression(format!("({}) {} ({})", left.0, op, right.0))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Expression {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Expression {
    fn from(s: String) -> Self {
        Self(s)
    }
}
