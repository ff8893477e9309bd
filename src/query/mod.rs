//! Query building blocks.
//!
//! - [`Expression`] - composable `$filter` predicates
//! - [`Field`] - property reference producing comparison expressions
//! - [`QueryParameters`] - the system query options an entity object accumulates
//!
//! # Example
//!
//! ```
//! use odata_orm::query::Field;
//!
//! let name = Field::new("Name");
//! let id = Field::new("Id");
//! let expr = name.equals("Foo").or(&id.greater_than(10));
//! assert_eq!(expr.to_string(), "(Name eq 'Foo') or (Id gt 10)");
//! ```

pub mod expression;
pub mod field;
pub mod params;

pub use expression::Expression;
pub use field::{ComparisonOperator, Field, FilterValue};
pub use params::{Format, QueryParameters, SortDirection};
