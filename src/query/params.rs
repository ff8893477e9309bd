//! Accumulated OData system query options.

use std::collections::BTreeMap;
use std::fmt;

use super::expression::Expression;
use crate::error::{OrmError, OrmResult};

pub const TOP: &str = "$top";
pub const SKIP: &str = "$skip";
pub const FILTER: &str = "$filter";
pub const SELECT: &str = "$select";
pub const ORDER_BY: &str = "$orderby";
pub const FORMAT: &str = "$format";
pub const COUNT: &str = "$count";

/// Response format requested through `$format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// Parse a format name. Only `json` and `xml` are accepted.
    pub fn parse(s: &str) -> OrmResult<Self> {
        match s {
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            other => Err(OrmError::invalid_parameter(
                FORMAT,
                other,
                "supported formats are json and xml",
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for `$orderby`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Query options collected by an entity object.
///
/// Values are kept typed; [`QueryParameters::to_map`] renders them into
/// the key/value form the transport sends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParameters {
    pub top: Option<u32>,
    pub skip: Option<u32>,
    pub filter: Vec<Expression>,
    pub select: Vec<String>,
    pub order_by: Vec<(String, SortDirection)>,
    pub format: Option<Format>,
    pub count: bool,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether only the record count was requested.
    ///
    /// A count request carries no other options when executed.
    pub fn is_count(&self) -> bool {
        self.count
    }

    /// Combined `$filter` predicate (all filters joined with `and`).
    pub fn filter_expression(&self) -> Option<Expression> {
        Expression::all(&self.filter)
    }

    /// Render every accumulated option.
    ///
    /// Keys are OData system query option names. `$count` is rendered as
    /// `true` when set; executing a count request ignores the other keys.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();

        if let Some(top) = self.top {
            map.insert(TOP.to_string(), top.to_string());
        }
        if let Some(skip) = self.skip {
            map.insert(SKIP.to_string(), skip.to_string());
        }
        if let Some(filter) = self.filter_expression() {
            map.insert(FILTER.to_string(), filter.to_string());
        }
        if !self.select.is_empty() {
            map.insert(SELECT.to_string(), self.select.join(","));
        }
        if !self.order_by.is_empty() {
            let order = self
                .order_by
                .iter()
                .map(|(field, dir)| format!("{} {}", field, dir.as_str()))
                .collect::<Vec<_>>()
                .join(",");
            map.insert(ORDER_BY.to_string(), order);
        }
        if let Some(format) = self.format {
            map.insert(FORMAT.to_string(), format.to_string());
        }
        if self.count {
            map.insert(COUNT.to_string(), "true".to_string());
        }

        map
    }
}
