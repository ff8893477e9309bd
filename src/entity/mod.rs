//! Schema-bound entity objects.
//!
//! An [`EntityObject`] plays two roles:
//!
//! - as a query template, it accumulates system query options
//!   (`$filter`, `$select`, `$top`, ...) for the registry to execute
//! - as a record, it holds field values returned by the service
//!
//! Every field access is checked against the bound [`EntitySchema`]. The
//! schema is shared and never mutated by the object.
//!
//! # Example
//!
//! ```ignore
//! let mut widgets = registry.get_object("Widgets", Some("demo"))?;
//! let name = widgets.field("Name")?;
//! widgets
//!     .filter(name.equals("Foo"))
//!     .top(10)
//!     .select(["Id", "Name"])?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{OrmError, OrmResult};
use crate::metadata::EntitySchema;
use crate::query::{Expression, Field, Format, QueryParameters, SortDirection};

/// OData V2 annotation keys that may appear beside the fields of a record.
const RECORD_ANNOTATIONS: &[&str] = &["__metadata", "__count", "__next"];

/// A record or query template for one entity set.
#[derive(Debug, Clone)]
pub struct EntityObject {
    schema: Arc<EntitySchema>,
    /// `None` means the field has not been assigned or populated.
    fields: BTreeMap<String, Option<Value>>,
    parameters: QueryParameters,
    dirty: bool,
}

impl EntityObject {
    /// An empty object with every declared field unset.
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        let fields = schema
            .property_names()
            .map(|name| (name.to_string(), None))
            .collect();

        Self {
            schema,
            fields,
            parameters: QueryParameters::new(),
            dirty: false,
        }
    }

    /// Build an object from one JSON record of a response.
    ///
    /// Every field of the record must be declared by the schema. OData
    /// annotations (`__metadata`, `__count`, `__next`) and deferred navigation links are not
    /// fields and are skipped. The result is not dirty.
    pub fn from_record(schema: Arc<EntitySchema>, record: &Map<String, Value>) -> OrmResult<Self> {
        let mut obj = Self::new(schema);

        for (key, value) in record {
            if RECORD_ANNOTATIONS.contains(&key.as_str()) || is_deferred_link(value) {
                continue;
            }
            let slot = obj
                .fields
                .get_mut(key)
                .ok_or_else(|| OrmError::unknown_field(&obj.schema.name, key))?;
            *slot = Some(value.clone());
        }

        Ok(obj)
    }

    pub fn entity_name(&self) -> &str {
        &self.schema.name
    }

    /// Owning service, if the schema came from a registered service.
    pub fn service_name(&self) -> Option<&str> {
        self.schema.service_name.as_deref()
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Query options accumulated so far.
    pub fn parameters(&self) -> &QueryParameters {
        &self.parameters
    }

    /// Whether any field was assigned through [`EntityObject::set`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // =========================================================================
    // Field access
    // =========================================================================

    /// Current value of a declared field; `None` while unset.
    pub fn get(&self, field: &str) -> OrmResult<Option<&Value>> {
        self.fields
            .get(field)
            .map(Option::as_ref)
            .ok_or_else(|| self.unknown_field(field))
    }

    /// Assign a declared field and mark the object dirty.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> OrmResult<()> {
        let slot = match self.fields.get_mut(field) {
            Some(slot) => slot,
            None => return Err(OrmError::unknown_field(&self.schema.name, field)),
        };
        *slot = Some(value.into());
        self.dirty = true;
        Ok(())
    }

    /// Whether a declared field currently holds a value.
    pub fn is_set(&self, field: &str) -> OrmResult<bool> {
        Ok(self.get(field)?.is_some())
    }

    /// Filter descriptor for a declared field.
    pub fn field(&self, name: &str) -> OrmResult<Field> {
        self.declared(name).map(Field::new)
    }

    /// Populated fields in name order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| (name.as_str(), v)))
    }

    /// Populated fields as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        )
    }

    // =========================================================================
    // Query options
    // =========================================================================

    /// `$top`
    pub fn top(&mut self, count: u32) -> &mut Self {
        self.parameters.top = Some(count);
        self
    }

    /// `$skip`
    pub fn skip(&mut self, count: u32) -> &mut Self {
        self.parameters.skip = Some(count);
        self
    }

    /// Add a `$filter` predicate. Multiple predicates are joined with `and`.
    pub fn filter(&mut self, expr: Expression) -> &mut Self {
        self.parameters.filter.push(expr);
        self
    }

    /// Append fields to `$select`.
    pub fn select<I, S>(&mut self, fields: I) -> OrmResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = fields
            .into_iter()
            .map(|f| self.declared(f.as_ref()).map(str::to_string))
            .collect::<OrmResult<Vec<_>>>()?;

        for field in fields {
            if !self.parameters.select.contains(&field) {
                self.parameters.select.push(field);
            }
        }
        Ok(self)
    }

    /// Append a field to `$orderby`.
    pub fn order_by(&mut self, field: &str, direction: SortDirection) -> OrmResult<&mut Self> {
        self.declared(field)?;
        self.parameters.order_by.push((field.to_string(), direction));
        Ok(self)
    }

    /// `$format`; only `json` and `xml` are accepted.
    pub fn format(&mut self, fmt: &str) -> OrmResult<&mut Self> {
        self.parameters.format = Some(Format::parse(fmt)?);
        Ok(self)
    }

    /// Request the record count only.
    ///
    /// Other options stay recorded but are not sent with a count request.
    pub fn count(&mut self) -> &mut Self {
        self.parameters.count = true;
        self
    }

    fn declared<'a>(&self, field: &'a str) -> OrmResult<&'a str> {
        if self.schema.has_property(field) {
            Ok(field)
        } else {
            Err(self.unknown_field(field))
        }
    }

    fn unknown_field(&self, field: &str) -> OrmError {
        OrmError::unknown_field(&self.schema.name, field)
    }
}

/// `{"__deferred": {"uri": ...}}` placeholders for unexpanded navigation properties.
fn is_deferred_link(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.len() == 1 && obj.contains_key("__deferred"))
}
