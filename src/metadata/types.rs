//! Entity schema types produced by the metadata parser.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Capability flags and type reference of an entity set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAttributes {
    /// Qualified entity type (e.g. `c4codata.CorporateAccount`).
    pub entity_type: String,
    pub updatable: bool,
    pub creatable: bool,
    pub deletable: bool,
}

/// A declared property of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// EDM type tag (e.g. `Edm.String`, `Edm.Int32`).
    pub data_type: String,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

impl PropertyDescriptor {
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            nullable: true,
            max_length: None,
        }
    }
}

/// Schema of one entity set exposed by a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub name: String,
    pub attributes: EntityAttributes,
    pub properties: BTreeMap<String, PropertyDescriptor>,
    /// Owning service, filled in on registration.
    #[serde(skip)]
    pub service_name: Option<String>,
}

impl EntitySchema {
    /// A schema with attributes only and no properties yet.
    pub fn new(name: impl Into<String>, attributes: EntityAttributes) -> Self {
        Self {
            name: name.into(),
            attributes,
            properties: BTreeMap::new(),
            service_name: None,
        }
    }

    /// Add a property, replacing any previous one with the same name.
    pub fn with_property(mut self, name: impl Into<String>, property: PropertyDescriptor) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}
