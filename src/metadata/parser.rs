//! EDMX metadata document parsing.
//!
//! Parsing is a single ordered pass:
//!
//! 1. every `EntitySet` of the `EntityContainer` seeds an [`EntitySchema`]
//!    with its capability flags
//! 2. each seed takes its properties from the `EntityType` it references,
//!    matched by namespace-qualified name, falling back to a type named
//!    like the set
//!
//! Entity types that no entity set exposes are dropped.

use std::collections::BTreeMap;

use roxmltree::{Document, Node};

use super::types::{EntityAttributes, EntitySchema, PropertyDescriptor};
use crate::error::{OrmError, OrmResult};

pub const EDMX_NS: &str = "http://schemas.microsoft.com/ado/2007/06/edmx";
pub const METADATA_NS: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/metadata";
pub const EDM_NS: &str = "http://schemas.microsoft.com/ado/2008/09/edm";
pub const SAP_NS: &str = "http://www.sap.com/Protocols/SAPData";

/// Output of a metadata parse.
#[derive(Debug, Clone, Default)]
pub struct ParsedMetadata {
    /// `m:DataServiceVersion` of the data services schema, if declared.
    pub data_service_version: Option<String>,
    pub entities: BTreeMap<String, EntitySchema>,
}

/// Parse an EDMX document into entity schemas keyed by entity set name.
pub fn parse_metadata(xml: &str) -> OrmResult<ParsedMetadata> {
    let doc = Document::parse(xml).map_err(|e| OrmError::SchemaParse(e.to_string()))?;
    let root = doc.root_element();

    // Restrict the search to edmx:DataServices when the document is wrapped
    // in the usual Edmx envelope.
    let scope = root
        .descendants()
        .find(|n| n.has_tag_name((EDMX_NS, "DataServices")))
        .unwrap_or(root);

    let data_service_version = scope
        .attribute((METADATA_NS, "DataServiceVersion"))
        .map(str::to_string);

    let container = scope
        .descendants()
        .find(|n| n.has_tag_name((EDM_NS, "EntityContainer")))
        .ok_or(OrmError::MissingEntityContainer)?;

    let mut entities = BTreeMap::new();
    for set in container
        .children()
        .filter(|n| n.has_tag_name((EDM_NS, "EntitySet")))
    {
        let name = match set.attribute("Name") {
            Some(name) if !name.is_empty() => name,
            _ => continue,
        };
        // First declaration wins.
        if entities.contains_key(name) {
            continue;
        }
        entities.insert(name.to_string(), EntitySchema::new(name, parse_attributes(set)));
    }

    let types = collect_entity_types(scope);
    let mut used = vec![false; types.len()];

    for schema in entities.values_mut() {
        if let Some(index) = resolve_type(&types, schema) {
            schema.properties = types[index].properties.clone();
            used[index] = true;
        }
    }

    for (declared, _) in types.iter().zip(&used).filter(|(_, used)| !**used) {
        tracing::debug!(
            entity_type = %declared.qualified_name,
            "entity type not exposed by any entity set"
        );
    }

    tracing::debug!(
        entities = entities.len(),
        version = data_service_version.as_deref().unwrap_or("unknown"),
        "parsed metadata document"
    );

    Ok(ParsedMetadata {
        data_service_version,
        entities,
    })
}

/// An `EntityType` with the names it can be referenced by.
struct DeclaredType<'a> {
    name: &'a str,
    qualified_name: String,
    alias_name: Option<String>,
    properties: BTreeMap<String, PropertyDescriptor>,
}

/// Entity types in document order, qualified by their enclosing schema.
fn collect_entity_types<'a>(scope: Node<'a, '_>) -> Vec<DeclaredType<'a>> {
    scope
        .descendants()
        .filter(|n| n.has_tag_name((EDM_NS, "EntityType")))
        .filter_map(|entity_type| {
            let name = entity_type.attribute("Name")?;
            let schema = entity_type
                .ancestors()
                .find(|n| n.has_tag_name((EDM_NS, "Schema")));
            let namespace = schema.and_then(|s| s.attribute("Namespace"));
            let alias = schema.and_then(|s| s.attribute("Alias"));

            Some(DeclaredType {
                name,
                qualified_name: match namespace {
                    Some(ns) => format!("{}.{}", ns, name),
                    None => name.to_string(),
                },
                alias_name: alias.map(|a| format!("{}.{}", a, name)),
                properties: parse_properties(entity_type),
            })
        })
        .collect()
}

/// Pick the type backing an entity set.
///
/// The set's `EntityType` reference wins: an exact qualified match first,
/// then an unqualified reference by name. A type named like the set is the
/// fallback. Ties go to the first declaration.
fn resolve_type(types: &[DeclaredType<'_>], schema: &EntitySchema) -> Option<usize> {
    let reference = schema.attributes.entity_type.as_str();

    let by_reference = || {
        types.iter().position(|t| {
            t.qualified_name == reference || t.alias_name.as_deref() == Some(reference)
        })
    };
    let by_unqualified_reference = || {
        if reference.contains('.') {
            None
        } else {
            types.iter().position(|t| t.name == reference)
        }
    };
    let by_set_name = || types.iter().position(|t| t.name == schema.name);

    if reference.is_empty() {
        return by_set_name();
    }
    by_reference()
        .or_else(by_unqualified_reference)
        .or_else(by_set_name)
}

fn parse_attributes(set: Node<'_, '_>) -> EntityAttributes {
    EntityAttributes {
        entity_type: set.attribute("EntityType").unwrap_or_default().to_string(),
        updatable: parse_flag(set.attribute((SAP_NS, "updatable"))),
        creatable: parse_flag(set.attribute((SAP_NS, "creatable"))),
        deletable: parse_flag(set.attribute((SAP_NS, "deletable"))),
    }
}

fn parse_properties(entity_type: Node<'_, '_>) -> BTreeMap<String, PropertyDescriptor> {
    entity_type
        .children()
        .filter(|n| n.has_tag_name((EDM_NS, "Property")))
        .filter_map(|prop| {
            let name = prop.attribute("Name")?;
            let descriptor = PropertyDescriptor {
                data_type: prop.attribute("Type").unwrap_or_default().to_string(),
                // EDM properties are nullable unless declared otherwise.
                nullable: prop
                    .attribute("Nullable")
                    .map_or(true, |v| !v.eq_ignore_ascii_case("false")),
                max_length: prop.attribute("MaxLength").and_then(|v| v.parse().ok()),
            };
            Some((name.to_string(), descriptor))
        })
        .collect()
}

/// SAP capability flags are `"true"`/`"false"`; a missing flag reads as false.
fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}
