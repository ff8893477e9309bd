//! Per-service entity schema store with optional lazy compression.
//!
//! Every entry is either expanded or compressed:
//!
//! ```text
//!            compress / compress_all
//!   Expanded ───────────────────────▶ Compressed
//!      ▲                                  │
//!      └──────── expand / get / entity ───┘
//! ```
//!
//! Compressed entries hold the gzip'd JSON encoding of the schema. Any read
//! goes through [`MetadataStore::expand`] first, so callers always see an
//! expanded schema and the entry stays expanded afterwards.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::sync::Arc;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::parser::parse_metadata;
use super::types::EntitySchema;
use crate::error::{OrmError, OrmResult};

/// State of a single store entry.
#[derive(Debug, Clone)]
pub enum EntityEntry {
    Expanded(Arc<EntitySchema>),
    Compressed(Vec<u8>),
}

impl EntityEntry {
    pub fn is_compressed(&self) -> bool {
        matches!(self, EntityEntry::Compressed(_))
    }

    /// Size of the stored payload in bytes (compressed entries only).
    pub fn compressed_len(&self) -> Option<usize> {
        match self {
            EntityEntry::Compressed(bytes) => Some(bytes.len()),
            EntityEntry::Expanded(_) => None,
        }
    }
}

/// Entity schemas of one service.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    entries: BTreeMap<String, EntityEntry>,
    service_name: Option<String>,
    data_service_version: Option<String>,
}

impl MetadataStore {
    /// Parse a metadata document.
    ///
    /// With `lazy_load`, every entry is compressed right after parsing.
    pub fn parse(xml: &str, lazy_load: bool) -> OrmResult<Self> {
        let parsed = parse_metadata(xml)?;
        let mut store = Self::from_schemas(parsed.entities.into_values());
        store.data_service_version = parsed.data_service_version;

        if lazy_load {
            let compressed = store.compress_all()?;
            tracing::debug!(entries = compressed, "compressed metadata entries");
        }

        Ok(store)
    }

    /// Build an expanded store from already-parsed schemas.
    pub fn from_schemas(schemas: impl IntoIterator<Item = EntitySchema>) -> Self {
        let entries = schemas
            .into_iter()
            .map(|schema| (schema.name.clone(), EntityEntry::Expanded(Arc::new(schema))))
            .collect();

        Self {
            entries,
            service_name: None,
            data_service_version: None,
        }
    }

    /// Tag every schema in the store with its owning service.
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        let service_name = service_name.into();
        for entry in self.entries.values_mut() {
            if let EntityEntry::Expanded(schema) = entry {
                Arc::make_mut(schema).service_name = Some(service_name.clone());
            }
        }
        self.service_name = Some(service_name);
        self
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    pub fn data_service_version(&self) -> Option<&str> {
        self.data_service_version.as_deref()
    }

    /// Look up an entity, expanding it in place if compressed.
    ///
    /// Returns `Ok(None)` when the entity is unknown.
    pub fn get(&mut self, entity_name: &str) -> OrmResult<Option<Arc<EntitySchema>>> {
        if !self.entries.contains_key(entity_name) {
            return Ok(None);
        }
        self.expand(entity_name)?;

        Ok(match self.entries.get(entity_name) {
            Some(EntityEntry::Expanded(schema)) => Some(Arc::clone(schema)),
            _ => None,
        })
    }

    /// Look up an entity that must exist.
    pub fn entity(&mut self, entity_name: &str) -> OrmResult<Arc<EntitySchema>> {
        self.get(entity_name)?
            .ok_or_else(|| OrmError::UnknownEntity(entity_name.to_string()))
    }

    /// Transition an entry to the expanded state.
    ///
    /// Returns `true` if the entry was compressed before the call.
    pub fn expand(&mut self, entity_name: &str) -> OrmResult<bool> {
        let entry = self
            .entries
            .get_mut(entity_name)
            .ok_or_else(|| OrmError::UnknownEntity(entity_name.to_string()))?;

        let EntityEntry::Compressed(bytes) = &*entry else {
            return Ok(false);
        };

        let mut schema = decode_schema(bytes)?;
        schema.service_name = self.service_name.clone();
        *entry = EntityEntry::Expanded(Arc::new(schema));

        tracing::debug!(entity = entity_name, "expanded metadata entry");
        Ok(true)
    }

    /// Transition an entry to the compressed state.
    ///
    /// Returns `true` if the entry was expanded before the call. Objects
    /// already holding the schema keep their copy.
    pub fn compress(&mut self, entity_name: &str) -> OrmResult<bool> {
        let entry = self
            .entries
            .get_mut(entity_name)
            .ok_or_else(|| OrmError::UnknownEntity(entity_name.to_string()))?;

        let EntityEntry::Expanded(schema) = &*entry else {
            return Ok(false);
        };

        *entry = EntityEntry::Compressed(encode_schema(schema)?);
        Ok(true)
    }

    /// Compress every expanded entry. Returns the number of entries compressed.
    pub fn compress_all(&mut self) -> OrmResult<usize> {
        let mut count = 0;
        for entry in self.entries.values_mut() {
            if let EntityEntry::Expanded(schema) = &*entry {
                *entry = EntityEntry::Compressed(encode_schema(schema)?);
                count += 1;
            }
        }
        Ok(count)
    }

    /// Whether the named entry is currently compressed.
    pub fn is_compressed(&self, entity_name: &str) -> Option<bool> {
        self.entries.get(entity_name).map(EntityEntry::is_compressed)
    }

    /// Raw entry state, without expanding.
    pub fn peek(&self, entity_name: &str) -> Option<&EntityEntry> {
        self.entries.get(entity_name)
    }

    pub fn contains(&self, entity_name: &str) -> bool {
        self.entries.contains_key(entity_name)
    }

    /// Entity names in sorted order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn encode_schema(schema: &EntitySchema) -> OrmResult<Vec<u8>> {
    let json = serde_json::to_vec(schema)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

fn decode_schema(bytes: &[u8]) -> OrmResult<EntitySchema> {
    let mut decoder = GzDecoder::new(bytes);
    let mut json = Vec::new();
    decoder.read_to_end(&mut json)?;
    Ok(serde_json::from_slice(&json)?)
}
