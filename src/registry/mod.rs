//! Service registry.
//!
//! Maps logical service names to an endpoint and the [`MetadataStore`]
//! parsed from that endpoint's `$metadata` document, hands out
//! [`EntityObject`]s bound to the registered schemas, and executes their
//! queries through the [`Transport`].
//!
//! # Example
//!
//! ```ignore
//! use odata_orm::prelude::*;
//!
//! let mut registry = ServiceRegistry::new(transport);
//! registry.register("demo", "/odata/v2")?;
//!
//! let mut widgets = registry.get_object("Widgets", Some("demo"))?;
//! let name = widgets.field("Name")?;
//! widgets.filter(name.equals("Foo")).top(5);
//!
//! match registry.fetch(&widgets)? {
//!     FetchResult::Records(rows) => println!("{} widgets", rows.len()),
//!     FetchResult::Count(n) => println!("{} widgets", n),
//!     FetchResult::Raw(_) => {}
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Settings;
use crate::entity::EntityObject;
use crate::error::{OrmError, OrmResult};
use crate::metadata::{EntitySchema, MetadataStore};
use crate::query::Format;
use crate::transport::{Params, Transport};

/// A registered service.
#[derive(Debug)]
pub struct Service {
    pub endpoint: String,
    pub store: MetadataStore,
}

/// Outcome of executing an entity query.
#[derive(Debug)]
pub enum FetchResult {
    /// Answer to a `$count` request.
    Count(u64),
    /// Decoded records of a JSON list request.
    Records(Vec<EntityObject>),
    /// Undecoded body of an XML list request.
    Raw(Vec<u8>),
}

impl FetchResult {
    /// Records of a list request; empty for other outcomes.
    pub fn into_records(self) -> Vec<EntityObject> {
        match self {
            FetchResult::Records(records) => records,
            _ => Vec::new(),
        }
    }

    pub fn count(&self) -> Option<u64> {
        match self {
            FetchResult::Count(n) => Some(*n),
            _ => None,
        }
    }
}

/// Registered services and the transport used to reach them.
pub struct ServiceRegistry<T: Transport> {
    transport: T,
    services: BTreeMap<String, Service>,
}

impl<T: Transport> ServiceRegistry<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            services: BTreeMap::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Register a service with lazily compressed metadata.
    pub fn register(&mut self, service_name: &str, endpoint: &str) -> OrmResult<()> {
        self.register_with(service_name, endpoint, true)
    }

    /// Fetch `<endpoint>/$metadata` and register the parsed schemas.
    ///
    /// An existing registration under the same name is replaced only once
    /// the new document has been fetched and parsed.
    pub fn register_with(
        &mut self,
        service_name: &str,
        endpoint: &str,
        lazy_load: bool,
    ) -> OrmResult<()> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let path = format!("{}/$metadata", endpoint);

        let response = self.transport.get(&path, &Params::new())?;
        if !response.is_ok() {
            return Err(OrmError::HttpStatus {
                endpoint: path,
                status: response.status,
            });
        }

        let store =
            MetadataStore::parse(response.text()?, lazy_load)?.with_service_name(service_name);

        tracing::info!(
            service = service_name,
            %endpoint,
            entities = store.len(),
            lazy_load,
            "registered service"
        );

        self.services
            .insert(service_name.to_string(), Service { endpoint, store });
        Ok(())
    }

    /// Register every service listed in the settings.
    pub fn register_all(&mut self, settings: &Settings) -> OrmResult<()> {
        let mut names: Vec<_> = settings.services.keys().collect();
        names.sort();

        for name in names {
            let service = &settings.services[name];
            self.register_with(name, &service.endpoint, service.lazy_load)?;
        }
        Ok(())
    }

    /// Drop a service and its metadata. Returns whether it was registered.
    pub fn deregister(&mut self, service_name: &str) -> bool {
        self.services.remove(service_name).is_some()
    }

    pub fn service(&self, service_name: &str) -> OrmResult<&Service> {
        self.services
            .get(service_name)
            .ok_or_else(|| OrmError::UnknownService(service_name.to_string()))
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Entity names exposed by a service.
    pub fn list_entities(&self, service_name: &str) -> OrmResult<Vec<String>> {
        Ok(self
            .service(service_name)?
            .store
            .entity_names()
            .map(str::to_string)
            .collect())
    }

    /// Resolve an entity schema.
    ///
    /// Without a service name, services are searched in name order and the
    /// first one declaring the entity wins.
    pub fn schema(
        &mut self,
        entity_name: &str,
        service_name: Option<&str>,
    ) -> OrmResult<Arc<EntitySchema>> {
        match service_name {
            Some(name) => self
                .services
                .get_mut(name)
                .ok_or_else(|| OrmError::UnknownService(name.to_string()))?
                .store
                .entity(entity_name),
            None => {
                for service in self.services.values_mut() {
                    if let Some(schema) = service.store.get(entity_name)? {
                        return Ok(schema);
                    }
                }
                Err(OrmError::UnknownEntity(entity_name.to_string()))
            }
        }
    }

    /// A fresh, empty object for an entity.
    pub fn get_object(
        &mut self,
        entity_name: &str,
        service_name: Option<&str>,
    ) -> OrmResult<EntityObject> {
        Ok(EntityObject::new(self.schema(entity_name, service_name)?))
    }

    /// Execute the query accumulated on an object.
    ///
    /// A count request goes to `<endpoint>/<entity>/$count` without any
    /// other option. A list request that the service rejects yields no
    /// records.
    pub fn fetch(&self, query: &EntityObject) -> OrmResult<FetchResult> {
        let service_name = query
            .service_name()
            .ok_or_else(|| {
                OrmError::UnknownService(format!("<none bound to entity {}>", query.entity_name()))
            })?;
        let service = self.service(service_name)?;
        let entity_path = format!("{}/{}", service.endpoint, query.entity_name());

        if query.parameters().is_count() {
            return self.fetch_count(&entity_path);
        }

        let params = query.parameters().to_map();
        let response = self.transport.get(&entity_path, &params)?;
        if !response.is_ok() {
            tracing::warn!(
                path = %entity_path,
                status = response.status,
                "list request failed, returning no records"
            );
            return Ok(FetchResult::Records(Vec::new()));
        }

        if query.parameters().format == Some(Format::Xml) {
            return Ok(FetchResult::Raw(response.body));
        }

        let body: Value = response.json()?;
        let records = decode_records(query.schema(), &body)?;
        tracing::debug!(path = %entity_path, records = records.len(), "fetched records");

        Ok(FetchResult::Records(records))
    }

    fn fetch_count(&self, entity_path: &str) -> OrmResult<FetchResult> {
        let path = format!("{}/$count", entity_path);
        let response = self.transport.get(&path, &Params::new())?;
        if !response.is_ok() {
            return Err(OrmError::HttpStatus {
                endpoint: path,
                status: response.status,
            });
        }

        let text = response.text()?.trim();
        let count = text.parse().map_err(|_| {
            OrmError::ResponseDecode(format!("expected an integer count, got '{}'", text))
        })?;
        Ok(FetchResult::Count(count))
    }
}

/// Decode the records of an OData list response.
///
/// Accepts the V2 envelope `{"d": {"results": [...]}}`, the V2 single
/// record envelope `{"d": {...}}` and the V4 `{"value": [...]}` form.
pub fn decode_records(schema: &Arc<EntitySchema>, body: &Value) -> OrmResult<Vec<EntityObject>> {
    let records = match (body.get("d"), body.get("value")) {
        (Some(d), _) => match d.get("results") {
            Some(results) => results,
            None if d.is_object() => return single_record(schema, d),
            None => d,
        },
        (None, Some(value)) => value,
        (None, None) => {
            return Err(OrmError::ResponseDecode(
                "response has neither 'd' nor 'value'".to_string(),
            ))
        }
    };

    let records = records
        .as_array()
        .ok_or_else(|| OrmError::ResponseDecode("results is not an array".to_string()))?;

    records
        .iter()
        .map(|record| {
            let record = record
                .as_object()
                .ok_or_else(|| OrmError::ResponseDecode("record is not an object".to_string()))?;
            EntityObject::from_record(Arc::clone(schema), record)
        })
        .collect()
}

fn single_record(schema: &Arc<EntitySchema>, record: &Value) -> OrmResult<Vec<EntityObject>> {
    let record = record
        .as_object()
        .ok_or_else(|| OrmError::ResponseDecode("record is not an object".to_string()))?;
    Ok(vec![EntityObject::from_record(Arc::clone(schema), record)?])
}
