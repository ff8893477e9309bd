//! # odata-orm
//!
//! Schema-driven object mapping and query building for OData services.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              $metadata document (EDMX)                   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metadata::parse_metadata]
//! ┌─────────────────────────────────────────────────────────┐
//! │        MetadataStore (Expanded | Compressed entries)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [registry::ServiceRegistry]
//! ┌─────────────────────────────────────────────────────────┐
//! │   EntityObject (fields + $filter/$select/$top/...)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [transport::Transport]
//! ┌─────────────────────────────────────────────────────────┐
//! │            GET <endpoint>/<entity>?<options>             │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod metadata;
pub mod query;
pub mod registry;
pub mod transport;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::entity::EntityObject;
    pub use crate::error::{OrmError, OrmResult};
    pub use crate::metadata::{EntityAttributes, EntitySchema, MetadataStore, PropertyDescriptor};
    pub use crate::query::{Expression, Field, FilterValue, Format, QueryParameters, SortDirection};
    pub use crate::registry::{FetchResult, ServiceRegistry};
    #[cfg(feature = "http")]
    pub use crate::transport::HttpTransport;
    pub use crate::transport::{Response, Transport};
}

pub use entity::EntityObject;
pub use error::{OrmError, OrmResult};
pub use metadata::MetadataStore;
pub use query::{Expression, Field};
pub use registry::{FetchResult, ServiceRegistry};
