//! Service metadata.
//!
//! Turns an OData `$metadata` document into [`EntitySchema`]s and keeps
//! them in a [`MetadataStore`], optionally compressed until first use.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   parse_metadata    ┌──────────────────────────┐
//! │  $metadata (EDMX)    │ ──────────────────▶ │  EntitySchema per set    │
//! └──────────────────────┘                     └──────────────────────────┘
//!                                                           │
//!                                                           ▼
//!                                       ┌──────────────────────────────────┐
//!                                       │  MetadataStore                   │
//!                                       │  name -> Expanded | Compressed   │
//!                                       └──────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use odata_orm::metadata::MetadataStore;
//!
//! let mut store = MetadataStore::parse(&xml, true)?;
//! let widgets = store.entity("Widgets")?; // expands on first access
//! ```

mod parser;
mod store;
mod types;

pub use parser::{parse_metadata, ParsedMetadata, EDMX_NS, EDM_NS, METADATA_NS, SAP_NS};
pub use store::{EntityEntry, MetadataStore};
pub use types::{EntityAttributes, EntitySchema, PropertyDescriptor};
