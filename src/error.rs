//! Crate-wide error type.

use std::io;
use thiserror::Error;

/// Result type for ORM operations.
pub type OrmResult<T> = Result<T, OrmError>;

/// Errors that can occur while parsing metadata, building queries or
/// talking to an OData service.
#[derive(Error, Debug)]
pub enum OrmError {
    /// The metadata document is not well-formed XML.
    #[error("failed to parse metadata document: {0}")]
    SchemaParse(String),

    /// The metadata document has no `EntityContainer` element.
    #[error("metadata document has no EntityContainer")]
    MissingEntityContainer,

    /// No service is registered under this name.
    #[error("service not registered: {0}")]
    UnknownService(String),

    /// The entity is not declared by the service metadata.
    #[error("entity not found: {0}")]
    UnknownEntity(String),

    /// The property is not declared on the entity.
    #[error("field '{field}' not declared on entity '{entity}'")]
    UnknownField {
        /// Entity the lookup was made against.
        entity: String,
        /// Field that was requested.
        field: String,
    },

    /// A query parameter was given an unsupported value.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidParameter {
        /// Parameter name (e.g. `$format`).
        name: String,
        /// Rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The transport failed before a response was received.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        /// Path or URL that was requested.
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The service answered with a non-success status.
    #[error("request to {endpoint} returned HTTP {status}")]
    HttpStatus {
        /// Path or URL that was requested.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },

    /// A response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    ResponseDecode(String),

    /// Compressing or decompressing a metadata entry failed.
    #[error("metadata entry codec failed: {0}")]
    Compression(#[source] io::Error),

    /// Serializing or deserializing a metadata entry failed.
    #[error("metadata entry encoding failed: {0}")]
    Encoding(#[source] serde_json::Error),
}

impl OrmError {
    /// Create an unknown-field error.
    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Create an invalid-parameter error.
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a transport failure with the endpoint it was made against.
    pub fn transport(
        endpoint: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    /// Check if this error was raised by local validation, before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownService(_)
                | Self::UnknownEntity(_)
                | Self::UnknownField { .. }
                | Self::InvalidParameter { .. }
        )
    }

    /// Check if this error came from the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }
}

impl From<io::Error> for OrmError {
    fn from(err: io::Error) -> Self {
        Self::Compression(err)
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err)
    }
}
