//! Transport boundary.
//!
//! The registry talks to an OData service only through the [`Transport`]
//! trait. Implementations return a [`Response`] for every HTTP status and
//! reserve errors for failures where no response was received; the caller
//! decides what a non-success status means for its operation.
//!
//! - [`HttpTransport`] - blocking HTTP session (feature `http`)
//! - [`MockTransport`] - canned responses for tests

#[cfg(feature = "http")]
mod http;
pub mod mock;

#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use mock::{MockTransport, RecordedRequest};

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{OrmError, OrmResult};

/// Query parameters sent with a GET request.
pub type Params = BTreeMap<String, String>;

/// HTTP method of a transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response received from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    /// 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> OrmResult<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| OrmError::ResponseDecode(format!("body is not UTF-8: {}", e)))
    }

    /// Body decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> OrmResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| OrmError::ResponseDecode(format!("invalid JSON body: {}", e)))
    }
}

/// Raw access to an OData service.
///
/// Paths are service-relative (e.g. `/sap/odata/v2/Widgets`).
pub trait Transport {
    fn get(&self, path: &str, params: &Params) -> OrmResult<Response>;

    fn post(&self, path: &str, body: &Value) -> OrmResult<Response>;

    fn patch(&self, path: &str, body: &Value) -> OrmResult<Response>;

    fn delete(&self, path: &str) -> OrmResult<Response>;
}
