//! Blocking HTTP session.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use super::{Params, Response, Transport};
use crate::config::{SettingsError, TransportSettings};
use crate::error::{OrmError, OrmResult};

/// HTTP transport bound to one source system.
///
/// Every request goes to `<protocol>://<host>:<port>/<path>` with JSON
/// `Accept`/`Content-Type` headers and optional basic auth.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    /// Build a session from transport settings.
    pub fn from_settings(settings: &TransportSettings) -> Result<Self, SettingsError> {
        let base_url = settings.base_url()?;
        let credentials = settings.resolved_credentials()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| SettingsError::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send(&self, url: String, request: RequestBuilder) -> OrmResult<Response> {
        let request = match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        };

        let response = request
            .send()
            .map_err(|e| OrmError::transport(url.as_str(), e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| OrmError::transport(url.as_str(), e))?;

        tracing::debug!(%url, status, bytes = body.len(), "received response");
        Ok(Response::new(status, body.to_vec()))
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str, params: &Params) -> OrmResult<Response> {
        let url = self.url(path);
        let request = self.client.get(&url).query(params);
        self.send(url, request)
    }

    fn post(&self, path: &str, body: &Value) -> OrmResult<Response> {
        let url = self.url(path);
        let request = self.client.post(&url).body(body.to_string());
        self.send(url, request)
    }

    fn patch(&self, path: &str, body: &Value) -> OrmResult<Response> {
        let url = self.url(path);
        let request = self.client.patch(&url).body(body.to_string());
        self.send(url, request)
    }

    fn delete(&self, path: &str) -> OrmResult<Response> {
        let url = self.url(path);
        let request = self.client.delete(&url);
        self.send(url, request)
    }
}
