//! In-memory transport for tests.
//!
//! Serves canned responses keyed by `(method, path)` and records every call.
//! Unrouted calls answer 404. A route can also fail the way a real
//! transport does when no response arrives.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::{Method, Params, Response, Transport};
use crate::error::{OrmError, OrmResult};

/// A call made through the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub params: Params,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
enum Route {
    Respond(Response),
    Fail(String),
}

#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a GET path to a response.
    pub fn with_get(self, path: impl Into<String>, response: Response) -> Self {
        self.route(Method::Get, path, response);
        self
    }

    /// Route a call, replacing any previous route for the same method and path.
    pub fn route(&self, method: Method, path: impl Into<String>, response: Response) {
        lock(&self.routes).insert((method, path.into()), Route::Respond(response));
    }

    /// Make a call fail with a transport error carrying `message`.
    pub fn route_error(&self, method: Method, path: impl Into<String>, message: impl Into<String>) {
        lock(&self.routes).insert((method, path.into()), Route::Fail(message.into()));
    }

    /// Every call made so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// The most recent call.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.requests).last().cloned()
    }

    fn call(
        &self,
        method: Method,
        path: &str,
        params: Params,
        body: Option<Value>,
    ) -> OrmResult<Response> {
        lock(&self.requests).push(RecordedRequest {
            method,
            path: path.to_string(),
            params,
            body,
        });

        let route = lock(&self.routes).get(&(method, path.to_string())).cloned();
        match route {
            Some(Route::Respond(response)) => Ok(response),
            Some(Route::Fail(message)) => Err(OrmError::transport(path, message)),
            None => Ok(Response::new(404, format!("no route for {} {}", method, path))),
        }
    }
}

impl Transport for MockTransport {
    fn get(&self, path: &str, params: &Params) -> OrmResult<Response> {
        self.call(Method::Get, path, params.clone(), None)
    }

    fn post(&self, path: &str, body: &Value) -> OrmResult<Response> {
        self.call(Method::Post, path, Params::new(), Some(body.clone()))
    }

    fn patch(&self, path: &str, body: &Value) -> OrmResult<Response> {
        self.call(Method::Patch, path, Params::new(), Some(body.clone()))
    }

    fn delete(&self, path: &str) -> OrmResult<Response> {
        self.call(Method::Delete, path, Params::new(), None)
    }
}

// Poisoned locks are recovered; recorded calls stay readable after a panic.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
