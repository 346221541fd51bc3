//! Read-only request accessor.
//!
//! A thin pass-through over the inbound request's query fields, body
//! fields, and headers. The dispatch core only ever reads from it; the one
//! field it cares about itself is `action`.

use std::collections::HashMap;

/// Inbound request data, assembled by the host before dispatch.
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    query: HashMap<String, String>,
    body: HashMap<String, String>,
    headers: HashMap<String, String>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new("GET")
    }
}

impl Request {
    #[must_use]
    pub fn new(method: &str) -> Self {
        Self {
            method: method.to_uppercase(),
            query: HashMap::new(),
            body: HashMap::new(),
            headers: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, key: &str, value: &str) -> Self {
        self.body.insert(key.to_string(), value.to_string());
        self
    }

    /// Header names are stored lowercased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    /// A query field, or `None` if absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// A query field, or the default if absent.
    #[must_use]
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// A body field, or `None` if absent.
    #[must_use]
    pub fn post(&self, key: &str) -> Option<&str> {
        self.body.get(key).map(String::as_str)
    }

    /// A body field, or the default if absent.
    #[must_use]
    pub fn post_or(&self, key: &str, default: &str) -> String {
        self.post(key).unwrap_or(default).to_string()
    }

    /// A header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    #[must_use]
    pub fn is_post(&self) -> bool {
        self.method == "POST"
    }

    #[must_use]
    pub fn is_put(&self) -> bool {
        self.method == "PUT"
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.method == "DELETE"
    }

    /// Whether the request carries the `XMLHttpRequest` marker header.
    #[must_use]
    pub fn is_ajax(&self) -> bool {
        self.header("x-requested-with")
            .is_some_and(|value| value.eq_ignore_ascii_case("xmlhttprequest"))
    }
}
