//! Buffered response emitter.
//!
//! Action units write into this buffer; the host decides how to put it on
//! the wire. `json` and `redirect` finish the response: once finished,
//! further emission calls are ignored, so a unit that keeps running after
//! emitting a body cannot corrupt what goes on the wire.

use serde::Serialize;

/// Buffered HTTP response under construction.
#[derive(Debug)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    finished: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
            finished: false,
        }
    }

    /// Serializes `value` as pretty-printed JSON and finishes the response.
    ///
    /// # Errors
    ///
    /// Returns the serialization error; the response is left unfinished so
    /// the caller can still surface its own failure.
    pub fn json<T: Serialize>(&mut self, value: &T, status: u16) -> Result<(), serde_json::Error> {
        if self.finished {
            return Ok(());
        }
        let body = serde_json::to_vec_pretty(value)?;
        self.status = status;
        self.set_header("content-type", "application/json; charset=utf-8");
        self.body = body;
        self.finished = true;
        Ok(())
    }

    /// Emits a redirect to `url` and finishes the response.
    pub fn redirect(&mut self, url: &str, status: u16) {
        if self.finished {
            return;
        }
        self.status = status;
        self.set_header("location", url);
        self.finished = true;
    }

    /// Sets a header, replacing any previous value for that name.
    pub fn header(&mut self, name: &str, value: &str) {
        if self.finished {
            return;
        }
        self.set_header(name, value);
    }

    /// Sets the status line without finishing the response.
    pub fn status(&mut self, code: u16) {
        if self.finished {
            return;
        }
        self.status = code;
    }

    /// Marks the response complete; later emission calls become no-ops.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    fn set_header(&mut self, name: &str, value: &str) {
        let name = name.to_lowercase();
        if let Some(existing) = self.headers.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = value.to_string();
        } else {
            self.headers.push((name, value.to_string()));
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_sets_status_body_and_content_type() {
        let mut response = Response::new();
        response.json(&json!({"ok": true}), 200).unwrap();

        assert!(response.is_finished());
        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({"ok": true}));
        assert!(response
            .headers()
            .iter()
            .any(|(n, v)| n == "content-type" && v.starts_with("application/json")));
    }

    #[test]
    fn emission_after_finish_is_ignored() {
        let mut response = Response::new();
        response.json(&json!({"first": 1}), 201).unwrap();
        response.json(&json!({"second": 2}), 500).unwrap();
        response.header("x-late", "nope");
        response.status(418);

        assert_eq!(response.status_code(), 201);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({"first": 1}));
        assert!(!response.headers().iter().any(|(n, _)| n == "x-late"));
    }

    #[test]
    fn redirect_sets_location_and_finishes() {
        let mut response = Response::new();
        response.redirect("/login", 302);

        assert!(response.is_finished());
        assert_eq!(response.status_code(), 302);
        assert!(response
            .headers()
            .iter()
            .any(|(n, v)| n == "location" && v == "/login"));
    }

    #[test]
    fn header_replaces_by_case_insensitive_name() {
        let mut response = Response::new();
        response.header("X-Trace", "one");
        response.header("x-trace", "two");

        let traces: Vec<_> = response
            .headers()
            .iter()
            .filter(|(n, _)| n == "x-trace")
            .collect();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].1, "two");
    }
}
