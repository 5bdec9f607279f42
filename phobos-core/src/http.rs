// HTTP request and response value objects

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Normalize a path: single leading slash, no trailing slash except for
/// the root path which stays exactly "/".
pub(crate) fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Parse a query string into a map of parameters
pub(crate) fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let mut split = part.splitn(2, '=');
            let key = split.next()?;
            let value = split.next().unwrap_or("");
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Descriptor for one uploaded file
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Form field the file was posted under
    pub field: String,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

/// An inbound HTTP request.
///
/// Constructed once per inbound call; only the router mutates it afterwards
/// (by setting the matched route params), and it is never reused across
/// requests.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub form: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
    pub cookies: HashMap<String, String>,
    pub server: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: String,
    params: HashMap<String, String>,
    json_cache: OnceCell<Option<serde_json::Value>>,
}

impl Request {
    /// Create a request. The method is upper-cased, the path is normalized,
    /// and an inline query string is split off into the query map.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let (path_part, query) = match path.split_once('?') {
            Some((p, q)) => (p, parse_query_string(q)),
            None => (path.as_str(), HashMap::new()),
        };

        Self {
            method: method.into().to_uppercase(),
            path: normalize_path(path_part),
            query,
            form: HashMap::new(),
            files: Vec::new(),
            cookies: HashMap::new(),
            server: HashMap::new(),
            headers: HashMap::new(),
            body: String::new(),
            params: HashMap::new(),
            json_cache: OnceCell::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_form(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_file(mut self, file: UploadedFile) -> Self {
        self.files.push(file);
        self
    }

    /// Case-insensitive header lookup, regardless of storage case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Form value, falling back to the query string
    pub fn input(&self, name: &str) -> Option<&str> {
        self.form
            .get(name)
            .or_else(|| self.query.get(name))
            .map(String::as_str)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Route parameter captured by the matched route
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Set the matched route parameters. Called once per dispatch by the
    /// router; params are empty until then.
    pub fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    /// Lazily parse the raw body as JSON; the result is cached for the
    /// lifetime of the request. Returns None for non-JSON bodies.
    pub fn json(&self) -> Option<&serde_json::Value> {
        self.json_cache
            .get_or_init(|| serde_json::from_str(&self.body).ok())
            .as_ref()
    }

    /// Deserialize the body into a concrete type
    pub fn json_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, crate::Error> {
        serde_json::from_str(&self.body)
            .map_err(|e| crate::Error::Http(crate::HttpException::bad_request(e.to_string())))
    }
}

/// An outbound HTTP response.
///
/// Created by a handler, a middleware, or the pipeline's return-value
/// normalizer; setters mutate and return the same instance for chaining.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Set a header; duplicate keys overwrite
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Plain-text body; infers `Content-Type: text/plain` unless one was
    /// already set explicitly.
    pub fn with_text(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self.infer_content_type("text/plain; charset=utf-8");
        self
    }

    /// HTML body; infers `Content-Type: text/html` unless already set.
    pub fn with_html(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self.infer_content_type("text/html; charset=utf-8");
        self
    }

    /// JSON body; infers `Content-Type: application/json` unless already set.
    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, crate::Error> {
        self.body = serde_json::to_vec(value)
            .map_err(|e| crate::Error::Container(format!("response serialization failed: {e}")))?;
        self.infer_content_type("application/json");
        Ok(self)
    }

    /// Raw byte body, no content-type inference
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body interpreted as UTF-8, for assertions and text transports
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    // An explicitly set Content-Type always wins over inference.
    fn infer_content_type(&mut self, content_type: &str) {
        let already_set = self
            .headers
            .keys()
            .any(|key| key.eq_ignore_ascii_case("content-type"));
        if !already_set {
            self.headers
                .insert("Content-Type".to_string(), content_type.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_normalizes_method_and_path() {
        let req = Request::new("get", "/users/");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/users");

        let root = Request::new("GET", "/");
        assert_eq!(root.path, "/");
    }

    #[test]
    fn test_request_splits_inline_query() {
        let req = Request::new("GET", "/search?q=phobos&page=2");
        assert_eq!(req.path, "/search");
        assert_eq!(req.query("q"), Some("phobos"));
        assert_eq!(req.query("page"), Some("2"));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = Request::new("GET", "/").with_header("X-Request-Id", "abc");
        assert_eq!(req.header("x-request-id"), Some("abc"));
        assert_eq!(req.header("X-REQUEST-ID"), Some("abc"));
        assert_eq!(req.header("missing"), None);
    }

    #[test]
    fn test_input_prefers_form_over_query() {
        let req = Request::new("POST", "/submit?name=query")
            .with_form("name", "form");
        assert_eq!(req.input("name"), Some("form"));
        assert_eq!(req.input("missing"), None);
    }

    #[test]
    fn test_params_empty_until_set() {
        let mut req = Request::new("GET", "/users/1");
        assert!(req.params().is_empty());

        let mut params = HashMap::new();
        params.insert("id".to_string(), "1".to_string());
        req.set_params(params);
        assert_eq!(req.param("id"), Some("1"));
    }

    #[test]
    fn test_json_body_is_cached() {
        let req = Request::new("POST", "/").with_body(r#"{"name":"phobos"}"#);
        let first = req.json().cloned();
        let second = req.json().cloned();
        assert_eq!(first, second);
        assert_eq!(first.and_then(|v| v["name"].as_str().map(String::from)), Some("phobos".to_string()));
    }

    #[test]
    fn test_json_invalid_body() {
        let req = Request::new("POST", "/").with_body("not json");
        assert!(req.json().is_none());
    }

    #[test]
    fn test_response_defaults_and_chaining() {
        let res = Response::ok()
            .with_header("X-One", "1")
            .with_header("X-One", "2");
        assert_eq!(res.status, 200);
        // duplicate keys overwrite
        assert_eq!(res.header("x-one"), Some("2"));
    }

    #[test]
    fn test_response_content_type_inference() {
        let res = Response::ok().with_html("<p>hi</p>");
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn test_explicit_content_type_wins_over_inference() {
        let res = Response::ok()
            .with_header("Content-Type", "application/xml")
            .with_json(&serde_json::json!({"a": 1}))
            .unwrap();
        assert_eq!(res.header("content-type"), Some("application/xml"));
    }

    #[test]
    fn test_parse_query_string() {
        let params = parse_query_string("name=john&age=30&flag");
        assert_eq!(params.get("name").map(String::as_str), Some("john"));
        assert_eq!(params.get("age").map(String::as_str), Some("30"));
        assert_eq!(params.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("users/"), "/users");
        assert_eq!(normalize_path("/users"), "/users");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
    }
}
