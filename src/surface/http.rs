use super::{Reply, Surface};
use crate::error::RouteError;
use crate::ids::InvocationId;
use crate::route::MAX_INLINE_PARAMS;
use crate::router::{MatchResult, Matcher};
use http::{Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage; names are `Arc<str>` since they repeat across requests
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Raw query string pairs
pub type QueryVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Already parsed HTTP request handed to the router
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path without the query string
    pub path: String,
    pub query_params: QueryVec,
    pub headers: HeaderVec,
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Build a request from a method and a target such as `/search?q=rust`.
    ///
    /// Query pairs are split on `&` and `=`; no percent-decoding is done.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let query_params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (Arc::from(k), v.to_string())
            })
            .collect();
        Self {
            method,
            path: path.to_string(),
            query_params,
            headers: HeaderVec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(target: &str) -> Self {
        Self::new(Method::GET, target)
    }

    #[must_use]
    pub fn post(target: &str, body: Value) -> Self {
        let mut request = Self::new(Method::POST, target);
        request.body = Some(body);
        request
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name; the last occurrence wins
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Response produced for an HTTP request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// JSON response with a `content-type` header
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self::new(status, headers, body)
    }

    /// Plain text response; the text is carried as a JSON string body
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((
            Arc::from("content-type"),
            "text/plain; charset=utf-8".to_string(),
        ));
        Self::new(status, headers, Value::String(body.into()))
    }

    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    #[must_use]
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT.as_u16(), HeaderVec::new(), Value::Null)
    }

    /// Status as an [`http::StatusCode`], if valid
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status).ok()
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// HTTP front end: matches on the request path
#[derive(Debug, Clone, Copy, Default)]
pub struct Http;

impl Surface for Http {
    type Input = HttpRequest;
    type Output = HttpResponse;

    const NAME: &'static str = "http";

    fn key(input: &HttpRequest) -> &str {
        &input.path
    }

    fn invocation_id(input: &HttpRequest) -> InvocationId {
        InvocationId::from_header_or_new(input.get_header("x-request-id"))
    }

    fn match_input(matcher: &Matcher, input: &HttpRequest) -> Result<MatchResult, RouteError> {
        matcher.match_route(&input.path)
    }

    fn coerce(reply: Reply) -> Result<HttpResponse, RouteError> {
        match reply {
            Reply::Http(response) => Ok(response),
            Reply::Json(value) => Ok(HttpResponse::json(StatusCode::OK.as_u16(), value)),
            Reply::Text(text) => Ok(HttpResponse::text(StatusCode::OK.as_u16(), text)),
            Reply::Empty => Ok(HttpResponse::no_content()),
            other => Err(RouteError::ContractViolation(format!(
                "http route returned {}",
                other.kind()
            ))),
        }
    }

    fn not_found(input: &HttpRequest) -> HttpResponse {
        HttpResponse::json(
            StatusCode::NOT_FOUND.as_u16(),
            json!({ "error": "Not Found", "path": input.path }),
        )
    }

    fn client_error(_input: &HttpRequest, error: &RouteError) -> HttpResponse {
        HttpResponse::error(StatusCode::BAD_REQUEST.as_u16(), &error.to_string())
    }

    fn failure(_input: &HttpRequest, _error: &RouteError) -> HttpResponse {
        HttpResponse::error(
            StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            "Internal Server Error",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_target_split() {
        let request = HttpRequest::get("/search?q=rust&page=2&q=regex");
        assert_eq!(request.path, "/search");
        assert_eq!(request.get_query_param("q"), Some("regex"));
        assert_eq!(request.get_query_param("page"), Some("2"));
        assert_eq!(request.get_query_param("missing"), None);
    }

    #[test]
    fn test_headers_case_insensitive() {
        let request = HttpRequest::get("/").with_header("X-Request-Id", "abc");
        assert_eq!(request.get_header("x-request-id"), Some("abc"));

        let mut response = HttpResponse::json(200, json!({}));
        response.set_header("Content-Type", "text/html".to_string());
        assert_eq!(response.get_header("content-type"), Some("text/html"));
        assert_eq!(response.headers.len(), 1);
    }

    #[test]
    fn test_coerce_replies() {
        assert_eq!(Http::coerce(Reply::Empty).unwrap().status, 204);
        let text = Http::coerce(Reply::text("hi")).unwrap();
        assert_eq!(text.body, json!("hi"));
        assert_eq!(text.status_code(), Some(StatusCode::OK));
        let err = Http::coerce(Reply::Command(crate::surface::CommandOutput::success("x")))
            .unwrap_err();
        assert!(matches!(err, RouteError::ContractViolation(_)));
    }
}
