//! TestClient for driving an application without network binding
//!
//! Requests go through the same dispatch path the server uses, including
//! the body limit and the 404/405 fallbacks.
//!
//! # Example
//!
//! ```rust,ignore
//! use geneva::prelude::*;
//! use geneva::TestClient;
//!
//! #[tokio::test]
//! async fn test_hello() {
//!     let r = Engine::new();
//!     r.get("/", |c: &mut Context| c.string(StatusCode::OK, "Hello, World!"));
//!     let client = TestClient::new(r.build().unwrap());
//!
//!     let response = client.get("/").await;
//!     response.assert_status(StatusCode::OK);
//!     assert_eq!(response.text(), "Hello, World!");
//! }
//! ```

use crate::engine::App;
use crate::response::Response;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use http_body_util::BodyExt;
use serde::{de::DeserializeOwned, Serialize};

/// Test client wrapping a built [`App`]
#[derive(Debug, Clone)]
pub struct TestClient {
    app: App,
}

impl TestClient {
    /// Create a new test client
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Send a GET request
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(TestRequest::get(path)).await
    }

    /// Send a POST request with an urlencoded form body
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        self.request(TestRequest::post(path).form(form)).await
    }

    /// Send a POST request with JSON body
    pub async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> TestResponse {
        self.request(TestRequest::post(path).json(body)).await
    }

    /// Send a request with full control
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let response = client.request(
    ///     TestRequest::put("/users/1")
    ///         .header("Authorization", "Bearer token")
    ///         .body("name=bob")
    /// ).await;
    /// ```
    pub async fn request(&self, req: TestRequest) -> TestResponse {
        let response = self.app.dispatch(req.into_http());
        TestResponse::from_response(response).await
    }
}

/// Test request builder
#[derive(Debug, Clone)]
pub struct TestRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
}

impl TestRequest {
    /// Create a request with the given method and path (query included)
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Create a GET request
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    /// Create a PUT request
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Create a PATCH request
    pub fn patch(path: &str) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Create a DELETE request
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a header to the request; invalid names or values are skipped
    pub fn header(mut self, key: &str, value: &str) -> Self {
        if let (Ok(name), Ok(val)) = (key.parse::<HeaderName>(), HeaderValue::from_str(value)) {
            self.headers.insert(name, val);
        }
        self
    }

    /// Set the request body as raw bytes
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set an `application/x-www-form-urlencoded` body.
    ///
    /// Repeated keys are kept in order.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        if let Ok(encoded) = serde_urlencoded::to_string(fields) {
            self.body = Bytes::from(encoded);
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }
        self
    }

    /// Set the request body as JSON
    ///
    /// This automatically sets the Content-Type header to `application/json`.
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        if let Ok(bytes) = serde_json::to_vec(body) {
            self.body = Bytes::from(bytes);
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        self
    }

    fn into_http(self) -> http::Request<Bytes> {
        let uri = self
            .path
            .parse::<http::Uri>()
            .unwrap_or_else(|_| http::Uri::from_static("/"));
        let mut req = http::Request::new(self.body);
        *req.method_mut() = self.method;
        *req.uri_mut() = uri;
        *req.headers_mut() = self.headers;
        req
    }
}

/// Test response with assertion helpers
#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    async fn from_response(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .unwrap_or_default();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Get the response status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the response body as bytes
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get the response body as a string, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Assert that the response has the expected status code
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Assert that a header has the expected value
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or has another value.
    pub fn assert_header(&self, key: &str, expected: &str) -> &Self {
        let actual = self
            .headers
            .get(key)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_else(|| panic!("header {} not found", key));
        assert_eq!(actual, expected, "header {} mismatch", key);
        self
    }

    /// Assert that the body equals `expected`
    ///
    /// # Panics
    ///
    /// Panics if the body differs.
    pub fn assert_body(&self, expected: &str) -> &Self {
        assert_eq!(self.text(), expected, "body mismatch");
        self
    }
}
