//! Per-request context and chain execution
//!
//! A [`Context`] is created for every matched request. It owns the request,
//! the response writer, the path parameters, a request-scoped key/value store
//! and a cursor into the route's [`HandlerChain`].
//!
//! # Chain execution
//!
//! [`Context::next`] runs the handlers after the current one. It is safe to
//! call from inside a handler: the nested call runs the rest of the chain and
//! returns, so code after it runs once every downstream handler has finished,
//! innermost first. Handlers that never call `next` are still followed by the
//! rest of the chain, because the enclosing loop keeps advancing the cursor.
//!
//! ```rust,ignore
//! fn timing(c: &mut Context) {
//!     let start = Instant::now();
//!     c.next();
//!     tracing::info!(elapsed = ?start.elapsed(), "done");
//! }
//! ```
//!
//! [`Context::abort`] stops the chain. The current handler keeps running to
//! its end and handlers that are already unwinding from a nested `next` still
//! run their remaining code; nothing after the current handler is invoked.

use crate::handler::HandlerChain;
use crate::params::Params;
use crate::request::Request;
use crate::response::{Response, ResponseWriter};
use http::header::{self, HeaderName};
use http::{HeaderValue, Method, StatusCode};
use serde::Serialize;
use std::any::Any;
use std::cell::OnceCell;
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Value stored in the request-scoped store
pub type Value = Box<dyn Any + Send + Sync>;

/// Form media type read by the post-form helpers
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Position of a context in its handler chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// No handler has run yet
    Pending,
    /// The handler at this index is the current one
    Running(usize),
    /// Every handler has been invoked
    Completed,
    /// The chain was stopped by [`Context::abort`]
    Aborted,
}

/// Per-request state shared by every handler of the chain
pub struct Context {
    request: Request,
    writer: ResponseWriter,
    params: Params,
    chain: HandlerChain,
    state: ChainState,
    keys: Option<HashMap<String, Value>>,
    query_cache: OnceCell<Vec<(String, String)>>,
    form_cache: OnceCell<Vec<(String, String)>>,
}

impl Context {
    /// Create a context positioned before the first handler of `chain`
    pub fn new(request: Request, params: Params, chain: HandlerChain) -> Self {
        Self {
            request,
            writer: ResponseWriter::new(),
            params,
            chain,
            state: ChainState::Pending,
            keys: None,
            query_cache: OnceCell::new(),
            form_cache: OnceCell::new(),
        }
    }

    // ------------------------------------------------------------------
    // Flow control
    // ------------------------------------------------------------------

    /// Run the pending handlers of the chain.
    ///
    /// Should be used only inside middleware. Returns once the chain has
    /// completed or been aborted.
    pub fn next(&mut self) {
        self.advance();
        let chain = self.chain.clone();

        while let ChainState::Running(index) = self.state {
            match chain.get(index) {
                Some(handler) => handler.call(self),
                None => {
                    self.state = ChainState::Completed;
                    break;
                }
            }
            self.advance();
        }
    }

    /// Prevent pending handlers from being called.
    ///
    /// This does not stop the current handler.
    pub fn abort(&mut self) {
        self.state = ChainState::Aborted;
    }

    /// Write `code` as the response status, then [`abort`](Self::abort).
    pub fn abort_with_status(&mut self, code: StatusCode) {
        self.writer.write_header(code);
        self.abort();
    }

    /// Check whether the chain was aborted
    pub fn is_aborted(&self) -> bool {
        self.state == ChainState::Aborted
    }

    /// Current position in the chain
    pub fn state(&self) -> ChainState {
        self.state
    }

    fn advance(&mut self) {
        let len = self.chain.len();
        self.state = match self.state {
            ChainState::Pending if len > 0 => ChainState::Running(0),
            ChainState::Pending => ChainState::Completed,
            ChainState::Running(index) if index + 1 < len => ChainState::Running(index + 1),
            ChainState::Running(_) => ChainState::Completed,
            terminal => terminal,
        };
    }

    // ------------------------------------------------------------------
    // Request-scoped store
    // ------------------------------------------------------------------

    /// Store a value exclusively for this request.
    ///
    /// The store is allocated on the first call.
    pub fn set<V>(&mut self, key: impl Into<String>, value: V)
    where
        V: Any + Send + Sync,
    {
        self.keys
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), Box::new(value));
    }

    /// Look up a stored value.
    ///
    /// Returns `None` when the key was never set.
    pub fn get(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.keys.as_ref()?.get(key).map(|value| value.as_ref())
    }

    /// Look up a stored value and downcast it to `T`.
    ///
    /// Returns `None` when the key was never set or holds another type.
    pub fn get_as<T: Any>(&self, key: &str) -> Option<&T> {
        self.get(key)?.downcast_ref::<T>()
    }

    /// Remove a stored value, returning it
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.keys.as_mut()?.remove(key)
    }

    // ------------------------------------------------------------------
    // Request data
    // ------------------------------------------------------------------

    /// Get the request
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Get the HTTP method
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Get the request path
    pub fn path(&self) -> &str {
        self.request.path()
    }

    /// Get the path parameters
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Value of the path parameter `name`, or `""` when absent.
    pub fn param(&self, name: &str) -> &str {
        self.params.by_name(name)
    }

    /// Value of the query parameter `key`, if present (even when empty).
    pub fn get_query(&self, key: &str) -> Option<&str> {
        first_value(self.query_pairs(), key)
    }

    /// Value of the query parameter `key`, or `""` when absent.
    pub fn query(&self, key: &str) -> &str {
        self.get_query(key).unwrap_or("")
    }

    /// Value of the query parameter `key`, or `default` when absent.
    pub fn default_query<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_query(key).unwrap_or(default)
    }

    /// Value of the form field `key`, if present (even when empty).
    ///
    /// Fields from an urlencoded `POST`, `PUT` or `PATCH` body take
    /// precedence over query parameters of the same name.
    pub fn get_post_form(&self, key: &str) -> Option<&str> {
        first_value(self.form_pairs(), key).or_else(|| self.get_query(key))
    }

    /// Value of the form field `key`, or `""` when absent.
    pub fn post_form(&self, key: &str) -> &str {
        self.get_post_form(key).unwrap_or("")
    }

    /// Value of the form field `key`, or `default` when absent.
    pub fn default_post_form<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_post_form(key).unwrap_or(default)
    }

    fn query_pairs(&self) -> &[(String, String)] {
        self.query_cache
            .get_or_init(|| parse_urlencoded(self.request.query_string().unwrap_or("")))
    }

    fn form_pairs(&self) -> &[(String, String)] {
        self.form_cache.get_or_init(|| {
            let has_form_body = matches!(
                *self.request.method(),
                Method::POST | Method::PUT | Method::PATCH
            ) && self.request.content_type() == Some(FORM_URLENCODED);

            if !has_form_body {
                return Vec::new();
            }

            match std::str::from_utf8(self.request.body()) {
                Ok(body) => parse_urlencoded(body),
                Err(err) => {
                    debug!(error = %err, "form body is not valid UTF-8");
                    Vec::new()
                }
            }
        })
    }

    // ------------------------------------------------------------------
    // Response
    // ------------------------------------------------------------------

    /// Get the response writer
    pub fn writer(&self) -> &ResponseWriter {
        &self.writer
    }

    /// Get the mutable response writer
    pub fn writer_mut(&mut self) -> &mut ResponseWriter {
        &mut self.writer
    }

    /// Write the response status
    pub fn status(&mut self, code: StatusCode) {
        self.writer.write_header(code);
    }

    /// Set a response header.
    ///
    /// Invalid names or values are skipped with a warning.
    pub fn header(&mut self, key: &str, value: &str) {
        match (key.parse::<HeaderName>(), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => self.writer.set_header(name, value),
            _ => warn!(header = %key, "skipping invalid response header"),
        }
    }

    /// Write `msg` as a `text/plain` body with status `code`.
    pub fn string(&mut self, code: StatusCode, msg: impl AsRef<str>) {
        self.writer
            .set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        self.writer.write_header(code);
        self.writer.write(msg.as_ref().as_bytes());
    }

    /// Serialize `value` as a newline-terminated `application/json` body.
    ///
    /// A value that fails to serialize produces an empty `500` response.
    pub fn json<T: Serialize + ?Sized>(&mut self, code: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(mut body) => {
                body.push(b'\n');
                self.writer.set_header(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                self.writer.write_header(code);
                self.writer.write(&body);
            }
            Err(err) => {
                error!(error = %err, "failed to serialize JSON response");
                self.writer.write_header(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }

    /// Finish the request, converting the writer into a response
    pub fn into_response(self) -> Response {
        self.writer.into_response()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request", &self.request)
            .field("params", &self.params)
            .field("chain", &self.chain)
            .field("state", &self.state)
            .finish()
    }
}

fn parse_urlencoded(input: &str) -> Vec<(String, String)> {
    serde_urlencoded::from_str(input).unwrap_or_else(|err| {
        debug!(error = %err, "ignoring malformed urlencoded data");
        Vec::new()
    })
}

fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{combine_handlers, into_boxed_handler, BoxedHandler};
    use bytes::Bytes;

    fn request(method: Method, uri: &str, body: &'static str, form: bool) -> Request {
        let mut builder = http::Request::builder().method(method).uri(uri);
        if form {
            builder = builder.header(header::CONTENT_TYPE, FORM_URLENCODED);
        }
        Request::from_http(builder.body(Bytes::from_static(body.as_bytes())).unwrap())
    }

    fn context(handlers: Vec<BoxedHandler>) -> Context {
        Context::new(
            request(Method::GET, "/", "", false),
            Params::new(),
            combine_handlers(&[], &handlers),
        )
    }

    fn push_trail(c: &mut Context, entry: &'static str) {
        let mut trail = c.get_as::<Vec<&'static str>>("trail").cloned().unwrap_or_default();
        trail.push(entry);
        c.set("trail", trail);
    }

    fn trail(c: &Context) -> Vec<&'static str> {
        c.get_as::<Vec<&'static str>>("trail").cloned().unwrap_or_default()
    }

    fn step(entry: &'static str) -> BoxedHandler {
        into_boxed_handler(move |c: &mut Context| push_trail(c, entry))
    }

    #[test]
    fn test_next_runs_every_handler_once_in_order() {
        let mut c = context(vec![step("a"), step("b"), step("c")]);
        c.next();

        assert_eq!(trail(&c), vec!["a", "b", "c"]);
        assert_eq!(c.state(), ChainState::Completed);
    }

    #[test]
    fn test_nested_next_unwinds_in_reverse_order() {
        let around = |name: &'static str, after: &'static str| {
            into_boxed_handler(move |c: &mut Context| {
                push_trail(c, name);
                c.next();
                push_trail(c, after);
            })
        };
        let mut c = context(vec![
            around("a:before", "a:after"),
            around("b:before", "b:after"),
            step("handler"),
        ]);
        c.next();

        assert_eq!(
            trail(&c),
            vec!["a:before", "b:before", "handler", "b:after", "a:after"]
        );
    }

    #[test]
    fn test_abort_with_status_stops_later_handlers() {
        let mut c = context(vec![
            step("first"),
            into_boxed_handler(|c: &mut Context| {
                push_trail(c, "second:before");
                c.abort_with_status(StatusCode::NOT_IMPLEMENTED);
                push_trail(c, "second:after");
            }),
            step("third"),
        ]);
        c.next();

        assert_eq!(trail(&c), vec!["first", "second:before", "second:after"]);
        assert!(c.is_aborted());
        assert_eq!(c.into_response().status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn test_abort_lets_entered_handlers_unwind() {
        let mut c = context(vec![
            into_boxed_handler(|c: &mut Context| {
                c.next();
                push_trail(c, "outer:after");
            }),
            into_boxed_handler(|c: &mut Context| {
                c.abort();
                push_trail(c, "aborting");
            }),
            step("never"),
        ]);
        c.next();

        assert_eq!(trail(&c), vec!["aborting", "outer:after"]);
        assert_eq!(c.state(), ChainState::Aborted);
    }

    #[test]
    fn test_next_on_finished_chain_is_noop() {
        let mut c = context(vec![step("a")]);
        c.next();
        c.next();
        assert_eq!(trail(&c), vec!["a"]);

        let mut empty = context(Vec::new());
        empty.next();
        assert_eq!(empty.state(), ChainState::Completed);
    }

    #[test]
    fn test_store_is_lazy() {
        let mut c = context(Vec::new());
        assert!(c.keys.is_none());
        assert!(c.get("unknown").is_none());
        assert!(c.keys.is_none());

        c.set("k", 42_i32);
        assert!(c.keys.is_some());
        assert_eq!(c.get_as::<i32>("k"), Some(&42));
    }

    #[test]
    fn test_get_as_wrong_type_misses() {
        let mut c = context(Vec::new());
        c.set("example", "12345");

        assert!(c.get("example").is_some());
        assert_eq!(c.get_as::<&str>("example"), Some(&"12345"));
        assert_eq!(c.get_as::<String>("example"), None);
    }

    #[test]
    fn test_set_overwrites_and_remove() {
        let mut c = context(Vec::new());
        c.set("k", 1_u8);
        c.set("k", 2_u8);
        assert_eq!(c.get_as::<u8>("k"), Some(&2));

        assert!(c.remove("k").is_some());
        assert!(c.get("k").is_none());
    }

    #[test]
    fn test_params_and_query() {
        let params: Params = [("name", "geneva")].into_iter().collect();
        let c = Context::new(
            request(Method::GET, "/test/geneva?q1=1&q2=2&empty=", "", false),
            params,
            HandlerChain::new(),
        );

        assert_eq!(c.param("name"), "geneva");
        assert_eq!(c.param("missing"), "");
        assert_eq!(c.query("q1"), "1");
        assert_eq!(c.query("q3"), "");
        assert_eq!(c.get_query("empty"), Some(""));
        assert_eq!(c.get_query("q3"), None);
        assert_eq!(c.default_query("firstname", "Guest"), "Guest");
    }

    #[test]
    fn test_post_form_prefers_body_then_query() {
        let c = Context::new(
            request(Method::POST, "/post?id=1234&name=query", "name=manu&p1=1&p1=3", true),
            Params::new(),
            HandlerChain::new(),
        );

        assert_eq!(c.post_form("name"), "manu");
        assert_eq!(c.post_form("p1"), "1");
        assert_eq!(c.post_form("id"), "1234");
        assert_eq!(c.default_post_form("p3", "default"), "default");
    }

    #[test]
    fn test_post_form_ignores_body_without_form_content_type() {
        let c = Context::new(
            request(Method::POST, "/post", "name=manu", false),
            Params::new(),
            HandlerChain::new(),
        );
        assert_eq!(c.get_post_form("name"), None);
    }

    #[test]
    fn test_string_and_json_helpers() {
        let mut c = context(Vec::new());
        c.string(StatusCode::OK, "test");
        let response = c.into_response();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");

        let mut c = context(Vec::new());
        c.json(StatusCode::CREATED, &serde_json::json!({ "foo": "bar" }));
        assert_eq!(c.writer().body(), b"{\"foo\":\"bar\"}\n");
        assert_eq!(c.writer().status(), StatusCode::CREATED);
        assert_eq!(c.writer().headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let mut c = context(Vec::new());
        c.header("bad header", "x");
        c.header("x-ok", "yes");
        assert_eq!(c.writer().headers().len(), 1);
    }
}
