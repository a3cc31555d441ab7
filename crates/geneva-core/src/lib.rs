//! # Geneva Core
//!
//! Core library of the Geneva web framework: handler chains, route groups,
//! the per-request context, the route table and the hyper-based server.
//!
//! This crate is not meant to be used directly. Use `geneva` instead.

mod config;
mod context;
mod engine;
mod error;
mod group;
mod handler;
pub mod middleware;
mod params;
mod path;
mod request;
mod response;
mod router;
mod server;
#[cfg(any(test, feature = "test-utils"))]
mod test_client;

// Public API
pub use config::{
    Environment, ServerConfig, DEFAULT_ADDR, DEFAULT_BODY_LIMIT, DEFAULT_LOG_FILTER, ENV_PREFIX,
};
pub use context::{ChainState, Context, Value};
pub use engine::{App, Engine, METHOD_NOT_ALLOWED_BODY, NOT_FOUND_BODY, PAYLOAD_TOO_LARGE_BODY};
pub use error::{GenevaError, Result};
pub use group::RouterGroup;
pub use handler::{combine_handlers, into_boxed_handler, BoxedHandler, Handler, HandlerChain, IntoHandlers};
pub use middleware::{logger, recovery};
pub use params::Params;
pub use path::{clean_path, join_paths};
pub use request::Request;
pub use response::{Response, ResponseWriter};
pub use router::{MethodRouter, RouteInfo, Router};
#[cfg(any(test, feature = "test-utils"))]
pub use test_client::{TestClient, TestRequest, TestResponse};

pub use http::{Method, StatusCode};

/// Shorthand for building JSON objects, e.g. `c.json(code, &H::from_iter(..))`
pub type H = serde_json::Map<String, serde_json::Value>;
