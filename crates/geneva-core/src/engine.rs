//! Engine builder and the frozen application
//!
//! [`Engine`] is the root route group plus the settings the server needs.
//! It dereferences to [`RouterGroup`], so middleware and routes are
//! registered on it directly:
//!
//! ```rust,ignore
//! use geneva::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> geneva::Result<()> {
//!     let mut r = Engine::new();
//!     r.use_middleware((logger(), recovery()));
//!     r.get("/hello/:name", |c: &mut Context| {
//!         let msg = format!("Hello {}", c.param("name"));
//!         c.string(StatusCode::OK, msg);
//!     });
//!     r.run("127.0.0.1:8080").await
//! }
//! ```
//!
//! [`Engine::build`] freezes the route table into an [`App`], which owns the
//! read-only router shared by every connection.

use crate::config::{Environment, ServerConfig};
use crate::context::Context;
use crate::error::Result;
use crate::group::RouterGroup;
use crate::request::Request;
use crate::response::{text_response, Response};
use crate::router::{RouteInfo, RouteMatch, Router, RouteTable};
use crate::server::Server;
use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::{ready, Ready};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Body of the response sent when no route matches the path
pub const NOT_FOUND_BODY: &str = "404 page not found";

/// Body of the response sent when the path exists for other methods only
pub const METHOD_NOT_ALLOWED_BODY: &str = "405 method not allowed";

/// Body of the response sent when the request body exceeds the limit
pub const PAYLOAD_TOO_LARGE_BODY: &str = "413 payload too large";

/// Application builder
pub struct Engine {
    root: RouterGroup,
    routes: RouteTable,
    config: ServerConfig,
}

impl Engine {
    /// Create an engine with the default [`ServerConfig`]
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create an engine with explicit settings.
    ///
    /// Installs a `tracing` subscriber if none is set yet. `RUST_LOG` takes
    /// precedence over `config.log_filter`.
    pub fn with_config(config: ServerConfig) -> Self {
        let _ = tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
            )
            .with(tracing_subscriber::fmt::layer())
            .try_init();

        let routes = RouteTable::new();
        Self {
            root: RouterGroup::root(routes.clone()),
            routes,
            config,
        }
    }

    /// Settings this engine was created with
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of route registrations recorded so far
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Freeze the route table and build the application.
    ///
    /// Fails on duplicate, conflicting or relative route paths. Groups that
    /// outlive the engine can no longer register routes.
    pub fn build(self) -> Result<App> {
        let router = self.routes.freeze()?;
        debug!(routes = router.registered_routes().len(), "route table frozen");
        Ok(App {
            router: Arc::new(router),
            config: Arc::new(self.config),
        })
    }

    /// Build the application and serve it on `addr`
    pub async fn run(self, addr: &str) -> Result<()> {
        self.build()?.serve(addr).await
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Engine {
    type Target = RouterGroup;

    fn deref(&self) -> &Self::Target {
        &self.root
    }
}

impl DerefMut for Engine {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.root
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("root", &self.root)
            .field("routes", &self.routes.len())
            .field("config", &self.config)
            .finish()
    }
}

/// A built application: the frozen router plus server settings
///
/// Cloning is cheap; clones share the router.
#[derive(Clone)]
pub struct App {
    router: Arc<Router>,
    config: Arc<ServerConfig>,
}

impl App {
    /// Settings the application was built with
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Registered routes, keyed by path pattern
    pub fn routes(&self) -> &HashMap<String, RouteInfo> {
        self.router.registered_routes()
    }

    /// Route a request and run its handler chain to completion.
    pub fn dispatch(&self, req: http::Request<Bytes>) -> Response {
        if req.body().len() > self.config.body_limit {
            return text_response(StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE_BODY);
        }

        let (chain, params) = match self.router.match_route(req.uri().path(), req.method()) {
            RouteMatch::Found { chain, params } => (chain.clone(), params),
            RouteMatch::NotFound => {
                return text_response(StatusCode::NOT_FOUND, NOT_FOUND_BODY);
            }
            RouteMatch::MethodNotAllowed { allowed } => {
                let allowed: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
                let mut response =
                    text_response(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_BODY);
                if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
                    response.headers_mut().insert(header::ALLOW, value);
                }
                return response;
            }
        };

        let mut c = Context::new(Request::from_http(req), params, chain);
        c.next();
        c.into_response()
    }

    /// Serve the application on `addr` until the listener fails
    pub async fn serve(self, addr: &str) -> Result<()> {
        info!(environment = %Environment::current(), "starting geneva");
        Server::new(self).run(addr).await
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.router.registered_routes().len())
            .field("config", &self.config)
            .finish()
    }
}

impl tower_service::Service<http::Request<Bytes>> for App {
    type Response = Response;
    type Error = Infallible;
    type Future = Ready<std::result::Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<std::result::Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<Bytes>) -> Self::Future {
        ready(Ok(self.dispatch(req)))
    }
}
