//! Route groups
//!
//! A [`RouterGroup`] carries a path prefix and the middleware shared by every
//! route registered through it. Groups are composed at startup:
//!
//! ```rust,ignore
//! let mut r = Engine::new();
//! r.use_middleware(recovery());
//!
//! let mut v1 = r.group("/v1", require_token);
//! v1.use_middleware(audit);
//! v1.get("/hello", hello); // recovery -> require_token -> audit -> hello
//! ```
//!
//! # Snapshot semantics
//!
//! The group's middleware list is a builder. Registering a route or deriving
//! a child group copies the list as it is at that moment. Middleware added
//! with [`use_middleware`](RouterGroup::use_middleware) afterwards applies to
//! routes and children created later from this group, never to those created
//! before. A child holds no reference to its parent.

use crate::handler::{combine_handlers, BoxedHandler, IntoHandlers};
use crate::path::join_paths;
use crate::router::RouteTable;
use http::Method;

/// Methods registered by [`RouterGroup::any`]
const ANY_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

/// Path prefix plus inherited middleware, used to configure routes
pub struct RouterGroup {
    base_path: String,
    handlers: Vec<BoxedHandler>,
    routes: RouteTable,
}

impl RouterGroup {
    pub(crate) fn root(routes: RouteTable) -> Self {
        Self {
            base_path: String::new(),
            handlers: Vec::new(),
            routes,
        }
    }

    /// The absolute path prefix of this group
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Middleware every route registered from now on will start with
    pub fn handlers(&self) -> &[BoxedHandler] {
        &self.handlers
    }

    /// Add middleware to the group.
    ///
    /// Only routes and groups created after this call see the new handlers.
    pub fn use_middleware(&mut self, handlers: impl IntoHandlers) -> &mut Self {
        let own = handlers.into_handlers();
        self.handlers = combine_handlers(&self.handlers, &own).to_vec();
        self
    }

    /// Create a child group.
    ///
    /// The child's prefix is `relative_path` joined onto this group's prefix
    /// and its middleware is this group's middleware followed by `handlers`.
    pub fn group(&self, relative_path: &str, handlers: impl IntoHandlers) -> RouterGroup {
        let own = handlers.into_handlers();
        RouterGroup {
            base_path: join_paths(&self.base_path, relative_path),
            handlers: combine_handlers(&self.handlers, &own).to_vec(),
            routes: self.routes.clone(),
        }
    }

    /// Register handlers for `method` and `relative_path`.
    ///
    /// The route's chain is this group's middleware followed by `handlers`,
    /// fixed now and reused for every request.
    pub fn handle(
        &self,
        method: Method,
        relative_path: &str,
        handlers: impl IntoHandlers,
    ) -> &Self {
        let own = handlers.into_handlers();
        let chain = combine_handlers(&self.handlers, &own);
        self.routes
            .register(method, join_paths(&self.base_path, relative_path), chain);
        self
    }

    /// Shortcut for `handle(Method::GET, path, handlers)`
    pub fn get(&self, relative_path: &str, handlers: impl IntoHandlers) -> &Self {
        self.handle(Method::GET, relative_path, handlers)
    }

    /// Shortcut for `handle(Method::POST, path, handlers)`
    pub fn post(&self, relative_path: &str, handlers: impl IntoHandlers) -> &Self {
        self.handle(Method::POST, relative_path, handlers)
    }

    /// Shortcut for `handle(Method::PUT, path, handlers)`
    pub fn put(&self, relative_path: &str, handlers: impl IntoHandlers) -> &Self {
        self.handle(Method::PUT, relative_path, handlers)
    }

    /// Shortcut for `handle(Method::DELETE, path, handlers)`
    pub fn delete(&self, relative_path: &str, handlers: impl IntoHandlers) -> &Self {
        self.handle(Method::DELETE, relative_path, handlers)
    }

    /// Shortcut for `handle(Method::PATCH, path, handlers)`
    pub fn patch(&self, relative_path: &str, handlers: impl IntoHandlers) -> &Self {
        self.handle(Method::PATCH, relative_path, handlers)
    }

    /// Shortcut for `handle(Method::HEAD, path, handlers)`
    pub fn head(&self, relative_path: &str, handlers: impl IntoHandlers) -> &Self {
        self.handle(Method::HEAD, relative_path, handlers)
    }

    /// Shortcut for `handle(Method::OPTIONS, path, handlers)`
    pub fn options(&self, relative_path: &str, handlers: impl IntoHandlers) -> &Self {
        self.handle(Method::OPTIONS, relative_path, handlers)
    }

    /// Register the same handlers for every shortcut method
    pub fn any(&self, relative_path: &str, handlers: impl IntoHandlers) -> &Self {
        let own = handlers.into_handlers();
        let chain = combine_handlers(&self.handlers, &own);
        let path = join_paths(&self.base_path, relative_path);
        for method in ANY_METHODS {
            self.routes.register(method, path.clone(), chain.clone());
        }
        self
    }
}

impl std::fmt::Debug for RouterGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterGroup")
            .field("base_path", &self.base_path)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
