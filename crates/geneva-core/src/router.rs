//! Route table and radix-tree router (matchit)
//!
//! Route groups register `(method, path, chain)` entries into a shared
//! [`RouteTable`] while the application is being set up. Building the engine
//! freezes the table into a [`Router`]: entries are grouped by path, checked
//! for duplicates and conflicts, and inserted into a `matchit` tree. The
//! frozen router is read-only and shared by every connection.
//!
//! # Path Patterns
//!
//! - `/users` - Static path
//! - `/users/:id` - Named parameter, matches one segment
//! - `/files/*path` - Catch-all parameter, matches the rest of the path

use crate::error::{GenevaError, Result};
use crate::handler::HandlerChain;
use crate::params::Params;
use http::Method;
use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Information about a registered route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// The path pattern (e.g., "/users/:id")
    pub path: String,
    /// The HTTP methods registered for this path
    pub methods: Vec<Method>,
}

struct RouteEntry {
    method: Method,
    path: String,
    chain: HandlerChain,
}

#[derive(Default)]
struct TableState {
    entries: Vec<RouteEntry>,
    frozen: bool,
}

/// Registration table shared by an engine and all of its route groups
///
/// Registration is a startup-time operation. Once the table is frozen,
/// further registrations are dropped with a warning.
#[derive(Clone, Default)]
pub(crate) struct RouteTable {
    state: Arc<Mutex<TableState>>,
}

impl RouteTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a route; the chain is already fixed at this point
    pub(crate) fn register(&self, method: Method, path: String, chain: HandlerChain) {
        let mut state = self.lock();
        if state.frozen {
            warn!(
                method = %method,
                path = %path,
                "route registered after the engine was built; ignoring"
            );
            return;
        }

        debug!(method = %method, path = %path, handlers = chain.len(), "route registered");
        state.entries.push(RouteEntry { method, path, chain });
    }

    /// Number of recorded entries
    pub(crate) fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Freeze the table and build the router from its entries
    pub(crate) fn freeze(&self) -> Result<Router> {
        let entries = {
            let mut state = self.lock();
            state.frozen = true;
            std::mem::take(&mut state.entries)
        };

        let mut router = Router::new();
        for entry in entries {
            router.insert(entry.method, entry.path, entry.chain)?;
        }
        router.finish()?;
        Ok(router)
    }
}

/// Handler chains for one path, keyed by method
#[derive(Clone, Default)]
pub struct MethodRouter {
    handlers: HashMap<Method, HandlerChain>,
}

impl MethodRouter {
    /// Create a new empty method router
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the chain for a method
    pub(crate) fn get_chain(&self, method: &Method) -> Option<&HandlerChain> {
        self.handlers.get(method)
    }

    /// Get allowed methods for a 405 response, sorted by name
    pub(crate) fn allowed_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.handlers.keys().cloned().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }
}

/// Frozen router
pub struct Router {
    inner: MatchitRouter<MethodRouter>,
    /// Method routers in registration order, moved into `inner` by `finish`
    pending: Vec<(String, MethodRouter)>,
    /// Track registered routes for conflict reporting
    registered_routes: HashMap<String, RouteInfo>,
}

impl Router {
    fn new() -> Self {
        Self {
            inner: MatchitRouter::new(),
            pending: Vec::new(),
            registered_routes: HashMap::new(),
        }
    }

    fn insert(&mut self, method: Method, path: String, chain: HandlerChain) -> Result<()> {
        if !path.starts_with('/') {
            return Err(GenevaError::InvalidPath { path });
        }

        let slot = match self.pending.iter().position(|(p, _)| *p == path) {
            Some(index) => index,
            None => {
                self.pending.push((path.clone(), MethodRouter::new()));
                self.pending.len() - 1
            }
        };

        let method_router = &mut self.pending[slot].1;
        if method_router.handlers.contains_key(&method) {
            return Err(GenevaError::DuplicateRoute { method, path });
        }
        method_router.handlers.insert(method, chain);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        for (path, method_router) in std::mem::take(&mut self.pending) {
            let methods = method_router.allowed_methods();

            if let Err(e) = self.inner.insert(path.clone(), method_router) {
                let existing_path = self
                    .find_conflicting_route(&path)
                    .map(|info| info.path.clone())
                    .unwrap_or_else(|| "<unknown>".to_string());

                return Err(GenevaError::RouteConflict {
                    new_path: path,
                    existing_path,
                    details: e.to_string(),
                });
            }

            self.registered_routes
                .insert(path.clone(), RouteInfo { path, methods });
        }
        Ok(())
    }

    /// Find a conflicting route by checking registered routes
    fn find_conflicting_route(&self, path: &str) -> Option<&RouteInfo> {
        if let Some(info) = self.registered_routes.get(path) {
            return Some(info);
        }

        // Same structure but different parameter names
        let normalized_new = normalize_path_for_comparison(path);
        self.registered_routes
            .iter()
            .find(|(registered, _)| normalize_path_for_comparison(registered) == normalized_new)
            .map(|(_, info)| info)
    }

    /// Match a request and return the chain + params
    pub(crate) fn match_route(&self, path: &str, method: &Method) -> RouteMatch<'_> {
        match self.inner.at(path) {
            Ok(matched) => {
                let method_router = matched.value;

                if let Some(chain) = method_router.get_chain(method) {
                    let params: Params = matched
                        .params
                        .iter()
                        .map(|(k, v)| (k.to_string(), decode_param(v)))
                        .collect();
                    RouteMatch::Found { chain, params }
                } else {
                    RouteMatch::MethodNotAllowed {
                        allowed: method_router.allowed_methods(),
                    }
                }
            }
            Err(_) => RouteMatch::NotFound,
        }
    }

    /// Get registered routes (for testing and debugging)
    pub fn registered_routes(&self) -> &HashMap<String, RouteInfo> {
        &self.registered_routes
    }
}

/// Result of route matching
pub(crate) enum RouteMatch<'a> {
    Found {
        chain: &'a HandlerChain,
        params: Params,
    },
    NotFound,
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
}

/// Percent-decode a captured value; invalid UTF-8 is replaced, not rejected
fn decode_param(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Normalize a path for conflict comparison by replacing parameter names with a placeholder
fn normalize_path_for_comparison(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut in_param = false;

    for ch in path.chars() {
        match ch {
            ':' | '*' => {
                in_param = true;
                result.push(ch);
                result.push('_');
            }
            '/' => {
                in_param = false;
                result.push('/');
            }
            _ if in_param => {}
            _ => result.push(ch),
        }
    }

    result
}
