//! Error types for Geneva
//!
//! Handler code never sees these: failures inside a chain are either written
//! to the response or, for panics, contained by the recovery middleware.
//! `GenevaError` covers startup and serving: invalid or conflicting routes,
//! configuration, binding and accept I/O. Failures of a single connection
//! are logged by the server and do not surface here.

use http::Method;
use thiserror::Error;

/// Result type alias for Geneva operations
pub type Result<T, E = GenevaError> = std::result::Result<T, E>;

/// Errors raised while building or running an engine
#[derive(Debug, Error)]
pub enum GenevaError {
    /// Route path does not start with `/`
    #[error("route path must start with '/', got: \"{path}\"")]
    InvalidPath {
        /// The offending path
        path: String,
    },

    /// The same method was registered twice for one path
    #[error("duplicate handler for {method} {path}")]
    DuplicateRoute {
        /// HTTP method registered twice
        method: Method,
        /// Route path
        path: String,
    },

    /// Two route patterns overlap in the router
    #[error(
        "route conflict: {new_path} conflicts with existing route {existing_path} ({details}); \
         use distinct path patterns or keep parameter names identical across routes"
    )]
    RouteConflict {
        /// The path that was being registered
        new_path: String,
        /// The existing path that conflicts
        existing_path: String,
        /// Detailed error message from the underlying router
        details: String,
    },

    /// Listen address could not be parsed
    #[error("invalid listen address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    /// Socket I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded from the environment
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),
}
