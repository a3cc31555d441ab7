//! # Geneva
//!
//! A small web framework built around middleware chains.
//!
//! Every route is served by an ordered chain of handlers: the middleware of
//! the engine, then that of each enclosing group, then the route's own
//! handlers. Handlers share one [`Context`] per request, can run the rest of
//! the chain with [`Context::next`] and stop it with [`Context::abort`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geneva::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> geneva::Result<()> {
//!     let mut r = Engine::new();
//!     r.use_middleware((logger(), recovery()));
//!
//!     r.get("/hello/:name", |c: &mut Context| {
//!         let msg = format!("Hello {}", c.param("name"));
//!         c.string(StatusCode::OK, msg);
//!     });
//!
//!     let v1 = r.group("/v1", ());
//!     v1.get("/ping", |c: &mut Context| {
//!         c.json(StatusCode::OK, &json!({ "message": "pong" }));
//!     });
//!
//!     r.run("127.0.0.1:8080").await
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `test-utils` - `TestClient`, `TestRequest` and `TestResponse` for
//!   driving an [`App`] without a socket

// Re-export core functionality
pub use geneva_core::*;

/// Prelude module - import everything you need with `use geneva::prelude::*`
pub mod prelude {
    pub use geneva_core::{
        // Built-in middleware
        logger,
        recovery,
        // Engine and groups
        App,
        Context,
        Engine,
        // Error handling
        GenevaError,
        Handler,
        IntoHandlers,
        Method,
        Result,
        RouterGroup,
        // Configuration
        ServerConfig,
        StatusCode,
        H,
    };

    // Re-export commonly used external types
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::json;
    pub use tracing::{debug, error, info, trace, warn};
}
