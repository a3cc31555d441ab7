//! Built-in middleware
//!
//! Middleware are ordinary handlers that call [`Context::next`](crate::Context::next)
//! to run the rest of the chain and act on the way back.
//!
//! - [`recovery`] contains panics raised further down the chain
//! - [`logger`] logs method, path, status and latency of every request

mod logger;
mod recovery;

pub use logger::logger;
pub use recovery::recovery;
