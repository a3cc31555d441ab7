//! Middleware example for Geneva
//!
//! This example demonstrates:
//! - Custom middleware that runs code before and after the rest of the chain
//! - Passing values to later handlers through the context store
//! - The built-in `recovery()` middleware
//!
//! Run with: cargo run -p middleware
//! Then test:
//!   curl http://127.0.0.1:8080/test
//!   curl -i http://127.0.0.1:8080/panic

use geneva::prelude::*;
use std::time::Instant;

fn timing() -> impl Handler {
    |c: &mut Context| {
        let t = Instant::now();

        // Set example variable
        c.set("example", "12345");

        c.next();

        // after request
        tracing::info!(latency = ?t.elapsed(), status = c.writer().status().as_u16(), "done");
    }
}

#[tokio::main]
async fn main() -> geneva::Result<()> {
    let mut r = Engine::new();
    r.use_middleware((recovery(), timing()));

    r.get("/test", |c: &mut Context| {
        let example = c.get_as::<&str>("example").copied().unwrap_or_default();

        // it would print: "12345"
        tracing::info!(example, "read from context");
        c.string(StatusCode::OK, example);
    });

    r.get("/panic", |_: &mut Context| panic!("handler failure"));

    r.run("127.0.0.1:8080").await
}
