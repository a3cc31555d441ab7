//! Route group example for Geneva
//!
//! Each version group logs through its own middleware before the route
//! handler runs.
//!
//! Run with: cargo run -p group
//! Then test:
//!   curl http://127.0.0.1:8080/v1/hello
//!   curl http://127.0.0.1:8080/v2/hello

use geneva::prelude::*;

#[tokio::main]
async fn main() -> geneva::Result<()> {
    let r = Engine::new();

    let v1 = r.group("/v1", |c: &mut Context| {
        info!(path = %c.path(), "/v1 handler");
    });
    v1.get("/hello", |c: &mut Context| c.string(StatusCode::OK, "hello v1"));

    let v2 = r.group("/v2", |c: &mut Context| {
        info!(path = %c.path(), "/v2 handler");
    });
    v2.get("/hello", |c: &mut Context| c.string(StatusCode::OK, "hello v2"));

    r.run("127.0.0.1:8080").await
}
