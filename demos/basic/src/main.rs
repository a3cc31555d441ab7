//! Basic routing example for Geneva
//!
//! This example demonstrates:
//! - Parameters in path
//! - Routing by HTTP method
//! - Query string parameters
//! - Query string plus post form
//!
//! Run with: cargo run -p basic
//! Then test:
//!   curl http://127.0.0.1:8080/hello/geneva
//!   curl "http://127.0.0.1:8080/welcome?firstname=Jane&lastname=Doe"
//!   curl "http://127.0.0.1:8080/post?id=1234" -d "name=manu" -d "message=this_is_great"

use geneva::prelude::*;

fn hello(c: &mut Context) {
    let s = format!("hello, {}!", c.param("name"));
    c.string(StatusCode::OK, s);
}

fn greeting(c: &mut Context) {
    let method = c.method().to_string();
    c.string(StatusCode::OK, method);
}

/// Responds to `/welcome?firstname=Jane&lastname=Doe`
fn welcome(c: &mut Context) {
    let s = format!(
        "Hello {} {}",
        c.default_query("firstname", "Guest"),
        c.query("lastname")
    );
    c.string(StatusCode::OK, s);
}

/// `POST /post?id=1234` with body `name=manu&message=this_is_great` responds
/// `id: 1234; page: 0; name: manu; message: this_is_great`
fn post(c: &mut Context) {
    let s = format!(
        "id: {}; page: {}; name: {}; message: {}",
        c.query("id"),
        c.default_query("page", "0"),
        c.post_form("name"),
        c.post_form("message")
    );
    c.string(StatusCode::OK, s);
}

#[tokio::main]
async fn main() -> geneva::Result<()> {
    let r = Engine::new();

    r.get("/hello/:name", hello);

    r.get("/greeting", greeting)
        .post("/greeting", greeting)
        .put("/greeting", greeting)
        .delete("/greeting", greeting)
        .patch("/greeting", greeting)
        .head("/greeting", greeting)
        .options("/greeting", greeting);

    r.get("/welcome", welcome);
    r.post("/post", post);

    r.run("127.0.0.1:8080").await
}
