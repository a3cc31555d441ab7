//! Flow control example for Geneva
//!
//! The second handler aborts with `500`, so the third one never runs.
//!
//! Run with: cargo run -p flow-control
//! Then test: curl -i http://127.0.0.1:8080/hello

use geneva::prelude::*;

fn something_failed() -> bool {
    true
}

#[tokio::main]
async fn main() -> geneva::Result<()> {
    let r = Engine::new();

    r.handle(
        Method::GET,
        "/hello",
        (
            |_: &mut Context| {
                // do something
            },
            |c: &mut Context| {
                if something_failed() {
                    c.abort_with_status(StatusCode::INTERNAL_SERVER_ERROR);
                }
            },
            |c: &mut Context| {
                // never called
                c.string(StatusCode::OK, "hello");
            },
        ),
    );

    r.run("127.0.0.1:8080").await
}
