//! Request logging middleware

use crate::context::Context;
use crate::handler::Handler;
use std::time::Instant;
use tracing::{error, info, warn};

/// Log every request once the rest of the chain has run.
///
/// Successful and redirected requests are logged at `info`, client errors
/// at `warn` and server errors at `error`.
pub fn logger() -> impl Handler {
    |c: &mut Context| {
        let start = Instant::now();
        c.next();
        let latency = start.elapsed();
        let status = c.writer().status();

        if status.is_server_error() {
            error!(
                method = %c.method(),
                path = %c.path(),
                status = status.as_u16(),
                latency = ?latency,
                "request"
            );
        } else if status.is_client_error() {
            warn!(
                method = %c.method(),
                path = %c.path(),
                status = status.as_u16(),
                latency = ?latency,
                "request"
            );
        } else {
            info!(
                method = %c.method(),
                path = %c.path(),
                status = status.as_u16(),
                latency = ?latency,
                "request"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{combine_handlers, into_boxed_handler};
    use crate::params::Params;
    use crate::request::Request;
    use bytes::Bytes;
    use http::StatusCode;

    #[test]
    fn test_logger_runs_the_rest_of_the_chain() {
        let request = Request::from_http(
            http::Request::builder()
                .uri("/logged")
                .body(Bytes::new())
                .unwrap(),
        );
        let chain = combine_handlers(
            &[into_boxed_handler(logger())],
            &[into_boxed_handler(|c: &mut Context| {
                c.string(StatusCode::ACCEPTED, "queued")
            })],
        );
        let mut c = Context::new(request, Params::new(), chain);
        c.next();

        assert_eq!(c.writer().status(), StatusCode::ACCEPTED);
        assert_eq!(c.writer().body(), b"queued");
    }
}
