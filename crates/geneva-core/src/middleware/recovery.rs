//! Panic recovery middleware

use crate::context::Context;
use crate::handler::Handler;
use http::StatusCode;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

/// Recover from panics in the rest of the chain.
///
/// Register it first so it wraps every other handler. A panic is logged,
/// the response status becomes `500` (unless a status was already written)
/// and the chain is aborted. The request then completes normally.
pub fn recovery() -> impl Handler {
    |c: &mut Context| {
        let result = panic::catch_unwind(AssertUnwindSafe(|| c.next()));

        if let Err(payload) = result {
            error!(
                method = %c.method(),
                path = %c.path(),
                panic = %panic_message(payload.as_ref()),
                "handler panicked"
            );
            c.abort_with_status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic payload"
    }
}
