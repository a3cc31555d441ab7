//! Response writer handed to handlers through the [`Context`](crate::Context)
//!
//! The writer accumulates headers, a status code and body bytes while the
//! handler chain runs; the dispatcher turns it into a hyper response once
//! the chain has returned.
//!
//! The status is written at most once. The first write wins and later writes
//! are ignored with a warning, so a status set right before an abort is not
//! overwritten by a default further down. Writing body bytes without an
//! explicit status commits `200 OK`.

use bytes::{Bytes, BytesMut};
use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;
use tracing::warn;

/// HTTP Response type
pub type Response = http::Response<Full<Bytes>>;

/// Buffered response sink for one request
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get mutable response headers
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Set a header, replacing any previous value
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Write the status code
    ///
    /// Only the first call has an effect.
    pub fn write_header(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(written) => {
                warn!(
                    written = %written.as_u16(),
                    ignored = %status.as_u16(),
                    "superfluous status write"
                );
            }
        }
    }

    /// Append bytes to the body, committing `200 OK` if no status was written
    pub fn write(&mut self, data: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(data);
    }

    /// The status written so far, if any
    pub fn written_status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The status the response will be sent with
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Body bytes written so far
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Convert the buffered state into a response
    pub fn into_response(self) -> Response {
        let status = self.status();
        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Build a plain-text response outside of a handler chain
pub(crate) fn text_response(status: StatusCode, body: &'static str) -> Response {
    let mut writer = ResponseWriter::new();
    writer.set_header(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    writer.write_header(status);
    writer.write(body.as_bytes());
    writer.into_response()
}
