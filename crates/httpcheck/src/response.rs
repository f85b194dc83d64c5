//! Captured response snapshot.

use crate::body::BufferedBody;
use crate::error::CheckError;
use http::{HeaderMap, StatusCode};
use std::fmt;
use std::io::Read;

/// An immutable snapshot of a handler's output.
///
/// Built once per execution from the handler's status code, header map, and
/// collected body. Assertions read from the snapshot; only body consumption
/// mutates it (the [`BufferedBody`] drains as it is read).
pub struct CheckResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: BufferedBody,
}

impl CheckResponse {
    /// Captures a snapshot from an HTTP response, collecting the full body.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, CheckError>
    where
        B: http_body_util::BodyExt,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body_bytes = body
            .collect()
            .await
            .map_err(|e| CheckError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body: BufferedBody::new(body_bytes),
        })
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns a reference to the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value as a string, or `None` if absent or not UTF-8.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the body adapter for direct reading.
    pub fn body_mut(&mut self) -> &mut BufferedBody {
        &mut self.body
    }

    /// Drains the remaining body into a byte vector.
    pub fn read_body(&mut self) -> Result<Vec<u8>, CheckError> {
        let mut out = Vec::with_capacity(self.body.remaining());
        self.body
            .read_to_end(&mut out)
            .map_err(|e| CheckError::BodyRead(e.to_string()))?;
        Ok(out)
    }
}

impl fmt::Debug for CheckResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_remaining", &self.body.remaining())
            .finish()
    }
}
