//! Checker error types.

use thiserror::Error;

/// Errors that can occur while building requests or inspecting responses.
///
/// These are never returned to the caller directly; the [`Checker`](crate::Checker)
/// formats them and reports them to its bound [`TestContext`](crate::TestContext)
/// so a chain collects every failure instead of short-circuiting.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The method or path given to `test` did not parse.
    #[error("invalid request target: {0}")]
    InvalidTarget(String),

    /// A header name or value was not valid for the wire.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// JSON serialization of a request or expected body failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML serialization of a request or expected body failed.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::SeError),

    /// Reading the captured response body failed.
    #[error("body read error: {0}")]
    BodyRead(String),

    /// A `Set-Cookie` response value had no `name=value` pair to store.
    #[error("malformed Set-Cookie value: {0:?}")]
    MalformedSetCookie(String),
}
