//! Request types and the built-vs-custom request slot.

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type dispatched to handlers.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type handlers return.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// The checker's outstanding request.
///
/// A request is either assembled incrementally through the builder methods or
/// supplied wholesale by the caller; modeling the two as distinct variants
/// keeps a custom request from silently clobbering a half-built one and lets
/// builder calls against no request at all fail with a clear message.
pub(crate) enum RequestSlot {
    /// No request has been started.
    Empty,
    /// A request assembled via `test` and the `with_*` builders.
    Built(Request),
    /// A request supplied wholesale via `use_request`.
    Custom(Request),
}

impl RequestSlot {
    /// Returns the current request for mutation, if one has been started.
    pub(crate) fn request_mut(&mut self) -> Option<&mut Request> {
        match self {
            Self::Empty => None,
            Self::Built(request) | Self::Custom(request) => Some(request),
        }
    }
}

/// Clones a request so the stored original survives dispatch.
///
/// `http::Request` does not implement `Clone`; the parts are copied by hand.
/// The `Full<Bytes>` body clone is cheap (shared buffer).
pub(crate) fn clone_request(request: &Request) -> Request {
    let mut cloned = http::Request::new(request.body().clone());
    *cloned.method_mut() = request.method().clone();
    *cloned.uri_mut() = request.uri().clone();
    *cloned.version_mut() = request.version();
    *cloned.headers_mut() = request.headers().clone();
    cloned
}
