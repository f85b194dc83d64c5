//! The fluent checker coordinating one request/response cycle.

use crate::context::{PanicContext, TestContext};
use crate::error::CheckError;
use crate::request::{clone_request, Request, RequestSlot, Response};
use crate::response::CheckResponse;
use bytes::Bytes;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderName, HeaderValue, Method, Uri};
use http_body_util::Full;
use indexmap::IndexMap;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Handler function type invoked by [`Checker::check`].
pub type Handler =
    Arc<dyn Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync>;

/// A fluent assertion helper for exercising an HTTP handler in-process.
///
/// A checker owns one outstanding request/response pair plus a session-scoped
/// cookie jar. Builder methods assemble the request, [`check`](Self::check)
/// dispatches it directly against the bound handler and snapshots the
/// response, and the `has_*` assertions compare captured attributes against
/// expected values. Mismatches are reported to the bound [`TestContext`]
/// without stopping the chain.
///
/// Cookies from `Set-Cookie` response headers are stored in the jar and
/// replayed as a single `Cookie` header on every subsequent dispatch from the
/// same checker.
///
/// # Example
///
/// ```ignore
/// let mut checker = Checker::new(|req| async move {
///     http::Response::builder()
///         .status(200)
///         .body(Full::new(Bytes::from("pong")))
///         .unwrap()
/// });
///
/// checker
///     .test("get", "/ping")
///     .check()
///     .await
///     .has_status(200)
///     .has_string("pong");
/// ```
#[must_use]
pub struct Checker {
    /// Failure sink for assertion outcomes.
    context: Arc<dyn TestContext>,
    /// The handler under test.
    handler: Handler,
    /// The outstanding request, mutable until dispatched.
    request: RequestSlot,
    /// Snapshot of the most recent execution, if any.
    response: Option<CheckResponse>,
    /// Session cookie jar, serialized into the `Cookie` header on dispatch.
    jar: IndexMap<String, String>,
}

impl Checker {
    /// Creates a checker that panics on the first failed assertion.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self::with_context(PanicContext, handler)
    }

    /// Creates a checker bound to an explicit test context.
    ///
    /// The handler is not validated; it is first invoked by
    /// [`check`](Self::check).
    pub fn with_context<C, F, Fut>(context: C, handler: F) -> Self
    where
        C: TestContext + 'static,
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self {
            context: Arc::new(context),
            handler: Arc::new(move |request| Box::pin(handler(request))),
            request: RequestSlot::Empty,
            response: None,
            jar: IndexMap::new(),
        }
    }

    // request construction //////////////////////////////////////////////

    /// Targets `path` with the given method, replacing any prior request.
    ///
    /// The method is uppercased before parsing. Construction failures are
    /// reported to the test context and leave no request in place. This is
    /// the typical entry point of a chain.
    pub fn test(&mut self, method: impl AsRef<str>, path: impl AsRef<str>) -> &mut Self {
        let method = method.as_ref().to_uppercase();
        match build_request(&method, path.as_ref()) {
            Ok(request) => self.request = RequestSlot::Built(request),
            Err(e) => {
                self.report(&e);
                self.request = RequestSlot::Empty;
            }
        }
        self
    }

    /// Targets `path` with a GET request.
    pub fn get(&mut self, path: impl AsRef<str>) -> &mut Self {
        self.test("GET", path)
    }

    /// Targets `path` with a POST request.
    pub fn post(&mut self, path: impl AsRef<str>) -> &mut Self {
        self.test("POST", path)
    }

    /// Targets `path` with a PUT request.
    pub fn put(&mut self, path: impl AsRef<str>) -> &mut Self {
        self.test("PUT", path)
    }

    /// Targets `path` with a PATCH request.
    pub fn patch(&mut self, path: impl AsRef<str>) -> &mut Self {
        self.test("PATCH", path)
    }

    /// Targets `path` with a DELETE request.
    pub fn delete(&mut self, path: impl AsRef<str>) -> &mut Self {
        self.test("DELETE", path)
    }

    /// Targets `path` with a HEAD request.
    pub fn head(&mut self, path: impl AsRef<str>) -> &mut Self {
        self.test("HEAD", path)
    }

    /// Targets `path` with an OPTIONS request.
    pub fn options(&mut self, path: impl AsRef<str>) -> &mut Self {
        self.test("OPTIONS", path)
    }

    /// Replaces the outstanding request wholesale with a caller-built one,
    /// bypassing the method/path builder.
    pub fn use_request(&mut self, request: Request) -> &mut Self {
        self.request = RequestSlot::Custom(request);
        self
    }

    /// Sets (overwrites) a single header on the outstanding request.
    pub fn with_header(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> &mut Self {
        let header = parse_header(key.as_ref(), value.as_ref());
        self.with_request(|request| {
            let (name, value) = header?;
            request.headers_mut().insert(name, value);
            Ok(())
        })
    }

    /// Appends `key=value` to the outgoing request's `Cookie` header
    /// immediately, independent of the jar-replay mechanism.
    ///
    /// Note that [`check`](Self::check) overwrites the `Cookie` header with
    /// the jar serialization before dispatch, so ad-hoc cookies only reach
    /// the handler through the jar.
    pub fn with_cookie(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> &mut Self {
        let pair = format!("{}={}", key.as_ref(), value.as_ref());
        self.with_request(move |request| {
            let combined = match request.headers().get(COOKIE).and_then(|v| v.to_str().ok()) {
                Some(current) if !current.is_empty() => format!("{current}; {pair}"),
                _ => pair,
            };
            let value = HeaderValue::try_from(combined)
                .map_err(|e| CheckError::InvalidHeader(format!("cookie: {e}")))?;
            request.headers_mut().insert(COOKIE, value);
            Ok(())
        })
    }

    /// Replaces the request body with the given bytes. Last call wins.
    pub fn with_body(&mut self, body: impl Into<Bytes>) -> &mut Self {
        let body = body.into();
        self.with_request(move |request| {
            *request.body_mut() = Full::new(body);
            Ok(())
        })
    }

    /// Replaces the request body with the given text. Last call wins.
    pub fn with_string(&mut self, text: impl Into<String>) -> &mut Self {
        self.with_body(Bytes::from(text.into()))
    }

    /// Serializes `value` as JSON and sets it as the request body.
    ///
    /// Serialization errors are reported to the test context and leave the
    /// body unchanged.
    pub fn with_json<T: Serialize + ?Sized>(&mut self, value: &T) -> &mut Self {
        match serde_json::to_vec(value) {
            Ok(encoded) => self.with_body(encoded),
            Err(e) => {
                self.report(&CheckError::from(e));
                self
            }
        }
    }

    /// Serializes `value` as XML and sets it as the request body.
    ///
    /// Serialization errors are reported to the test context and leave the
    /// body unchanged.
    pub fn with_xml<T: Serialize>(&mut self, value: &T) -> &mut Self {
        match quick_xml::se::to_string(value) {
            Ok(encoded) => self.with_string(encoded),
            Err(e) => {
                self.report(&CheckError::from(e));
                self
            }
        }
    }

    // execution /////////////////////////////////////////////////////////

    /// Dispatches the outstanding request against the handler and snapshots
    /// the response for assertions.
    ///
    /// The cookie jar is serialized into a single `Cookie` header value of
    /// concatenated `name=value;` pairs in insertion order, overwriting any
    /// existing `Cookie` header on the request. The handler is awaited
    /// inline; there is no socket, timeout, or retry. After capture, every
    /// `Set-Cookie` response value is split on its first `=` and stored in
    /// the jar with the remainder (attribute text included) kept verbatim as
    /// the value. A `Set-Cookie` value with no `name=` prefix is reported as
    /// a non-fatal parse failure and skipped.
    ///
    /// The stored request survives dispatch, so calling `check` again re-sends
    /// it with the updated jar.
    pub async fn check(&mut self) -> &mut Self {
        let cookie_value = match HeaderValue::try_from(self.serialize_jar()) {
            Ok(value) => value,
            Err(e) => {
                self.report(&CheckError::InvalidHeader(format!("cookie: {e}")));
                return self;
            }
        };

        let dispatched = self.request.request_mut().map(|request| {
            request.headers_mut().insert(COOKIE, cookie_value);
            clone_request(request)
        });
        let Some(request) = dispatched else {
            self.fail("nothing to check; call test() or use_request() first");
            return self;
        };

        tracing::debug!(method = %request.method(), uri = %request.uri(), "dispatching request in-process");
        let handler = Arc::clone(&self.handler);
        let response = handler(request).await;

        match CheckResponse::from_http(response).await {
            Ok(snapshot) => {
                tracing::debug!(status = %snapshot.status(), "captured response");
                self.harvest_cookies(&snapshot);
                self.response = Some(snapshot);
            }
            Err(e) => {
                self.report(&e);
                self.response = None;
            }
        }
        self
    }

    // assertions ////////////////////////////////////////////////////////

    /// Asserts that the response status code equals `expected`.
    pub fn has_status(&mut self, expected: u16) -> &mut Self {
        match &self.response {
            Some(response) => {
                let actual = response.status().as_u16();
                if actual != expected {
                    self.fail(format!("expected status {expected}, got {actual}"));
                }
            }
            None => self.fail(NO_RESPONSE),
        }
        self
    }

    /// Asserts that the response header `key` equals `expected` exactly.
    ///
    /// An absent header compares as the empty string.
    pub fn has_header(&mut self, key: impl AsRef<str>, expected: impl AsRef<str>) -> &mut Self {
        let key = key.as_ref();
        let expected = expected.as_ref();
        match &self.response {
            Some(response) => {
                let actual = response.header_str(key).unwrap_or("");
                if actual != expected {
                    self.fail(format!(
                        "header {key:?}: expected {expected:?}, got {actual:?}"
                    ));
                }
            }
            None => self.fail(NO_RESPONSE),
        }
        self
    }

    /// Asserts that the jar holds cookie `key` with exactly `expected`.
    ///
    /// The jar reflects the most recent execution's `Set-Cookie` headers.
    pub fn has_cookie(&mut self, key: impl AsRef<str>, expected: impl AsRef<str>) -> &mut Self {
        let key = key.as_ref();
        let expected = expected.as_ref();
        match self.jar.get(key) {
            Some(value) if value == expected => {}
            Some(value) => {
                let message = format!("cookie {key:?}: expected {expected:?}, got {value:?}");
                self.fail(message);
            }
            None => self.fail(format!("cookie {key:?} not present in jar")),
        }
        self
    }

    /// Asserts that the response body equals `expected` byte-for-byte.
    ///
    /// Reading consumes the captured body; a later body assertion on the
    /// same response observes an empty stream.
    pub fn has_body(&mut self, expected: impl AsRef<[u8]>) -> &mut Self {
        self.has_captured_body("body", expected.as_ref())
    }

    /// Asserts that the response body equals `expected` as UTF-8 text.
    pub fn has_string(&mut self, expected: impl AsRef<str>) -> &mut Self {
        self.has_body(expected.as_ref().as_bytes())
    }

    /// Serializes `value` as JSON and asserts the response body matches the
    /// encoded bytes exactly.
    ///
    /// This is byte equality, not semantic JSON equality: whitespace or
    /// key-order differences between the captured body and the re-serialized
    /// expectation fail the assertion.
    pub fn has_json<T: Serialize + ?Sized>(&mut self, value: &T) -> &mut Self {
        match serde_json::to_vec(value) {
            Ok(expected) => self.has_captured_body("JSON body", &expected),
            Err(e) => {
                self.report(&CheckError::from(e));
                self
            }
        }
    }

    /// Serializes `value` as XML and asserts the response body matches the
    /// encoded bytes exactly. Byte equality, as with
    /// [`has_json`](Self::has_json).
    pub fn has_xml<T: Serialize>(&mut self, value: &T) -> &mut Self {
        match quick_xml::se::to_string(value) {
            Ok(expected) => self.has_captured_body("XML body", expected.as_bytes()),
            Err(e) => {
                self.report(&CheckError::from(e));
                self
            }
        }
    }

    /// Invokes `f` with the captured response for assertions not covered by
    /// the built-in set.
    ///
    /// `f` receives `None` when no execution has happened yet.
    pub fn callback(&mut self, f: impl FnOnce(Option<&mut CheckResponse>)) -> &mut Self {
        f(self.response.as_mut());
        self
    }

    // internals /////////////////////////////////////////////////////////

    /// Applies `apply` to the outstanding request, reporting a failure when
    /// no request has been started.
    fn with_request(
        &mut self,
        apply: impl FnOnce(&mut Request) -> Result<(), CheckError>,
    ) -> &mut Self {
        let outcome = self.request.request_mut().map(apply);
        match outcome {
            Some(Ok(())) => {}
            Some(Err(e)) => self.report(&e),
            None => self.fail("no request started; call test() or use_request() first"),
        }
        self
    }

    /// Reads the captured body and compares it against `expected`.
    fn has_captured_body(&mut self, label: &str, expected: &[u8]) -> &mut Self {
        let outcome = self.response.as_mut().map(CheckResponse::read_body);
        match outcome {
            Some(Ok(actual)) => {
                if actual != expected {
                    self.fail(format!(
                        "{label} mismatch: expected {:?}, got {:?}",
                        String::from_utf8_lossy(expected),
                        String::from_utf8_lossy(&actual)
                    ));
                }
            }
            Some(Err(e)) => self.report(&e),
            None => self.fail(NO_RESPONSE),
        }
        self
    }

    /// Serializes the jar as concatenated `name=value;` pairs in insertion
    /// order, with a trailing separator after every pair.
    fn serialize_jar(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.jar {
            out.push_str(name);
            out.push('=');
            out.push_str(value);
            out.push(';');
        }
        out
    }

    /// Stores every `Set-Cookie` value of the snapshot in the jar.
    fn harvest_cookies(&mut self, response: &CheckResponse) {
        for value in response.headers().get_all(SET_COOKIE) {
            let Ok(text) = value.to_str() else {
                self.report(&CheckError::MalformedSetCookie(
                    "non-UTF-8 value".to_string(),
                ));
                continue;
            };
            match text.split_once('=') {
                Some((name, rest)) if !name.is_empty() => {
                    tracing::debug!(cookie = %name, "stored cookie from response");
                    self.jar.insert(name.to_string(), rest.to_string());
                }
                _ => self.report(&CheckError::MalformedSetCookie(text.to_string())),
            }
        }
    }

    fn report(&self, error: &CheckError) {
        self.fail(error.to_string());
    }

    fn fail(&self, message: impl Into<String>) {
        self.context.fail(message.into());
    }
}

const NO_RESPONSE: &str = "no response captured; call check() first";

/// Builds a bodyless request for the given method and path.
fn build_request(method: &str, path: &str) -> Result<Request, CheckError> {
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|e| CheckError::InvalidTarget(format!("method {method:?}: {e}")))?;
    let uri: Uri = path
        .parse()
        .map_err(|e| CheckError::InvalidTarget(format!("path {path:?}: {e}")))?;

    let mut request = http::Request::new(Full::new(Bytes::new()));
    *request.method_mut() = method;
    *request.uri_mut() = uri;
    Ok(request)
}

fn parse_header(key: &str, value: &str) -> Result<(HeaderName, HeaderValue), CheckError> {
    let name = HeaderName::try_from(key)
        .map_err(|e| CheckError::InvalidHeader(format!("{key}: {e}")))?;
    let value = HeaderValue::try_from(value)
        .map_err(|e| CheckError::InvalidHeader(format!("{key}: {e}")))?;
    Ok((name, value))
}
