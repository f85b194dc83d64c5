//! # httpcheck
//!
//! Fluent in-memory assertion helper for exercising HTTP handlers in
//! automated tests. A [`Checker`] builds a request, dispatches it directly
//! against an in-process handler (no socket, no listener), captures the
//! response, and exposes chained assertions over status, headers, cookies,
//! and body content (raw, string, JSON, XML).
//!
//! Cookies set by one execution are replayed on the next request from the
//! same checker, emulating session continuity across sequential calls.
//!
//! ## Key Features
//!
//! - **In-Memory Dispatch**: no network connections or port binding
//! - **Fluent Builder**: chain target, headers, cookies, and body calls
//! - **Chained Assertions**: status, headers, cookies, raw/string/JSON/XML body
//! - **Cookie Jar**: `Set-Cookie` values persisted and replayed in order
//! - **Collect-All Failures**: mismatches are reported to a test context
//!   without stopping the chain
//!
//! ## Example
//!
//! ```ignore
//! use httpcheck::Checker;
//!
//! #[tokio::test]
//! async fn test_ping() {
//!     let mut checker = Checker::new(|req| async move {
//!         http::Response::builder()
//!             .status(200)
//!             .header("X-Test", "ok")
//!             .body(Full::new(Bytes::from("pong")))
//!             .unwrap()
//!     });
//!
//!     checker
//!         .test("get", "/ping")
//!         .check()
//!         .await
//!         .has_status(200)
//!         .has_header("X-Test", "ok")
//!         .has_string("pong");
//! }
//! ```
//!
//! By default a checker panics on the first failed assertion. Bind a
//! [`FailureLog`] with [`Checker::with_context`] to collect every failure
//! from a chain instead and inspect them afterwards.

#![doc(html_root_url = "https://docs.rs/httpcheck/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod checker;
mod context;
mod error;
mod request;
mod response;

pub use body::BufferedBody;
pub use checker::{Checker, Handler};
pub use context::{FailureLog, PanicContext, TestContext};
pub use error::CheckError;
pub use request::{Request, Response};
pub use response::CheckResponse;
