//! Transports that execute an [`HttpRequest`] over the network.
//!
//! A transport does no status interpretation: any response the server
//! sends back, 4xx and 5xx included, is returned as data for the
//! `HubClient` to parse. Only failures to get a response become
//! [`TransportError`](crate::error::TransportError)s.

use std::future::Future;

use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};

#[cfg(feature = "reqwest-transport")]
mod reqwest_transport;
#[cfg(feature = "reqwest-transport")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "ureq-transport")]
mod ureq_transport;
#[cfg(feature = "ureq-transport")]
pub use ureq_transport::UreqTransport;

/// Blocking transport: `send` returns once the response has been read.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Non-blocking transport driven by an async runtime.
///
/// Uses native `impl Future` in traits, so implementors may write
/// `async fn send`.
pub trait AsyncTransport: Send + Sync {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}
