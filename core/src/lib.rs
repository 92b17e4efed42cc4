//! Client library for the ContactHub customer-data API.
//!
//! # Overview
//! `HubClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). Two facades run
//! those build/parse pairs over a transport: [`ContactHub`] blocks the
//! calling thread, [`AsyncContactHub`] returns futures.
//!
//! # Design
//! - `HubClient` is stateless; it holds only the base URL and credentials.
//! - List endpoints return [`Paginated`] / [`AsyncPaginated`] values that
//!   can fetch further pages with the first request's filters frozen.
//! - Errors are never retried. Local precondition failures are reported
//!   before any request is built.
//!
//! ```no_run
//! use hub_core::{ContactHub, GetCustomersOptions, HubConfig};
//!
//! let hub = ContactHub::from_config(&HubConfig::from_env()?);
//! let mut page = hub.get_customers(&GetCustomersOptions::default().with_size(50))?;
//! loop {
//!     for customer in &page {
//!         println!("{:?}", customer.id);
//!     }
//!     if !page.has_next_page() {
//!         break;
//!     }
//!     page = page.next_page()?;
//! }
//! # Ok::<(), hub_core::HubError>(())
//! ```

pub mod auth;
pub mod blocking;
pub mod client;
mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod nonblocking;
pub mod paginated;
pub mod transport;
pub mod types;

pub use auth::Auth;
pub use blocking::ContactHub;
pub use client::HubClient;
pub use config::HubConfig;
pub use error::{ErrorCategory, HubError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use nonblocking::AsyncContactHub;
pub use paginated::{AsyncPaginated, Paginated};
pub use transport::{AsyncTransport, Transport};
pub use types::{
    BaseProperties, BringBackProperties, BringBackType, Contacts, Customer, Education, Event,
    EventContext, EventFilters, EventMode, GetCustomersOptions, Job, Like, PageEnvelope, PageInfo,
    SchoolType, SortDirection, Tags,
};

#[cfg(feature = "reqwest-transport")]
pub use transport::ReqwestTransport;
#[cfg(feature = "ureq-transport")]
pub use transport::UreqTransport;
