//! Domain DTOs for the ContactHub API.
//!
//! # Design
//! Optional wire fields are `Option<T>` and are left out of request bodies
//! when absent, so the same types serve full updates and partial patches.
//! The mock-server crate keeps its own schema; integration tests catch
//! drift between the two.

mod customer;
pub mod date;
mod enums;
mod event;
mod options;
mod page;

pub use customer::{BaseProperties, Contacts, Customer, Education, Job, Like, Tags};
pub use enums::{BringBackType, EventContext, EventMode, SchoolType, SortDirection};
pub use event::{BringBackProperties, Event};
pub use options::{EventFilters, GetCustomersOptions};
pub use page::{PageEnvelope, PageInfo};
