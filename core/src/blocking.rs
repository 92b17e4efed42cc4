//! Blocking ContactHub facade.
//!
//! Every call builds a request with [`HubClient`], runs it on the calling
//! thread through a [`Transport`], and parses the response. Listings return
//! a [`Paginated`] whose page turns re-run the same listing.

use std::sync::Arc;

use uuid::Uuid;

use crate::client::HubClient;
use crate::codec::{self, TagChange};
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::paginated::{PageFetcher, Paginated};
use crate::transport::Transport;
use crate::types::{
    Customer, Education, Event, EventFilters, GetCustomersOptions, Job, Like,
};

#[cfg(feature = "ureq-transport")]
use crate::{config::HubConfig, transport::UreqTransport};

struct Inner<T> {
    client: HubClient,
    transport: T,
}

/// Synchronous ContactHub client. Cheap to clone.
pub struct ContactHub<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ContactHub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(feature = "ureq-transport")]
impl ContactHub<UreqTransport> {
    pub fn from_config(config: &HubConfig) -> Self {
        Self::new(
            HubClient::new(&config.base_url, config.auth.clone()),
            UreqTransport::new(config.timeout),
        )
    }
}

impl<T: Transport + 'static> ContactHub<T> {
    pub fn new(client: HubClient, transport: T) -> Self {
        Self {
            inner: Arc::new(Inner { client, transport }),
        }
    }

    pub fn client(&self) -> &HubClient {
        &self.inner.client
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.inner.transport.send(request)?;
        tracing::debug!(status = response.status, "received response");
        Ok(response)
    }

    fn fetch<R: serde::de::DeserializeOwned>(&self, request: HttpRequest) -> Result<R> {
        let response = self.execute(request)?;
        self.inner.client.parse_entity(response)
    }

    fn run(&self, request: HttpRequest) -> Result<()> {
        let response = self.execute(request)?;
        self.inner.client.parse_empty(response)
    }

    // --- Sessions ---

    /// Generate a fresh session id. No request is made.
    pub fn create_session_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Link a session id to an existing customer.
    pub fn add_customer_session(&self, customer_id: &str, session_id: &str) -> Result<()> {
        self.run(
            self.inner
                .client
                .build_add_customer_session(customer_id, session_id)?,
        )
    }

    // --- Customers ---

    pub fn get_customer(&self, id: &str) -> Result<Customer> {
        self.fetch(self.inner.client.build_get_customer(id))
    }

    /// List the customers of the node, filtered and ordered by `options`.
    ///
    /// The returned page fetches its siblings with exactly these options,
    /// only the page number changing.
    pub fn get_customers(&self, options: &GetCustomersOptions) -> Result<Paginated<Customer>> {
        let request = self.inner.client.build_list_customers(options);
        let envelope = self.inner.client.parse_page(self.execute(request)?)?;

        let hub = self.clone();
        let options = options.clone();
        let fetcher: PageFetcher<Customer> =
            Arc::new(move |page| hub.get_customers(&options.with_page(page)));
        Ok(Paginated::new(envelope, fetcher))
    }

    pub fn get_all_customers(&self) -> Result<Paginated<Customer>> {
        self.get_customers(&GetCustomersOptions::default())
    }

    pub fn get_customer_by_external_id(&self, external_id: &str) -> Result<Paginated<Customer>> {
        self.get_customers(&GetCustomersOptions::default().with_external_id(external_id))
    }

    pub fn add_customer(&self, customer: &Customer) -> Result<Customer> {
        self.fetch(self.inner.client.build_add_customer(customer)?)
    }

    /// Replace a customer. The customer must carry its id.
    pub fn update_customer(&self, customer: &Customer) -> Result<Customer> {
        self.fetch(self.inner.client.build_update_customer(customer)?)
    }

    /// Apply the fields set in `patch` to the customer.
    pub fn patch_customer(&self, customer_id: &str, patch: &Customer) -> Result<Customer> {
        self.fetch(self.inner.client.build_patch_customer(customer_id, patch)?)
    }

    pub fn delete_customer(&self, id: &str) -> Result<()> {
        self.run(self.inner.client.build_delete_customer(id))
    }

    // --- Likes ---

    pub fn add_like(&self, customer_id: &str, like: &Like) -> Result<Like> {
        self.fetch(self.inner.client.build_add_like(customer_id, like)?)
    }

    pub fn update_like(&self, customer_id: &str, like: &Like) -> Result<Like> {
        self.fetch(self.inner.client.build_update_like(customer_id, like)?)
    }

    pub fn remove_like(&self, customer_id: &str, like_id: &str) -> Result<()> {
        self.run(self.inner.client.build_remove_like(customer_id, like_id))
    }

    // --- Jobs ---

    pub fn add_job(&self, customer_id: &str, job: &Job) -> Result<Job> {
        self.fetch(self.inner.client.build_add_job(customer_id, job)?)
    }

    pub fn update_job(&self, customer_id: &str, job: &Job) -> Result<Job> {
        self.fetch(self.inner.client.build_update_job(customer_id, job)?)
    }

    pub fn remove_job(&self, customer_id: &str, job_id: &str) -> Result<()> {
        self.run(self.inner.client.build_remove_job(customer_id, job_id))
    }

    // --- Educations ---

    pub fn add_education(&self, customer_id: &str, education: &Education) -> Result<Education> {
        self.fetch(self.inner.client.build_add_education(customer_id, education)?)
    }

    pub fn update_education(&self, customer_id: &str, education: &Education) -> Result<Education> {
        self.fetch(
            self.inner
                .client
                .build_update_education(customer_id, education)?,
        )
    }

    pub fn remove_education(&self, customer_id: &str, education_id: &str) -> Result<()> {
        self.run(
            self.inner
                .client
                .build_remove_education(customer_id, education_id),
        )
    }

    // --- Tags ---

    /// Add a manual tag. Returns the customer as stored afterwards; nothing
    /// is patched when the tag is already present.
    pub fn add_tag(&self, customer_id: &str, tag: &str) -> Result<Customer> {
        self.change_tag(customer_id, tag, TagChange::Add)
    }

    /// Remove a manual tag. Nothing is patched when the tag is absent.
    pub fn remove_tag(&self, customer_id: &str, tag: &str) -> Result<Customer> {
        self.change_tag(customer_id, tag, TagChange::Remove)
    }

    fn change_tag(&self, customer_id: &str, tag: &str, change: TagChange) -> Result<Customer> {
        let customer = self.get_customer(customer_id)?;
        match codec::tag_patch(&customer, tag, change) {
            Some(patch) => self.fetch(self.inner.client.build_patch_customer(customer_id, &patch)?),
            None => Ok(customer),
        }
    }

    // --- Events ---

    /// Queue an event for insertion.
    ///
    /// Fails locally, without a request, when the event carries none of
    /// customer id, external id or session id.
    pub fn add_event(&self, event: &Event) -> Result<()> {
        self.run(self.inner.client.build_add_event(event)?)
    }

    pub fn get_event(&self, id: &str) -> Result<Event> {
        self.fetch(self.inner.client.build_get_event(id))
    }

    /// List the events of a customer.
    pub fn get_events(&self, customer_id: &str, filters: &EventFilters) -> Result<Paginated<Event>> {
        let request = self.inner.client.build_list_events(customer_id, filters);
        let envelope = self.inner.client.parse_page(self.execute(request)?)?;

        let hub = self.clone();
        let customer_id = customer_id.to_string();
        let filters = filters.clone();
        let fetcher: PageFetcher<Event> =
            Arc::new(move |page| hub.get_events(&customer_id, &filters.with_page(page)));
        Ok(Paginated::new(envelope, fetcher))
    }
}
