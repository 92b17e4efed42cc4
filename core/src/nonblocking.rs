//! Async ContactHub facade.
//!
//! Mirrors [`ContactHub`](crate::blocking::ContactHub) over an
//! [`AsyncTransport`]. Listings return an [`AsyncPaginated`] whose page
//! turns are themselves futures.

use std::sync::Arc;

use futures_util::future::FutureExt;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::client::HubClient;
use crate::codec::{self, TagChange};
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::paginated::{AsyncPageFetcher, AsyncPaginated};
use crate::transport::AsyncTransport;
use crate::types::{
    Customer, Education, Event, EventFilters, GetCustomersOptions, Job, Like,
};

#[cfg(feature = "reqwest-transport")]
use crate::{config::HubConfig, transport::ReqwestTransport};

struct Inner<T> {
    client: HubClient,
    transport: T,
}

/// Asynchronous ContactHub client. Cheap to clone.
pub struct AsyncContactHub<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for AsyncContactHub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(feature = "reqwest-transport")]
impl AsyncContactHub<ReqwestTransport> {
    pub fn from_config(config: &HubConfig) -> Result<Self> {
        Ok(Self::new(
            HubClient::new(&config.base_url, config.auth.clone()),
            ReqwestTransport::new(config.timeout)?,
        ))
    }
}

impl<T: AsyncTransport + 'static> AsyncContactHub<T> {
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

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.inner.transport.send(request).await?;
        tracing::debug!(status = response.status, "received response");
        Ok(response)
    }

    async fn fetch<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R> {
        let response = self.execute(request).await?;
        self.inner.client.parse_entity(response)
    }

    async fn run(&self, request: HttpRequest) -> Result<()> {
        let response = self.execute(request).await?;
        self.inner.client.parse_empty(response)
    }

    // --- Sessions ---

    pub fn create_session_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    pub async fn add_customer_session(&self, customer_id: &str, session_id: &str) -> Result<()> {
        let request = self
            .inner
            .client
            .build_add_customer_session(customer_id, session_id)?;
        self.run(request).await
    }

    // --- Customers ---

    pub async fn get_customer(&self, id: &str) -> Result<Customer> {
        self.fetch(self.inner.client.build_get_customer(id)).await
    }

    /// List the customers of the node, filtered and ordered by `options`.
    pub async fn get_customers(
        &self,
        options: &GetCustomersOptions,
    ) -> Result<AsyncPaginated<Customer>> {
        let request = self.inner.client.build_list_customers(options);
        let envelope = self
            .inner
            .client
            .parse_page(self.execute(request).await?)?;
        Ok(AsyncPaginated::new(
            envelope,
            self.customer_pages(options.clone()),
        ))
    }

    // Kept out of `get_customers` so the boxed future does not have to name
    // the opaque type it is defined in.
    fn customer_pages(&self, options: GetCustomersOptions) -> AsyncPageFetcher<Customer> {
        let hub = self.clone();
        Arc::new(move |page| {
            let hub = hub.clone();
            let options = options.with_page(page);
            async move { hub.get_customers(&options).await }.boxed()
        })
    }

    pub async fn get_all_customers(&self) -> Result<AsyncPaginated<Customer>> {
        self.get_customers(&GetCustomersOptions::default()).await
    }

    pub async fn get_customer_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<AsyncPaginated<Customer>> {
        self.get_customers(&GetCustomersOptions::default().with_external_id(external_id))
            .await
    }

    pub async fn add_customer(&self, customer: &Customer) -> Result<Customer> {
        let request = self.inner.client.build_add_customer(customer)?;
        self.fetch(request).await
    }

    pub async fn update_customer(&self, customer: &Customer) -> Result<Customer> {
        let request = self.inner.client.build_update_customer(customer)?;
        self.fetch(request).await
    }

    pub async fn patch_customer(&self, customer_id: &str, patch: &Customer) -> Result<Customer> {
        let request = self.inner.client.build_patch_customer(customer_id, patch)?;
        self.fetch(request).await
    }

    pub async fn delete_customer(&self, id: &str) -> Result<()> {
        self.run(self.inner.client.build_delete_customer(id)).await
    }

    // --- Likes ---

    pub async fn add_like(&self, customer_id: &str, like: &Like) -> Result<Like> {
        let request = self.inner.client.build_add_like(customer_id, like)?;
        self.fetch(request).await
    }

    pub async fn update_like(&self, customer_id: &str, like: &Like) -> Result<Like> {
        let request = self.inner.client.build_update_like(customer_id, like)?;
        self.fetch(request).await
    }

    pub async fn remove_like(&self, customer_id: &str, like_id: &str) -> Result<()> {
        self.run(self.inner.client.build_remove_like(customer_id, like_id))
            .await
    }

    // --- Jobs ---

    pub async fn add_job(&self, customer_id: &str, job: &Job) -> Result<Job> {
        let request = self.inner.client.build_add_job(customer_id, job)?;
        self.fetch(request).await
    }

    pub async fn update_job(&self, customer_id: &str, job: &Job) -> Result<Job> {
        let request = self.inner.client.build_update_job(customer_id, job)?;
        self.fetch(request).await
    }

    pub async fn remove_job(&self, customer_id: &str, job_id: &str) -> Result<()> {
        self.run(self.inner.client.build_remove_job(customer_id, job_id))
            .await
    }

    // --- Educations ---

    pub async fn add_education(&self, customer_id: &str, education: &Education) -> Result<Education> {
        let request = self.inner.client.build_add_education(customer_id, education)?;
        self.fetch(request).await
    }

    pub async fn update_education(
        &self,
        customer_id: &str,
        education: &Education,
    ) -> Result<Education> {
        let request = self
            .inner
            .client
            .build_update_education(customer_id, education)?;
        self.fetch(request).await
    }

    pub async fn remove_education(&self, customer_id: &str, education_id: &str) -> Result<()> {
        let request = self
            .inner
            .client
            .build_remove_education(customer_id, education_id);
        self.run(request).await
    }

    // --- Tags ---

    pub async fn add_tag(&self, customer_id: &str, tag: &str) -> Result<Customer> {
        self.change_tag(customer_id, tag, TagChange::Add).await
    }

    pub async fn remove_tag(&self, customer_id: &str, tag: &str) -> Result<Customer> {
        self.change_tag(customer_id, tag, TagChange::Remove).await
    }

    async fn change_tag(&self, customer_id: &str, tag: &str, change: TagChange) -> Result<Customer> {
        let customer = self.get_customer(customer_id).await?;
        match codec::tag_patch(&customer, tag, change) {
            Some(patch) => {
                let request = self.inner.client.build_patch_customer(customer_id, &patch)?;
                self.fetch(request).await
            }
            None => Ok(customer),
        }
    }

    // --- Events ---

    /// Queue an event for insertion. Unidentified events fail before any
    /// request is made.
    pub async fn add_event(&self, event: &Event) -> Result<()> {
        let request = self.inner.client.build_add_event(event)?;
        self.run(request).await
    }

    pub async fn get_event(&self, id: &str) -> Result<Event> {
        self.fetch(self.inner.client.build_get_event(id)).await
    }

    pub async fn get_events(
        &self,
        customer_id: &str,
        filters: &EventFilters,
    ) -> Result<AsyncPaginated<Event>> {
        let request = self.inner.client.build_list_events(customer_id, filters);
        let envelope = self
            .inner
            .client
            .parse_page(self.execute(request).await?)?;
        Ok(AsyncPaginated::new(
            envelope,
            self.event_pages(customer_id.to_string(), filters.clone()),
        ))
    }

    fn event_pages(&self, customer_id: String, filters: EventFilters) -> AsyncPageFetcher<Event> {
        let hub = self.clone();
        Arc::new(move |page| {
            let hub = hub.clone();
            let customer_id = customer_id.clone();
            let filters = filters.with_page(page);
            async move { hub.get_events(&customer_id, &filters).await }.boxed()
        })
    }
}
