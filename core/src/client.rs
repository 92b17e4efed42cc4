//! Stateless HTTP request builder and response parser for the ContactHub API.
//!
//! # Design
//! `HubClient` holds the base URL and credentials and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The blocking and async facades run the same build/parse
//! pairs over different transports.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::auth::Auth;
use crate::codec;
use crate::error::{HubError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Customer, Education, Event, EventFilters, GetCustomersOptions, Job, Like, PageEnvelope,
};

/// Customer sub-resources addressed as `/customers/{id}/{segment}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubResource {
    Likes,
    Jobs,
    Educations,
}

impl SubResource {
    fn segment(self) -> &'static str {
        match self {
            SubResource::Likes => "likes",
            SubResource::Jobs => "jobs",
            SubResource::Educations => "educations",
        }
    }
}

/// Sans-IO client for the ContactHub API.
#[derive(Debug, Clone)]
pub struct HubClient {
    base_url: String,
    auth: Auth,
}

impl HubClient {
    pub fn new(base_url: &str, auth: Auth) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/workspaces/{}{endpoint}",
            self.base_url, self.auth.workspace_id
        )
    }

    fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        query: Vec<(String, String)>,
        body: Option<String>,
    ) -> HttpRequest {
        let mut headers = vec![
            ("authorization".to_string(), self.auth.bearer()),
            ("accept".to_string(), "application/json".to_string()),
        ];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url: self.url(endpoint),
            query,
            headers,
            body,
        }
    }

    // --- Customers ---

    pub fn build_get_customer(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/customers/{id}"), Vec::new(), None)
    }

    /// GET /customers scoped to the caller's node.
    pub fn build_list_customers(&self, options: &GetCustomersOptions) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            "/customers",
            options.to_query(&self.auth.node_id),
            None,
        )
    }

    pub fn build_add_customer(&self, customer: &Customer) -> Result<HttpRequest> {
        let body = codec::customer_body(customer, &self.auth.node_id)?;
        Ok(self.request(HttpMethod::Post, "/customers", Vec::new(), Some(body)))
    }

    /// PUT /customers/{id}. The customer must carry its id.
    pub fn build_update_customer(&self, customer: &Customer) -> Result<HttpRequest> {
        let id = customer
            .id
            .as_deref()
            .ok_or_else(|| HubError::Usage("cannot update a customer without an id".to_string()))?;
        let body = codec::customer_body(customer, &self.auth.node_id)?;
        Ok(self.request(
            HttpMethod::Put,
            &format!("/customers/{id}"),
            Vec::new(),
            Some(body),
        ))
    }

    /// PATCH /customers/{id} with any serializable partial customer.
    pub fn build_patch_customer<T: Serialize + ?Sized>(
        &self,
        id: &str,
        patch: &T,
    ) -> Result<HttpRequest> {
        let body = codec::encode(patch)?;
        Ok(self.request(
            HttpMethod::Patch,
            &format!("/customers/{id}"),
            Vec::new(),
            Some(body),
        ))
    }

    pub fn build_delete_customer(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/customers/{id}"), Vec::new(), None)
    }

    /// POST /customers/{id}/sessions, linking a session id to the customer.
    pub fn build_add_customer_session(
        &self,
        customer_id: &str,
        session_id: &str,
    ) -> Result<HttpRequest> {
        let body = codec::encode(&json!({ "value": session_id }))?;
        Ok(self.request(
            HttpMethod::Post,
            &format!("/customers/{customer_id}/sessions"),
            Vec::new(),
            Some(body),
        ))
    }

    // --- Likes, jobs, educations ---

    fn build_add_sub<T: Serialize>(
        &self,
        kind: SubResource,
        customer_id: &str,
        entity: &T,
    ) -> Result<HttpRequest> {
        let body = codec::encode(entity)?;
        Ok(self.request(
            HttpMethod::Post,
            &format!("/customers/{customer_id}/{}", kind.segment()),
            Vec::new(),
            Some(body),
        ))
    }

    fn build_update_sub<T: Serialize>(
        &self,
        kind: SubResource,
        customer_id: &str,
        entity_id: Option<&str>,
        entity: &T,
    ) -> Result<HttpRequest> {
        let entity_id = entity_id.ok_or_else(|| {
            HubError::Usage(format!("cannot update {} without an id", kind.segment()))
        })?;
        let body = codec::encode(entity)?;
        Ok(self.request(
            HttpMethod::Put,
            &format!("/customers/{customer_id}/{}/{entity_id}", kind.segment()),
            Vec::new(),
            Some(body),
        ))
    }

    fn build_remove_sub(&self, kind: SubResource, customer_id: &str, entity_id: &str) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            &format!("/customers/{customer_id}/{}/{entity_id}", kind.segment()),
            Vec::new(),
            None,
        )
    }

    pub fn build_add_like(&self, customer_id: &str, like: &Like) -> Result<HttpRequest> {
        self.build_add_sub(SubResource::Likes, customer_id, like)
    }

    pub fn build_update_like(&self, customer_id: &str, like: &Like) -> Result<HttpRequest> {
        self.build_update_sub(SubResource::Likes, customer_id, like.id.as_deref(), like)
    }

    pub fn build_remove_like(&self, customer_id: &str, like_id: &str) -> HttpRequest {
        self.build_remove_sub(SubResource::Likes, customer_id, like_id)
    }

    pub fn build_add_job(&self, customer_id: &str, job: &Job) -> Result<HttpRequest> {
        self.build_add_sub(SubResource::Jobs, customer_id, job)
    }

    pub fn build_update_job(&self, customer_id: &str, job: &Job) -> Result<HttpRequest> {
        self.build_update_sub(SubResource::Jobs, customer_id, job.id.as_deref(), job)
    }

    pub fn build_remove_job(&self, customer_id: &str, job_id: &str) -> HttpRequest {
        self.build_remove_sub(SubResource::Jobs, customer_id, job_id)
    }

    pub fn build_add_education(
        &self,
        customer_id: &str,
        education: &Education,
    ) -> Result<HttpRequest> {
        self.build_add_sub(SubResource::Educations, customer_id, education)
    }

    pub fn build_update_education(
        &self,
        customer_id: &str,
        education: &Education,
    ) -> Result<HttpRequest> {
        self.build_update_sub(
            SubResource::Educations,
            customer_id,
            education.id.as_deref(),
            education,
        )
    }

    pub fn build_remove_education(&self, customer_id: &str, education_id: &str) -> HttpRequest {
        self.build_remove_sub(SubResource::Educations, customer_id, education_id)
    }

    // --- Events ---

    /// POST /events. Fails locally when the event identifies no customer.
    pub fn build_add_event(&self, event: &Event) -> Result<HttpRequest> {
        let body = codec::event_body(event, &self.auth.node_id)?;
        Ok(self.request(HttpMethod::Post, "/events", Vec::new(), Some(body)))
    }

    pub fn build_get_event(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/events/{id}"), Vec::new(), None)
    }

    pub fn build_list_events(&self, customer_id: &str, filters: &EventFilters) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            "/events",
            filters.to_query(customer_id),
            None,
        )
    }

    // --- Parsing ---

    /// Decode a single entity from a 2xx response.
    pub fn parse_entity<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T> {
        check_status(&response)?;
        codec::decode(&response.body)
    }

    /// Decode a page envelope from a 2xx response.
    pub fn parse_page<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<PageEnvelope<T>> {
        check_status(&response)?;
        codec::decode(&response.body)
    }

    /// Accept any 2xx response, ignoring its body.
    pub fn parse_empty(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }
}

/// Map non-2xx status codes to [`HubError::Server`].
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let message = codec::error_message(&response.body);
    tracing::warn!(status = response.status, %message, "server rejected request");
    Err(HubError::Server {
        status: response.status,
        message,
    })
}
