//! Listing options.
//!
//! # Design
//! Options are plain values. Turning a page goes through `with_page`, which
//! copies every other field unchanged, so a listing and all of its later
//! pages share the exact same filters.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::date;
use super::enums::{EventContext, EventMode, SortDirection};

/// Filters, field selection and ordering for a customer listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetCustomersOptions {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub external_id: Option<String>,
    /// Restrict the returned properties; empty means all.
    pub fields: Vec<String>,
    /// Server-side query expression, sent as JSON text.
    pub query: Option<Value>,
    pub sort: Option<String>,
    /// Ignored unless `sort` is set.
    pub direction: Option<SortDirection>,
}

impl GetCustomersOptions {
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_external_id(mut self, external_id: &str) -> Self {
        self.external_id = Some(external_id.to_string());
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_sort(mut self, field: &str, direction: Option<SortDirection>) -> Self {
        self.sort = Some(field.to_string());
        self.direction = direction;
        self
    }

    /// Query parameters for `GET /customers`, in a fixed order.
    pub fn to_query(&self, node_id: &str) -> Vec<(String, String)> {
        let mut query = vec![("nodeId".to_string(), node_id.to_string())];
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            query.push(("size".to_string(), size.to_string()));
        }
        if let Some(ref id) = self.external_id {
            query.push(("externalId".to_string(), id.clone()));
        }
        if !self.fields.is_empty() {
            query.push(("fields".to_string(), self.fields.join(",")));
        }
        if let Some(ref q) = self.query {
            query.push(("query".to_string(), q.to_string()));
        }
        if let Some(ref sort) = self.sort {
            let value = match self.direction {
                Some(dir) => format!("{sort},{}", dir.as_str()),
                None => sort.clone(),
            };
            query.push(("sort".to_string(), value));
        }
        query
    }
}

/// Filters for the events of one customer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilters {
    pub event_type: Option<String>,
    pub context: Option<EventContext>,
    pub mode: Option<EventMode>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl EventFilters {
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }

    pub fn with_type(mut self, event_type: &str) -> Self {
        self.event_type = Some(event_type.to_string());
        self
    }

    pub fn with_context(mut self, context: EventContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_mode(mut self, mode: EventMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Query parameters for `GET /events`, in a fixed order.
    pub fn to_query(&self, customer_id: &str) -> Vec<(String, String)> {
        let mut query = vec![("customerId".to_string(), customer_id.to_string())];
        if let Some(ref t) = self.event_type {
            query.push(("type".to_string(), t.clone()));
        }
        if let Some(ctx) = self.context {
            query.push(("context".to_string(), ctx.as_str().to_string()));
        }
        if let Some(mode) = self.mode {
            query.push(("mode".to_string(), mode.as_str().to_string()));
        }
        if let Some(ref from) = self.date_from {
            query.push(("dateFrom".to_string(), date::format(from)));
        }
        if let Some(ref to) = self.date_to {
            query.push(("dateTo".to_string(), date::format(to)));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            query.push(("size".to_string(), size.to_string()));
        }
        query
    }
}
