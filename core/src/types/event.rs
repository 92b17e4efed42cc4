use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::date;
use super::enums::{BringBackType, EventContext};

/// Something a customer did, or that happened to a customer.
///
/// Exactly one way of identifying the customer is sent on submission:
/// `customer_id` wins, then `external_id`, then `session_id`. The latter two
/// only travel inside a [`BringBackProperties`] envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub session_id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub context: EventContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub properties: Value,
    #[serde(
        default,
        with = "date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bring_back_properties: Option<BringBackProperties>,
    #[serde(
        default,
        with = "date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub registered_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn new(event_type: &str, context: EventContext) -> Self {
        Self {
            id: None,
            customer_id: None,
            external_id: None,
            session_id: None,
            event_type: event_type.to_string(),
            context,
            context_info: None,
            properties: Value::Null,
            date: None,
            bring_back_properties: None,
            registered_at: None,
        }
    }

    pub fn for_customer(mut self, customer_id: &str) -> Self {
        self.customer_id = Some(customer_id.to_string());
        self
    }

    pub fn for_external_id(mut self, external_id: &str) -> Self {
        self.external_id = Some(external_id.to_string());
        self
    }

    pub fn for_session(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// Identifies a customer by external or session id when an event is
/// submitted without a customer id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BringBackProperties {
    #[serde(rename = "type")]
    pub kind: BringBackType,
    pub value: String,
    pub node_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_decodes_server_shape() {
        let json = r#"{
            "id": "ev-1",
            "customerId": "c-1",
            "type": "viewedPage",
            "context": "WEB",
            "properties": { "url": "https://example.com" },
            "date": "2024-05-06T07:08:09.123Z",
            "bringBackProperties": { "type": "SESSION_ID", "value": "s-1", "nodeId": "n-1" }
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, "viewedPage");
        assert_eq!(event.context, EventContext::Web);
        assert_eq!(event.properties["url"], "https://example.com");
        assert_eq!(
            event.bring_back_properties.unwrap().kind,
            BringBackType::SessionId
        );
    }

    #[test]
    fn external_and_session_ids_never_serialize_at_top_level() {
        let event = Event::new("viewedPage", EventContext::Web)
            .for_external_id("ext-1")
            .for_session("s-1");
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("externalId").is_none());
        assert!(json.get("sessionId").is_none());
        assert_eq!(json["type"], "viewedPage");
    }
}
