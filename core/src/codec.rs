//! Conversion between wire JSON and domain types.
//!
//! Most entities map field-for-field through serde. The exceptions live
//! here: customers are stamped with the caller's node, events identified
//! by external or session id are wrapped in a bring-back envelope, and tag
//! changes become a minimal patch.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{HubError, Result};
use crate::types::{date, BringBackProperties, BringBackType, Customer, Event, EventContext};

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(HubError::Serialization)
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(HubError::Deserialization)
}

/// Body for customer add/update, carrying the caller's node id.
pub(crate) fn customer_body(customer: &Customer, node_id: &str) -> Result<String> {
    encode(&customer.with_node_id(node_id))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventSubmission<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bring_back_properties: Option<BringBackProperties>,
    #[serde(rename = "type")]
    event_type: &'a str,
    context: EventContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    context_info: Option<&'a Value>,
    #[serde(skip_serializing_if = "Value::is_null")]
    properties: &'a Value,
    #[serde(
        with = "date::option",
        skip_serializing_if = "Option::is_none"
    )]
    date: Option<DateTime<Utc>>,
}

/// Identification carried by a submitted event.
fn identify(event: &Event, node_id: &str) -> Result<(Option<String>, Option<BringBackProperties>)> {
    let bring_back = |kind, value: &str| BringBackProperties {
        kind,
        value: value.to_string(),
        node_id: node_id.to_string(),
    };

    match (&event.customer_id, &event.external_id, &event.session_id) {
        (Some(id), _, _) => Ok((Some(id.clone()), None)),
        (None, Some(ext), _) => Ok((None, Some(bring_back(BringBackType::ExternalId, ext)))),
        (None, None, Some(session)) => {
            Ok((None, Some(bring_back(BringBackType::SessionId, session))))
        }
        (None, None, None) => Err(HubError::Usage(
            "an event needs a customerId, an externalId or a sessionId".to_string(),
        )),
    }
}

/// Body for `POST /events`.
///
/// Fails with [`HubError::Usage`] when the event identifies no customer.
pub(crate) fn event_body(event: &Event, node_id: &str) -> Result<String> {
    let (customer_id, bring_back_properties) = identify(event, node_id)?;
    encode(&EventSubmission {
        customer_id: customer_id.as_deref(),
        bring_back_properties,
        event_type: &event.event_type,
        context: event.context,
        context_info: event.context_info.as_ref(),
        properties: &event.properties,
        date: event.date,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagChange {
    Add,
    Remove,
}

/// Patch body that applies `change` to the customer's manual tags, or
/// `None` when the tags would not change.
pub(crate) fn tag_patch(customer: &Customer, tag: &str, change: TagChange) -> Option<Value> {
    let current = customer.manual_tags();
    let present = current.iter().any(|t| t == tag);

    let manual: Vec<&str> = match (change, present) {
        (TagChange::Add, false) => current
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(tag))
            .collect(),
        (TagChange::Remove, true) => current
            .iter()
            .map(String::as_str)
            .filter(|t| *t != tag)
            .collect(),
        _ => return None,
    };

    Some(json!({ "tags": { "manual": manual } }))
}

/// Human-readable message from a server error body.
///
/// The server reports `{"message": ..., "logref": ...}`; anything else is
/// returned verbatim.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::Tags;

    fn body_json(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn customer_id_is_sent_directly() {
        let event = Event::new("viewedPage", EventContext::Web)
            .for_customer("c-1")
            .for_external_id("ignored");
        let body = body_json(&event_body(&event, "node-1").unwrap());
        assert_eq!(body["customerId"], "c-1");
        assert!(body.get("bringBackProperties").is_none());
        assert!(body.get("externalId").is_none());
    }

    #[test]
    fn external_id_moves_into_bring_back_envelope() {
        let event = Event::new("viewedPage", EventContext::Web)
            .for_external_id("ext-1")
            .with_properties(json!({ "url": "/home" }));
        let body = body_json(&event_body(&event, "node-1").unwrap());
        assert_eq!(
            body["bringBackProperties"],
            json!({ "type": "EXTERNAL_ID", "value": "ext-1", "nodeId": "node-1" })
        );
        assert!(body.get("externalId").is_none());
        assert!(body.get("customerId").is_none());
        assert_eq!(body["properties"]["url"], "/home");
    }

    #[test]
    fn session_id_moves_into_bring_back_envelope() {
        let event = Event::new("loggedIn", EventContext::Mobile).for_session("s-1");
        let body = body_json(&event_body(&event, "node-1").unwrap());
        assert_eq!(body["bringBackProperties"]["type"], "SESSION_ID");
        assert_eq!(body["bringBackProperties"]["value"], "s-1");
        assert!(body.get("sessionId").is_none());
    }

    #[test]
    fn unidentified_event_is_rejected() {
        let event = Event::new("viewedPage", EventContext::Web);
        let err = event_body(&event, "node-1").unwrap_err();
        assert!(matches!(err, HubError::Usage(_)));
    }

    #[test]
    fn event_date_uses_wire_format() {
        let event = Event::new("viewedPage", EventContext::Web)
            .for_customer("c-1")
            .with_date(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap());
        let body = body_json(&event_body(&event, "n").unwrap());
        assert_eq!(body["date"], "2024-05-06T07:08:09.000Z");
    }

    #[test]
    fn customer_body_stamps_node() {
        let body = body_json(&customer_body(&Customer::default(), "node-7").unwrap());
        assert_eq!(body["nodeId"], "node-7");
    }

    #[test]
    fn tag_patch_adds_and_removes() {
        let customer = Customer {
            tags: Some(Tags {
                auto: vec!["auto".to_string()],
                manual: vec!["a".to_string(), "b".to_string()],
            }),
            ..Default::default()
        };
        assert_eq!(
            tag_patch(&customer, "c", TagChange::Add).unwrap(),
            json!({ "tags": { "manual": ["a", "b", "c"] } })
        );
        assert_eq!(
            tag_patch(&customer, "a", TagChange::Remove).unwrap(),
            json!({ "tags": { "manual": ["b"] } })
        );
        assert!(tag_patch(&customer, "a", TagChange::Add).is_none());
        assert!(tag_patch(&customer, "z", TagChange::Remove).is_none());
    }

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"message":"Customer not found","logref":"x"}"#),
            "Customer not found"
        );
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }
}
