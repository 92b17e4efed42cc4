//! In-memory ContactHub API for integration tests and local development.
//!
//! Customers and events are kept as raw JSON so the client's schema is not
//! shared with the server. Every route requires `Authorization: Bearer
//! <token>` with the token the app was built with.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Default)]
pub struct Store {
    pub customers: Vec<Value>,
    pub events: Vec<Value>,
    /// session id -> customer id
    pub sessions: HashMap<String, String>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    db: Db,
}

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = Result<T, ApiError>;

fn error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "message": message, "logref": Uuid::new_v4() })))
}

fn not_found(what: &str) -> ApiError {
    error(StatusCode::NOT_FOUND, &format!("{what} not found"))
}

pub fn app(token: &str) -> Router {
    app_with_db(token, Db::default())
}

/// Build the router over an existing store, so tests can seed or inspect it.
pub fn app_with_db(token: &str, db: Db) -> Router {
    let state = AppState {
        token: Arc::from(token),
        db,
    };
    Router::new()
        .route(
            "/workspaces/{workspace}/customers",
            get(list_customers).post(create_customer),
        )
        .route(
            "/workspaces/{workspace}/customers/{id}",
            get(get_customer)
                .put(update_customer)
                .patch(patch_customer)
                .delete(delete_customer),
        )
        .route(
            "/workspaces/{workspace}/customers/{id}/{collection}",
            post(add_item),
        )
        .route(
            "/workspaces/{workspace}/customers/{id}/{collection}/{item}",
            put(update_item).delete(remove_item),
        )
        .route(
            "/workspaces/{workspace}/events",
            get(list_events).post(create_event),
        )
        .route("/workspaces/{workspace}/events/{id}", get(get_event))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.token);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        tracing::debug!(uri = %request.uri(), "rejecting unauthenticated request");
        return error(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(request).await
}

/// Slice `items` into the page envelope list endpoints return.
fn paginate(items: Vec<Value>, page: Option<usize>, size: Option<usize>) -> Value {
    let size = size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE);
    let page = page.unwrap_or(0);
    let total = items.len();
    let elements: Vec<Value> = items
        .into_iter()
        .skip(page.saturating_mul(size))
        .take(size)
        .collect();
    json!({
        "elements": elements,
        "page": {
            "size": size,
            "totalElements": total,
            "totalPages": total.div_ceil(size),
            "number": page,
        }
    })
}

/// Shallow-recursive JSON merge: objects merge key by key, anything else
/// replaces.
fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge(existing, value)
                    }
                    _ => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn find_customer<'a>(customers: &'a mut [Value], id: &str) -> ApiResult<&'a mut Value> {
    customers
        .iter_mut()
        .find(|c| str_field(c, "id") == Some(id))
        .ok_or_else(|| not_found("Customer"))
}

fn object(body: Value) -> ApiResult<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(error(StatusCode::BAD_REQUEST, "Body must be a JSON object")),
    }
}

// --- customers ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerQuery {
    pub node_id: Option<String>,
    pub external_id: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerQuery>,
) -> Json<Value> {
    let store = state.db.read().await;
    let matching: Vec<Value> = store
        .customers
        .iter()
        .filter(|c| {
            query
                .node_id
                .as_deref()
                .is_none_or(|node| str_field(c, "nodeId") == Some(node))
        })
        .filter(|c| {
            query
                .external_id
                .as_deref()
                .is_none_or(|ext| str_field(c, "externalId") == Some(ext))
        })
        .cloned()
        .collect();
    Json(paginate(matching, query.page, query.size))
}

async fn create_customer(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut customer = object(body)?;
    let node_id = customer
        .get("nodeId")
        .and_then(Value::as_str)
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "nodeId is required"))?
        .to_string();

    let mut store = state.db.write().await;
    if let Some(ext) = customer.get("externalId").and_then(Value::as_str) {
        let taken = store.customers.iter().any(|c| {
            str_field(c, "nodeId") == Some(node_id.as_str()) && str_field(c, "externalId") == Some(ext)
        });
        if taken {
            return Err(error(StatusCode::CONFLICT, "Customer already exists"));
        }
    }

    customer.insert("id".to_string(), json!(Uuid::new_v4()));
    customer.entry("enabled").or_insert(json!(true));
    let customer = Value::Object(customer);
    store.customers.push(customer.clone());
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn get_customer(
    State(state): State<AppState>,
    Path((_, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let store = state.db.read().await;
    store
        .customers
        .iter()
        .find(|c| str_field(c, "id") == Some(id.as_str()))
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Customer"))
}

async fn update_customer(
    State(state): State<AppState>,
    Path((_, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let mut replacement = object(body)?;
    let mut store = state.db.write().await;
    let customer = find_customer(&mut store.customers, &id)?;
    replacement.insert("id".to_string(), json!(id));
    *customer = Value::Object(replacement);
    Ok(Json(customer.clone()))
}

async fn patch_customer(
    State(state): State<AppState>,
    Path((_, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let mut patch = object(body)?;
    patch.remove("id");
    let mut store = state.db.write().await;
    let customer = find_customer(&mut store.customers, &id)?;
    merge(customer, Value::Object(patch));
    Ok(Json(customer.clone()))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path((_, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut store = state.db.write().await;
    let before = store.customers.len();
    store.customers.retain(|c| str_field(c, "id") != Some(id.as_str()));
    if store.customers.len() == before {
        return Err(not_found("Customer"));
    }
    store.sessions.retain(|_, customer| *customer != id);
    Ok(StatusCode::NO_CONTENT)
}

// --- likes, jobs, educations, sessions ---

fn check_collection(collection: &str) -> ApiResult<()> {
    match collection {
        "likes" | "jobs" | "educations" => Ok(()),
        _ => Err(not_found("Resource")),
    }
}

fn items_mut<'a>(customer: &'a mut Value, collection: &str) -> &'a mut Vec<Value> {
    if !customer["base"].is_object() {
        customer["base"] = json!({});
    }
    let list = &mut customer["base"][collection];
    if !list.is_array() {
        *list = json!([]);
    }
    list.as_array_mut().expect("collection was just made an array")
}

async fn add_item(
    State(state): State<AppState>,
    Path((_, id, collection)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut store = state.db.write().await;

    if collection == "sessions" {
        find_customer(&mut store.customers, &id)?;
        let session = str_field(&body, "value")
            .ok_or_else(|| error(StatusCode::BAD_REQUEST, "value is required"))?
            .to_string();
        store.sessions.insert(session, id);
        return Ok((StatusCode::OK, Json(body)));
    }

    check_collection(&collection)?;
    let mut item = object(body)?;
    item.entry("id").or_insert_with(|| json!(Uuid::new_v4()));
    let item = Value::Object(item);

    let customer = find_customer(&mut store.customers, &id)?;
    items_mut(customer, &collection).push(item.clone());
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<AppState>,
    Path((_, id, collection, item_id)): Path<(String, String, String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    check_collection(&collection)?;
    let mut replacement = object(body)?;
    replacement.insert("id".to_string(), json!(item_id));

    let mut store = state.db.write().await;
    let customer = find_customer(&mut store.customers, &id)?;
    let item = items_mut(customer, &collection)
        .iter_mut()
        .find(|i| str_field(i, "id") == Some(item_id.as_str()))
        .ok_or_else(|| not_found("Item"))?;
    *item = Value::Object(replacement);
    Ok(Json(item.clone()))
}

async fn remove_item(
    State(state): State<AppState>,
    Path((_, id, collection, item_id)): Path<(String, String, String, String)>,
) -> ApiResult<StatusCode> {
    check_collection(&collection)?;
    let mut store = state.db.write().await;
    let customer = find_customer(&mut store.customers, &id)?;
    let items = items_mut(customer, &collection);
    let before = items.len();
    items.retain(|i| str_field(i, "id") != Some(item_id.as_str()));
    if items.len() == before {
        return Err(not_found("Item"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// --- events ---

/// Resolve the customer an incoming event refers to.
fn event_customer(store: &Store, event: &Value) -> ApiResult<Option<String>> {
    if let Some(id) = str_field(event, "customerId") {
        return Ok(Some(id.to_string()));
    }
    let bring_back = event.get("bringBackProperties").ok_or_else(|| {
        error(
            StatusCode::BAD_REQUEST,
            "customerId or bringBackProperties is required",
        )
    })?;
    let value = str_field(bring_back, "value");
    let node = str_field(bring_back, "nodeId");
    match (str_field(bring_back, "type"), value, node) {
        (Some("EXTERNAL_ID"), Some(ext), Some(node)) => Ok(store
            .customers
            .iter()
            .find(|c| str_field(c, "externalId") == Some(ext) && str_field(c, "nodeId") == Some(node))
            .and_then(|c| str_field(c, "id"))
            .map(str::to_string)),
        (Some("SESSION_ID"), Some(session), Some(_)) => Ok(store.sessions.get(session).cloned()),
        _ => Err(error(StatusCode::BAD_REQUEST, "Invalid bringBackProperties")),
    }
}

async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<StatusCode> {
    let mut event = object(body)?;
    if event.contains_key("externalId") || event.contains_key("sessionId") {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "externalId and sessionId belong in bringBackProperties",
        ));
    }
    if !event.contains_key("type") || !event.contains_key("context") {
        return Err(error(StatusCode::BAD_REQUEST, "type and context are required"));
    }

    let mut store = state.db.write().await;
    let customer_id = event_customer(&store, &Value::Object(event.clone()))?;
    event.insert("id".to_string(), json!(Uuid::new_v4()));
    if let Some(id) = customer_id {
        event.insert("customerId".to_string(), json!(id));
    }
    event.entry("properties").or_insert_with(|| json!({}));
    store.events.push(Value::Object(event));
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub customer_id: String,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub context: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Json<Value> {
    let store = state.db.read().await;
    let matching: Vec<Value> = store
        .events
        .iter()
        .filter(|e| str_field(e, "customerId") == Some(query.customer_id.as_str()))
        .filter(|e| {
            query
                .event_type
                .as_deref()
                .is_none_or(|t| str_field(e, "type") == Some(t))
        })
        .filter(|e| {
            query
                .context
                .as_deref()
                .is_none_or(|c| str_field(e, "context") == Some(c))
        })
        .cloned()
        .collect();
    Json(paginate(matching, query.page, query.size))
}

async fn get_event(
    State(state): State<AppState>,
    Path((_, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let store = state.db.read().await;
    store
        .events
        .iter()
        .find(|e| str_field(e, "id") == Some(id.as_str()))
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Event"))
}
