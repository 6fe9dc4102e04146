//! In-memory stand-in for the Iterable REST API.
//!
//! Serves the `/api/lists` and `/api/users` endpoints from a shared store,
//! rejects calls without an `Api-Key` header, and records every `/api` call
//! in a journal readable at `GET /__journal`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// Key accepted when none is configured.
pub const DEFAULT_API_KEY: &str = "test-key";

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: i64,
    pub name: String,
    pub list_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub token: String,
    pub platform: String,
    pub application_name: String,
    pub endpoint_enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub data_fields: Map<String, Value>,
    pub email_list_ids: Vec<i64>,
    pub unsubscribed_channel_ids: Vec<i64>,
    pub devices: Vec<Device>,
}

impl User {
    fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            user_id: None,
            data_fields: Map::new(),
            email_list_ids: Vec::new(),
            unsubscribed_channel_ids: Vec::new(),
            devices: Vec::new(),
        }
    }
}

/// One call as seen by the server.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub api_key: Option<String>,
    pub body: Option<Value>,
}

/// Everything the mock knows. `forgotten` holds emails erased through
/// `/users/forget`; calls that would create a profile for them are refused.
#[derive(Debug, Default)]
pub struct Store {
    pub lists: BTreeMap<i64, List>,
    pub members: HashMap<i64, BTreeSet<String>>,
    pub users: HashMap<String, User>,
    pub forgotten: BTreeSet<String>,
    pub journal: Vec<RecordedRequest>,
    next_list_id: i64,
}

impl Store {
    fn is_forgotten(&self, email: &str) -> bool {
        self.forgotten.contains(email)
    }

    fn user_by_id(&self, user_id: &str) -> Option<&User> {
        self.users
            .values()
            .find(|u| u.user_id.as_deref() == Some(user_id))
    }
}

#[derive(Clone)]
pub struct AppState {
    pub api_key: String,
    pub db: Arc<RwLock<Store>>,
}

pub fn app() -> Router {
    app_with_key(DEFAULT_API_KEY)
}

pub fn app_with_key(api_key: &str) -> Router {
    let state = AppState {
        api_key: api_key.to_string(),
        db: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/api/lists", get(list_lists).post(create_list))
        .route("/api/lists/{list_id}", delete(delete_list))
        .route("/api/lists/getUsers", get(list_users))
        .route("/api/lists/subscribe", post(subscribe))
        .route("/api/lists/unsubscribe", post(unsubscribe))
        .route("/api/users/update", post(update_user))
        .route("/api/users/bulkUpdate", post(bulk_update))
        .route("/api/users/updateSubscriptions", post(update_subscriptions))
        .route("/api/users/updateEmail", post(update_email))
        .route("/api/users/getByEmail", get(get_by_email))
        .route("/api/users/getFields", get(get_fields))
        .route("/api/users/getSentMessages", get(get_sent_messages))
        .route("/api/users/registerDeviceToken", post(register_device_token))
        .route("/api/users/disableDevice", post(disable_device))
        .route("/api/users/forget", post(forget))
        .route("/api/users/byUserId/{user_id}", get(get_by_id).delete(delete_by_id))
        .route("/api/users/{email}", delete(delete_by_email))
        .layer(middleware::from_fn_with_state(state.clone(), record_and_authenticate))
        .route("/__journal", get(journal))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn success() -> Json<Value> {
    Json(json!({"code": "Success", "msg": "", "params": null}))
}

fn forgotten_user() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"code": "BadParams", "msg": "user has been forgotten", "params": null})),
    )
}

fn not_found(msg: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"code": "NotFound", "msg": msg, "params": null})),
    )
}

async fn record_and_authenticate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };
    let api_key = parts
        .headers
        .get("Api-Key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        api_key: api_key.clone(),
        body: serde_json::from_slice(&bytes).ok(),
    };
    debug!(method = %recorded.method, path = %recorded.path, "mock request");
    state.db.write().await.journal.push(recorded);

    if api_key.as_deref() != Some(state.api_key.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"code": "BadApiKey", "msg": "Invalid API key", "params": null})),
        )
            .into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn journal(State(state): State<AppState>) -> Json<Vec<RecordedRequest>> {
    Json(state.db.read().await.journal.clone())
}

// --- lists ---

#[derive(Deserialize)]
pub struct CreateList {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub list_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub email: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub list_id: i64,
    pub subscribers: Vec<Member>,
}

async fn list_lists(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    let lists: Vec<&List> = db.lists.values().collect();
    Json(json!({ "lists": lists }))
}

async fn create_list(State(state): State<AppState>, Json(input): Json<CreateList>) -> Json<Value> {
    let mut db = state.db.write().await;
    db.next_list_id += 1;
    let id = db.next_list_id;
    db.lists.insert(
        id,
        List {
            id,
            name: input.name,
            list_type: "Standard".to_string(),
        },
    );
    Json(json!({ "listId": id }))
}

async fn delete_list(State(state): State<AppState>, Path(list_id): Path<i64>) -> Response {
    let mut db = state.db.write().await;
    if db.lists.remove(&list_id).is_none() {
        return not_found("list does not exist").into_response();
    }
    db.members.remove(&list_id);
    success().into_response()
}

/// Members as newline-separated emails, the way the real endpoint replies.
async fn list_users(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let db = state.db.read().await;
    if !db.lists.contains_key(&query.list_id) {
        return not_found("list does not exist").into_response();
    }
    let emails: Vec<&str> = db
        .members
        .get(&query.list_id)
        .map(|m| m.iter().map(String::as_str).collect())
        .unwrap_or_default();
    emails.join("\n").into_response()
}

fn resolve_email(db: &Store, member: &Member) -> Option<String> {
    match (&member.email, &member.user_id) {
        (Some(email), _) => Some(email.clone()),
        (None, Some(id)) => db.user_by_id(id).map(|u| u.email.clone()),
        (None, None) => None,
    }
}

async fn subscribe(State(state): State<AppState>, Json(input): Json<Membership>) -> Response {
    let mut db = state.db.write().await;
    if !db.lists.contains_key(&input.list_id) {
        return not_found("list does not exist").into_response();
    }
    let (mut ok, mut failed) = (0, 0);
    for member in &input.subscribers {
        match resolve_email(&db, member) {
            Some(email) if !db.is_forgotten(&email) => {
                db.users.entry(email.clone()).or_insert_with(|| User::new(&email));
                db.members.entry(input.list_id).or_default().insert(email);
                ok += 1;
            }
            _ => failed += 1,
        }
    }
    Json(json!({"successCount": ok, "failCount": failed})).into_response()
}

async fn unsubscribe(State(state): State<AppState>, Json(input): Json<Membership>) -> Response {
    let mut db = state.db.write().await;
    if !db.lists.contains_key(&input.list_id) {
        return not_found("list does not exist").into_response();
    }
    let (mut ok, mut failed) = (0, 0);
    for member in &input.subscribers {
        let removed = resolve_email(&db, member)
            .map(|email| db.members.entry(input.list_id).or_default().remove(&email))
            .unwrap_or(false);
        if removed {
            ok += 1;
        } else {
            failed += 1;
        }
    }
    Json(json!({"successCount": ok, "failCount": failed})).into_response()
}

// --- users ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub email: String,
    #[serde(default)]
    pub data_fields: Map<String, Value>,
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct BulkUpdate {
    pub users: Vec<UpdateUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptions {
    pub email: String,
    pub email_list_ids: Option<Vec<i64>>,
    pub unsubscribed_channel_ids: Option<Vec<i64>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmail {
    pub current_email: String,
    pub new_email: String,
}

#[derive(Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub token: String,
    pub platform: String,
    pub application_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDevice {
    pub email: String,
    pub device: NewDevice,
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableDevice {
    pub token: String,
    pub email: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct Forget {
    pub email: String,
}

/// Returns `false` without touching the store when the email was forgotten.
fn upsert(db: &mut Store, input: UpdateUser) -> bool {
    if db.is_forgotten(&input.email) {
        return false;
    }
    let user = db
        .users
        .entry(input.email.clone())
        .or_insert_with(|| User::new(&input.email));
    user.data_fields.extend(input.data_fields);
    if input.user_id.is_some() {
        user.user_id = input.user_id;
    }
    true
}

async fn update_user(State(state): State<AppState>, Json(input): Json<UpdateUser>) -> Response {
    if upsert(&mut *state.db.write().await, input) {
        success().into_response()
    } else {
        forgotten_user().into_response()
    }
}

async fn bulk_update(State(state): State<AppState>, Json(input): Json<BulkUpdate>) -> Json<Value> {
    let mut db = state.db.write().await;
    let (mut ok, mut failed) = (0, 0);
    for user in input.users {
        if upsert(&mut db, user) {
            ok += 1;
        } else {
            failed += 1;
        }
    }
    Json(json!({"successCount": ok, "failCount": failed}))
}

async fn update_subscriptions(
    State(state): State<AppState>,
    Json(input): Json<UpdateSubscriptions>,
) -> Response {
    let mut db = state.db.write().await;
    if db.is_forgotten(&input.email) {
        return forgotten_user().into_response();
    }
    let user = db
        .users
        .entry(input.email.clone())
        .or_insert_with(|| User::new(&input.email));
    if let Some(ids) = input.email_list_ids {
        user.email_list_ids = ids;
    }
    if let Some(ids) = input.unsubscribed_channel_ids {
        user.unsubscribed_channel_ids = ids;
    }
    success().into_response()
}

async fn update_email(State(state): State<AppState>, Json(input): Json<UpdateEmail>) -> Response {
    let mut db = state.db.write().await;
    if db.is_forgotten(&input.new_email) {
        return forgotten_user().into_response();
    }
    let Some(mut user) = db.users.remove(&input.current_email) else {
        return not_found("user does not exist").into_response();
    };
    user.email = input.new_email.clone();
    db.users.insert(input.new_email, user);
    success().into_response()
}

/// Unknown users get `{}` with 200, matching the real endpoint.
async fn get_by_email(State(state): State<AppState>, Query(query): Query<EmailQuery>) -> Json<Value> {
    let db = state.db.read().await;
    match db.users.get(&query.email) {
        Some(user) => Json(json!({ "user": user })),
        None => Json(json!({})),
    }
}

async fn get_by_id(State(state): State<AppState>, Path(user_id): Path<String>) -> Json<Value> {
    let db = state.db.read().await;
    match db.user_by_id(&user_id) {
        Some(user) => Json(json!({ "user": user })),
        None => Json(json!({})),
    }
}

async fn delete_by_email(State(state): State<AppState>, Path(email): Path<String>) -> Response {
    let mut db = state.db.write().await;
    match db.users.remove(&email) {
        Some(_) => success().into_response(),
        None => not_found("user does not exist").into_response(),
    }
}

async fn delete_by_id(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    let mut db = state.db.write().await;
    let Some(email) = db.user_by_id(&user_id).map(|u| u.email.clone()) else {
        return not_found("user does not exist").into_response();
    };
    db.users.remove(&email);
    success().into_response()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "long",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

async fn get_fields(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    let mut fields = BTreeMap::from([("email".to_string(), "string")]);
    for user in db.users.values() {
        for (name, value) in &user.data_fields {
            fields.entry(name.clone()).or_insert(type_name(value));
        }
    }
    Json(json!({ "fields": fields }))
}

async fn get_sent_messages(Query(query): Query<EmailQuery>) -> Json<Value> {
    debug!(email = %query.email, "no messages recorded");
    Json(json!({ "messages": [] }))
}

async fn register_device_token(
    State(state): State<AppState>,
    Json(input): Json<RegisterDevice>,
) -> Response {
    let mut db = state.db.write().await;
    if db.is_forgotten(&input.email) {
        return forgotten_user().into_response();
    }
    let user = db
        .users
        .entry(input.email.clone())
        .or_insert_with(|| User::new(&input.email));
    if input.user_id.is_some() {
        user.user_id = input.user_id;
    }
    user.devices.retain(|d| d.token != input.device.token);
    user.devices.push(Device {
        token: input.device.token,
        platform: input.device.platform,
        application_name: input.device.application_name,
        endpoint_enabled: true,
    });
    success().into_response()
}

async fn disable_device(State(state): State<AppState>, Json(input): Json<DisableDevice>) -> Json<Value> {
    let mut db = state.db.write().await;
    for user in db.users.values_mut() {
        let targeted = match (&input.email, &input.user_id) {
            (Some(email), _) => &user.email == email,
            (None, Some(id)) => user.user_id.as_ref() == Some(id),
            (None, None) => true,
        };
        if !targeted {
            continue;
        }
        for device in user.devices.iter_mut().filter(|d| d.token == input.token) {
            device.endpoint_enabled = false;
        }
    }
    success()
}

async fn forget(State(state): State<AppState>, Json(input): Json<Forget>) -> Json<Value> {
    let mut db = state.db.write().await;
    db.users.remove(&input.email);
    for members in db.members.values_mut() {
        members.remove(&input.email);
    }
    db.forgotten.insert(input.email);
    success()
}
