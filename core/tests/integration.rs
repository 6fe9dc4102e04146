//! End-to-end runs against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every resource
//! operation over real HTTP through the default `ureq` transport. The
//! server's journal confirms each call produced exactly one request with
//! the expected verb, path and body.

use std::net::SocketAddr;

use iterable_core::{
    ApiError, BulkUser, Config, DataFields, Device, IterableClient, Platform, ResponseBody,
    SentMessagesQuery, Subscriber, Subscriptions, UpdateUserOptions,
};
use mock_server::RecordedRequest;
use serde_json::{json, Value};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client(addr: SocketAddr, key: &str) -> IterableClient {
    IterableClient::new(Config::new(key, &format!("http://{addr}/api")))
}

fn journal(addr: SocketAddr) -> Vec<RecordedRequest> {
    let mut response = ureq::get(&format!("http://{addr}/__journal")).call().unwrap();
    serde_json::from_str(&response.body_mut().read_to_string().unwrap()).unwrap()
}

fn fields(value: Value) -> DataFields {
    value.as_object().cloned().unwrap()
}

#[test]
fn lists_lifecycle() {
    let addr = start_server();
    let client = client(addr, mock_server::DEFAULT_API_KEY);
    let lists = client.lists();

    // Create.
    let created = lists.create("VIP").unwrap();
    assert_eq!(created.status, 200);
    assert_eq!(created.header("content-type"), Some("application/json"));
    let list_id = created.json().unwrap()["listId"].as_i64().unwrap();

    let recorded = journal(addr);
    assert_eq!(recorded.len(), 1, "one request per call");
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].path, "/api/lists");
    assert_eq!(recorded[0].body, Some(json!({"name": "VIP"})));
    assert_eq!(recorded[0].api_key.as_deref(), Some(mock_server::DEFAULT_API_KEY));

    // List.
    let all = lists.list().unwrap();
    assert_eq!(all.json().unwrap()["lists"][0]["name"], "VIP");

    // Subscribe and read members back; the reply is plain text.
    let members = [Subscriber::email("a@example.com"), Subscriber::email("b@example.com")];
    let subscribed = lists.subscribe(list_id, &members).unwrap();
    assert_eq!(subscribed.json().unwrap()["successCount"], 2);
    let users = lists.get_users(list_id).unwrap();
    assert_eq!(
        users.body,
        ResponseBody::Text("a@example.com\nb@example.com".to_string())
    );

    // Unsubscribe one.
    let removed = lists
        .unsubscribe(list_id, &members[..1], None, false)
        .unwrap();
    assert_eq!(removed.json().unwrap()["successCount"], 1);

    // Delete, then delete again: the second reply is a 404 value, not an error.
    assert!(lists.delete(list_id).unwrap().is_success());
    let again = lists.delete(list_id).unwrap();
    assert_eq!(again.status, 404);
    assert_eq!(again.json().unwrap()["code"], "NotFound");

    let last = journal(addr).pop().unwrap();
    assert_eq!(last.method, "DELETE");
    assert_eq!(last.path, format!("/api/lists/{list_id}"));
    assert!(last.body.is_none());
}

#[test]
fn users_lifecycle() {
    let addr = start_server();
    let client = client(addr, mock_server::DEFAULT_API_KEY);
    let users = client.users();

    // Update merges the email without touching the caller's map.
    let data = fields(json!({"firstName": "Ada", "score": 7}));
    let options = UpdateUserOptions {
        user_id: Some("42".to_string()),
        ..Default::default()
    };
    assert!(users.update("ada@example.com", &data, &options).unwrap().is_success());
    assert!(!data.contains_key("email"));
    let recorded = journal(addr);
    assert_eq!(recorded.len(), 1);
    assert_eq!(
        recorded[0].body,
        Some(json!({"email": "ada@example.com", "dataFields": {"firstName": "Ada", "score": 7}, "userId": "42"}))
    );

    // Fetch by email and by id.
    let by_email = users.get_by_email("ada@example.com").unwrap();
    assert_eq!(by_email.json().unwrap()["user"]["dataFields"]["firstName"], "Ada");
    let by_id = users.get_by_id("42").unwrap();
    assert_eq!(by_id.json().unwrap()["user"]["email"], "ada@example.com");

    // Bulk update and field introspection.
    let batch = [
        BulkUser::new("bo@example.com", fields(json!({"vip": true}))),
        BulkUser::new("cy@example.com", DataFields::new()),
    ];
    let bulk = users.bulk_update(&batch).unwrap();
    assert_eq!(bulk.json().unwrap()["successCount"], 2);
    let known = users.get_fields().unwrap();
    assert_eq!(known.json().unwrap()["fields"]["vip"], "boolean");
    assert_eq!(known.json().unwrap()["fields"]["score"], "long");

    // Subscriptions.
    let subscriptions = Subscriptions {
        email_list_ids: Some(vec![3]),
        ..Default::default()
    };
    assert!(users.update_subscriptions("bo@example.com", &subscriptions).unwrap().is_success());
    let bo = users.get_by_email("bo@example.com").unwrap();
    assert_eq!(bo.json().unwrap()["user"]["emailListIds"], json!([3]));

    // Devices.
    let device = Device {
        token: "tok-1".to_string(),
        platform: Platform::Gcm,
        application_name: "shop".to_string(),
        data_fields: None,
    };
    assert!(users.register_device_token("bo@example.com", &device, None).unwrap().is_success());
    assert!(users.disable_device("tok-1", Some("bo@example.com"), None).unwrap().is_success());
    let bo = users.get_by_email("bo@example.com").unwrap();
    assert_eq!(bo.json().unwrap()["user"]["devices"][0]["endpointEnabled"], false);

    // Sent messages.
    let query = SentMessagesQuery {
        limit: Some(10),
        ..Default::default()
    };
    let sent = users.get_sent_messages("bo@example.com", &query).unwrap();
    assert_eq!(sent.json().unwrap()["messages"], json!([]));
    let last = journal(addr).pop().unwrap();
    assert_eq!(last.path, "/api/users/getSentMessages");
    assert_eq!(last.query.as_deref(), Some("email=bo%40example.com&limit=10"));

    // Change email, then delete by email.
    assert!(users.update_email("cy@example.com", "cy2@example.com").unwrap().is_success());
    assert!(users.delete_by_email("cy2@example.com").unwrap().is_success());
    assert_eq!(users.delete_by_email("cy2@example.com").unwrap().status, 404);

    // Delete by id issues DELETE with no body.
    assert!(users.delete_by_id("42").unwrap().is_success());
    let last = journal(addr).pop().unwrap();
    assert_eq!(last.method, "DELETE");
    assert_eq!(last.path, "/api/users/byUserId/42");
    assert!(last.body.is_none());
    assert_eq!(users.get_by_id("42").unwrap().json(), Some(&json!({})));

    // Forget.
    assert!(users.forget("bo@example.com").unwrap().is_success());
    assert_eq!(users.get_by_email("bo@example.com").unwrap().json(), Some(&json!({})));
}

#[test]
fn wrong_key_yields_401_response() {
    let addr = start_server();
    let client = client(addr, "wrong-key");

    let response = client.lists().list().unwrap();
    assert_eq!(response.status, 401);
    assert!(!response.is_success());
    assert_eq!(response.json().unwrap()["code"], "BadApiKey");
}

#[test]
fn unreachable_host_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = client(addr, "k");

    let err = client.users().get_fields().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
