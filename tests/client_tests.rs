//! End-to-end ticket operations against a scripted mock endpoint.
//!
//! The mock dispatches on the `method` member of each request, the way the
//! real tracker does, so these tests cover parameter construction and
//! response normalization through the full client stack.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use trac_client::ticket::{DEFAULT_QUERY_LIMIT, DEFAULT_RESOLUTION};
use trac_client::{AttachmentRecord, TicketClient, TracError};

/// A mock tracker: per-method canned results plus captured request bodies.
#[derive(Clone, Default)]
struct MockTrac {
    results: Arc<Mutex<HashMap<String, Value>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl MockTrac {
    /// Sets the `result` value returned for a method.
    fn respond(&self, method: &str, result: Value) {
        self.results
            .lock()
            .unwrap()
            .insert(method.to_string(), result);
    }

    /// Returns the captured params of the `index`-th request.
    fn params(&self, index: usize) -> Value {
        self.bodies.lock().unwrap()[index]["params"].clone()
    }
}

async fn handler(State(mock): State<MockTrac>, Json(body): Json<Value>) -> Json<Value> {
    let method = body["method"].as_str().unwrap_or_default().to_string();
    mock.bodies.lock().unwrap().push(body);

    match mock.results.lock().unwrap().get(&method) {
        Some(result) => Json(json!({"result": result})),
        None => Json(json!({"error": {"message": format!("RPC method \"{}\" not found", method)}})),
    }
}

async fn spawn_tracker() -> (TicketClient, MockTrac) {
    let mock = MockTrac::default();
    let app = Router::new()
        .route("/login/jsonrpc", post(handler))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let url = format!("http://{}/login/jsonrpc", addr);
    let client = TicketClient::new(url, "alice", "secret").unwrap();
    (client, mock)
}

#[tokio::test]
async fn test_query_user_tickets_builds_single_query_param() {
    let (client, mock) = spawn_tracker().await;
    mock.respond("ticket.query", json!([4, 8, 15]));

    let ids = client
        .query_user_tickets("alice", &["new", "assigned"], 50)
        .await
        .unwrap();

    assert_eq!(ids, vec![4, 8, 15]);
    assert_eq!(
        mock.params(0),
        json!(["owner=alice&max=50&status=new&status=assigned"])
    );
}

#[tokio::test]
async fn test_query_user_tickets_default_limit() {
    let (client, mock) = spawn_tracker().await;
    mock.respond("ticket.query", json!([]));

    client
        .query_user_tickets("bob", &[], DEFAULT_QUERY_LIMIT)
        .await
        .unwrap();

    assert_eq!(mock.params(0), json!(["owner=bob&max=100"]));
}

#[tokio::test]
async fn test_get_ticket_normalizes_and_is_idempotent() {
    let (client, mock) = spawn_tracker().await;
    mock.respond(
        "ticket.get",
        json!([
            1,
            {"__jsonclass__": ["datetime", "2020-01-01"]},
            {"__jsonclass__": ["datetime", "2020-01-02"]},
            {"summary": "x", "status": "new", "changetime": "ignored", "time": "ignored"}
        ]),
    );

    let first = client.get_ticket(1).await.unwrap();
    assert_eq!(first.created_at, "2020-01-01");
    assert_eq!(first.changed_at, "2020-01-02");
    assert_eq!(first.attr("summary"), Some(&json!("x")));
    assert_eq!(first.attr("status"), Some(&json!("new")));
    assert_eq!(first.attr("changetime"), None);
    assert_eq!(first.attr("time"), None);

    // Same remote state, identical normalized record.
    let second = client.get_ticket(1).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(mock.params(0), json!([1]));
}

#[tokio::test]
async fn test_create_ticket_param_order() {
    let (client, mock) = spawn_tracker().await;
    mock.respond("ticket.create", json!(12));

    let mut attrs = Map::new();
    attrs.insert("priority".to_string(), json!("minor"));
    let id = client
        .create_ticket("summary line", "long description", attrs)
        .await
        .unwrap();

    assert_eq!(id, 12);
    assert_eq!(
        mock.params(0),
        json!(["summary line", "long description", {"priority": "minor"}])
    );
}

#[tokio::test]
async fn test_workflow_actions_build_expected_attrs() {
    let (client, mock) = spawn_tracker().await;
    mock.respond("ticket.update", Value::Null);

    client.accept_ticket(7, "").await.unwrap();
    client.reassign_ticket(7, "bob", "over to you").await.unwrap();
    client
        .resolve_ticket(7, "done", DEFAULT_RESOLUTION)
        .await
        .unwrap();
    client.reopen_ticket(7, "not fixed").await.unwrap();

    assert_eq!(mock.params(0), json!([7, "", {"action": "accept"}]));
    assert_eq!(
        mock.params(1),
        json!([7, "over to you", {"action": "reassign", "action_reassign_reassign_owner": "bob"}])
    );
    assert_eq!(
        mock.params(2),
        json!([7, "done", {"action": "resolve", "action_resolve_resolve_resolution": "fixed"}])
    );
    assert_eq!(mock.params(3), json!([7, "not fixed", {"action": "reopen"}]));
}

#[tokio::test]
async fn test_add_comment_sends_two_params() {
    let (client, mock) = spawn_tracker().await;
    mock.respond("ticket.update", Value::Null);

    client.add_comment(3, "looks good").await.unwrap();

    assert_eq!(mock.params(0), json!([3, "looks good"]));
}

#[tokio::test]
async fn test_delete_ticket() {
    let (client, mock) = spawn_tracker().await;
    mock.respond("ticket.delete", json!(0));

    client.delete_ticket(9).await.unwrap();

    assert_eq!(mock.params(0), json!([9]));
}

#[tokio::test]
async fn test_get_comments_threads_change_log() {
    let (client, mock) = spawn_tracker().await;
    mock.respond(
        "ticket.changeLog",
        json!([
            [{"__jsonclass__": ["datetime", "2020-05-01T09:00:00"]}, "bob", "comment", 5, "hello"],
            [{"__jsonclass__": ["datetime", "2020-05-01T09:00:00"]}, "bob", "priority", "minor", "major"],
            [{"__jsonclass__": ["datetime", "2020-05-01T09:00:00"]}, "bob", "_internal", "x", "y"]
        ]),
    );

    let comments = client.get_comments(1).await.unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].id, json!(5));
    assert_eq!(comments[0].author, "bob");
    assert_eq!(comments[0].text, "hello");
    assert_eq!(comments[0].actions.len(), 1);
    assert_eq!(comments[0].actions[0].kind, "change_priority");
    assert_eq!(comments[0].actions[0].old, json!("minor"));
    assert_eq!(comments[0].actions[0].new, json!("major"));
}

#[tokio::test]
async fn test_get_comments_leading_change_row_is_malformed() {
    let (client, mock) = spawn_tracker().await;
    mock.respond(
        "ticket.changeLog",
        json!([
            [{"__jsonclass__": ["datetime", "t1"]}, "bob", "priority", "minor", "major"]
        ]),
    );

    let err = client.get_comments(1).await.unwrap_err();
    assert!(matches!(err, TracError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_list_attachments() {
    let (client, mock) = spawn_tracker().await;
    mock.respond(
        "ticket.listAttachments",
        json!([
            ["log.txt", "server log", 2048,
             {"__jsonclass__": ["datetime", "2020-03-04T05:06:07"]}, "alice"],
            ["core.dump", "", 1048576,
             {"__jsonclass__": ["datetime", "2020-03-05T01:02:03"]}, "bob"]
        ]),
    );

    let attachments = client.list_attachments(1).await.unwrap();

    assert_eq!(
        attachments,
        vec![
            AttachmentRecord {
                filename: "log.txt".into(),
                description: "server log".into(),
                size: 2048,
                updated_at: "2020-03-04T05:06:07".into(),
                author: "alice".into(),
            },
            AttachmentRecord {
                filename: "core.dump".into(),
                description: "".into(),
                size: 1048576,
                updated_at: "2020-03-05T01:02:03".into(),
                author: "bob".into(),
            },
        ]
    );
}

#[tokio::test]
async fn test_attachment_round_trip() {
    let (client, mock) = spawn_tracker().await;
    let payload: Vec<u8> = vec![0x00, 0x01, 0xfe, 0xff, 0x42];

    mock.respond("ticket.putAttachment", json!("trace.bin"));
    client
        .upload_attachment(1, "trace.bin", "raw trace", &payload)
        .await
        .unwrap();

    // The upload body carries the binary envelope; feed the exact same
    // envelope back through the download path.
    let sent = mock.params(0);
    assert_eq!(sent[0], json!(1));
    assert_eq!(sent[1], json!("trace.bin"));
    assert_eq!(sent[2], json!("raw trace"));
    let envelope = sent[3].clone();
    assert_eq!(envelope["__jsonclass__"][0], json!("binary"));

    mock.respond("ticket.getAttachment", envelope);
    let downloaded = client.download_attachment(1, "trace.bin").await.unwrap();

    assert_eq!(downloaded, payload);
}

#[tokio::test]
async fn test_unknown_method_fault_surfaces() {
    let (client, _mock) = spawn_tracker().await;

    let err = client.delete_ticket(1).await.unwrap_err();
    assert!(matches!(err, TracError::Rpc(msg) if msg.contains("ticket.delete")));
}
