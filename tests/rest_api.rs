//! Integration tests for the taskd REST API.
//! Spins up a real server on a free port with a tempdir data directory and
//! drives it with reqwest: auth flows, task CRUD, ownership isolation, and
//! the view-aware listing.

use std::sync::Arc;

use serde_json::{json, Value};
use taskd::auth::tokens::{self, TokenSigner};
use taskd::config::ServerConfig;
use taskd::rest;
use taskd::storage::Storage;
use taskd::AppContext;

/// Find a free local port by binding to port 0.
fn get_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Start a server on a random port and return its base URL.
async fn start_test_server() -> (String, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let port = get_free_port();

    let config = Arc::new(ServerConfig::new(
        Some(port),
        Some(dir.path().to_path_buf()),
        Some("warn".to_string()),
        Some("127.0.0.1".to_string()),
    ));
    let storage = Arc::new(Storage::new(&config.data_dir).await.unwrap());
    let secret = tokens::get_or_create_secret(&storage, None).await.unwrap();
    let signer = Arc::new(TokenSigner::new(&secret, config.token_ttl_days));
    let ctx = Arc::new(AppContext::new(config, storage, signer));

    tokio::spawn(async move {
        rest::start_rest_server(ctx).await.ok();
    });

    // Give the server a moment to bind
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), dir)
}

async fn register(base: &str, username: &str, email: &str) -> (String, String) {
    let resp = reqwest::Client::new()
        .post(format!("{base}/auth/register"))
        .json(&json!({ "username": username, "email": email, "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    (
        body["token"].as_str().unwrap().to_string(),
        body["userId"].as_str().unwrap().to_string(),
    )
}

async fn create_task(base: &str, token: &str, body: Value) -> Value {
    let resp = reqwest::Client::new()
        .post(format!("{base}/tasks"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

async fn list_tasks(base: &str, token: &str, query: &str) -> Vec<Value> {
    let resp = reqwest::Client::new()
        .get(format!("{base}/tasks{query}"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn health_endpoint_needs_no_auth() {
    let (base, _dir) = start_test_server().await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_login_and_token_use() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    let (token, user_id) = register(&base, "alice", "alice@example.com").await;
    assert!(!token.is_empty());
    assert!(!user_id.is_empty());

    // Duplicate email is rejected with the canonical message.
    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({ "username": "alice2", "email": "alice@example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "User already exists");

    // Login works by email or username; bad password does not.
    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "usernameOrEmail": "alice@example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "usernameOrEmail": "alice", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Invalid Credentials");

    // The issued token is accepted by the guard.
    let tasks = list_tasks(&base, &token, "").await;
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn requests_without_a_valid_token_are_rejected() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/tasks")).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .get(format!("{base}/tasks"))
        .bearer_auth("garbage-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn task_crud_roundtrip() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();
    let (token, user_id) = register(&base, "alice", "alice@example.com").await;

    // Defaults: medium priority, General category, not completed.
    let task = create_task(&base, &token, json!({ "title": "Buy milk" })).await;
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["category"], "General");
    assert_eq!(task["completed"], false);
    assert_eq!(task["userId"], user_id.as_str());
    let id = task["id"].as_str().unwrap().to_string();

    // Empty title is a validation error.
    let resp = client
        .post(format!("{base}/tasks"))
        .bearer_auth(&token)
        .json(&json!({ "title": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Partial update: completing the task, then explicitly reopening it.
    let resp = client
        .put(format!("{base}/tasks/{id}"))
        .bearer_auth(&token)
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], "Buy milk");

    let resp = client
        .put(format!("{base}/tasks/{id}"))
        .bearer_auth(&token)
        .json(&json!({ "completed": false }))
        .send()
        .await
        .unwrap();
    let reopened: Value = resp.json().await.unwrap();
    assert_eq!(reopened["completed"], false);

    // Unknown id is 404.
    let resp = client
        .put(format!("{base}/tasks/no-such-id"))
        .bearer_auth(&token)
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Delete, confirm the message, and confirm it is gone.
    let resp = client
        .delete(format!("{base}/tasks/{id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Task removed");

    let resp = client
        .delete(format!("{base}/tasks/{id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn tasks_are_isolated_between_owners() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();
    let (alice, _) = register(&base, "alice", "alice@example.com").await;
    let (bob, _) = register(&base, "bob", "bob@example.com").await;

    let task = create_task(&base, &bob, json!({ "title": "Bob's task" })).await;
    let id = task["id"].as_str().unwrap();

    // Alice sees none of Bob's tasks.
    assert!(list_tasks(&base, &alice, "").await.is_empty());

    // Alice cannot mutate or delete Bob's task by direct id reference.
    let resp = client
        .put(format!("{base}/tasks/{id}"))
        .bearer_auth(&alice)
        .json(&json!({ "title": "hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Not authorized");

    let resp = client
        .delete(format!("{base}/tasks/{id}"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Bob's task is unchanged.
    let bobs = list_tasks(&base, &bob, "").await;
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0]["title"], "Bob's task");
}

#[tokio::test]
async fn plain_list_is_newest_first() {
    let (base, _dir) = start_test_server().await;
    let (token, _) = register(&base, "alice", "alice@example.com").await;

    create_task(&base, &token, json!({ "title": "first" })).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    create_task(&base, &token, json!({ "title": "second" })).await;

    let tasks = list_tasks(&base, &token, "").await;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["title"], "second");
    assert_eq!(tasks[1]["title"], "first");
}

#[tokio::test]
async fn view_query_filters_and_sorts() {
    let (base, _dir) = start_test_server().await;
    let (token, _) = register(&base, "alice", "alice@example.com").await;

    create_task(
        &base,
        &token,
        json!({ "title": "errand", "priority": "low", "category": "Errands" }),
    )
    .await;
    create_task(
        &base,
        &token,
        json!({ "title": "deadline", "priority": "high", "dueDate": "2026-06-10" }),
    )
    .await;
    create_task(
        &base,
        &token,
        json!({ "title": "chore", "priority": "medium" }),
    )
    .await;

    // Priority sort: high first.
    let sorted = list_tasks(&base, &token, "?sort=priority").await;
    let titles: Vec<_> = sorted.iter().map(|t| t["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["deadline", "chore", "errand"]);

    // Priority selection.
    let high_only = list_tasks(&base, &token, "?priority=high").await;
    assert_eq!(high_only.len(), 1);
    assert_eq!(high_only[0]["title"], "deadline");

    // Category selection.
    let errands = list_tasks(&base, &token, "?category=Errands").await;
    assert_eq!(errands.len(), 1);
    assert_eq!(errands[0]["title"], "errand");

    // Overdue classification against an explicit reference date: the task
    // due 2026-06-10 is overdue on 2026-06-15, the other two are active.
    let overdue = list_tasks(
        &base,
        &token,
        "?today=2026-06-15&show_active=false&show_overdue=true",
    )
    .await;
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0]["title"], "deadline");

    // Invalid priority filter is a 400.
    let resp = reqwest::Client::new()
        .get(format!("{base}/tasks?priority=urgent"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Category index over the full collection.
    let resp = reqwest::Client::new()
        .get(format!("{base}/tasks/categories"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let categories: Vec<String> = resp.json().await.unwrap();
    assert!(categories.contains(&"Errands".to_string()));
    assert!(categories.contains(&"General".to_string()));
    assert_eq!(categories.len(), 2);
}
