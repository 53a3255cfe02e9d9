//! Integration tests for the todo endpoints
//!
//! Every test drives the full router (middleware included) against an
//! in-memory store.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{token_for, TestContext};
use serde_json::json;
use todo_shared::auth::jwt::{create_token, Claims};
use todo_shared::models::todo::TASK_MAX_LENGTH;
use todo_shared::store::TodoStore;

const MISSING: &str = "Object with todo id does not exists";

#[tokio::test]
async fn test_create_todo() {
    let ctx = TestContext::with_user(42);

    let response = ctx
        .send("POST", "/api/", Some(json!({ "task": "buy milk", "complete": false })))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["task"], "buy milk");
    assert_eq!(response.body["complete"], false);
    assert_eq!(response.body["user"], 42);
    assert!(response.body["id"].is_i64());
    assert!(response.body["timestamp"].is_string());
    assert!(response.body["update"].is_string());
}

#[tokio::test]
async fn test_create_defaults_complete_to_false() {
    let ctx = TestContext::new();

    let response = ctx.send("POST", "/api/", Some(json!({ "task": "walk dog" }))).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["complete"], false);
}

#[tokio::test]
async fn test_create_without_task_fails() {
    let ctx = TestContext::new();

    let response = ctx.send("POST", "/api/", Some(json!({ "complete": true }))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "task": ["This field is required."] }));
    assert!(ctx.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_field_errors() {
    let ctx = TestContext::new();

    let response = ctx
        .send("POST", "/api/", Some(json!({ "task": "", "complete": "yes" })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["task"], json!(["This field may not be blank."]));
    assert_eq!(response.body["complete"], json!(["Must be a valid boolean."]));

    let longest = "x".repeat(TASK_MAX_LENGTH as usize);
    let response = ctx.send("POST", "/api/", Some(json!({ "task": longest }))).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let too_long = "x".repeat(TASK_MAX_LENGTH as usize + 1);
    let response = ctx.send("POST", "/api/", Some(json!({ "task": too_long }))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["task"],
        json!(["Ensure this field has no more than 255 characters."])
    );
}

#[tokio::test]
async fn test_create_trims_task() {
    let ctx = TestContext::new();

    let response = ctx
        .send("POST", "/api/", Some(json!({ "task": "  buy milk  " })))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["task"], "buy milk");

    let padded = format!("{}  ", "x".repeat(TASK_MAX_LENGTH as usize));
    let response = ctx.send("POST", "/api/", Some(json!({ "task": padded }))).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(
        response.body["task"].as_str().map(str::len),
        Some(TASK_MAX_LENGTH as usize)
    );

    let response = ctx.send("POST", "/api/", Some(json!({ "task": " \t " }))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "task": ["This field may not be blank."] }));
}

#[tokio::test]
async fn test_update_trims_task() {
    let ctx = TestContext::new();
    let id = ctx.create_todo("buy milk").await;

    let response = ctx
        .send("PUT", &format!("/api/{}/", id), Some(json!({ "task": " buy oat milk\n" })))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["task"], "buy oat milk");
    assert_eq!(ctx.store.get(id).await.unwrap().unwrap().task, "buy oat milk");
}

#[tokio::test]
async fn test_create_rejects_non_object_body() {
    let ctx = TestContext::new();

    let response = ctx.send("POST", "/api/", Some(json!(["buy milk"]))).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["non_field_errors"],
        json!(["Invalid data. Expected a dictionary, but got list."])
    );
}

#[tokio::test]
async fn test_create_rejects_malformed_json() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/api/")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from("{\"task\": "))
        .unwrap();
    let response = ctx.send_raw(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "bad_request");
}

#[tokio::test]
async fn test_create_requires_principal() {
    let ctx = TestContext::new();

    let response = ctx
        .send_anonymous("POST", "/api/", Some(json!({ "task": "buy milk" })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "user": ["This field may not be null."] }));
}

#[tokio::test]
async fn test_create_ignores_user_in_body() {
    let ctx = TestContext::with_user(3);

    let response = ctx
        .send("POST", "/api/", Some(json!({ "task": "buy milk", "user": 99 })))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["user"], 3);
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let ctx = TestContext::new();

    let response = ctx
        .send_with_auth("GET", "/api/", None, Some("Bearer not-a-token"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let wrong_secret = create_token(&Claims::new(1), "some-other-secret-that-is-32-bytes-long").unwrap();
    let response = ctx
        .send_with_auth("GET", "/api/", None, Some(&format!("Bearer {}", wrong_secret)))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "unauthorized");
}

#[tokio::test]
async fn test_get_todo_until_deleted() {
    let ctx = TestContext::new();
    let id = ctx.create_todo("buy milk").await;

    let response = ctx.send("GET", &format!("/api/{}/", id), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], id);
    assert_eq!(response.body["task"], "buy milk");

    let response = ctx.send("DELETE", &format!("/api/{}/", id), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = ctx.send("GET", &format!("/api/{}/", id), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "rest": MISSING }));
}

#[tokio::test]
async fn test_missing_todo_bodies() {
    let ctx = TestContext::new();

    let response = ctx.send("GET", "/api/999/", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "rest": MISSING }));

    let response = ctx
        .send("PUT", "/api/999/", Some(json!({ "complete": true })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "res": MISSING }));

    let response = ctx.send("DELETE", "/api/999/", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "res": MISSING }));
}

#[tokio::test]
async fn test_update_missing_id_checked_before_body() {
    let ctx = TestContext::new();

    let response = ctx
        .send("PUT", "/api/5/", Some(json!({ "complete": "not-a-bool" })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "res": MISSING }));
}

#[tokio::test]
async fn test_partial_update() {
    let ctx = TestContext::new();
    let id = ctx.create_todo("buy milk").await;

    let response = ctx
        .send("PUT", &format!("/api/{}/", id), Some(json!({ "complete": true })))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["task"], "buy milk");
    assert_eq!(response.body["complete"], true);

    let response = ctx
        .send("PUT", &format!("/api/{}/", id), Some(json!({ "task": "buy oat milk" })))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["task"], "buy oat milk");
    assert_eq!(response.body["complete"], true);
}

#[tokio::test]
async fn test_update_preserves_timestamp() {
    let ctx = TestContext::new();
    let id = ctx.create_todo("buy milk").await;
    let before = ctx.store.get(id).await.unwrap().unwrap();

    let response = ctx
        .send("PUT", &format!("/api/{}/", id), Some(json!({ "complete": true })))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let after = ctx.store.get(id).await.unwrap().unwrap();
    assert_eq!(after.timestamp, before.timestamp);
    assert!(after.update >= before.update);
}

#[tokio::test]
async fn test_update_reasserts_owner_from_caller() {
    let ctx = TestContext::with_user(1);
    let id = ctx.create_todo("buy milk").await;

    let response = ctx
        .send_with_auth(
            "PUT",
            &format!("/api/{}/", id),
            Some(json!({ "complete": true })),
            Some(&format!("Bearer {}", token_for(2))),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"], 2);
}

#[tokio::test]
async fn test_update_field_errors() {
    let ctx = TestContext::new();
    let id = ctx.create_todo("buy milk").await;

    let response = ctx
        .send("PUT", &format!("/api/{}/", id), Some(json!({ "task": null })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "task": ["This field may not be null."] }));

    let response = ctx
        .send_anonymous("PUT", &format!("/api/{}/", id), Some(json!({ "complete": true })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "user": ["This field may not be null."] }));

    let stored = ctx.store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.task, "buy milk");
    assert!(!stored.complete);
}

#[tokio::test]
async fn test_delete_todo() {
    let ctx = TestContext::new();
    let id = ctx.create_todo("buy milk").await;

    let response = ctx.send("DELETE", &format!("/api/{}/", id), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "res": "Object deleted!" }));
    assert!(ctx.store.get(id).await.unwrap().is_none());

    let response = ctx.send("DELETE", &format!("/api/{}/", id), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "res": MISSING }));
}

#[tokio::test]
async fn test_list_after_creates_and_deletes() {
    let ctx = TestContext::new();

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(ctx.create_todo(&format!("task {}", i)).await);
    }
    for id in &ids[..2] {
        let response = ctx.send("DELETE", &format!("/api/{}/", id), None).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let response = ctx.send_anonymous("GET", "/api/", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let listed: Vec<i64> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|todo| todo["id"].as_i64().unwrap())
        .collect();
    assert_eq!(listed, ids[2..].to_vec());
}

#[tokio::test]
async fn test_routes_without_trailing_slash() {
    let ctx = TestContext::new();
    let id = ctx.create_todo("buy milk").await;

    let response = ctx.send("GET", "/api", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 1);

    let response = ctx.send("GET", &format!("/api/{}", id), None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_non_integer_id_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx.send("GET", "/api/abc/", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signed_id_is_not_found() {
    let ctx = TestContext::new();
    let id = ctx.create_todo("buy milk").await;

    for uri in [format!("/api/+{}/", id), format!("/api/-{}/", id), "/api/-1".to_string()] {
        let response = ctx.send("GET", &uri, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", uri);
    }

    let response = ctx
        .send("PUT", &format!("/api/+{}/", id), Some(json!({ "complete": true })))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = ctx.send("DELETE", &format!("/api/+{}/", id), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(ctx.store.get(id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_buy_milk_scenario() {
    let ctx = TestContext::new();

    let response = ctx
        .send("POST", "/api/", Some(json!({ "task": "buy milk", "complete": false })))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["task"], "buy milk");
    assert_eq!(response.body["complete"], false);
    let id = response.body["id"].as_i64().unwrap();
    let item = format!("/api/{}/", id);

    let response = ctx.send("PUT", &item, Some(json!({ "complete": true }))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["complete"], true);
    assert_eq!(response.body["task"], "buy milk");

    let response = ctx.send("DELETE", &item, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "res": "Object deleted!" }));

    let response = ctx.send("GET", &item, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let response = ctx.send_anonymous("GET", "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["backend"], "memory");
    assert_eq!(response.body["store"], "connected");
}
