//! REST layer tests: the real router is driven with `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use chat::{config::ChatConfig, ChatModule};

use common::{at, create_test_db, seed_conversation, seed_message, seed_user};

async fn create_router() -> (Router, DatabaseConnection) {
    let db = create_test_db().await;
    let module = ChatModule::init(db.clone(), &ChatConfig::default());
    let router = module
        .register_rest(Router::new())
        .expect("Failed to register routes");
    (router, db)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, content_type, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn keys(v: &Value) -> Vec<String> {
    let mut keys: Vec<String> = v.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}

#[tokio::test]
async fn post_users_creates_superuser() {
    let (router, _db) = create_router().await;

    let (status, _, body) = send(
        &router,
        post_json(
            "/users",
            &json!({ "username": "alice", "email": "a@x.com", "password": "alice123" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        keys(&body),
        vec!["email", "id", "is_staff", "is_superuser", "username"]
    );
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["is_superuser"], true);
    assert_eq!(body["is_staff"], true);
    assert!(!body.to_string().contains("alice123"));
}

#[tokio::test]
async fn post_users_reports_field_errors() {
    let (router, _db) = create_router().await;
    let alice = json!({ "username": "alice", "email": "a@x.com", "password": "alice123" });
    let (status, _, _) = send(&router, post_json("/users", &alice)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, content_type, body) = send(
        &router,
        post_json(
            "/users",
            &json!({ "username": "alice", "email": "a@x.com", "password": "abcdefgh" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    assert_eq!(body["status"], 400);
    assert_eq!(body["code"], "CHAT_VALIDATION");
    assert_eq!(body["instance"], "/users");
    assert_eq!(
        body["errors"],
        json!({
            "username": ["This username is already taken."],
            "email": ["This email is already in use."],
            "password": ["Password must contain at least one digit."],
        })
    );
}

#[tokio::test]
async fn post_users_with_missing_fields() {
    let (router, _db) = create_router().await;

    let (status, _, body) = send(&router, post_json("/users", &json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["username", "email", "password"] {
        assert_eq!(body["errors"][field], json!(["This field is required."]));
    }
}

#[tokio::test]
async fn post_users_password_matching_username() {
    let (router, _db) = create_router().await;

    let (status, _, body) = send(
        &router,
        post_json(
            "/users",
            &json!({ "username": "bob12345", "email": "bob@x.com", "password": "BOB12345" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"],
        json!({ "password": ["Password cannot be the same as the username."] })
    );
}

#[tokio::test]
async fn post_users_with_malformed_json() {
    let (router, _db) = create_router().await;

    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();
    let (status, content_type, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    assert_eq!(body["code"], "CHAT_BAD_REQUEST");
}

#[tokio::test]
async fn conversations_are_projected_without_private_fields() {
    let (router, db) = create_router().await;
    let (alice, bob) = (seed_user(&db, "alice").await, seed_user(&db, "bob").await);
    let conv = seed_conversation(&db, &[&bob, &alice], at(30)).await;

    let (status, _, body) = send(&router, get("/conversations")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "id": conv.id,
            "users": [
                { "id": alice.id, "username": "alice" },
                { "id": bob.id, "username": "bob" },
            ],
            "modified_at": "2024-05-01T10:30:00Z",
        }])
    );
    assert!(!body.to_string().contains("example.com"));

    let (status, _, detail) = send(&router, get(&format!("/conversations/{}", conv.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail, body[0]);
}

#[tokio::test]
async fn conversations_honour_limit_and_offset() {
    let (router, db) = create_router().await;
    let newest = seed_conversation(&db, &[], at(3)).await;
    let middle = seed_conversation(&db, &[], at(2)).await;
    seed_conversation(&db, &[], at(1)).await;

    let (_, _, body) = send(&router, get("/conversations?limit=1")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], json!(newest.id));

    let (_, _, body) = send(&router, get("/conversations?limit=1&offset=1")).await;
    assert_eq!(body[0]["id"], json!(middle.id));
}

#[tokio::test]
async fn unknown_conversation_is_a_problem_404() {
    let (router, _db) = create_router().await;
    let id = Uuid::new_v4();

    for uri in [
        format!("/conversations/{id}"),
        format!("/conversations/{id}/messages"),
    ] {
        let (status, content_type, body) = send(&router, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(content_type.as_deref(), Some("application/problem+json"));
        assert_eq!(body["code"], "CHAT_CONVERSATION_NOT_FOUND");
        assert_eq!(body["instance"], uri);
    }
}

#[tokio::test]
async fn malformed_path_and_query_are_problems() {
    let (router, _db) = create_router().await;
    let id = Uuid::new_v4();

    for uri in [
        "/conversations/not-a-uuid".to_string(),
        "/conversations/not-a-uuid/messages".to_string(),
        "/conversations?limit=abc".to_string(),
        format!("/conversations/{id}/messages?offset=-1"),
    ] {
        let (status, content_type, body) = send(&router, get(&uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(content_type.as_deref(), Some("application/problem+json"), "{uri}");
        assert_eq!(body["code"], "CHAT_BAD_REQUEST");
        assert_eq!(body["status"], 400);
    }
}

#[tokio::test]
async fn messages_are_projected_oldest_first() {
    let (router, db) = create_router().await;
    let (alice, bob) = (seed_user(&db, "alice").await, seed_user(&db, "bob").await);
    let conv = seed_conversation(&db, &[&alice, &bob], at(10)).await;
    let reply = seed_message(&db, &conv, &bob, &alice, "hello alice", at(2)).await;
    let first = seed_message(&db, &conv, &alice, &bob, "hello bob", at(1)).await;

    let (status, _, body) = send(&router, get(&format!("/conversations/{}/messages", conv.id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {
                "id": first.id,
                "body": "hello bob",
                "sent_to": { "id": bob.id, "username": "bob" },
                "created_by": { "id": alice.id, "username": "alice" },
            },
            {
                "id": reply.id,
                "body": "hello alice",
                "sent_to": { "id": alice.id, "username": "alice" },
                "created_by": { "id": bob.id, "username": "bob" },
            },
        ])
    );
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (router, _db) = create_router().await;

    let (status, _, body) = send(&router, get("/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/users"]["post"].is_object());
    assert!(body["paths"]["/conversations/{id}/messages"]["get"].is_object());
    assert!(body["components"]["schemas"]["Problem"].is_object());
}
