use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use plaza_api::{AppStateInner, router};
use plaza_community::{Community, CommunityConfig};
use plaza_db::Database;

const SECRET: &str = "test-secret-for-http-suite";

fn app() -> Router {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let community = Community::new(db, CommunityConfig::default());
    router(AppStateInner::new(
        community,
        SECRET.to_string(),
        vec!["Root@Example.com".to_string()],
    ))
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, name: &str) -> (String, String) {
    let (status, body) = call(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "email": format!("{name}@example.com"),
            "username": name,
            "password": "correct horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (
        body["user_id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

async fn new_post(app: &Router, token: &str) -> i64 {
    let (status, body) = call(
        app,
        Method::POST,
        "/posts",
        Some(token),
        Some(json!({ "title": "Busan trip", "contents": "{}" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["post_id"].as_i64().unwrap()
}

#[tokio::test]
async fn comment_thread_round_trip() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let (_, bob) = register(&app, "bob").await;
    let post_id = new_post(&app, &alice).await;

    let (status, top) = call(
        &app,
        Method::POST,
        &format!("/posts/{post_id}/comments"),
        Some(&alice),
        Some(json!({ "contents": "C1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(top["replies_count"], 0);
    assert_eq!(top["user"]["username"], "alice");
    let top_id = top["comment_id"].as_i64().unwrap();

    for text in ["R1", "R2"] {
        let (status, reply) = call(
            &app,
            Method::POST,
            &format!("/comments/{top_id}/replies"),
            Some(&bob),
            Some(json!({ "contents": text })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(reply["parent_comment_id"], top_id);
        assert!(reply.get("replies_count").is_none());
    }

    let (status, page) = call(&app, Method::GET, &format!("/posts/{post_id}/comments?page=0&size=5"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page_info"]["total_size"], 1);
    assert_eq!(page["page_info"]["total_pages"], 1);
    assert_eq!(page["items"][0]["replies_count"], 2);

    let (_, replies) = call(&app, Method::GET, &format!("/comments/{top_id}/replies"), None, None).await;
    assert_eq!(replies["items"][0]["contents"], "R1");
    assert_eq!(replies["page_info"]["current_size"], 2);

    let (status, edited) = call(
        &app,
        Method::PATCH,
        &format!("/comments/{top_id}"),
        Some(&alice),
        Some(json!({ "contents": "C1 edited" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["contents"], "C1 edited");
    assert_eq!(edited["replies_count"], 2);

    let (status, deleted) = call(&app, Method::DELETE, &format!("/comments/{top_id}"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted_replies"], 2);
    assert_eq!(deleted["message"], "Comment and 2 replies deleted");

    let (_, post) = call(&app, Method::GET, &format!("/posts/{post_id}"), None, None).await;
    assert_eq!(post["comment_count"], 0);
}

#[tokio::test]
async fn writes_require_a_valid_token() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let post_id = new_post(&app, &alice).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/posts/{post_id}/comments"),
        None,
        Some(json!({ "contents": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/posts/{post_id}/comments"),
        Some("not-a-jwt"),
        Some(json!({ "contents": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Reads stay public.
    let (status, _) = call(&app, Method::GET, &format!("/posts/{post_id}/comments"), None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn failures_map_to_statuses() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let (_, bob) = register(&app, "bob").await;
    let post_id = new_post(&app, &alice).await;

    let (_, top) = call(
        &app,
        Method::POST,
        &format!("/posts/{post_id}/comments"),
        Some(&alice),
        Some(json!({ "contents": "top" })),
    )
    .await;
    let top_id = top["comment_id"].as_i64().unwrap();

    let (status, like) = call(&app, Method::POST, &format!("/comments/{top_id}/likes"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(like["like_count"], 1);
    let (status, body) = call(&app, Method::POST, &format!("/comments/{top_id}/likes"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (_, reply) = call(
        &app,
        Method::POST,
        &format!("/comments/{top_id}/replies"),
        Some(&bob),
        Some(json!({ "contents": "reply" })),
    )
    .await;
    let reply_id = reply["comment_id"].as_i64().unwrap();
    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/comments/{reply_id}/replies"),
        Some(&alice),
        Some(json!({ "contents": "too deep" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_input");

    let (status, _) = call(&app, Method::DELETE, &format!("/comments/{top_id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::DELETE, "/comments/9999", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = call(&app, Method::POST, &format!("/posts/{post_id}/likes"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::GET, "/posts?size=0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_checks_credentials() {
    let app = app();
    let (user_id, _) = register(&app, "alice").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ALICE@example.com", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], user_id);
    assert_eq!(body["username"], "alice");

    let (status, _) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "alice@example.com", "username": "again", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn admins_restrict_users() {
    let app = app();
    let (_, root) = register(&app, "root").await;
    let (bob_id, bob) = register(&app, "bob").await;

    let (status, _) = call(&app, Method::GET, "/manage/users/restricted", Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, user) = call(
        &app,
        Method::PUT,
        &format!("/manage/users/{bob_id}/restriction"),
        Some(&root),
        Some(json!({ "restricted": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["restricted"], true);

    let (status, _) = call(
        &app,
        Method::POST,
        "/posts",
        Some(&bob),
        Some(json!({ "title": "t", "contents": "c" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, page) = call(&app, Method::GET, "/manage/users/restricted", Some(&root), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page_info"]["total_size"], 1);
    assert_eq!(page["items"][0]["username"], "bob");
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let post_id = new_post(&app, &alice).await;

    let comments_uri = format!("/posts/{post_id}/comments?page=x");
    for uri in ["/posts?page=-1", "/posts?size=ten", comments_uri.as_str()] {
        let (status, body) = call(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "bad_input", "{uri}");
        assert!(body["message"].as_str().is_some());
    }

    let (status, body) = call(&app, Method::GET, "/posts/not-a-number", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_input");

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/posts/{post_id}/comments"),
        Some(&alice),
        Some(json!({ "text": "wrong field" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_input");

    // No body and no content type at all.
    let (status, body) = call(&app, Method::POST, &format!("/posts/{post_id}/comments"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_input");
}

#[tokio::test]
async fn admins_list_and_withdraw_users() {
    let app = app();
    let (_, root) = register(&app, "root").await;
    let (alice_id, alice) = register(&app, "alice").await;
    let (_, bob) = register(&app, "bob").await;

    let post_id = new_post(&app, &bob).await;
    let (_, top) = call(
        &app,
        Method::POST,
        &format!("/posts/{post_id}/comments"),
        Some(&bob),
        Some(json!({ "contents": "top" })),
    )
    .await;
    let top_id = top["comment_id"].as_i64().unwrap();
    call(
        &app,
        Method::POST,
        &format!("/comments/{top_id}/replies"),
        Some(&alice),
        Some(json!({ "contents": "reply" })),
    )
    .await;
    call(&app, Method::POST, &format!("/comments/{top_id}/likes"), Some(&alice), None).await;

    let (status, page) = call(&app, Method::GET, "/manage/users?size=2", Some(&root), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page_info"]["total_size"], 3);
    assert_eq!(page["page_info"]["total_pages"], 2);

    let (status, _) = call(&app, Method::POST, &format!("/manage/users/{alice_id}/withdraw"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, summary) =
        call(&app, Method::POST, &format!("/manage/users/{alice_id}/withdraw"), Some(&root), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["deleted_comments"], 1);
    assert_eq!(summary["deleted_likes"], 1);

    let (_, page) = call(&app, Method::GET, &format!("/posts/{post_id}/comments"), None, None).await;
    assert_eq!(page["items"][0]["replies_count"], 0);
    assert_eq!(page["items"][0]["like_count"], 0);
    let (_, post) = call(&app, Method::GET, &format!("/posts/{post_id}"), None, None).await;
    assert_eq!(post["comment_count"], 1);

    // The withdrawn account's token no longer resolves.
    let (status, _) = call(&app, Method::POST, "/posts", Some(&alice), Some(json!({ "title": "t", "contents": "c" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
