mod common;

use axum::{Router, http::StatusCode};
use serde_json::json;

use missive_api::{AppState, AppStateInner, AuthorPolicy, router};
use missive_db::Database;

use common::call;

fn setup() -> (AppState, Router) {
    let state = AppStateInner::new(Database::open_in_memory().unwrap(), AuthorPolicy::Legacy);
    (state.clone(), router(state))
}

async fn create(router: &Router, username: &str) -> String {
    let (status, body) = call(
        router,
        "POST",
        "/users",
        Some(json!({ "username": username, "password": "mypassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["user"]["_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn create_user_hides_password() {
    let (state, router) = setup();

    let (status, body) = call(
        &router,
        "POST",
        "/users",
        Some(json!({ "_id": "aaaaaaaaaaaa", "username": "myuser", "password": "mypassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "user": { "_id": "aaaaaaaaaaaa", "username": "myuser", "messages": [] } })
    );

    let row = state.db.get_user_by_id("aaaaaaaaaaaa").unwrap().unwrap();
    assert_ne!(row.password, "mypassword");
    assert!(row.password.starts_with("$argon2"));
}

#[tokio::test]
async fn duplicate_username_is_500() {
    let (_, router) = setup();
    create(&router, "myuser").await;

    let (status, body) = call(
        &router,
        "POST",
        "/users",
        Some(json!({ "username": "myuser", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn create_user_requires_password() {
    let (_, router) = setup();

    let (status, _) = call(&router, "POST", "/users", Some(json!({ "username": "myuser" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_user_rejects_empty_id() {
    let (state, router) = setup();

    let (status, body) = call(
        &router,
        "POST",
        "/users",
        Some(json!({ "_id": "", "username": "myuser", "password": "mypassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(state.db.list_users().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_user_id_is_json_error() {
    let (_, router) = setup();

    for method in ["GET", "DELETE"] {
        let (status, body) = call(&router, method, "/users/%FF", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} /users/%FF", method);
        assert!(body["error"].is_string(), "{} /users/%FF", method);
    }
}

#[tokio::test]
async fn list_and_get_include_message_lists() {
    let (_, router) = setup();
    let first = create(&router, "myuser").await;
    let second = create(&router, "anotheruser").await;

    let mut message_ids = Vec::new();
    for title in ["one", "two"] {
        let (_, body) = call(
            &router,
            "POST",
            "/messages",
            Some(json!({ "title": title, "body": "b", "author": first })),
        )
        .await;
        message_ids.push(body["message"]["_id"].as_str().unwrap().to_string());
    }

    let (status, body) = call(&router, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["_id"], first.as_str());
    assert_eq!(users[0]["messages"], json!([message_ids[1], message_ids[0]]));
    assert_eq!(users[1]["_id"], second.as_str());
    assert_eq!(users[1]["messages"], json!([]));

    let (status, body) = call(&router, "GET", &format!("/users/{}", first), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "myuser");
    assert!(body["user"].get("password").is_none());

    let (status, body) = call(&router, "GET", "/users/nope", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "user": null }));
}

#[tokio::test]
async fn update_user_renames_and_rehashes() {
    let (state, router) = setup();
    let id = create(&router, "myuser").await;
    let old_hash = state.db.get_user_by_id(&id).unwrap().unwrap().password;

    let (status, body) = call(
        &router,
        "PUT",
        &format!("/users/{}", id),
        Some(json!({ "username": "renamed", "password": "newpassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "renamed");

    let new_hash = state.db.get_user_by_id(&id).unwrap().unwrap().password;
    assert_ne!(new_hash, old_hash);

    let (status, body) =
        call(&router, "PUT", "/users/nope", Some(json!({ "username": "x" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "user": null }));
}

#[tokio::test]
async fn delete_user_keeps_authored_messages() {
    let (state, router) = setup();
    let id = create(&router, "myuser").await;
    let (_, body) = call(
        &router,
        "POST",
        "/messages",
        Some(json!({ "title": "kept", "body": "b", "author": id })),
    )
    .await;
    assert_eq!(body["message"]["author"], id.as_str());

    let (status, body) = call(&router, "DELETE", &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Successfully deleted.", "_id": id }));
    assert!(state.db.find_message_by_title("kept").unwrap().is_some());

    let (status, body) = call(&router, "DELETE", &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "User does not exist." }));
}
