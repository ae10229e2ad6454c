//! HTTP API integration tests
//!
//! Drives the full router (auth middleware included) over the in-memory
//! store.

#[macro_use]
mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use standup::backend::routes::create_router;
use standup::backend::server::AppState;
use tower::ServiceExt;

use common::{auth_header, login, test_state, TestUser};

fn create_test_server(state: &AppState) -> TestServer {
    TestServer::new(create_router(state.clone())).expect("test server starts")
}

async fn create_group(server: &TestServer, user: &TestUser, name: &str) -> Value {
    let response = server
        .post("/group")
        .authorization_bearer(&user.access_token)
        .json(&json!({ "name": name, "allowed_emails": ["bob@acme.io"] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()
}

async fn create_session(server: &TestServer, user: &TestUser, group_id: &Value) -> i64 {
    let response = server
        .post("/session")
        .authorization_bearer(&user.access_token)
        .json(&json!({ "groupId": group_id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().expect("session id")
}

#[tokio::test]
async fn test_login_returns_tokens_and_sets_cookie() {
    let state = test_state();
    let request = Request::post("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Ada","email":"Ada@Acme.io"}"#))
        .unwrap();

    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("cookie set")
        .to_string();
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["user"]["email"], "ada@acme.io");
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["refresh_token"].as_str().map(str::len), Some(32));
    assert!(body["access_token"].is_string());
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let state = test_state();
    let server = create_test_server(&state);

    let response = server.get("/auth/check").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_error_body!(response.json::<Value>(), 401);

    let response = server.get("/auth/check").authorization_bearer("garbage").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_check_accepts_header_and_cookie() {
    let state = test_state();
    let ada = login(&state, "ada@acme.io").await;

    let server = create_test_server(&state);
    let response = server
        .get("/auth/check")
        .authorization_bearer(&ada.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "email": "ada@acme.io" }));

    let request = Request::get("/auth/check")
        .header(header::COOKIE, format!("theme=dark; access_token={}", ada.access_token))
        .body(Body::empty())
        .unwrap();
    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::get("/auth/check")
        .header(header::AUTHORIZATION, auth_header(&ada.access_token))
        .body(Body::empty())
        .unwrap();
    let response = create_router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_exchanges_only_the_current_token() {
    let state = test_state();
    let server = create_test_server(&state);
    let first = login(&state, "ada@acme.io").await;
    let second = login(&state, "ada@acme.io").await;

    let response = server
        .post("/token/refresh")
        .json(&json!({ "email": "ada@acme.io", "refresh_token": second.refresh_token }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let access = response.json::<Value>()["access_token"]
        .as_str()
        .expect("access token")
        .to_string();

    let response = server.get("/auth/check").authorization_bearer(&access).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .post("/token/refresh")
        .json(&json!({ "email": "ada@acme.io", "refresh_token": first.refresh_token }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_group_and_session_flow() {
    let state = test_state();
    let server = create_test_server(&state);
    let ada = login(&state, "ada@acme.io").await;

    let group = create_group(&server, &ada, "platform").await;
    let members = group["allowed_emails"].as_array().expect("emails");
    assert!(members.contains(&json!("ada@acme.io")));
    assert!(members.contains(&json!("bob@acme.io")));

    let response = server
        .get("/user/group")
        .authorization_bearer(&ada.access_token)
        .await;
    assert_eq!(response.json::<Value>().as_array().map(Vec::len), Some(1));

    let session_id = create_session(&server, &ada, &group["id"]).await;
    assert_eq!(create_session(&server, &ada, &group["id"]).await, session_id);

    let response = server
        .get(&format!("/session/{}", session_id))
        .authorization_bearer(&ada.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let session = response.json::<Value>();
    assert_eq!(session["group_id"], group["id"]);

    let response = server
        .post(&format!("/session/{}/shuffle", session_id))
        .authorization_bearer(&ada.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let seed = response.json::<Value>()["shuffle_seed"].as_i64().expect("seed");
    assert!((0..32767).contains(&seed));

    let response = server
        .delete(&format!("/group/{}", group["id"]))
        .authorization_bearer(&ada.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server
        .get(&format!("/session/{}", session_id))
        .authorization_bearer(&ada.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_outsiders_are_forbidden() {
    let state = test_state();
    let server = create_test_server(&state);
    let ada = login(&state, "ada@acme.io").await;
    let eve = login(&state, "eve@evil.io").await;

    let group = create_group(&server, &ada, "private").await;
    let session_id = create_session(&server, &ada, &group["id"]).await;

    let response = server
        .post("/session")
        .authorization_bearer(&eve.access_token)
        .json(&json!({ "groupId": group["id"] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .get(&format!("/session/{}", session_id))
        .authorization_bearer(&eve.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .post("/group/user/add")
        .authorization_bearer(&eve.access_token)
        .json(&json!({ "email": "eve@evil.io", "group_id": group["id"] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // Once added by a member, the outsider gets in
    let response = server
        .post("/group/user/add")
        .authorization_bearer(&ada.access_token)
        .json(&json!({ "email": "Eve@Evil.io", "group_id": group["id"] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get(&format!("/session/{}", session_id))
        .authorization_bearer(&eve.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_submission_upsert_and_aggregate() {
    let state = test_state();
    let server = create_test_server(&state);
    let ada = login(&state, "ada@acme.io").await;
    let bob = login(&state, "bob@acme.io").await;

    let group = create_group(&server, &ada, "core").await;
    let session_id = create_session(&server, &ada, &group["id"]).await;

    for (user, today) in [(&ada, "review"), (&bob, "deploy")] {
        let response = server
            .post("/user/submission")
            .authorization_bearer(&user.access_token)
            .json(&json!({ "session_id": session_id, "today": [today] }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    // A second upsert replaces instead of adding a row
    let response = server
        .post("/user/submission")
        .authorization_bearer(&ada.access_token)
        .json(&json!({ "session_id": session_id, "today": ["review", "pair"], "blockers": ["ci"] }))
        .await;
    let saved = response.json::<Value>();
    assert_eq!(saved["user_id"], ada.user.id);
    assert_eq!(saved["blockers"], json!(["ci"]));

    let response = server
        .get("/user/submission")
        .authorization_bearer(&bob.access_token)
        .add_query_param("session_id", session_id)
        .add_query_param("all", "true")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let all = response.json::<Value>();
    let rows = all.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r["name"] == "ada" && r["today"] == json!(["review", "pair"])));

    let response = server
        .get("/user/submission")
        .authorization_bearer(&bob.access_token)
        .add_query_param("session_id", session_id)
        .add_query_param("user_id", ada.user.id)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["today"], json!(["review", "pair"]));

    let response = server
        .get("/user/submission")
        .authorization_bearer(&bob.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_lookup_and_creation() {
    let state = test_state();
    let server = create_test_server(&state);
    let ada = login(&state, "ada@acme.io").await;

    let response = server
        .get("/user")
        .authorization_bearer(&ada.access_token)
        .add_query_param("email", "ADA@acme.io")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["id"], ada.user.id);

    // An empty id falls through to the email lookup
    let response = server
        .get("/user")
        .authorization_bearer(&ada.access_token)
        .add_query_param("id", "")
        .add_query_param("email", "ada@acme.io")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["id"], ada.user.id);

    let response = server
        .get("/user")
        .authorization_bearer(&ada.access_token)
        .add_query_param("id", ada.user.id.to_string())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["email"], "ada@acme.io");

    let response = server
        .get("/user")
        .authorization_bearer(&ada.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/user")
        .authorization_bearer(&ada.access_token)
        .json(&json!({ "name": "Carol", "email": "carol@acme.io" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = server
        .post("/user")
        .authorization_bearer(&ada.access_token)
        .json(&json!({ "name": "Carol again", "email": "carol@acme.io" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_group_validation() {
    let state = test_state();
    let server = create_test_server(&state);
    let ada = login(&state, "ada@acme.io").await;

    let response = server
        .post("/group")
        .authorization_bearer(&ada.access_token)
        .json(&json!({ "name": "mars", "timezone": "Mars/Olympus_Mons" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    create_group(&server, &ada, "dup").await;
    let response = server
        .post("/group")
        .authorization_bearer(&ada.access_token)
        .json(&json!({ "name": "dup" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let state = test_state();
    let server = create_test_server(&state);

    let response = server.get("/nope").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_error_body!(response.json::<Value>(), 404);
}
