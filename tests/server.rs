use std::sync::Arc;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::TimeDelta;
use botledger::auth::SessionStore;
use botledger::server::{build_router, AppState};
use botledger::storage::SqliteStore;
use botledger::users::{UserService, DEFAULT_PASSWORD};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const CSV: &str = "\
CompanyName,Description,ChatbotName,LLMName,Specialization
Acme,Widgets,AcmeBot,AcmeLM,Support
Globex,\"Energy, mostly\",none,GlobexLM,Research
";

fn app() -> (TempDir, Router) {
    let (dir, state) = app_state(SessionStore::default());
    (dir, build_router(state))
}

fn app_state(sessions: SessionStore) -> (TempDir, Arc<AppState>) {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("botledger.db");
    let csv = dir.path().join("import.csv");
    std::fs::write(&csv, CSV).unwrap();

    let store = SqliteStore::open(&db).unwrap();
    UserService::new(&store).seed_default_users().unwrap();
    drop(store);

    (dir, Arc::new(AppState::new(db, csv, sessions)))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, cookie, body)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::post(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Log in as the seeded admin and return the `name=value` cookie pair
async fn login(app: &Router) -> String {
    let creds = serde_json::json!({ "email": "admin@example.com", "password": DEFAULT_PASSWORD });
    let (status, cookie, body) = send(app, post("/login", None, Some(creds))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "admin@example.com");
    assert!(body["user"].get("passwordHash").is_none());

    let cookie = cookie.expect("login sets a session cookie");
    assert!(cookie.contains("HttpOnly"));
    cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_companies_requires_login() {
    let (_dir, app) = app();
    let (status, _, body) = send(&app, get("/companies", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _, _) = send(&app, post("/import", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_import_and_list_companies() {
    let (_dir, app) = app();
    let cookie = login(&app).await;

    let (status, _, body) = send(&app, post("/import", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["success"], true);
    assert_eq!(body["result"]["companiesImported"], 2);
    assert_eq!(body["result"]["chatbotsImported"], 1);
    assert_eq!(body["result"]["llmsImported"], 2);
    assert_eq!(body["stats"]["companies"], 2);

    let (status, _, body) = send(&app, get("/companies", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let companies = body.as_array().unwrap();
    assert_eq!(companies.len(), 2);
    assert_eq!(companies[0]["name"], "Acme");
    assert_eq!(companies[0]["chatbots"][0]["name"], "AcmeBot");
    assert_eq!(companies[1]["description"], "Energy, mostly");
    assert!(companies[1]["chatbots"].as_array().unwrap().is_empty());

    // A second import is refused while data exists
    let (_, _, body) = send(&app, post("/import", Some(&cookie), None)).await;
    assert_eq!(body["result"]["success"], false);
    assert_eq!(body["result"]["companiesImported"], 0);

    let (status, _, body) = send(&app, post("/import/clear", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["companies"], 0);
    assert_eq!(body["stats"]["llms"], 0);
}

#[tokio::test]
async fn test_bad_login() {
    let (_dir, app) = app();

    let creds = serde_json::json!({ "email": "admin@example.com", "password": "wrong-password" });
    let (status, cookie, body) = send(&app, post("/login", None, Some(creds))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(cookie.is_none());
    assert_eq!(body["message"], "Invalid email or password");

    let creds = serde_json::json!({ "email": "not-an-email", "password": "password123" });
    let (status, _, _) = send(&app, post("/login", None, Some(creds))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (_dir, app) = app();
    let cookie = login(&app).await;

    let (_, _, body) = send(&app, get("/dashboard", Some(&cookie))).await;
    assert_eq!(body["currentUser"]["email"], "admin@example.com");
    assert_eq!(body["users"].as_array().unwrap().len(), 2);

    let (status, expired, body) = send(&app, post("/logout", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionEnded"], true);
    assert!(expired.unwrap().contains("Max-Age=0"));

    let (status, _, _) = send(&app, get("/companies", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, _, body) = send(&app, get("/dashboard", Some(&cookie))).await;
    assert!(body["currentUser"].is_null());
}

#[tokio::test]
async fn test_user_lookup_and_admin_pages() {
    let (_dir, app) = app();

    let (status, _, body) = send(&app, get("/users/1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "admin@example.com");

    let (status, _, body) = send(&app, get("/users/999", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (_, _, body) = send(&app, get("/debug", None)).await;
    assert_eq!(body["isAuthenticated"], false);
    assert_eq!(body["currentUser"], "Not logged in");
    assert_eq!(body["databaseConnected"], true);
    assert_eq!(body["companiesTableExists"], true);
    assert_eq!(body["usersCount"], 2);

    let (_, _, body) = send(&app, post("/database-info/clear-users", None, None)).await;
    assert_eq!(body["usersRemoved"], 2);
    let (_, _, body) = send(&app, get("/database-info", None)).await;
    assert_eq!(body["databaseExists"], true);
    assert_eq!(body["totalUsers"], 0);

    let (_, _, body) = send(&app, post("/database-info/seed", None, None)).await;
    assert_eq!(body["usersSeeded"], 2);
    let (_, _, body) = send(&app, get("/users", None)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_idle_sessions_are_swept() {
    let (_dir, state) = app_state(SessionStore::new(TimeDelta::milliseconds(1)));
    let app = build_router(state.clone());

    for _ in 0..20 {
        login(&app).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    assert!(state.sessions.len() <= 1);

    let (status, _, _) = send(&app, get("/dashboard", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.sessions.len(), 0);
}

#[tokio::test]
async fn test_login_rejects_malformed_body() {
    let (_dir, app) = app();

    let req = Request::post("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let req = Request::post("/login")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("email=admin@example.com"))
        .unwrap();
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let creds = serde_json::json!({ "email": "admin@example.com", "password": "x".repeat(101) });
    let (status, _, body) = send(&app, post("/login", None, Some(creds))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at most 100 characters long.");
}
