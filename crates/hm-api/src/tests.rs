//! Router tests against an in-memory store.

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use hm_core::{
  message::Message,
  person::{NetworkStats, Person},
  session::{Settings, UserInfo},
  user::{Identity, WELCOME_MESSAGE},
};
use hm_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppState, GrantConfig, ServerConfig, router};

fn config(mock_user: bool) -> ServerConfig {
  ServerConfig {
    appid: Some("cli_test".into()),
    mock_user,
    grants: vec![GrantConfig {
      code:     "grant-1".into(),
      identity: Identity {
        open_id:    "ou_ada".into(),
        name:       "Ada".into(),
        avatar_url: Some("https://example.com/ada.png".into()),
      },
    }],
    ..ServerConfig::default()
  }
}

async fn app(mock_user: bool) -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  router(AppState::new(store, config(mock_user)))
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  cookie: Option<&str>,
  body: Option<Value>,
) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(cookie) = cookie {
    builder = builder.header(header::COOKIE, cookie);
  }
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json<T: serde::de::DeserializeOwned>(resp: Response) -> T {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

/// Log in with `code` and return the `name=value` cookie pair.
async fn login(app: &Router, code: &str) -> String {
  let resp = send(app, "GET", &format!("/api/public/auth/callback?code={code}"), None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_owned();
  set_cookie.split(';').next().unwrap().to_owned()
}

// ── Public ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn settings_reports_appid_and_mock_mode() {
  let app = app(true).await;
  let resp = send(&app, "GET", "/api/public/settings", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let settings: Settings = json(resp).await;
  assert_eq!(settings.app_id(), Some("cli_test"));
  assert!(settings.mock_user);
}

#[tokio::test]
async fn mock_code_only_accepted_in_mock_mode() {
  let mock = app(true).await;
  let resp = send(&mock, "GET", "/api/public/auth/callback?code=mock", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let info: UserInfo = json(resp).await;
  assert_eq!(info.name, "Mock User");

  let strict = app(false).await;
  let resp = send(&strict, "GET", "/api/public/auth/callback?code=mock", None, None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn grant_codes_are_single_use() {
  let app = app(false).await;
  let resp = send(&app, "GET", "/api/public/auth/callback?code=grant-1", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(resp.headers().contains_key(header::SET_COOKIE));
  let info: UserInfo = json(resp).await;
  assert_eq!(info.name, "Ada");
  assert_eq!(info.avatar_or_placeholder(), "https://example.com/ada.png");
  assert_eq!(info.field("open_id"), Some("ou_ada"));

  let again = send(&app, "GET", "/api/public/auth/callback?code=grant-1", None, None).await;
  assert_eq!(again.status(), StatusCode::UNAUTHORIZED);
  let body: Value = json(again).await;
  assert!(body["error"].is_string());
}

// ── Sessions ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn private_routes_need_a_session() {
  let app = app(true).await;
  for uri in ["/api/private/people/", "/api/private/network/stat", "/api/private/user/inbox"] {
    let resp = send(&app, "GET", uri, None, None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{uri}");
    let resp = send(&app, "GET", uri, Some("hm_session=forged"), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{uri}");
  }
  let body: Value = json(send(&app, "GET", "/api/private/people/", None, None).await).await;
  assert_eq!(body["error"], "invalid session");
}

// ── People ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn people_crud() {
  let app = app(true).await;
  let cookie = login(&app, "mock").await;
  let cookie = Some(cookie.as_str());

  let resp = send(
    &app,
    "POST",
    "/api/private/people/",
    cookie,
    Some(json!({ "name": "Grace", "nickname": "amazing", "gender": "female" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Person = json(resp).await;
  assert_eq!(created.nickname(), Some("amazing"));

  let uri = format!("/api/private/people/{}", created.id);
  let fetched: Person = json(send(&app, "GET", &uri, cookie, None).await).await;
  assert_eq!(fetched, created);

  let resp = send(&app, "PUT", &uri, cookie, Some(json!({ "name": "Grace Hopper" }))).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let updated: Person = json(resp).await;
  assert_eq!(updated.name(), "Grace Hopper");
  assert_eq!(updated.nickname(), None);
  assert_eq!(updated.created_at, created.created_at);
  assert!(updated.updated_at.is_some());

  let people: Vec<Person> = json(send(&app, "GET", "/api/private/people/", cookie, None).await).await;
  assert_eq!(people.len(), 1);
  let stats: NetworkStats = json(send(&app, "GET", "/api/private/network/stat", cookie, None).await).await;
  assert_eq!(stats.total_people, 1);

  let resp = send(&app, "DELETE", &uri, cookie, None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  for method in ["GET", "DELETE"] {
    let resp = send(&app, method, &uri, cookie, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method}");
  }
  let resp = send(&app, "PUT", &uri, cookie, Some(json!({ "name": "x" }))).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_name_is_bad_request() {
  let app = app(true).await;
  let cookie = login(&app, "mock").await;
  let resp = send(
    &app,
    "POST",
    "/api/private/people/",
    Some(&cookie),
    Some(json!({ "name": "   " })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Inbox ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn welcome_message_and_idempotent_mark_read() {
  let app = app(true).await;
  let cookie = login(&app, "mock").await;
  let cookie = Some(cookie.as_str());

  let inbox: Vec<Message> = json(send(&app, "GET", "/api/private/user/inbox", cookie, None).await).await;
  assert_eq!(inbox.len(), 1);
  assert_eq!(inbox[0].text, WELCOME_MESSAGE);
  assert!(!inbox[0].read);

  let uri = format!("/api/private/user/inbox/{}/read", inbox[0].id);
  for _ in 0..2 {
    let resp = send(&app, "POST", &uri, cookie, None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  }
  let inbox: Vec<Message> = json(send(&app, "GET", "/api/private/user/inbox", cookie, None).await).await;
  assert!(inbox[0].read);

  let resp = send(&app, "POST", "/api/private/user/inbox/nope/read", cookie, None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn messages_are_private_to_their_user() {
  let app = app(true).await;
  let mock = login(&app, "mock").await;
  let ada = login(&app, "grant-1").await;

  let inbox: Vec<Message> =
    json(send(&app, "GET", "/api/private/user/inbox", Some(&mock), None).await).await;
  let uri = format!("/api/private/user/inbox/{}/read", inbox[0].id);

  let resp = send(&app, "POST", &uri, Some(&ada), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let me: Value = json(send(&app, "GET", "/api/private/user/me", Some(&ada), None).await).await;
  assert_eq!(me["open_id"], "ou_ada");
}
