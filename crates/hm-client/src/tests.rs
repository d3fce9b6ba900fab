//! `HttpBackend` against the reference router on an ephemeral port.

use std::sync::Arc;

use hm_api::{AppState, GrantConfig, ServerConfig};
use hm_core::{
  backend::Backend,
  host::{AccessRequest, HostCapability, HostError, HostSdk},
  message::MessageId,
  person::{PersonFields, PersonId},
  session::AuthCode,
  user::{Identity, WELCOME_MESSAGE},
};
use hm_store_sqlite::SqliteStore;
use hm_sync::{
  bootstrap::{Bootstrap, Resolution},
  navigation::{Route, Tab},
  session::SessionCell,
  shell::{NavigationShell, Screen},
};
use tokio::net::TcpListener;

use crate::{ClientError, HttpBackend};

async fn serve(config: ServerConfig) -> String {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let app = hm_api::router(AppState::new(store, config));
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, app).await });
  format!("http://{addr}")
}

fn mock_config() -> ServerConfig {
  ServerConfig {
    appid: Some("cli_test".into()),
    mock_user: true,
    ..ServerConfig::default()
  }
}

async fn logged_in() -> HttpBackend {
  let backend = HttpBackend::new(serve(mock_config()).await).unwrap();
  backend.exchange_code(&AuthCode::mock()).await.unwrap();
  backend
}

#[tokio::test]
async fn private_calls_fail_without_session() {
  let backend = HttpBackend::new(serve(mock_config()).await).unwrap();
  let settings = backend.settings().await.unwrap();
  assert_eq!(settings.app_id(), Some("cli_test"));

  let err = backend.list_people().await.unwrap_err();
  assert_eq!(err.status(), Some(403));
  assert!(matches!(
    err,
    ClientError::Status { message: Some(ref m), .. } if m == "invalid session"
  ));
}

#[tokio::test]
async fn session_cookie_carries_across_calls() {
  let backend = logged_in().await;

  let inbox = backend.list_inbox().await.unwrap();
  assert_eq!(inbox.len(), 1);
  assert_eq!(inbox[0].text, WELCOME_MESSAGE);

  backend.mark_read(&inbox[0].id).await.unwrap();
  backend.mark_read(&inbox[0].id).await.unwrap();
  assert!(backend.list_inbox().await.unwrap()[0].read);

  let err = backend.mark_read(&MessageId::new("nope")).await.unwrap_err();
  assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn people_round_trip_and_missing_records() {
  let backend = logged_in().await;

  let created = backend
    .create_person(&PersonFields::named("Ada", Some("ada".into())))
    .await
    .unwrap();
  let fetched = backend.get_person(&created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);

  let updated = backend
    .update_person(&created.id, &PersonFields::named("Ada King", None))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.name(), "Ada King");
  assert_eq!(backend.network_stats().await.unwrap().total_people, 1);

  backend.delete_person(&created.id).await.unwrap();
  let ghost = PersonId::new("ghost");
  assert!(backend.get_person(&created.id).await.unwrap().is_none());
  assert!(
    backend
      .update_person(&ghost, &PersonFields::named("x", None))
      .await
      .unwrap()
      .is_none()
  );
  assert_eq!(
    backend.delete_person(&ghost).await.unwrap_err().status(),
    Some(404)
  );
}

struct GrantingHost(&'static str);

impl HostSdk for GrantingHost {
  async fn ready(&self) {}

  async fn request_access(&self, request: AccessRequest) -> Result<AuthCode, HostError> {
    assert_eq!(request.app_id, "cli_test");
    Ok(AuthCode::new(self.0))
  }
}

#[tokio::test]
async fn shell_boots_over_http_with_host_grant() {
  let config = ServerConfig {
    appid: Some("cli_test".into()),
    grants: vec![GrantConfig {
      code:     "grant-1".into(),
      identity: Identity {
        open_id:    "ou_ada".into(),
        name:       "Ada".into(),
        avatar_url: None,
      },
    }],
    ..ServerConfig::default()
  };
  let backend = Arc::new(HttpBackend::new(serve(config).await).unwrap());
  let session = SessionCell::new();
  let mut shell = NavigationShell::new(backend.clone(), session.clone(), Route::Root);
  let bootstrap = Bootstrap::new(
    backend.clone(),
    HostCapability::Available(GrantingHost("grant-1")),
    session.clone(),
  );

  shell.boot(bootstrap).await.unwrap().await.unwrap();

  assert!(matches!(shell.resolution(), Some(Resolution::Authenticated(u)) if u.name == "Ada"));
  assert_eq!(session.get().unwrap().field("open_id"), Some("ou_ada"));
  let inbox = shell.inbox().unwrap().state();
  assert_eq!(inbox.unread_count(), 1);

  shell.select_tab(Tab::Network).unwrap().await.unwrap();
  let directory = shell.directory().unwrap().clone();
  directory
    .create(PersonFields::named("Grace", Some("amazing".into())))
    .await
    .unwrap();
  assert_eq!(directory.state().people().len(), 1);
  assert_eq!(directory.state().stats.unwrap().total_people, 1);
  assert_eq!(shell.screen(), Screen::Tabs(Tab::Network));
}

#[tokio::test]
async fn bootstrap_outcomes_over_http() {
  let mut strict = mock_config();
  strict.mock_user = false;
  let strict = Arc::new(HttpBackend::new(serve(strict).await).unwrap());
  let bootstrap = Bootstrap::new(
    strict,
    HostCapability::Available(GrantingHost("never-issued")),
    SessionCell::new(),
  );
  assert!(!bootstrap.run().await.is_authenticated());

  // Mock mode never consults the host.
  let mock = Arc::new(HttpBackend::new(serve(mock_config()).await).unwrap());
  let session = SessionCell::new();
  let bootstrap = Bootstrap::new(mock, HostCapability::<GrantingHost>::Unavailable, session.clone());
  assert!(bootstrap.run().await.is_authenticated());
  assert_eq!(session.get().unwrap().name, "Mock User");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
  let backend = HttpBackend::new("http://127.0.0.1:9/").unwrap();
  assert_eq!(backend.base_url(), "http://127.0.0.1:9");
  let err = backend.settings().await.unwrap_err();
  assert!(matches!(err, ClientError::Http(_)));
  assert_eq!(err.status(), None);
}
