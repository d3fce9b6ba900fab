//! Async HTTP client wrapping the HM JSON API.

use std::time::Duration;

use hm_core::{
  backend::Backend,
  message::{Message, MessageId},
  person::{NetworkStats, Person, PersonFields, PersonId},
  session::{AuthCode, Settings, UserInfo},
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{ClientError, Result};

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// [`Backend`] over HTTP.
///
/// Clones share the inner [`reqwest::Client`] and its cookie jar, so every
/// clone rides on one session.
#[derive(Clone)]
pub struct HttpBackend {
  client:   Client,
  base_url: String,
}

impl HttpBackend {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .cookie_store(true)
      .build()?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_owned(),
    })
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self.client.request(method, format!("{}/api{path}", self.base_url))
  }

  /// Send and map non-success statuses to [`ClientError::Status`].
  async fn send(&self, req: RequestBuilder, method: &'static str, path: &str) -> Result<Response> {
    let resp = req.send().await?;
    check(resp, method, path).await
  }

  /// Like [`Self::send`], but a 404 yields `Ok(None)`.
  async fn send_optional(
    &self,
    req: RequestBuilder,
    method: &'static str,
    path: &str,
  ) -> Result<Option<Response>> {
    let resp = req.send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      debug!(%method, path, "not found");
      return Ok(None);
    }
    check(resp, method, path).await.map(Some)
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let resp = self.send(self.request(Method::GET, path), "GET", path).await?;
    Ok(resp.json().await?)
  }

  async fn json_or_missing<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
    method: &'static str,
    path: &str,
  ) -> Result<Option<T>> {
    match self.send_optional(req, method, path).await? {
      Some(resp) => Ok(Some(resp.json().await?)),
      None => Ok(None),
    }
  }
}

async fn check(resp: Response, method: &'static str, path: &str) -> Result<Response> {
  let status = resp.status();
  debug!(%method, path, status = status.as_u16(), "api call");
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp.json::<ErrorBody>().await.ok().map(|b| b.error);
  Err(ClientError::Status {
    method,
    path: path.to_owned(),
    status: status.as_u16(),
    message,
  })
}

// ─── Backend impl ────────────────────────────────────────────────────────────

impl Backend for HttpBackend {
  type Error = ClientError;

  // ── Public ────────────────────────────────────────────────────────────────

  async fn settings(&self) -> Result<Settings> { self.get("/public/settings").await }

  async fn exchange_code(&self, code: &AuthCode) -> Result<UserInfo> {
    let path = "/public/auth/callback";
    let req = self
      .request(Method::GET, path)
      .query(&[("code", code.as_str())]);
    Ok(self.send(req, "GET", path).await?.json().await?)
  }

  // ── People ────────────────────────────────────────────────────────────────

  async fn list_people(&self) -> Result<Vec<Person>> { self.get("/private/people/").await }

  async fn get_person(&self, id: &PersonId) -> Result<Option<Person>> {
    let path = format!("/private/people/{id}");
    self
      .json_or_missing(self.request(Method::GET, &path), "GET", &path)
      .await
  }

  async fn create_person(&self, fields: &PersonFields) -> Result<Person> {
    let path = "/private/people/";
    let req = self.request(Method::POST, path).json(fields);
    Ok(self.send(req, "POST", path).await?.json().await?)
  }

  async fn update_person(&self, id: &PersonId, fields: &PersonFields) -> Result<Option<Person>> {
    let path = format!("/private/people/{id}");
    let req = self.request(Method::PUT, &path).json(fields);
    self.json_or_missing(req, "PUT", &path).await
  }

  async fn delete_person(&self, id: &PersonId) -> Result<()> {
    let path = format!("/private/people/{id}");
    self
      .send(self.request(Method::DELETE, &path), "DELETE", &path)
      .await?;
    Ok(())
  }

  async fn network_stats(&self) -> Result<NetworkStats> { self.get("/private/network/stat").await }

  // ── Inbox ─────────────────────────────────────────────────────────────────

  async fn list_inbox(&self) -> Result<Vec<Message>> { self.get("/private/user/inbox").await }

  async fn mark_read(&self, id: &MessageId) -> Result<()> {
    let path = format!("/private/user/inbox/{id}/read");
    self
      .send(self.request(Method::POST, &path), "POST", &path)
      .await?;
    Ok(())
  }
}
