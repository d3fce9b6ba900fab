//! In-memory [`Backend`] and [`HostSdk`] doubles for tests.

use std::{
  collections::{HashMap, HashSet, VecDeque},
  sync::{
    Mutex,
    atomic::{AtomicU64, AtomicUsize, Ordering},
  },
  time::Duration,
};

use chrono::Utc;
use hm_core::{
  backend::Backend,
  host::{AccessRequest, HostError, HostSdk},
  message::{Message, MessageId},
  person::{NetworkStats, Person, PersonFields, PersonId},
  session::{AuthCode, Settings, UserInfo},
};

#[derive(Debug, thiserror::Error)]
#[error("fake backend failure in {0}")]
pub struct FakeError(pub &'static str);

/// A backend whose state lives in memory and whose calls are counted.
#[derive(Default)]
pub struct FakeBackend {
  settings:   Mutex<Settings>,
  people:     Mutex<Vec<Person>>,
  messages:   Mutex<Vec<Message>>,
  calls:      Mutex<HashMap<&'static str, usize>>,
  failing:    Mutex<HashSet<&'static str>>,
  exchanged:  Mutex<Vec<String>>,
  /// Delays applied to successive calls, per endpoint.
  delays:     Mutex<HashMap<&'static str, VecDeque<Duration>>>,
  next_id:    AtomicU64,
}

impl FakeBackend {
  pub fn with_settings(settings: Settings) -> Self {
    let backend = Self::default();
    *backend.settings.lock().unwrap() = settings;
    backend
  }

  /// Settings that resolve straight to the mock identity.
  pub fn mock_mode() -> Self {
    Self::with_settings(Settings {
      appid: Some("cli_test".into()),
      mock_user: true,
      ..Settings::default()
    })
  }

  pub fn fail(&self, endpoint: &'static str) { self.failing.lock().unwrap().insert(endpoint); }

  pub fn recover(&self, endpoint: &'static str) { self.failing.lock().unwrap().remove(endpoint); }

  pub fn calls(&self, endpoint: &'static str) -> usize {
    self.calls.lock().unwrap().get(endpoint).copied().unwrap_or(0)
  }

  pub fn exchanged_codes(&self) -> Vec<String> { self.exchanged.lock().unwrap().clone() }

  /// Hold the next call to `endpoint` for `delay` before it answers.
  pub fn delay_next(&self, endpoint: &'static str, delay: Duration) {
    self.delays.lock().unwrap().entry(endpoint).or_default().push_back(delay);
  }

  pub fn seed_person(&self, name: &str, nickname: Option<&str>) -> PersonId {
    let person = self.make_person(&PersonFields::named(name, nickname.map(str::to_owned)));
    let id = person.id.clone();
    self.people.lock().unwrap().push(person);
    id
  }

  pub fn seed_message(&self, id: &str, text: &str, read: bool) {
    self.messages.lock().unwrap().push(Message {
      id:           MessageId::new(id),
      text:         text.into(),
      message_type: None,
      date:         Utc::now(),
      read,
    });
  }

  pub fn people_count(&self) -> usize { self.people.lock().unwrap().len() }

  fn make_person(&self, fields: &PersonFields) -> Person {
    let n = self.next_id.fetch_add(1, Ordering::SeqCst);
    Person {
      id:         PersonId::new(format!("p{n}")),
      fields:     fields.clone(),
      created_at: Utc::now(),
      updated_at: None,
    }
  }

  fn hit(&self, endpoint: &'static str) -> Result<(), FakeError> {
    *self.calls.lock().unwrap().entry(endpoint).or_default() += 1;
    if self.failing.lock().unwrap().contains(endpoint) {
      return Err(FakeError(endpoint));
    }
    Ok(())
  }

  async fn stall(&self, endpoint: &'static str) {
    let delay = self
      .delays
      .lock()
      .unwrap()
      .get_mut(endpoint)
      .and_then(VecDeque::pop_front);
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
  }
}

impl Backend for FakeBackend {
  type Error = FakeError;

  async fn settings(&self) -> Result<Settings, FakeError> {
    self.hit("settings")?;
    Ok(self.settings.lock().unwrap().clone())
  }

  async fn exchange_code(&self, code: &AuthCode) -> Result<UserInfo, FakeError> {
    self.exchanged.lock().unwrap().push(code.as_str().to_owned());
    self.hit("exchange_code")?;
    let name = if code.is_mock() { "Mock User" } else { "Host User" };
    Ok(UserInfo::new(name))
  }

  async fn list_people(&self) -> Result<Vec<Person>, FakeError> {
    self.hit("list_people")?;
    let snapshot = self.people.lock().unwrap().clone();
    self.stall("list_people").await;
    Ok(snapshot)
  }

  async fn get_person(&self, id: &PersonId) -> Result<Option<Person>, FakeError> {
    self.hit("get_person")?;
    Ok(self.people.lock().unwrap().iter().find(|p| &p.id == id).cloned())
  }

  async fn create_person(&self, fields: &PersonFields) -> Result<Person, FakeError> {
    self.hit("create_person")?;
    let person = self.make_person(fields);
    self.people.lock().unwrap().push(person.clone());
    Ok(person)
  }

  async fn update_person(
    &self,
    id: &PersonId,
    fields: &PersonFields,
  ) -> Result<Option<Person>, FakeError> {
    self.hit("update_person")?;
    let mut people = self.people.lock().unwrap();
    Ok(people.iter_mut().find(|p| &p.id == id).map(|p| {
      p.fields = fields.clone();
      p.updated_at = Some(Utc::now());
      p.clone()
    }))
  }

  async fn delete_person(&self, id: &PersonId) -> Result<(), FakeError> {
    self.hit("delete_person")?;
    self.people.lock().unwrap().retain(|p| &p.id != id);
    Ok(())
  }

  async fn network_stats(&self) -> Result<NetworkStats, FakeError> {
    self.hit("network_stats")?;
    Ok(NetworkStats {
      total_people: self.people.lock().unwrap().len() as u64,
    })
  }

  async fn list_inbox(&self) -> Result<Vec<Message>, FakeError> {
    self.hit("list_inbox")?;
    Ok(self.messages.lock().unwrap().clone())
  }

  async fn mark_read(&self, id: &MessageId) -> Result<(), FakeError> {
    self.hit("mark_read")?;
    self.stall("mark_read").await;
    if let Some(m) = self.messages.lock().unwrap().iter_mut().find(|m| &m.id == id) {
      m.read = true;
    }
    Ok(())
  }
}

/// A host SDK that is always ready and answers with a fixed outcome.
pub struct FakeHost {
  outcome:     Result<AuthCode, HostError>,
  ready_calls: AtomicUsize,
  requests:    Mutex<Vec<AccessRequest>>,
}

impl FakeHost {
  pub fn granting(code: &str) -> Self { Self::new(Ok(AuthCode::new(code))) }

  pub fn refusing(err: HostError) -> Self { Self::new(Err(err)) }

  fn new(outcome: Result<AuthCode, HostError>) -> Self {
    Self {
      outcome,
      ready_calls: AtomicUsize::new(0),
      requests: Mutex::new(Vec::new()),
    }
  }

  pub fn ready_calls(&self) -> usize { self.ready_calls.load(Ordering::SeqCst) }

  pub fn requests(&self) -> Vec<AccessRequest> { self.requests.lock().unwrap().clone() }
}

impl HostSdk for FakeHost {
  async fn ready(&self) { self.ready_calls.fetch_add(1, Ordering::SeqCst); }

  async fn request_access(&self, request: AccessRequest) -> Result<AuthCode, HostError> {
    self.requests.lock().unwrap().push(request);
    self.outcome.clone()
  }
}
