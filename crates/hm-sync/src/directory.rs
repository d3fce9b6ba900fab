//! DirectorySync — the people collection behind the "network" tab.
//!
//! Consistency is refetch-after-write: a successful create, update or remove
//! never patches the in-memory list; it reloads from the backend instead.
//! That rule lives in [`DirectorySync::converge`] and nowhere else.
//!
//! Overlapping [`DirectorySync::load_all`] calls are not cancelled. Whichever
//! response arrives last is what the collection shows.

use std::sync::Arc;

use hm_core::{
  Error, Result,
  backend::Backend,
  person::{NetworkStats, Person, PersonFields, PersonId},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

// ─── State ────────────────────────────────────────────────────────────────────

/// What a list view should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
  /// A fetch is in flight, or none has completed yet.
  Loading,
  /// Nothing in flight and nothing to show, including a failed first load.
  Empty,
  /// Nothing in flight and at least one record.
  Ready,
}

/// Snapshot of the directory as published to views.
#[derive(Debug, Clone, Default)]
pub struct DirectoryState {
  loads_in_flight: usize,
  /// `None` until the first successful `load_all`.
  pub people:      Option<Vec<Person>>,
  /// `None` until the first successful `load_stats`.
  pub stats:       Option<NetworkStats>,
  /// Message of the most recent failed call, cleared by the next success.
  pub last_error:  Option<String>,
}

impl DirectoryState {
  pub fn is_loading(&self) -> bool { self.loads_in_flight > 0 }

  pub fn phase(&self) -> ListPhase {
    if self.is_loading() {
      return ListPhase::Loading;
    }
    match (self.people.as_deref(), &self.last_error) {
      (Some([_, ..]), _) => ListPhase::Ready,
      // Mounted but the first fetch has not started yet.
      (None, None) => ListPhase::Loading,
      _ => ListPhase::Empty,
    }
  }

  pub fn people(&self) -> &[Person] { self.people.as_deref().unwrap_or_default() }
}

// ─── Remove intent ────────────────────────────────────────────────────────────

/// A request to delete a person. Must be [`confirm`](Self::confirm)ed
/// before a store will act on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveIntent {
  id:        PersonId,
  confirmed: bool,
}

impl RemoveIntent {
  pub fn new(id: PersonId) -> Self { Self { id, confirmed: false } }

  /// Record the user's explicit confirmation.
  pub fn confirm(self) -> Self {
    Self {
      confirmed: true,
      ..self
    }
  }

  pub fn id(&self) -> &PersonId { &self.id }

  pub fn is_confirmed(&self) -> bool { self.confirmed }
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// Kinds of successful write, as far as convergence cares.
#[derive(Debug, Clone, Copy)]
enum Write {
  Created,
  Updated,
  Removed,
}

/// The people collection and network stats for one mounting of the tab.
///
/// Cloning is cheap and every clone drives the same state.
pub struct DirectorySync<B> {
  backend: Arc<B>,
  state:   Arc<watch::Sender<DirectoryState>>,
}

impl<B> Clone for DirectorySync<B> {
  fn clone(&self) -> Self {
    Self {
      backend: self.backend.clone(),
      state:   self.state.clone(),
    }
  }
}

impl<B: Backend> DirectorySync<B> {
  pub fn new(backend: Arc<B>) -> Self {
    let (state, _) = watch::channel(DirectoryState::default());
    Self {
      backend,
      state: Arc::new(state),
    }
  }

  /// Current snapshot.
  pub fn state(&self) -> DirectoryState { self.state.borrow().clone() }

  /// Change notifications for views.
  pub fn subscribe(&self) -> watch::Receiver<DirectoryState> { self.state.subscribe() }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// First-activation fetch: people and stats, independently.
  pub async fn activate(&self) {
    // Both failures are already logged and recorded in the state.
    let _ = tokio::join!(self.load_all(), self.load_stats());
  }

  /// Replace the collection with the backend's current list.
  ///
  /// On failure the previous collection is kept and the loading flag is
  /// still cleared.
  pub async fn load_all(&self) -> Result<()> {
    self.state.send_modify(|s| s.loads_in_flight += 1);

    match self.backend.list_people().await {
      Ok(people) => {
        debug!(count = people.len(), "people loaded");
        self.state.send_modify(move |s| {
          s.loads_in_flight = s.loads_in_flight.saturating_sub(1);
          s.people = Some(people);
          s.last_error = None;
        });
        Ok(())
      }
      Err(e) => {
        warn!(error = %e, "failed to load people");
        let message = e.to_string();
        self.state.send_modify(move |s| {
          s.loads_in_flight = s.loads_in_flight.saturating_sub(1);
          s.last_error = Some(message);
        });
        Err(Error::fetch(e))
      }
    }
  }

  /// Refresh the network stats. Independent of `load_all`.
  pub async fn load_stats(&self) -> Result<()> {
    match self.backend.network_stats().await {
      Ok(stats) => {
        self.state.send_modify(move |s| s.stats = Some(stats));
        Ok(())
      }
      Err(e) => {
        warn!(error = %e, "failed to load network stats");
        Err(Error::fetch(e))
      }
    }
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Create a person, then reload people and stats.
  ///
  /// The new record is never appended locally; on failure the collection is
  /// untouched.
  pub async fn create(&self, fields: PersonFields) -> Result<PersonId> {
    fields.validate()?;
    let created = self.backend.create_person(&fields).await.map_err(|e| {
      warn!(error = %e, "failed to create person");
      Error::fetch(e)
    })?;
    info!(id = %created.id, "person created");
    self.converge(Write::Created).await;
    Ok(created.id)
  }

  /// Replace every mutable field of `id`, then reload people.
  pub async fn update(&self, id: &PersonId, fields: PersonFields) -> Result<Person> {
    fields.validate()?;
    let updated = self
      .backend
      .update_person(id, &fields)
      .await
      .map_err(|e| {
        warn!(%id, error = %e, "failed to update person");
        Error::fetch(e)
      })?
      .ok_or_else(|| Error::NotFound(format!("person {id}")))?;
    info!(%id, "person updated");
    self.converge(Write::Updated).await;
    Ok(updated)
  }

  /// Delete a person after explicit confirmation, then reload people and
  /// stats. An unconfirmed intent never reaches the backend.
  pub async fn remove(&self, intent: RemoveIntent) -> Result<()> {
    remove_confirmed(self.backend.as_ref(), intent).await?;
    self.converge(Write::Removed).await;
    Ok(())
  }

  /// Bring local state back in line with the backend after a write.
  async fn converge(&self, write: Write) {
    debug!(?write, "refetching after write");
    match write {
      Write::Created | Write::Removed => {
        let _ = tokio::join!(self.load_all(), self.load_stats());
      }
      Write::Updated => {
        let _ = self.load_all().await;
      }
    }
  }
}

/// Issue the DELETE for a confirmed intent.
pub(crate) async fn remove_confirmed<B: Backend>(backend: &B, intent: RemoveIntent) -> Result<()> {
  if !intent.is_confirmed() {
    debug!(id = %intent.id, "removal not confirmed; nothing sent");
    return Err(Error::Unconfirmed(intent.id));
  }
  backend.delete_person(&intent.id).await.map_err(|e| {
    warn!(id = %intent.id, error = %e, "failed to delete person");
    Error::fetch(e)
  })?;
  info!(id = %intent.id, "person removed");
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;
  use crate::fake::FakeBackend;

  fn store() -> (Arc<FakeBackend>, DirectorySync<FakeBackend>) {
    let backend = Arc::new(FakeBackend::default());
    (backend.clone(), DirectorySync::new(backend))
  }

  #[tokio::test]
  async fn activate_fetches_people_and_stats_once() {
    let (backend, dir) = store();
    backend.seed_person("Ada", Some("ada"));

    assert_eq!(dir.state().phase(), ListPhase::Loading);
    assert!(dir.state().people.is_none());
    dir.activate().await;

    let state = dir.state();
    assert_eq!(state.phase(), ListPhase::Ready);
    assert_eq!(state.people().len(), 1);
    assert_eq!(state.stats, Some(NetworkStats { total_people: 1 }));
    assert_eq!(backend.calls("list_people"), 1);
    assert_eq!(backend.calls("network_stats"), 1);
  }

  #[tokio::test]
  async fn empty_collection_is_distinct_from_loading() {
    let (_, dir) = store();
    dir.load_all().await.unwrap();
    let state = dir.state();
    assert!(!state.is_loading());
    assert_eq!(state.people, Some(vec![]));
    assert_eq!(state.phase(), ListPhase::Empty);
  }

  #[tokio::test]
  async fn create_refetches_instead_of_appending() {
    let (backend, dir) = store();
    backend.seed_person("Ada", None);
    dir.activate().await;
    let before = dir.state().people().len();

    dir
      .create(PersonFields::named("Grace", Some("amazing grace".into())))
      .await
      .unwrap();

    let state = dir.state();
    assert_eq!(state.people().len(), before + 1);
    let grace = state.people().iter().find(|p| p.name() == "Grace").unwrap();
    assert_eq!(grace.nickname(), Some("amazing grace"));
    assert_eq!(state.stats, Some(NetworkStats { total_people: 2 }));
    assert_eq!(backend.calls("list_people"), 2);
    assert_eq!(backend.calls("network_stats"), 2);
  }

  #[tokio::test]
  async fn create_rejects_blank_name_without_calling_backend() {
    let (backend, dir) = store();
    let err = dir.create(PersonFields::named(" ", None)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(backend.calls("create_person"), 0);
  }

  #[tokio::test]
  async fn failed_create_leaves_collection_untouched() {
    let (backend, dir) = store();
    backend.seed_person("Ada", None);
    dir.activate().await;
    backend.fail("create_person");

    let err = dir.create(PersonFields::named("Grace", None)).await;

    assert!(matches!(err, Err(Error::Fetch(_))));
    assert_eq!(dir.state().people().len(), 1);
    assert_eq!(backend.calls("list_people"), 1);
  }

  #[tokio::test]
  async fn failed_load_keeps_previous_data_and_clears_loading() {
    let (backend, dir) = store();
    backend.seed_person("Ada", None);
    dir.load_all().await.unwrap();
    backend.fail("list_people");

    assert!(dir.load_all().await.is_err());

    let state = dir.state();
    assert!(!state.is_loading());
    assert_eq!(state.people().len(), 1);
    assert!(state.last_error.is_some());
  }

  #[tokio::test]
  async fn update_replaces_fields_and_reloads() {
    let (backend, dir) = store();
    let id = backend.seed_person("Ada", Some("ada"));
    dir.activate().await;

    let mut fields = PersonFields::named("Ada Lovelace", None);
    fields.city = Some("London".into());
    let updated = dir.update(&id, fields).await.unwrap();

    assert_eq!(updated.id, id);
    assert!(updated.updated_at.is_some());
    assert_eq!(updated.nickname(), None);
    assert_eq!(dir.state().people()[0].name(), "Ada Lovelace");
    assert_eq!(backend.calls("list_people"), 2);
  }

  #[tokio::test]
  async fn update_of_missing_person_is_not_found() {
    let (_, dir) = store();
    let err = dir
      .update(&PersonId::new("nope"), PersonFields::named("X", None))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
  }

  #[tokio::test]
  async fn remove_without_confirmation_sends_nothing() {
    let (backend, dir) = store();
    let id = backend.seed_person("Ada", None);

    let err = dir.remove(RemoveIntent::new(id.clone())).await.unwrap_err();

    assert!(matches!(err, Error::Unconfirmed(ref i) if *i == id));
    assert_eq!(backend.calls("delete_person"), 0);
    assert_eq!(backend.people_count(), 1);
  }

  #[tokio::test]
  async fn confirmed_remove_deletes_and_reloads() {
    let (backend, dir) = store();
    let id = backend.seed_person("Ada", None);
    dir.activate().await;

    dir.remove(RemoveIntent::new(id).confirm()).await.unwrap();

    assert_eq!(backend.calls("delete_person"), 1);
    assert_eq!(dir.state().phase(), ListPhase::Empty);
    assert_eq!(dir.state().stats, Some(NetworkStats { total_people: 0 }));
  }

  #[tokio::test(start_paused = true)]
  async fn overlapping_loads_last_response_wins() {
    let (backend, dir) = store();
    backend.seed_person("Ada", None);
    // First call sees one person but answers late.
    backend.delay_next("list_people", Duration::from_millis(200));

    let slow = {
      let dir = dir.clone();
      tokio::spawn(async move { dir.load_all().await })
    };
    tokio::task::yield_now().await;

    backend.seed_person("Grace", None);
    backend.delay_next("list_people", Duration::from_millis(10));
    let fast = {
      let dir = dir.clone();
      tokio::spawn(async move { dir.load_all().await })
    };

    fast.await.unwrap().unwrap();
    assert!(dir.state().is_loading(), "slow load still in flight");
    assert_eq!(dir.state().people().len(), 2);

    slow.await.unwrap().unwrap();
    let state = dir.state();
    assert!(!state.is_loading());
    assert_eq!(state.people().len(), 1, "stale response arrived last");
  }

  #[tokio::test]
  async fn subscribers_are_told_when_a_load_lands() {
    let (backend, dir) = store();
    backend.seed_person("Ada", None);
    let mut updates = dir.subscribe();
    assert!(!updates.has_changed().unwrap());

    dir.activate().await;
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().phase(), ListPhase::Ready);
    assert!(!updates.has_changed().unwrap());
  }
}
