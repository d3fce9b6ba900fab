//! ProfileView: one person, as shown on the `/people/{id}` page.
//!
//! Unlike the directory list, a successful update here replaces the held
//! record with the one the backend returned; there is no list to refetch.

use std::sync::Arc;

use hm_core::{
  Error, Result,
  backend::Backend,
  person::{Person, PersonFields, PersonId},
};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::directory::{RemoveIntent, remove_confirmed};

/// What the profile page renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProfileState {
  #[default]
  Loading,
  Found(Person),
  /// Missing record or failed fetch. Terminal; not retried.
  NotFound,
  /// Deleted from this page.
  Removed,
}

impl ProfileState {
  pub fn person(&self) -> Option<&Person> {
    match self {
      Self::Found(p) => Some(p),
      _ => None,
    }
  }
}

pub struct ProfileView<B> {
  backend: Arc<B>,
  id:      PersonId,
  state:   Arc<watch::Sender<ProfileState>>,
}

impl<B> Clone for ProfileView<B> {
  fn clone(&self) -> Self {
    Self {
      backend: self.backend.clone(),
      id:      self.id.clone(),
      state:   self.state.clone(),
    }
  }
}

impl<B: Backend> ProfileView<B> {
  pub fn new(backend: Arc<B>, id: PersonId) -> Self {
    let (state, _) = watch::channel(ProfileState::Loading);
    Self {
      backend,
      id,
      state: Arc::new(state),
    }
  }

  pub fn id(&self) -> &PersonId { &self.id }

  pub fn state(&self) -> ProfileState { self.state.borrow().clone() }

  pub fn subscribe(&self) -> watch::Receiver<ProfileState> { self.state.subscribe() }

  /// Fetch the record once. Missing and failed both end in `NotFound`.
  pub async fn load(&self) {
    let next = match self.backend.get_person(&self.id).await {
      Ok(Some(person)) => ProfileState::Found(person),
      Ok(None) => {
        info!(id = %self.id, "person not found");
        ProfileState::NotFound
      }
      Err(e) => {
        warn!(id = %self.id, error = %e, "failed to fetch person");
        ProfileState::NotFound
      }
    };
    self.state.send_replace(next);
  }

  /// Replace every mutable field; the returned record becomes the held one.
  pub async fn update(&self, fields: PersonFields) -> Result<Person> {
    fields.validate()?;
    let updated = self
      .backend
      .update_person(&self.id, &fields)
      .await
      .map_err(|e| {
        warn!(id = %self.id, error = %e, "failed to update person");
        Error::fetch(e)
      })?;

    match updated {
      Some(person) => {
        info!(id = %self.id, "person updated");
        self.state.send_replace(ProfileState::Found(person.clone()));
        Ok(person)
      }
      None => {
        self.state.send_replace(ProfileState::NotFound);
        Err(Error::NotFound(format!("person {}", self.id)))
      }
    }
  }

  /// Delete this person after explicit confirmation.
  pub async fn remove(&self, intent: RemoveIntent) -> Result<()> {
    if intent.id() != &self.id {
      return Err(Error::Validation(format!(
        "removal intent for {} does not match profile {}",
        intent.id(),
        self.id
      )));
    }
    remove_confirmed(self.backend.as_ref(), intent).await?;
    self.state.send_replace(ProfileState::Removed);
    Ok(())
  }
}
