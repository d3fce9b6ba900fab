//! InboxStore — the message list behind the "inbox" tab.
//!
//! Messages keep the order the backend returned them in. Marking a message
//! read is the one write that patches local state instead of refetching: it
//! is a narrow, idempotent flip of a single flag.

use std::{collections::HashSet, sync::Arc};

use hm_core::{
  Error, Result,
  backend::Backend,
  message::{Message, MessageId},
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::directory::ListPhase;

// ─── State ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InboxState {
  loads_in_flight: usize,
  marks_in_flight: HashSet<MessageId>,
  /// `None` until the first successful load.
  pub messages:    Option<Vec<Message>>,
  /// The message open in the detail view.
  pub selected:    Option<MessageId>,
  pub last_error:  Option<String>,
}

impl InboxState {
  pub fn is_loading(&self) -> bool { self.loads_in_flight > 0 }

  pub fn phase(&self) -> ListPhase {
    if self.is_loading() {
      return ListPhase::Loading;
    }
    match (self.messages.as_deref(), &self.last_error) {
      (Some([_, ..]), _) => ListPhase::Ready,
      // Mounted but the first fetch has not started yet.
      (None, None) => ListPhase::Loading,
      _ => ListPhase::Empty,
    }
  }

  pub fn messages(&self) -> &[Message] { self.messages.as_deref().unwrap_or_default() }

  pub fn message(&self, id: &MessageId) -> Option<&Message> {
    self.messages().iter().find(|m| &m.id == id)
  }

  pub fn selected_message(&self) -> Option<&Message> {
    self.selected.as_ref().and_then(|id| self.message(id))
  }

  pub fn unread_count(&self) -> usize { self.messages().iter().filter(|m| !m.read).count() }

  fn message_mut(&mut self, id: &MessageId) -> Option<&mut Message> {
    self.messages.as_mut()?.iter_mut().find(|m| &m.id == id)
  }
}

/// Whether a `mark_read` call should go to the backend.
enum Gate {
  Unknown,
  AlreadyRead,
  InFlight,
  Send,
}

// ─── Store ────────────────────────────────────────────────────────────────────

pub struct InboxStore<B> {
  backend: Arc<B>,
  state:   Arc<watch::Sender<InboxState>>,
}

impl<B> Clone for InboxStore<B> {
  fn clone(&self) -> Self {
    Self {
      backend: self.backend.clone(),
      state:   self.state.clone(),
    }
  }
}

impl<B: Backend> InboxStore<B> {
  pub fn new(backend: Arc<B>) -> Self {
    let (state, _) = watch::channel(InboxState::default());
    Self {
      backend,
      state: Arc::new(state),
    }
  }

  pub fn state(&self) -> InboxState { self.state.borrow().clone() }

  pub fn subscribe(&self) -> watch::Receiver<InboxState> { self.state.subscribe() }

  /// First-activation fetch.
  pub async fn activate(&self) {
    // Failure is logged and recorded in the state.
    let _ = self.load_all().await;
  }

  /// Replace the message collection.
  pub async fn load_all(&self) -> Result<()> {
    self.state.send_modify(|s| s.loads_in_flight += 1);

    match self.backend.list_inbox().await {
      Ok(messages) => {
        debug!(count = messages.len(), "inbox loaded");
        self.state.send_modify(move |s| {
          s.loads_in_flight = s.loads_in_flight.saturating_sub(1);
          s.messages = Some(messages);
          s.last_error = None;
        });
        Ok(())
      }
      Err(e) => {
        warn!(error = %e, "failed to load inbox");
        let message = e.to_string();
        self.state.send_modify(move |s| {
          s.loads_in_flight = s.loads_in_flight.saturating_sub(1);
          s.last_error = Some(message);
        });
        Err(Error::fetch(e))
      }
    }
  }

  /// Mark one message read.
  ///
  /// No-op when the message is already read or a mark for it is already in
  /// flight. On success exactly that record flips to `read = true`; on
  /// failure nothing changes.
  pub async fn mark_read(&self, id: &MessageId) -> Result<()> {
    let mut gate = Gate::Unknown;
    self.state.send_if_modified(|s| {
      gate = match s.message(id) {
        None => Gate::Unknown,
        Some(m) if m.read => Gate::AlreadyRead,
        Some(_) if s.marks_in_flight.contains(id) => Gate::InFlight,
        Some(_) => {
          s.marks_in_flight.insert(id.clone());
          Gate::Send
        }
      };
      false
    });

    match gate {
      Gate::Unknown => return Err(Error::NotFound(format!("message {id}"))),
      Gate::AlreadyRead | Gate::InFlight => {
        debug!(%id, "message already read or being marked");
        return Ok(());
      }
      Gate::Send => {}
    }

    let result = self.backend.mark_read(id).await;
    self.state.send_modify(|s| {
      s.marks_in_flight.remove(id);
      if result.is_ok()
        && let Some(m) = s.message_mut(id)
      {
        m.read = true;
      }
    });

    result.map_err(|e| {
      warn!(%id, error = %e, "failed to mark message read");
      Error::fetch(e)
    })
  }

  // ── Detail view ───────────────────────────────────────────────────────────

  /// Open the detail view for `id`. Unknown ids are ignored.
  pub fn open(&self, id: &MessageId) {
    self.state.send_if_modified(|s| {
      if s.message(id).is_none() || s.selected.as_ref() == Some(id) {
        return false;
      }
      s.selected = Some(id.clone());
      true
    });
  }

  /// Close the detail view without touching any message.
  pub fn close(&self) {
    self.state.send_if_modified(|s| s.selected.take().is_some());
  }

  /// Mark the open message read and close the detail view.
  ///
  /// The view stays open if the mark fails.
  pub async fn mark_read_and_close(&self) -> Result<()> {
    let Some(id) = self.state.borrow().selected.clone() else {
      return Ok(());
    };
    self.mark_read(&id).await?;
    self.close();
    Ok(())
  }
}
