//! Application state machine and event dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hm_client::HttpBackend;
use hm_core::person::PersonId;
use hm_sync::{
  bootstrap::{Reason, Resolution},
  directory::RemoveIntent,
  navigation::Tab,
  shell::{NavigationShell, Screen},
};
use strum::IntoEnumIterator;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::form::{PersonForm, Purpose};

// ─── Mode ─────────────────────────────────────────────────────────────────────

/// Keyboard focus layered over the current screen.
#[derive(Debug, Clone)]
pub enum Mode {
  Normal,
  Form(PersonForm),
  /// Waiting for y/n before deleting the profile's person.
  ConfirmDelete(PersonId),
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub shell: NavigationShell<HttpBackend>,

  pub mode: Mode,

  /// Cursor position within the visible list (inbox or network).
  pub list_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// The running bootstrap, until its outcome is handed to the shell.
  boot: Option<JoinHandle<Resolution>>,
}

impl App {
  pub fn new(shell: NavigationShell<HttpBackend>, boot: JoinHandle<Resolution>) -> Self {
    Self {
      shell,
      mode: Mode::Normal,
      list_cursor: 0,
      status_msg: String::new(),
      boot: Some(boot),
    }
  }

  /// Hand the bootstrap outcome to the shell once it is available.
  pub async fn poll_bootstrap(&mut self) {
    let Some(task) = self.boot.take_if(|t| t.is_finished()) else {
      return;
    };
    let resolution = task.await.unwrap_or_else(|e| {
      warn!(error = %e, "bootstrap task failed");
      Resolution::Unauthenticated(Reason::ExchangeFailed)
    });
    // Every unauthenticated outcome renders the same screen; the cause only
    // goes to the log.
    if let Resolution::Unauthenticated(reason) = &resolution {
      warn!(error = %hm_core::Error::from(*reason), "session unavailable");
    }
    self.shell.resolve(resolution);
  }

  /// Number of rows in the list under the cursor.
  fn list_len(&self) -> usize {
    if let Some(inbox) = self.shell.inbox() {
      inbox.state().messages().len()
    } else if let Some(directory) = self.shell.directory() {
      directory.state().people().len()
    } else {
      0
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match &self.mode {
      Mode::Form(_) => {
        self.handle_form_key(key).await;
        return Ok(true);
      }
      Mode::ConfirmDelete(id) => {
        let id = id.clone();
        self.handle_confirm_key(key, id).await;
        return Ok(true);
      }
      Mode::Normal => {}
    }

    if key.code == KeyCode::Char('q') {
      return Ok(false);
    }

    match self.shell.screen() {
      Screen::Loading | Screen::Unsupported => {}
      Screen::Tabs(tab) => {
        if !self.handle_tab_switch(key, tab) {
          match tab {
            Tab::Inbox => self.handle_inbox_key(key).await,
            Tab::Network => self.handle_network_key(key),
            Tab::Me => {}
          }
        }
      }
      Screen::Profile(_) => self.handle_profile_key(key),
    }
    Ok(true)
  }

  /// Digits jump to a tab, Tab cycles. Returns whether the key was used.
  fn handle_tab_switch(&mut self, key: KeyEvent, current: Tab) -> bool {
    let tabs: Vec<Tab> = Tab::iter().collect();
    let target = match key.code {
      KeyCode::Char(c @ '1'..='9') => tabs.get(c as usize - '1' as usize).copied(),
      KeyCode::Tab => {
        let at = tabs.iter().position(|t| *t == current).unwrap_or(0);
        tabs.get((at + 1) % tabs.len()).copied()
      }
      _ => return false,
    };
    if let Some(tab) = target
      && self.shell.select_tab(tab).is_some()
    {
      self.list_cursor = 0;
      self.status_msg.clear();
    }
    true
  }

  fn move_cursor(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.list_len() {
          self.list_cursor += 1;
        }
        true
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
        true
      }
      _ => false,
    }
  }

  async fn handle_inbox_key(&mut self, key: KeyEvent) {
    let Some(inbox) = self.shell.inbox().cloned() else {
      return;
    };
    let state = inbox.state();

    // Detail overlay.
    if state.selected_message().is_some() {
      match key.code {
        KeyCode::Enter | KeyCode::Char('r') => {
          if let Err(e) = inbox.mark_read_and_close().await {
            self.status_msg = format!("Error: {e}");
          }
        }
        KeyCode::Esc | KeyCode::Char('c') => inbox.close(),
        _ => {}
      }
      return;
    }

    if self.move_cursor(key) {
      return;
    }
    match key.code {
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(msg) = state.messages().get(self.list_cursor) {
          inbox.open(&msg.id);
        }
      }
      KeyCode::Char('R') => {
        if inbox.load_all().await.is_err() {
          self.status_msg = "Could not reload the inbox.".into();
        }
      }
      _ => {}
    }
  }

  fn handle_network_key(&mut self, key: KeyEvent) {
    if self.move_cursor(key) {
      return;
    }
    let Some(directory) = self.shell.directory() else {
      return;
    };
    match key.code {
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        let id = directory
          .state()
          .people()
          .get(self.list_cursor)
          .map(|p| p.id.clone());
        if let Some(id) = id {
          self.shell.open_profile(id);
          self.status_msg.clear();
        }
      }
      KeyCode::Char('a') => self.mode = Mode::Form(PersonForm::create()),
      KeyCode::Char('R') => {
        let directory = directory.clone();
        tokio::spawn(async move { directory.activate().await });
      }
      _ => {}
    }
  }

  fn handle_profile_key(&mut self, key: KeyEvent) {
    let Some(profile) = self.shell.profile() else {
      return;
    };
    match key.code {
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') | KeyCode::Backspace => {
        self.shell.back();
        self.list_cursor = 0;
        self.status_msg.clear();
      }
      KeyCode::Char('e') => {
        if let Some(person) = profile.state().person() {
          self.mode = Mode::Form(PersonForm::edit(person));
        }
      }
      KeyCode::Char('d') => {
        if profile.state().person().is_some() {
          self.mode = Mode::ConfirmDelete(profile.id().clone());
        }
      }
      _ => {}
    }
  }

  async fn handle_confirm_key(&mut self, key: KeyEvent, id: PersonId) {
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => {
        self.mode = Mode::Normal;
        let Some(profile) = self.shell.profile().cloned() else {
          return;
        };
        match profile.remove(RemoveIntent::new(id).confirm()).await {
          Ok(()) => {
            self.status_msg = "Deleted.".into();
            self.shell.back();
            self.list_cursor = 0;
          }
          Err(e) => self.status_msg = format!("Error: {e}"),
        }
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
        self.mode = Mode::Normal;
      }
      _ => {}
    }
  }

  async fn handle_form_key(&mut self, key: KeyEvent) {
    let Mode::Form(form) = &mut self.mode else {
      return;
    };
    match key.code {
      KeyCode::Esc => self.mode = Mode::Normal,
      KeyCode::Tab | KeyCode::Down => form.next(),
      KeyCode::BackTab | KeyCode::Up => form.prev(),
      KeyCode::Backspace => form.pop(),
      KeyCode::Char(c) => form.push(c),
      KeyCode::Enter => self.submit_form().await,
      _ => {}
    }
  }

  /// Send the form. It stays open with the error on failure.
  async fn submit_form(&mut self) {
    let Mode::Form(form) = &self.mode else {
      return;
    };
    let fields = match form.fields() {
      Ok(fields) => fields,
      Err(e) => return self.form_error(e),
    };

    let result = match &form.purpose {
      Purpose::Create => match self.shell.directory().cloned() {
        Some(directory) => directory.create(fields).await.map(|_| "Added."),
        None => return,
      },
      Purpose::Edit(_) => match self.shell.profile().cloned() {
        Some(profile) => profile.update(fields).await.map(|_| "Saved."),
        None => return,
      },
    };

    match result {
      Ok(done) => {
        self.mode = Mode::Normal;
        self.status_msg = done.into();
      }
      Err(e) => self.form_error(e.to_string()),
    }
  }

  fn form_error(&mut self, message: String) {
    if let Mode::Form(form) = &mut self.mode {
      form.error = Some(message);
    }
  }
}
