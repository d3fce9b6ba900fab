//! NavigationShell, the top of the client.
//!
//! The shell mounts first and hands control to a [`Bootstrap`]. Until that
//! resolves it shows [`Screen::Loading`]; an unauthenticated outcome pins it
//! to [`Screen::Unsupported`] for the rest of the run. Once authenticated it
//! mounts exactly one tab (or a profile page) at a time. Mounting builds a
//! fresh store and spawns its first fetch, so switching away and back always
//! refetches and a stalled fetch only stalls its own view.

use std::sync::Arc;

use hm_core::{backend::Backend, host::HostSdk, person::PersonId};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
  bootstrap::{Bootstrap, Resolution},
  directory::DirectorySync,
  inbox::InboxStore,
  navigation::{History, Route, Tab},
  profile::ProfileView,
  session::SessionCell,
};

/// What the front-end should draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  Loading,
  /// Any unauthenticated bootstrap outcome.
  Unsupported,
  Tabs(Tab),
  Profile(PersonId),
}

/// The store backing the mounted view.
enum Mounted<B> {
  None,
  Inbox(InboxStore<B>),
  Network(DirectorySync<B>),
  Me,
  Profile(ProfileView<B>),
}

pub struct NavigationShell<B> {
  backend:    Arc<B>,
  session:    SessionCell,
  resolution: Option<Resolution>,
  tab:        Tab,
  history:    History,
  mounted:    Mounted<B>,
}

impl<B> NavigationShell<B>
where
  B: Backend + 'static,
{
  /// A shell that will open at `entry` once authenticated.
  pub fn new(backend: Arc<B>, session: SessionCell, entry: Route) -> Self {
    Self {
      backend,
      session,
      resolution: None,
      tab: Tab::default(),
      history: History::new(entry),
      mounted: Mounted::None,
    }
  }

  /// Run the bootstrap to completion, then mount the entry view.
  pub async fn boot<H: HostSdk>(&mut self, bootstrap: Bootstrap<B, H>) -> Option<JoinHandle<()>> {
    let resolution = bootstrap.run().await;
    self.resolve(resolution)
  }

  /// Record the bootstrap outcome. Only the first call has any effect.
  ///
  /// Returns the handle of the entry view's first fetch when authenticated.
  pub fn resolve(&mut self, resolution: Resolution) -> Option<JoinHandle<()>> {
    if self.resolution.is_some() {
      warn!("bootstrap already resolved; ignoring");
      return None;
    }
    let authenticated = resolution.is_authenticated();
    info!(authenticated, "bootstrap resolved");
    self.resolution = Some(resolution);
    if authenticated { self.mount() } else { None }
  }

  /// True until the bootstrap resolves, then false for good.
  pub fn is_loading(&self) -> bool { self.resolution.is_none() }

  pub fn resolution(&self) -> Option<&Resolution> { self.resolution.as_ref() }

  pub fn session(&self) -> &SessionCell { &self.session }

  pub fn tab(&self) -> Tab { self.tab }

  pub fn route(&self) -> &Route { self.history.current() }

  pub fn screen(&self) -> Screen {
    match &self.resolution {
      None => Screen::Loading,
      Some(r) if !r.is_authenticated() => Screen::Unsupported,
      Some(_) => match self.history.current() {
        Route::Root => Screen::Tabs(self.tab),
        Route::Profile(id) => Screen::Profile(id.clone()),
      },
    }
  }

  // ── Mounted stores ────────────────────────────────────────────────────────

  pub fn inbox(&self) -> Option<&InboxStore<B>> {
    match &self.mounted {
      Mounted::Inbox(store) => Some(store),
      _ => None,
    }
  }

  pub fn directory(&self) -> Option<&DirectorySync<B>> {
    match &self.mounted {
      Mounted::Network(store) => Some(store),
      _ => None,
    }
  }

  pub fn profile(&self) -> Option<&ProfileView<B>> {
    match &self.mounted {
      Mounted::Profile(view) => Some(view),
      _ => None,
    }
  }

  // ── Navigation ────────────────────────────────────────────────────────────

  /// Switch tabs, discarding the previous tab's store.
  ///
  /// No-op when `tab` is already active, before authentication, or while a
  /// profile page is shown.
  pub fn select_tab(&mut self, tab: Tab) -> Option<JoinHandle<()>> {
    if self.screen() != Screen::Tabs(self.tab) || tab == self.tab {
      return None;
    }
    debug!(from = %self.tab, to = %tab, "switching tab");
    self.tab = tab;
    self.mount()
  }

  /// Navigate to a person's profile page.
  pub fn open_profile(&mut self, id: PersonId) -> Option<JoinHandle<()>> {
    if !self.is_authenticated() {
      return None;
    }
    self.history.push(Route::Profile(id));
    self.mount()
  }

  /// Go back one step, or to the tab view when there is nowhere to go back
  /// to. The view landed on is mounted fresh.
  pub fn back(&mut self) -> Option<JoinHandle<()>> {
    if !self.is_authenticated() {
      return None;
    }
    let route = self.history.back();
    debug!(%route, "navigated back");
    self.mount()
  }

  fn is_authenticated(&self) -> bool {
    self.resolution.as_ref().is_some_and(Resolution::is_authenticated)
  }

  /// Replace the mounted store with a fresh one for the current route and
  /// spawn its first fetch.
  fn mount(&mut self) -> Option<JoinHandle<()>> {
    let backend = self.backend.clone();
    let (mounted, handle) = match self.history.current() {
      Route::Profile(id) => {
        let view = ProfileView::new(backend, id.clone());
        let task = view.clone();
        (Mounted::Profile(view), Some(tokio::spawn(async move { task.load().await })))
      }
      Route::Root => match self.tab {
        Tab::Inbox => {
          let store = InboxStore::new(backend);
          let task = store.clone();
          (Mounted::Inbox(store), Some(tokio::spawn(async move { task.activate().await })))
        }
        Tab::Network => {
          let store = DirectorySync::new(backend);
          let task = store.clone();
          (Mounted::Network(store), Some(tokio::spawn(async move { task.activate().await })))
        }
        Tab::Me => (Mounted::Me, None),
      },
    };
    self.mounted = mounted;
    handle
  }
}
