//! Tabs and routes.

use std::fmt;

use hm_core::{Error, Result, person::PersonId};
use strum::{Display, EnumIter, EnumString};

/// A top-level view. Exactly one is mounted at a time.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Tab {
  #[default]
  Inbox,
  Network,
  Me,
}

/// A page address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
  /// The tab view.
  Root,
  /// `/people/{id}`
  Profile(PersonId),
}

impl Route {
  pub fn path(&self) -> String {
    match self {
      Self::Root => "/".to_owned(),
      Self::Profile(id) => format!("/people/{id}"),
    }
  }

  /// Parse `/` or `/people/{id}`. A trailing slash is tolerated.
  pub fn parse(path: &str) -> Result<Self> {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
      return Ok(Self::Root);
    }
    match trimmed.strip_prefix("/people/") {
      Some(id) if !id.is_empty() && !id.contains('/') => Ok(Self::Profile(PersonId::new(id))),
      _ => Err(Error::Validation(format!("unknown route: {path}"))),
    }
  }
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.path()) }
}

/// Client-side navigation history for one run.
///
/// The entry route has no predecessor, so a deep link to a profile page
/// cannot go "back" anywhere; [`History::back`] falls through to
/// [`Route::Root`] instead.
#[derive(Debug, Clone)]
pub struct History {
  entries: Vec<Route>,
}

impl History {
  pub fn new(entry: Route) -> Self {
    Self {
      entries: vec![entry],
    }
  }

  pub fn current(&self) -> &Route {
    // `entries` is never empty.
    &self.entries[self.entries.len() - 1]
  }

  pub fn push(&mut self, route: Route) {
    if self.current() != &route {
      self.entries.push(route);
    }
  }

  /// Whether anything was navigated to since the entry route.
  pub fn has_history(&self) -> bool { self.entries.len() > 1 }

  /// Go back one step, or replace the entry with [`Route::Root`].
  pub fn back(&mut self) -> &Route {
    if self.has_history() {
      self.entries.pop();
    } else {
      self.entries[0] = Route::Root;
    }
    self.current()
  }
}
