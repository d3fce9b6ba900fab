//! The authenticated identity for the lifetime of the process.
//!
//! A [`SessionCell`] is created empty at startup, filled exactly once by the
//! bootstrap, and never cleared. Components receive a clone of the cell
//! rather than reaching for a global.

use std::sync::{Arc, OnceLock};

use hm_core::{Error, Result, session::UserInfo};

/// Shared, init-once holder for the current [`UserInfo`].
///
/// Cloning is cheap; all clones observe the same identity.
#[derive(Debug, Clone, Default)]
pub struct SessionCell(Arc<OnceLock<UserInfo>>);

impl SessionCell {
  pub fn new() -> Self { Self::default() }

  /// Store the identity. Fails if one has already been stored.
  pub fn init(&self, user: UserInfo) -> Result<&UserInfo> {
    self
      .0
      .set(user)
      .map_err(|_| Error::SessionAlreadyInitialised)?;
    self.0.get().ok_or(Error::SessionAlreadyInitialised)
  }

  pub fn get(&self) -> Option<&UserInfo> { self.0.get() }

  pub fn is_authenticated(&self) -> bool { self.0.get().is_some() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn init_once_is_visible_to_all_clones() {
    let cell = SessionCell::new();
    let other = cell.clone();
    assert!(!other.is_authenticated());

    cell.init(UserInfo::new("Ada")).unwrap();
    assert_eq!(other.get().map(|u| u.name.as_str()), Some("Ada"));

    let second = other.init(UserInfo::new("Bob"));
    assert!(matches!(second, Err(Error::SessionAlreadyInitialised)));
    assert_eq!(cell.get().unwrap().name, "Ada");
  }
}
