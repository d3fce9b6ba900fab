//! Session bootstrap and tab-scoped data synchronisation for HM.
//!
//! The pieces, leaves first:
//!
//! - [`session::SessionCell`]: the process-wide, init-once user identity.
//! - [`bootstrap::Bootstrap`]: settings → host handshake → code exchange.
//! - [`directory::DirectorySync`] and [`profile::ProfileView`]: people CRUD
//!   under a refetch-after-write consistency rule.
//! - [`inbox::InboxStore`]: messages and their read state.
//! - [`shell::NavigationShell`]: which tab or profile page is mounted.
//!
//! Everything is generic over [`hm_core::backend::Backend`] and
//! [`hm_core::host::HostSdk`]; nothing here knows about HTTP.

pub mod bootstrap;
pub mod directory;
pub mod inbox;
pub mod navigation;
pub mod profile;
pub mod session;
pub mod shell;

#[cfg(test)]
mod fake;
