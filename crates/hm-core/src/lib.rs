//! Core types and trait definitions for the HM people directory client.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! REST backend and the host SDK are reached only through the [`Backend`]
//! and [`HostSdk`] traits, so every state machine built on top of them can be
//! exercised with in-process fakes. The server side persists through
//! [`DirectoryStore`].
//!
//! [`Backend`]: backend::Backend
//! [`HostSdk`]: host::HostSdk
//! [`DirectoryStore`]: store::DirectoryStore

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod age;
pub mod backend;
pub mod error;
pub mod host;
pub mod message;
pub mod person;
pub mod session;
pub mod store;
pub mod user;

pub use error::{Error, Result};
