//! HTTP implementation of [`hm_core::backend::Backend`].
//!
//! [`HttpBackend`] talks to the HM REST API with a cookie-carrying
//! [`reqwest::Client`]: the session cookie set by the code exchange
//! authenticates every later `/api/private/*` call.

mod client;

pub mod error;

pub use client::HttpBackend;
pub use error::{ClientError, Result};

#[cfg(test)]
mod tests;
