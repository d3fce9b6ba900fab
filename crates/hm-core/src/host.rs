//! The host SDK capability.
//!
//! The host application may or may not provide an SDK that issues
//! authorization codes. Its presence is modelled as [`HostCapability`] so the
//! bootstrap can take the "unavailable" path without treating it as an error.

use std::{future::Future, sync::Arc};

use serde::Serialize;
use thiserror::Error;

use crate::session::AuthCode;

/// The fixed, minimal permission set requested during the handshake.
pub const SCOPE_LIST: &[&str] = &["contact:contact.base:readonly"];

/// Parameters of an authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
  pub app_id:     String,
  pub scope_list: Vec<String>,
}

impl AccessRequest {
  /// A request for `app_id` with the fixed [`SCOPE_LIST`].
  pub fn new(app_id: impl Into<String>) -> Self {
    Self {
      app_id:     app_id.into(),
      scope_list: SCOPE_LIST.iter().map(|s| (*s).to_owned()).collect(),
    }
  }
}

/// Opaque failure reported by the host's failure callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("host refused access: {0}")]
pub struct HostError(pub String);

/// A host SDK able to issue authorization codes.
pub trait HostSdk: Send + Sync {
  /// Resolves once, when the host environment is ready.
  fn ready(&self) -> impl Future<Output = ()> + Send + '_;

  /// Ask the host for an authorization grant. Resolves to exactly one of the
  /// success (code) or failure outcomes.
  fn request_access(
    &self,
    request: AccessRequest,
  ) -> impl Future<Output = Result<AuthCode, HostError>> + Send + '_;
}

impl<H: HostSdk> HostSdk for Arc<H> {
  fn ready(&self) -> impl Future<Output = ()> + Send + '_ { (**self).ready() }

  fn request_access(
    &self,
    request: AccessRequest,
  ) -> impl Future<Output = Result<AuthCode, HostError>> + Send + '_ {
    (**self).request_access(request)
  }
}

/// Whether the host SDK is present in the current environment.
#[derive(Debug, Clone)]
pub enum HostCapability<H> {
  Available(H),
  Unavailable,
}

impl<H> HostCapability<H> {
  pub fn is_available(&self) -> bool { matches!(self, Self::Available(_)) }
}

impl<H> From<Option<H>> for HostCapability<H> {
  fn from(host: Option<H>) -> Self {
    match host {
      Some(h) => Self::Available(h),
      None => Self::Unavailable,
    }
  }
}
