//! The terminal stands in for the host application.
//!
//! A grant is pre-issued out of band and handed over with `--auth-code`;
//! without one the host SDK is reported as unavailable.

use hm_core::{
  host::{AccessRequest, HostCapability, HostError, HostSdk},
  session::AuthCode,
};
use tracing::info;

pub struct TerminalHost {
  code: AuthCode,
}

impl TerminalHost {
  pub fn new(code: impl Into<String>) -> Self { Self { code: AuthCode::new(code) } }

  /// `Available` when a code was supplied on the command line.
  pub fn capability(code: Option<String>) -> HostCapability<Self> {
    HostCapability::from(code.map(Self::new))
  }
}

impl HostSdk for TerminalHost {
  async fn ready(&self) {}

  async fn request_access(&self, request: AccessRequest) -> Result<AuthCode, HostError> {
    info!(app_id = %request.app_id, scopes = ?request.scope_list, "handing over terminal grant");
    Ok(self.code.clone())
  }
}
