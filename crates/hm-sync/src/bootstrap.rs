//! Session bootstrap state machine.
//!
//! ```text
//! Init → FetchingSettings ─┬─ SettingsInvalid                     (terminal)
//!                          ├─ CodeExchangePending                 (mock identity)
//!                          └─ HandshakeAttempt ─┬─ HandshakeUnavailable   (terminal)
//!                                               ├─ ExchangeFailed         (grant refused)
//!                                               └─ CodeExchangePending ─┬─ Authenticated  (terminal)
//!                                                                       └─ ExchangeFailed (terminal)
//! ```
//!
//! [`Bootstrap::run`] consumes the machine, so it runs at most once and
//! reaches exactly one terminal phase. Progress is published on a
//! [`tokio::sync::watch`] channel; see [`BootstrapStatus`].

use std::sync::Arc;

use hm_core::{
  Error,
  backend::Backend,
  host::{AccessRequest, HostCapability, HostSdk},
  session::{AuthCode, UserInfo},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::session::SessionCell;

// ─── Phase ────────────────────────────────────────────────────────────────────

/// A state of the bootstrap machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
  Init,
  FetchingSettings,
  HandshakeAttempt,
  CodeExchangePending,
  Authenticated(UserInfo),
  SettingsInvalid,
  HandshakeUnavailable,
  ExchangeFailed,
}

impl Phase {
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      Self::Authenticated(_)
        | Self::SettingsInvalid
        | Self::HandshakeUnavailable
        | Self::ExchangeFailed
    )
  }

  /// Whether `next` is a legal successor of `self`.
  ///
  /// A refused grant leaves `HandshakeAttempt` straight for
  /// `ExchangeFailed`; there is no code to exchange.
  pub fn can_advance_to(&self, next: &Phase) -> bool {
    use Phase::*;
    matches!(
      (self, next),
      (Init, FetchingSettings)
        | (FetchingSettings, SettingsInvalid | HandshakeAttempt | CodeExchangePending)
        | (HandshakeAttempt, HandshakeUnavailable | CodeExchangePending | ExchangeFailed)
        | (CodeExchangePending, Authenticated(_) | ExchangeFailed)
    )
  }

  /// The outcome, once the phase is terminal.
  pub fn resolution(&self) -> Option<Resolution> {
    match self {
      Self::Authenticated(user) => Some(Resolution::Authenticated(user.clone())),
      Self::SettingsInvalid => Some(Resolution::Unauthenticated(Reason::SettingsInvalid)),
      Self::HandshakeUnavailable => Some(Resolution::Unauthenticated(Reason::HostUnavailable)),
      Self::ExchangeFailed => Some(Resolution::Unauthenticated(Reason::ExchangeFailed)),
      _ => None,
    }
  }
}

// ─── Resolution ───────────────────────────────────────────────────────────────

/// Why a bootstrap ended without an identity. All three render the same
/// "unsupported environment" screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
  /// Settings missing the application id, or not retrievable.
  SettingsInvalid,
  /// The host SDK capability is absent.
  HostUnavailable,
  /// The grant request or the code exchange failed.
  ExchangeFailed,
}

/// The terminal outcome of a bootstrap.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
  Authenticated(UserInfo),
  Unauthenticated(Reason),
}

impl Resolution {
  pub fn is_authenticated(&self) -> bool { matches!(self, Self::Authenticated(_)) }
}

impl From<Reason> for Error {
  fn from(reason: Reason) -> Self {
    match reason {
      Reason::SettingsInvalid => {
        Error::Configuration("integration settings carry no application id".into())
      }
      Reason::HostUnavailable => Error::HostUnavailable,
      Reason::ExchangeFailed => Error::AuthExchange("no usable authorization code".into()),
    }
  }
}

// ─── Status handle ────────────────────────────────────────────────────────────

/// Read side of a running bootstrap.
#[derive(Debug, Clone)]
pub struct BootstrapStatus(watch::Receiver<Phase>);

impl BootstrapStatus {
  pub fn phase(&self) -> Phase { self.0.borrow().clone() }

  /// True from `Init` until a terminal phase is reached.
  pub fn is_loading(&self) -> bool { !self.0.borrow().is_terminal() }

  /// Wait for the terminal phase. `None` if the bootstrap was dropped before
  /// finishing.
  pub async fn resolved(&mut self) -> Option<Resolution> {
    let phase = self.0.wait_for(Phase::is_terminal).await.ok()?;
    phase.resolution()
  }
}

// ─── Bootstrap ────────────────────────────────────────────────────────────────

/// One-shot bootstrap: settings → (mock | host handshake) → code exchange.
pub struct Bootstrap<B, H> {
  backend: Arc<B>,
  host:    HostCapability<H>,
  session: SessionCell,
  phase:   watch::Sender<Phase>,
}

impl<B, H> Bootstrap<B, H>
where
  B: Backend,
  H: HostSdk,
{
  pub fn new(backend: Arc<B>, host: HostCapability<H>, session: SessionCell) -> Self {
    let (phase, _) = watch::channel(Phase::Init);
    Self {
      backend,
      host,
      session,
      phase,
    }
  }

  pub fn status(&self) -> BootstrapStatus { BootstrapStatus(self.phase.subscribe()) }

  /// Drive the machine to its terminal phase.
  ///
  /// Never fails: every failure is logged and mapped to an unauthenticated
  /// [`Resolution`]. On success the identity is stored in the session cell.
  pub async fn run(self) -> Resolution {
    self.advance(Phase::FetchingSettings);

    let settings = match self.backend.settings().await {
      Ok(settings) => settings,
      Err(e) => {
        warn!(error = %e, "failed to fetch integration settings");
        return self.finish(Phase::SettingsInvalid);
      }
    };

    let Some(app_id) = settings.app_id().map(str::to_owned) else {
      warn!("integration settings carry no application id");
      return self.finish(Phase::SettingsInvalid);
    };

    let code = if settings.mock_user {
      info!("mock identity mode, skipping host handshake");
      AuthCode::mock()
    } else {
      self.advance(Phase::HandshakeAttempt);
      match self.handshake(app_id).await {
        Ok(code) => code,
        Err(terminal) => return self.finish(terminal),
      }
    };

    self.advance(Phase::CodeExchangePending);
    match self.backend.exchange_code(&code).await {
      Ok(user) => {
        if let Err(e) = self.session.init(user.clone()) {
          warn!(error = %e, "session identity was already set");
        }
        info!(user = %user.name, "authenticated");
        self.finish(Phase::Authenticated(user))
      }
      Err(e) => {
        warn!(error = %e, "authorization code exchange failed");
        self.finish(Phase::ExchangeFailed)
      }
    }
  }

  /// Wait for the host, then request a grant. `Err` carries the terminal
  /// phase to finish in.
  async fn handshake(&self, app_id: String) -> Result<AuthCode, Phase> {
    let HostCapability::Available(host) = &self.host else {
      info!("host sdk not present in this environment");
      return Err(Phase::HandshakeUnavailable);
    };

    host.ready().await;
    debug!("host sdk ready");

    host
      .request_access(AccessRequest::new(app_id))
      .await
      .map_err(|e| {
        warn!(error = %e, "authorization grant failed");
        Phase::ExchangeFailed
      })
  }

  fn advance(&self, next: Phase) {
    let current = self.phase.borrow().clone();
    debug_assert!(
      current.can_advance_to(&next),
      "illegal bootstrap transition {current:?} -> {next:?}"
    );
    debug!(from = ?current, to = ?next, "bootstrap transition");
    self.phase.send_replace(next);
  }

  fn finish(self, terminal: Phase) -> Resolution {
    self.advance(terminal);
    self
      .phase
      .borrow()
      .resolution()
      .unwrap_or(Resolution::Unauthenticated(Reason::ExchangeFailed))
  }
}
