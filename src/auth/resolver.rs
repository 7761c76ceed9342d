//! Session/role resolver.
//!
//! Bridges the identity provider's push-based session notifications to
//! application-level role-based routing. The resolver runs as an actor task
//! that owns its state: consumers read snapshots from a watch channel and
//! routing decisions from a broadcast channel instead of sharing mutable
//! state with the notification handler.
//!
//! Per notification the actor clears any claims held for a previous
//! session, exchanges a freshly refreshed token for role claims at the
//! backend, and emits at most one [`RoutingDecision`]. A notification that
//! arrives while a claims fetch is still in flight cancels that fetch; the
//! newest session state always wins.
//!
//! ```rust
//! use localserv::auth::claims::RoleClaims;
//! use localserv::auth::resolver::RoutingDecision;
//!
//! let claims = RoleClaims { admin: false, provider: true };
//! assert_eq!(RoutingDecision::for_claims(claims).path(), "/provider-dashboard");
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::backend::ClaimsSource;
use super::claims::{Role, RoleClaims};
use super::error::Result;
use super::provider::{IdentityProvider, SessionEvents};

/// Read-only resolver snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverState {
    /// True once the first session notification has been fully processed,
    /// including its claims-fetch attempt. Never reverts to false.
    pub ready: bool,
    /// Claims from the most recent successful exchange for the current
    /// session, if any.
    pub claims: Option<RoleClaims>,
    /// Set when the most recent claims fetch failed. Claims are then
    /// unknown rather than absent; consumers should not treat the identity
    /// as signed out.
    pub claims_error: Option<String>,
}

impl ResolverState {
    /// Whether the first notification is still being processed.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.ready
    }

    /// Whether a claim set is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.claims.is_some()
    }
}

/// Where the application should navigate after a session change.
///
/// A pure value: the resolver emits it, a single navigation consumer (the
/// web layer) applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingDecision {
    Login,
    AdminPanel,
    ProviderDashboard,
    Apply,
}

impl RoutingDecision {
    /// Client-side navigation target.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::AdminPanel => "/admin-panel",
            Self::ProviderDashboard => "/provider-dashboard",
            Self::Apply => "/apply",
        }
    }

    /// Decision for a fetched claim set. Admin wins over provider; an
    /// identity with neither flag is routed to onboarding.
    #[must_use]
    pub fn for_claims(claims: RoleClaims) -> Self {
        match claims.role() {
            Role::Admin => Self::AdminPanel,
            Role::Provider => Self::ProviderDashboard,
            Role::Client => Self::Apply,
        }
    }

    /// Decision implied by a settled snapshot, if any.
    ///
    /// Returns `None` while the resolver is still loading and after a
    /// claims-fetch failure (claims unknown, no navigation).
    #[must_use]
    pub fn for_state(state: &ResolverState) -> Option<Self> {
        if !state.ready {
            return None;
        }
        match state.claims {
            Some(claims) => Some(Self::for_claims(claims)),
            None if state.claims_error.is_none() => Some(Self::Login),
            None => None,
        }
    }
}

/// Handle to a running resolver actor.
///
/// Dropping the handle tears the actor down; no state updates or routing
/// decisions are published afterwards, even if the identity provider keeps
/// firing notifications.
#[derive(Debug)]
pub struct Resolver {
    provider: Arc<dyn IdentityProvider>,
    state_rx: watch::Receiver<ResolverState>,
    decisions: broadcast::Sender<RoutingDecision>,
    task: JoinHandle<()>,
}

impl Resolver {
    /// Spawn the resolver actor.
    ///
    /// The subscription to the identity provider is established before this
    /// returns; the initial session state is processed as the first
    /// notification.
    #[must_use]
    pub fn spawn(provider: Arc<dyn IdentityProvider>, claims: Arc<dyn ClaimsSource>) -> Self {
        let (state_tx, state_rx) = watch::channel(ResolverState::default());
        let (decisions, _) = broadcast::channel(16);
        let events = provider.subscribe();
        let task = tokio::spawn(run(
            events,
            state_tx,
            decisions.clone(),
            Arc::clone(&provider),
            claims,
        ));
        Self {
            provider,
            state_rx,
            decisions,
            task,
        }
    }

    /// Current snapshot. No side effects.
    #[must_use]
    pub fn state(&self) -> ResolverState {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to state snapshots.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<ResolverState> {
        self.state_rx.clone()
    }

    /// Subscribe to routing decisions.
    #[must_use]
    pub fn decisions(&self) -> broadcast::Receiver<RoutingDecision> {
        self.decisions.subscribe()
    }

    /// Trigger an interactive sign-in with the identity provider.
    ///
    /// Failure is surfaced to the caller, not swallowed; no retry.
    pub async fn sign_in(&self) -> Result<()> {
        self.provider.sign_in().await
    }

    /// Terminate the session with the identity provider.
    pub async fn sign_out(&self) -> Result<()> {
        self.provider.sign_out().await
    }
}

impl Drop for Resolver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Result of the token-refresh plus claims-fetch step.
enum FetchOutcome {
    Claims(RoleClaims),
    FetchFailed(String),
    TokenFailed(String),
    Interrupted,
    ProviderClosed,
}

async fn run(
    mut events: SessionEvents,
    state_tx: watch::Sender<ResolverState>,
    decisions: broadcast::Sender<RoutingDecision>,
    provider: Arc<dyn IdentityProvider>,
    claims: Arc<dyn ClaimsSource>,
) {
    loop {
        if events.changed().await.is_err() {
            // Provider gone; the actor retires without touching state.
            return;
        }

        'notification: loop {
            let session = events.borrow_and_update().clone();

            // Claims from a previous session must never outlive a
            // session-state change: clear before re-fetching.
            state_tx.send_modify(|s| {
                s.claims = None;
                s.claims_error = None;
            });

            let Some(session) = session else {
                state_tx.send_modify(|s| s.ready = true);
                let _ = decisions.send(RoutingDecision::Login);
                info!(name: "auth.session.cleared", "signed out; routing to login");
                break 'notification;
            };

            let outcome = tokio::select! {
                biased;
                changed = events.changed() => {
                    if changed.is_ok() {
                        FetchOutcome::Interrupted
                    } else {
                        FetchOutcome::ProviderClosed
                    }
                }
                outcome = fetch_claims(provider.as_ref(), claims.as_ref()) => outcome,
            };

            match outcome {
                // A newer notification wins; discard the in-flight fetch
                // and process the latest session state.
                FetchOutcome::Interrupted => continue 'notification,
                FetchOutcome::ProviderClosed => return,
                FetchOutcome::Claims(set) => {
                    state_tx.send_modify(|s| {
                        s.ready = true;
                        s.claims = Some(set);
                    });
                    let decision = RoutingDecision::for_claims(set);
                    let _ = decisions.send(decision);
                    info!(
                        name: "auth.claims.resolved",
                        user_id = %session.user_id,
                        role = ?set.role(),
                        target = decision.path(),
                        "claims resolved"
                    );
                }
                FetchOutcome::FetchFailed(message) => {
                    warn!(
                        name: "auth.claims.fetch_failed",
                        user_id = %session.user_id,
                        error = %message,
                        "claims fetch failed; claims unknown, no navigation"
                    );
                    state_tx.send_modify(|s| {
                        s.ready = true;
                        s.claims_error = Some(message);
                    });
                }
                FetchOutcome::TokenFailed(message) => {
                    warn!(
                        name: "auth.token.refresh_failed",
                        error = %message,
                        "token refresh failed; treating as signed out"
                    );
                    state_tx.send_modify(|s| s.ready = true);
                    let _ = decisions.send(RoutingDecision::Login);
                }
            }
            break 'notification;
        }
    }
}

async fn fetch_claims(provider: &dyn IdentityProvider, claims: &dyn ClaimsSource) -> FetchOutcome {
    let token = match provider.fresh_token(true).await {
        Ok(token) => token,
        Err(e) => return FetchOutcome::TokenFailed(e.to_string()),
    };
    match claims.fetch(&token).await {
        Ok(me) => FetchOutcome::Claims(me.claims.unwrap_or_default()),
        Err(e) => FetchOutcome::FetchFailed(e.to_string()),
    }
}
