//! Identity-provider capability surface.
//!
//! The application never talks to the identity provider's wire protocol
//! directly; it consumes the small capability set below. The handle is
//! injected into the resolver at construction time so tests can substitute
//! a controllable double.

use async_trait::async_trait;
use tokio::sync::watch;

use super::error::{Error, Result};

/// A signed-in identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Stable identifier of the signed-in user.
    pub user_id: String,
}

impl Session {
    /// Create a session for the given user.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Push channel of session-state notifications.
///
/// The receiver yields the current session state immediately after
/// subscription, then once per change. Dropping the receiver unsubscribes.
pub type SessionEvents = watch::Receiver<Option<Session>>;

/// Capability surface of the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Subscribe to session-state notifications.
    fn subscribe(&self) -> SessionEvents;

    /// Obtain the current session's identity token.
    ///
    /// `force_refresh` requests a newly minted token rather than a cached
    /// one, so the caller never presents an expired credential.
    async fn fresh_token(&self, force_refresh: bool) -> Result<String>;

    /// Trigger an interactive sign-in. A dismissed or failed flow is a
    /// surfaced error, never swallowed.
    async fn sign_in(&self) -> Result<()>;

    /// Terminate the session. Idempotent when already signed out.
    async fn sign_out(&self) -> Result<()>;
}

/// Identity provider backed by a pre-issued bearer token.
///
/// Covers deployments where identity is provisioned out of band (a gateway
/// or desktop shell injecting a token at startup) and doubles as the
/// controllable provider used by the test suite: [`push_session`] feeds
/// session-state notifications to every subscriber.
///
/// [`push_session`]: StaticIdentityProvider::push_session
#[derive(Debug)]
pub struct StaticIdentityProvider {
    token: Option<String>,
    user_id: String,
    tx: watch::Sender<Option<Session>>,
}

impl StaticIdentityProvider {
    /// Create a signed-out provider holding the given token, if any.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self::with_user(token, "local-user")
    }

    /// Create a signed-out provider reporting the given user id on sign-in.
    #[must_use]
    pub fn with_user(token: Option<String>, user_id: impl Into<String>) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            token,
            user_id: user_id.into(),
            tx,
        }
    }

    /// Push a session-state notification to all subscribers.
    pub fn push_session(&self, session: Option<Session>) {
        self.tx.send_replace(session);
    }

    /// Current session state.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    fn subscribe(&self) -> SessionEvents {
        let mut rx = self.tx.subscribe();
        // Deliver the current state as the first notification.
        rx.mark_changed();
        rx
    }

    async fn fresh_token(&self, _force_refresh: bool) -> Result<String> {
        if self.tx.borrow().is_none() {
            return Err(Error::TokenRefresh("no active session".into()));
        }
        self.token
            .clone()
            .ok_or_else(|| Error::TokenRefresh("no identity token configured".into()))
    }

    async fn sign_in(&self) -> Result<()> {
        if self.token.is_none() {
            return Err(Error::SignIn("no identity token configured".into()));
        }
        self.push_session(Some(Session::new(self.user_id.clone())));
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.push_session(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_delivers_current_state_first() {
        let provider = StaticIdentityProvider::new(Some("tok".into()));
        provider.push_session(Some(Session::new("u1")));

        let mut events = provider.subscribe();
        events.changed().await.unwrap();
        assert_eq!(
            events.borrow_and_update().as_ref().map(|s| s.user_id.clone()),
            Some("u1".to_string())
        );
    }

    #[tokio::test]
    async fn test_sign_in_requires_token() {
        let provider = StaticIdentityProvider::new(None);
        assert!(provider.sign_in().await.is_err());
        assert!(provider.session().is_none());

        let provider = StaticIdentityProvider::new(Some("tok".into()));
        provider.sign_in().await.unwrap();
        assert!(provider.session().is_some());
        assert_eq!(provider.fresh_token(true).await.unwrap(), "tok");
    }

    #[tokio::test]
    async fn test_sign_out_is_idempotent() {
        let provider = StaticIdentityProvider::new(Some("tok".into()));
        provider.sign_in().await.unwrap();
        provider.sign_out().await.unwrap();
        provider.sign_out().await.unwrap();
        assert!(provider.session().is_none());
        assert!(provider.fresh_token(true).await.is_err());
    }
}
