//! Per-visitor resolver registry.
//!
//! The web layer keys resolvers by browser-session cookie so each visitor
//! gets an isolated resolver actor. Dropping a registry entry tears the
//! actor down.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::backend::ClaimsSource;
use super::provider::IdentityProvider;
use super::resolver::Resolver;

/// Thread-safe store of resolver actors, one per browser session.
#[derive(Debug, Clone)]
pub struct ResolverRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    resolvers: RwLock<HashMap<String, Arc<Resolver>>>,
    provider: Arc<dyn IdentityProvider>,
    claims: Arc<dyn ClaimsSource>,
}

impl ResolverRegistry {
    /// Create a registry that spawns resolvers against the given provider
    /// and claims source.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, claims: Arc<dyn ClaimsSource>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                resolvers: RwLock::new(HashMap::new()),
                provider,
                claims,
            }),
        }
    }

    /// Get the resolver for a browser session, spawning one on first use.
    #[must_use]
    pub fn get_or_spawn(&self, key: &str) -> Arc<Resolver> {
        {
            let guard = self.inner.resolvers.read().unwrap();
            if let Some(resolver) = guard.get(key) {
                return Arc::clone(resolver);
            }
        }

        let mut guard = self.inner.resolvers.write().unwrap();
        let entry = guard.entry(key.to_string()).or_insert_with(|| {
            Arc::new(Resolver::spawn(
                Arc::clone(&self.inner.provider),
                Arc::clone(&self.inner.claims),
            ))
        });
        Arc::clone(entry)
    }

    /// Remove a browser session's resolver, tearing the actor down once the
    /// last handle drops.
    pub fn remove(&self, key: &str) -> Option<Arc<Resolver>> {
        let mut guard = self.inner.resolvers.write().unwrap();
        guard.remove(key)
    }

    /// Number of live resolvers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.resolvers.read().unwrap().len()
    }

    /// Whether no resolvers are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::backend::{ClaimsSource, MeResponse};
    use crate::auth::provider::StaticIdentityProvider;

    #[derive(Debug)]
    struct NoClaims;

    #[async_trait::async_trait]
    impl ClaimsSource for NoClaims {
        async fn fetch(&self, _token: &str) -> crate::auth::Result<MeResponse> {
            Ok(MeResponse::default())
        }
    }

    #[tokio::test]
    async fn test_one_resolver_per_session_key() {
        let provider = Arc::new(StaticIdentityProvider::new(None));
        let registry = ResolverRegistry::new(provider, Arc::new(NoClaims));

        assert!(registry.is_empty());
        let a = registry.get_or_spawn("visitor-a");
        let a_again = registry.get_or_spawn("visitor-a");
        let b = registry.get_or_spawn("visitor-b");

        assert!(Arc::ptr_eq(&a, &a_again));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);

        registry.remove("visitor-a");
        assert_eq!(registry.len(), 1);
    }
}
