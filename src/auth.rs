//! Bearer-token access for outgoing requests.
//!
//! The token is owned by an external auth collaborator; this crate only
//! reads it (and asks the collaborator to drop it on logout). Components take
//! an `Arc<dyn AuthStore>` so tests can substitute a fixed token.

use secrecy::{ExposeSecret, SecretString};
use std::sync::{PoisonError, RwLock};

pub trait AuthStore: Send + Sync {
    /// Current bearer token, or `None` when signed out.
    fn token(&self) -> Option<SecretString>;

    fn logout(&self);
}

/// In-memory token holder.
///
/// Used by the CLI (token from `DAPUR_TOKEN` or the config file) and by
/// tests.
pub struct StaticTokenStore {
    token: RwLock<Option<SecretString>>,
}

impl StaticTokenStore {
    pub fn new(token: Option<SecretString>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn signed_in(token: &str) -> Self {
        Self::new(Some(SecretString::from(token.to_owned())))
    }

    pub fn signed_out() -> Self {
        Self::new(None)
    }
}

impl AuthStore for StaticTokenStore {
    fn token(&self) -> Option<SecretString> {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .map(|t| SecretString::from(t.expose_secret().to_owned()))
    }

    fn logout(&self) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            tracing::info!("Signed out, bearer token dropped");
        }
    }
}

impl std::fmt::Debug for StaticTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let signed_in = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("StaticTokenStore")
            .field("token", &signed_in.then_some("[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let store = StaticTokenStore::signed_in("abc");
        let token = store.token().unwrap();
        assert_eq!(token.expose_secret(), "abc");
    }

    #[test]
    fn test_logout_clears_token() {
        let store = StaticTokenStore::signed_in("abc");
        store.logout();
        assert!(store.token().is_none());
        // Second logout is a no-op
        store.logout();
        assert!(store.token().is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let store = StaticTokenStore::signed_in("super-secret");
        let out = format!("{:?}", store);
        assert!(!out.contains("super-secret"));
        assert!(out.contains("[REDACTED]"));
    }
}
