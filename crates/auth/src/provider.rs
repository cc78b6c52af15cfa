//! Identity provider adapter
//!
//! The identity service itself is external. The resolver only needs sign-in,
//! sign-out and a stream of identity changes. Each client gets its own
//! provider session from an [`IdentityProviderFactory`].

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::AuthError;
use crate::types::Identity;

/// How the user is signing in
#[derive(Clone, PartialEq, Eq)]
pub enum SignInMethod {
    /// ID token the client obtained from the hosted service's popup or
    /// redirect flow (e.g. Google)
    Federated { id_token: String },
    Password { email: String, password: String },
}

impl fmt::Debug for SignInMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignInMethod::Federated { .. } => f
                .debug_struct("Federated")
                .field("id_token", &"<redacted>")
                .finish(),
            SignInMethod::Password { email, .. } => f
                .debug_struct("Password")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Stream of identity changes from a provider.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct IdentitySubscription {
    receiver: watch::Receiver<Option<Identity>>,
}

impl IdentitySubscription {
    pub fn new(receiver: watch::Receiver<Option<Identity>>) -> Self {
        Self { receiver }
    }

    /// Latest identity, marking it as seen
    pub fn latest(&mut self) -> Option<Identity> {
        self.receiver.borrow_and_update().clone()
    }

    /// Wait for the next change. `None` once the provider has shut down.
    pub async fn changed(&mut self) -> Option<Option<Identity>> {
        self.receiver.changed().await.ok()?;
        Some(self.latest())
    }

    pub fn unsubscribe(self) {}
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Subscribe to sign-in/sign-out changes, starting from the current identity
    fn subscribe(&self) -> IdentitySubscription;

    async fn sign_in(&self, method: SignInMethod) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Opens an independent provider session for one client
pub trait IdentityProviderFactory: Send + Sync {
    fn open(&self) -> Arc<dyn IdentityProvider>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_redacted_in_debug_output() {
        let method = SignInMethod::Password {
            email: "admin@energram.com".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", method);
        assert!(rendered.contains("admin@energram.com"));
        assert!(!rendered.contains("hunter2"));

        let method = SignInMethod::Federated {
            id_token: "eyJhbGciOi.secret.sig".to_string(),
        };
        assert!(!format!("{:?}", method).contains("eyJhbGciOi"));
    }

    #[tokio::test]
    async fn test_subscription_sees_changes_and_close() {
        let (sender, receiver) = watch::channel(None);
        let mut subscription = IdentitySubscription::new(receiver);
        assert_eq!(subscription.latest(), None);

        sender.send_replace(Some(Identity::new("u1")));
        assert_eq!(
            subscription.changed().await,
            Some(Some(Identity::new("u1")))
        );

        drop(sender);
        assert_eq!(subscription.changed().await, None);
    }
}
