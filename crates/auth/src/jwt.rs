//! Identity provider backed by the hosted identity service's ID tokens
//!
//! The client finishes the sign-in flow (Google popup, email/password form)
//! with the hosted service and posts the ID token it received. The token is
//! verified here with the shared HS256 signing secret; nothing the client
//! claims about itself is trusted without a valid signature.

use std::sync::Arc;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::JwtConfig;
use crate::error::AuthError;
use crate::provider::{
    IdentityProvider, IdentityProviderFactory, IdentitySubscription, SignInMethod,
};
use crate::types::Identity;

/// Claims read from an ID token
#[derive(Debug, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject (the provider's user id)
    pub sub: String,
    pub email: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Avatar URL
    pub picture: Option<String>,
    pub iat: u64,
    pub exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl IdTokenClaims {
    fn into_identity(self) -> Identity {
        let mut identity = Identity::new(self.sub);
        if let Some(email) = self.email {
            identity = identity.with_email(email);
        }
        if let Some(name) = self.name {
            identity = identity.with_display_name(name);
        }
        if let Some(picture) = self.picture {
            identity = identity.with_avatar_url(picture);
        }
        identity
    }
}

pub(crate) fn validate_id_token(token: &str, config: &JwtConfig) -> Result<IdTokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);

    if let Some(aud) = &config.audience {
        validation.set_audience(&[aud]);
    } else {
        validation.validate_aud = false;
    }

    if let Some(iss) = &config.issuer {
        validation.set_issuer(&[iss]);
    }

    let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

    let token_data = decode::<IdTokenClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "ID token validation failed");
        AuthError::InvalidToken
    })?;

    if token_data.claims.sub.trim().is_empty() {
        tracing::debug!("ID token has an empty subject");
        return Err(AuthError::InvalidToken);
    }

    Ok(token_data.claims)
}

/// One client's session with the hosted identity service
pub struct JwtIdentityProvider {
    config: Arc<JwtConfig>,
    current: watch::Sender<Option<Identity>>,
}

impl JwtIdentityProvider {
    pub fn new(config: JwtConfig) -> Self {
        Self::with_shared_config(Arc::new(config))
    }

    fn with_shared_config(config: Arc<JwtConfig>) -> Self {
        let (current, _) = watch::channel(None);
        Self { config, current }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for JwtIdentityProvider {
    fn subscribe(&self) -> IdentitySubscription {
        IdentitySubscription::new(self.current.subscribe())
    }

    async fn sign_in(&self, method: SignInMethod) -> Result<Identity, AuthError> {
        let identity = match method {
            SignInMethod::Federated { id_token } => {
                validate_id_token(&id_token, &self.config)?.into_identity()
            }
            SignInMethod::Password { .. } => {
                return Err(AuthError::IdentityProvider(
                    "Password sign-in happens at the identity service; submit its ID token"
                        .to_string(),
                ))
            }
        };

        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.current.send_replace(None);
        Ok(())
    }
}

impl IdentityProviderFactory for JwtIdentityProvider {
    fn open(&self) -> Arc<dyn IdentityProvider> {
        Arc::new(Self::with_shared_config(self.config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-signing-secret";

    fn config() -> JwtConfig {
        JwtConfig {
            secret: SECRET.to_string(),
            issuer: Some("https://identity.energram.com".to_string()),
            audience: Some("energram".to_string()),
        }
    }

    fn claims(sub: &str, email: &str) -> IdTokenClaims {
        let now = chrono::Utc::now().timestamp() as u64;
        IdTokenClaims {
            sub: sub.to_string(),
            email: Some(email.to_string()),
            name: Some("Ada Obi".to_string()),
            picture: None,
            iat: now,
            exp: now + 3600,
            aud: Some("energram".to_string()),
            iss: Some("https://identity.energram.com".to_string()),
        }
    }

    fn sign(claims: &IdTokenClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .expect("Failed to encode JWT")
    }

    fn federated(id_token: String) -> SignInMethod {
        SignInMethod::Federated { id_token }
    }

    #[tokio::test]
    async fn test_valid_token_signs_in() {
        let provider = JwtIdentityProvider::new(config());
        let mut events = provider.subscribe();

        let identity = provider
            .sign_in(federated(sign(&claims("ada-uid", "ada@energram.com"), SECRET)))
            .await
            .unwrap();

        assert_eq!(identity.id.as_str(), "ada-uid");
        assert_eq!(identity.email.as_deref(), Some("ada@energram.com"));
        assert_eq!(identity.display_name.as_deref(), Some("Ada Obi"));
        assert_eq!(events.latest(), Some(identity));

        provider.sign_out().await.unwrap();
        assert_eq!(events.latest(), None);
    }

    #[tokio::test]
    async fn test_rejected_tokens() {
        let provider = JwtIdentityProvider::new(config());

        let mut expired = claims("ada-uid", "ada@energram.com");
        expired.exp = expired.iat - 7200;

        let mut wrong_audience = claims("ada-uid", "ada@energram.com");
        wrong_audience.aud = Some("someone-else".to_string());

        let mut wrong_issuer = claims("ada-uid", "ada@energram.com");
        wrong_issuer.iss = Some("https://evil.example.com".to_string());

        let tokens = vec![
            String::new(),
            "not-a-jwt".to_string(),
            sign(&claims("ada-uid", "ada@energram.com"), "forged-secret"),
            sign(&expired, SECRET),
            sign(&wrong_audience, SECRET),
            sign(&wrong_issuer, SECRET),
            sign(&claims("", "ada@energram.com"), SECRET),
        ];

        for token in tokens {
            let result = provider.sign_in(federated(token.clone())).await;
            assert!(
                matches!(result, Err(AuthError::InvalidToken)),
                "accepted {:?}",
                token
            );
        }
        assert_eq!(provider.subscribe().latest(), None);
    }

    #[tokio::test]
    async fn test_password_sign_in_is_not_handled_here() {
        let provider = JwtIdentityProvider::new(config());
        let result = provider
            .sign_in(SignInMethod::Password {
                email: "ada@energram.com".to_string(),
                password: "pw".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AuthError::IdentityProvider(_))));
    }

    #[tokio::test]
    async fn test_no_audience_configured_accepts_any_audience() {
        let provider = JwtIdentityProvider::new(JwtConfig {
            secret: SECRET.to_string(),
            issuer: None,
            audience: None,
        });
        let mut token_claims = claims("ada-uid", "ada@energram.com");
        token_claims.aud = Some("authenticated".to_string());

        let result = provider.sign_in(federated(sign(&token_claims, SECRET))).await;
        assert!(result.is_ok(), "{:?}", result.err());
    }

    #[tokio::test]
    async fn test_opened_sessions_do_not_share_identity() {
        let provider = JwtIdentityProvider::new(config());
        let first = provider.open();
        let second = provider.open();

        first
            .sign_in(federated(sign(&claims("ada-uid", "ada@energram.com"), SECRET)))
            .await
            .unwrap();

        assert!(first.subscribe().latest().is_some());
        assert_eq!(second.subscribe().latest(), None);
    }
}
