//! Issues and verifies signed bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::domain::entities::User;
use crate::domain::identity::Identity;
use crate::utils::random::random_id;

const JTI_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    #[error("token rejected: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token subject is not a user id")]
    BadSubject,

    #[error("token timestamps out of range")]
    BadTimestamp,

    #[error("random source unavailable: {0}")]
    Entropy(#[from] getrandom::Error),
}

/// JWT claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// HS256 token issuer and verifier.
///
/// Verification accepts exactly HS256 and checks the signature, issuer,
/// audience and expiry with zero leeway. Any failure yields no identity.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenService {
    /// Creates a token service.
    ///
    /// # Arguments
    ///
    /// - `secret` - symmetric signing key
    /// - `issuer` / `audience` - values stamped into and required from tokens
    /// - `ttl_seconds` - token lifetime
    pub fn new(secret: &[u8], issuer: &str, audience: &str, ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            ttl: Duration::try_seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX))
                .unwrap_or(Duration::MAX),
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issues a token for `user` valid from now for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if signing or the random source fails.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Issues a token as if signed at `issued_at`.
    pub fn issue_at(
        &self,
        user: &User,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at + self.ttl;

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.username.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: random_id(JTI_BYTES)?,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encoding)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies `token` and reconstructs the caller identity.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for a bad signature, algorithm, issuer,
    /// audience or an expired token.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(TokenError::Invalid)?;
        let claims = data.claims;

        let subject_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::BadSubject)?;
        let issued_at =
            DateTime::from_timestamp(claims.iat, 0).ok_or(TokenError::BadTimestamp)?;
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::BadTimestamp)?;

        Ok(Identity {
            subject_id,
            display_name: claims.name,
            roles: claims.roles.into_iter().collect::<BTreeSet<_>>(),
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    const SECRET: &[u8] = b"an-hs256-test-secret-of-32-bytes!!";

    fn service() -> TokenService {
        TokenService::new(SECRET, "secure-api", "secure-api-clients", 3600)
    }

    fn user() -> User {
        User {
            id: 42,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            age: 30,
            roles: vec!["User".to_string()],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let service = service();
        let issued = service.issue(&user()).unwrap();

        let identity = service.verify(&issued.token).unwrap();
        assert_eq!(identity.subject_id, 42);
        assert_eq!(identity.display_name, "alice");
        assert!(identity.has_role("User"));
        assert_eq!(identity.expires_at.timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = service();
        let issued = service
            .issue_at(&user(), Utc::now() - Duration::seconds(3601))
            .unwrap();

        assert!(matches!(
            service.verify(&issued.token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_altered_signature_rejected() {
        let service = service();
        let token = service.issue(&user()).unwrap().token;

        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut sig = URL_SAFE_NO_PAD.decode(signature).unwrap();
        sig[0] ^= 0x01;
        let tampered = format!("{head}.{}", URL_SAFE_NO_PAD.encode(sig));

        assert!(service.verify(&tampered).is_err());
    }

    #[test]
    fn test_alg_none_rejected() {
        let service = service();
        let token = service.issue(&user()).unwrap().token;
        let payload = token.split('.').nth(1).unwrap();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);

        assert!(service.verify(&format!("{header}.{payload}.")).is_err());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let other = TokenService::new(
            b"a-completely-different-secret-key!!",
            "secure-api",
            "secure-api-clients",
            3600,
        );
        let token = other.issue(&user()).unwrap().token;
        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let other = TokenService::new(SECRET, "secure-api", "someone-else", 3600);
        let token = other.issue(&user()).unwrap().token;
        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let other = TokenService::new(SECRET, "not-us", "secure-api-clients", 3600);
        let token = other.issue(&user()).unwrap().token;
        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let service = service();
        let a = service.issue(&user()).unwrap().token;
        let b = service.issue(&user()).unwrap().token;
        assert_ne!(a, b);
    }
}
