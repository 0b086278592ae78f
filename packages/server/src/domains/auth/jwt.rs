use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::common::MemberId;

/// Default session lifetime
pub const DEFAULT_SESSION_HOURS: i64 = 24;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session token has expired")]
    Expired,

    #[error("Invalid session token: {0}")]
    Invalid(String),

    #[error("Failed to sign session token: {0}")]
    Signing(String),
}

/// Who the session token says the caller is
///
/// `claims_steward` mirrors what the client believes about its role. The
/// moderation authority never trusts it; grants are re-read at action time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub member_id: MemberId,
    pub display_name: String,
    pub claims_steward: bool,
}

/// Wire form of a session token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    #[serde(default)]
    pub steward: bool,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub jti: Uuid,
}

impl From<Claims> for SessionIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            member_id: MemberId::from_uuid(claims.sub),
            display_name: claims.name,
            claims_steward: claims.steward,
        }
    }
}

/// Signs and verifies HS256 session tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl: Duration::hours(DEFAULT_SESSION_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sign a token for the identity. Used by tooling; members normally get
    /// tokens from the identity provider.
    pub fn issue(&self, identity: &SessionIdentity) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.member_id.into_uuid(),
            name: identity.display_name.clone(),
            steward: identity.claims_steward,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Check signature, issuer and expiry
    pub fn verify(&self, token: &str) -> Result<SessionIdentity, SessionError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims.into()),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(SessionError::Expired),
            Err(e) => Err(SessionError::Invalid(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(claims_steward: bool) -> SessionIdentity {
        SessionIdentity {
            member_id: MemberId::new(),
            display_name: "Ada".to_string(),
            claims_steward,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let service = JwtService::new("test_secret_key", "test_issuer".to_string());
        let ada = identity(true);

        let token = service.issue(&ada).unwrap();
        assert_eq!(service.verify(&token).unwrap(), ada);
    }

    #[test]
    fn test_garbage_is_invalid() {
        let service = JwtService::new("test_secret_key", "test_issuer".to_string());
        assert!(matches!(
            service.verify("invalid_token"),
            Err(SessionError::Invalid(_))
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let signer = JwtService::new("secret1", "test_issuer".to_string());
        let verifier = JwtService::new("secret2", "test_issuer".to_string());

        let token = signer.issue(&identity(false)).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let issuer_a = JwtService::new("secret", "a".to_string());
        let issuer_b = JwtService::new("secret", "b".to_string());

        let token = issuer_a.issue(&identity(false)).unwrap();
        assert!(issuer_b.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        // Past the default 60s leeway
        let service = JwtService::new("secret", "test_issuer".to_string())
            .with_ttl(Duration::seconds(-120));

        let token = service.issue(&identity(false)).unwrap();
        assert!(matches!(service.verify(&token), Err(SessionError::Expired)));
    }
}
