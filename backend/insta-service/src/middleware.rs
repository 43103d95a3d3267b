/// Caller identity for HTTP handlers.
///
/// Authentication itself lives with an external identity provider; this module
/// only checks the bearer token it issued and exposes the caller as [`UserId`].
use crate::error::ServiceError;
use actix_web::{web, Error};
use actix_web::{FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use std::sync::Arc;
use uuid::Uuid;

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// Verifies bearer tokens issued by the identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Return the user id carried by `token`, or a reason it was rejected.
    fn authenticate(&self, token: &str) -> Result<Uuid, String>;
}

/// JWT claims we rely on; anything else the provider adds is ignored
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Expiry (Unix timestamp)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Validates RS256 JWTs against the provider's public key.
pub struct JwtIdentityProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn from_rsa_pem(public_key_pem: &str, issuer: Option<&str>) -> anyhow::Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        Ok(Self::with_key(decoding_key, validation))
    }

    pub fn with_key(decoding_key: DecodingKey, validation: Validation) -> Self {
        Self {
            decoding_key,
            validation,
        }
    }
}

impl IdentityProvider for JwtIdentityProvider {
    fn authenticate(&self, token: &str) -> Result<Uuid, String> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| format!("invalid token: {}", e))?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| "invalid subject".to_string())
    }
}

/// Development-only provider: the bearer token is the user id itself.
pub struct DevIdentityProvider;

impl IdentityProvider for DevIdentityProvider {
    fn authenticate(&self, token: &str) -> Result<Uuid, String> {
        Uuid::parse_str(token).map_err(|_| "token is not a user id".to_string())
    }
}

fn authenticate(req: &HttpRequest) -> Result<UserId, ServiceError> {
    let provider = req
        .app_data::<web::Data<Arc<dyn IdentityProvider>>>()
        .ok_or_else(|| ServiceError::Internal("identity provider not configured".to_string()))?;

    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ServiceError::Unauthorized("missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ServiceError::Unauthorized("invalid Authorization scheme".to_string()))?;

    let user_id = provider.authenticate(token.trim()).map_err(|reason| {
        tracing::debug!(%reason, "rejected bearer token");
        ServiceError::Unauthorized("invalid or expired token".to_string())
    })?;

    Ok(UserId(user_id))
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(authenticate(req).map_err(Error::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"test-secret";

    fn hs256_provider() -> JwtIdentityProvider {
        JwtIdentityProvider::with_key(
            DecodingKey::from_secret(SECRET),
            Validation::new(Algorithm::HS256),
        )
    }

    fn token_for(sub: &str, exp: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp,
            iss: None,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    #[test]
    fn test_jwt_provider_accepts_valid_token() {
        let user_id = Uuid::new_v4();
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = token_for(&user_id.to_string(), exp);

        assert_eq!(hs256_provider().authenticate(&token), Ok(user_id));
    }

    #[test]
    fn test_jwt_provider_rejects_expired_and_bad_subject() {
        let expired = token_for(
            &Uuid::new_v4().to_string(),
            chrono::Utc::now().timestamp() - 3600,
        );
        assert!(hs256_provider().authenticate(&expired).is_err());

        let bad_sub = token_for("not-a-uuid", chrono::Utc::now().timestamp() + 3600);
        assert!(hs256_provider().authenticate(&bad_sub).is_err());

        assert!(hs256_provider().authenticate("garbage").is_err());
    }

    #[test]
    fn test_dev_provider_parses_uuid() {
        let user_id = Uuid::new_v4();
        assert_eq!(
            DevIdentityProvider.authenticate(&user_id.to_string()),
            Ok(user_id)
        );
        assert!(DevIdentityProvider.authenticate("alice").is_err());
    }
}
