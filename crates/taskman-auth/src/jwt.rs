//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Algorithms accepted on validation. Tokens are always issued as HS256.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// JWT claims
///
/// The token is valid on `[iat, exp)`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Authenticated user ID
    pub user_id: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Issues and validates signed bearer tokens
///
/// Holds the signing secret and token lifetime; both are fixed for the
/// lifetime of the process.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration: Duration,
}

impl TokenService {
    /// Create a token service for `secret` issuing tokens valid for `expiration`
    pub fn new(secret: &str, expiration: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration,
        }
    }

    /// Token lifetime in whole seconds
    pub fn expires_in_secs(&self) -> i64 {
        self.expiration.num_seconds()
    }

    /// Issue a signed token for a user
    pub fn issue(&self, user_id: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.expiration)
            .ok_or_else(|| AuthError::Signing("token expiry out of range".to_string()))?;

        let claims = Claims {
            user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        debug!("Issuing token for user id {}", user_id);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        if !HMAC_ALGORITHMS.contains(&header.alg) {
            return Err(AuthError::UnexpectedSigningMethod(format!("{:?}", header.alg)));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidAlgorithm => {
                    AuthError::UnexpectedSigningMethod(format!("{:?}", header.alg))
                }
                _ => AuthError::MalformedToken,
            })?;

        // The library accepts `exp == now`; the window is half-open
        let now = Utc::now().timestamp();
        if token_data.claims.exp <= now {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret, Duration::hours(24))
    }

    #[test]
    fn test_token_generation_and_validation() {
        let tokens = service("test-secret-key");

        let token = tokens.issue(42).unwrap();
        let claims = tokens.validate(&token).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(tokens.expires_in_secs(), 24 * 3600);
    }

    #[test]
    fn test_invalid_token() {
        let tokens = service("test-secret-key");

        assert!(matches!(
            tokens.validate("invalid-token"),
            Err(AuthError::MalformedToken)
        ));
        assert!(matches!(tokens.validate(""), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_wrong_secret_fails_signature() {
        let token = service("secret-1").issue(7).unwrap();
        assert!(matches!(
            service("secret-2").validate(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let tokens = TokenService::new("test-secret-key", Duration::seconds(-30));
        let token = tokens.issue(1).unwrap();
        assert!(matches!(tokens.validate(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_zero_lifetime_token_is_never_valid() {
        let tokens = TokenService::new("test-secret-key", Duration::zero());
        let token = tokens.issue(1).unwrap();
        assert!(matches!(tokens.validate(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let tokens = TokenService::new("test-secret-key", Duration::hours(10_000_000_000));
        assert!(matches!(tokens.issue(1), Err(AuthError::Signing(_))));
    }

    #[test]
    fn test_flipped_payload_byte_fails_signature() {
        let tokens = service("test-secret-key");
        let token = tokens.issue(1).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let payload = parts[1].as_bytes();
        for i in 0..payload.len() {
            let mut tampered = payload.to_vec();
            tampered[i] = if tampered[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(tampered).unwrap();
            let forged = format!("{}.{}.{}", parts[0], tampered, parts[2]);
            assert!(
                matches!(tokens.validate(&forged), Err(AuthError::InvalidSignature)),
                "byte {i} flip was not rejected"
            );
        }
    }

    #[test]
    fn test_foreign_algorithm_is_rejected() {
        let tokens = service("test-secret-key");
        let token = tokens.issue(1).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        // {"alg":"RS256","typ":"JWT"}
        let rs256_header = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9";
        let forged = format!("{}.{}.{}", rs256_header, parts[1], parts[2]);

        assert!(matches!(
            tokens.validate(&forged),
            Err(AuthError::UnexpectedSigningMethod(_))
        ));
    }

    #[test]
    fn test_other_hmac_variant_is_verified_not_rejected_by_family() {
        let secret = "test-secret-key";
        let tokens = service(secret);
        let claims = Claims {
            user_id: 9,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(tokens.validate(&token).unwrap().user_id, 9);
    }
}
