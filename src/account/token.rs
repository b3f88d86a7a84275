/// Session token issuance and verification
///
/// Tokens are HS256 JWTs signed with the process-wide secret. They carry the
/// account id and an expiry and nothing else; account status is never baked
/// into a token and is re-read on every request instead.
use crate::error::{PlatformError, PlatformResult};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// Allowed clock skew when checking expiry, in seconds
const LEEWAY_SECS: u64 = 30;

/// Claims embedded in a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// A freshly issued token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECS;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Issue a token for `account_id` expiring one TTL from now
    pub fn issue(&self, account_id: &str) -> PlatformResult<IssuedToken> {
        self.issue_at(account_id, Utc::now())
    }

    /// Issue a token as if it were `issued_at`
    pub fn issue_at(&self, account_id: &str, issued_at: DateTime<Utc>) -> PlatformResult<IssuedToken> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: account_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PlatformError::Internal(format!("Failed to generate token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> PlatformResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token verification failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
                    ErrorKind::InvalidSignature => {
                        PlatformError::InvalidToken("Invalid token signature".to_string())
                    }
                    _ => PlatformError::InvalidToken("Malformed token".to_string()),
                }
            })
    }
}
