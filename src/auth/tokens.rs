use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::JWTConfig;
use crate::models::Identity;

/// Why a token failed verification. Handlers must treat both variants
/// identically (generic 401) so clients cannot probe the difference.
#[derive(Debug, PartialEq, Eq)]
pub enum VerifyError {
    Expired,
    Invalid,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies the signed identity tokens carried in the session
/// cookie. Tokens are not persisted; validity is determined solely by
/// signature and expiry at verification time.
pub struct TokenService {
    config: JWTConfig,
}

impl TokenService {
    pub fn new(config: JWTConfig) -> Self {
        TokenService { config }
    }

    /// Token lifetime in seconds, as configured.
    pub fn lifetime(&self) -> i64 {
        self.config.exp
    }

    /// Sign a token carrying the given email claim, expiring `config.exp`
    /// seconds from now (2 hours in deployed configs).
    pub fn issue(&self, email: &str) -> String {
        self.issue_with_lifetime(email, self.config.exp)
    }

    fn issue_with_lifetime(&self, email: &str, lifetime_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: email.to_string(),
            email: email.to_string(),
            iss: self.config.iss.clone(),
            iat: now,
            exp: now + lifetime_secs,
        };

        let encoding_key = EncodingKey::from_secret(self.config.secret.as_ref());
        encode(&Header::default(), &claims, &encoding_key).expect("Failed to encode JWT")
    }

    /// Check signature and expiry, returning the identity the token encodes.
    pub fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let decoding_key = DecodingKey::from_secret(self.config.secret.as_ref());
        let decoded = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            debug!("Token verification failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => VerifyError::Expired,
                _ => VerifyError::Invalid,
            }
        })?;

        Ok(Identity {
            email: decoded.claims.email,
        })
    }
}
