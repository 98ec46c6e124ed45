//! Access token issuance and verification (HS256 JWT).

use chrono::{Duration, Utc};
use docqa_core::config::AuthConfig;
use docqa_core::{AppError, AppResult};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token claims: subject and expiry (seconds since the epoch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Response body of the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Checks the single configured credential pair and signs tokens.
pub struct TokenIssuer {
    username: String,
    password: String,
    expiry: Duration,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
            expiry: Duration::minutes(config.token_expiry_minutes),
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    /// Exchange credentials for a bearer token.
    pub fn login(&self, username: &str, password: &str) -> AppResult<TokenResponse> {
        if username != self.username || password != self.password {
            tracing::warn!("Rejected login for '{}'", username);
            return Err(AppError::Auth("Invalid credentials".to_string()));
        }

        Ok(TokenResponse {
            access_token: self.issue(username)?,
            token_type: "bearer".to_string(),
        })
    }

    /// Sign a token for `subject` expiring after the configured lifetime.
    pub fn issue(&self, subject: &str) -> AppResult<String> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (Utc::now() + self.expiry).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Auth(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))?;
        Ok(data.claims)
    }
}
