use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, error};

use crate::{config::AuthConfig, error::AppError, state::AppState};

/// JWT payload: the user's email and an absolute expiry instant.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.auth)
    }
}

impl JwtKeys {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret_key.as_bytes()),
            algorithm: config.algorithm,
            default_ttl: Duration::minutes(config.token_ttl_minutes),
        }
    }

    /// Sign a token for `subject` expiring `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, AppError> {
        let exp = OffsetDateTime::now_utc() + ttl;
        let claims = Claims {
            sub: subject.to_string(),
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| {
                error!(error = %e, "jwt encode error");
                AppError::Internal(e.to_string())
            })?;
        debug!(subject = %subject, "jwt signed");
        Ok(token)
    }

    pub fn issue_default(&self, subject: &str) -> Result<String, AppError> {
        self.issue(subject, self.default_ttl)
    }

    /// Verify signature and expiry; returns the subject, or None for any
    /// invalid, malformed or expired token.
    pub fn decode(&self, token: &str) -> Option<String> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => {
                debug!(subject = %data.claims.sub, "jwt verified");
                Some(data.claims.sub)
            }
            Err(_) => None,
        }
    }

    pub fn default_ttl_seconds(&self) -> i64 {
        self.default_ttl.whole_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::from_config(&AuthConfig {
            secret_key: secret.into(),
            algorithm: Algorithm::HS256,
            token_ttl_minutes: 30,
            reject_inactive: false,
        })
    }

    #[test]
    fn issue_and_decode_roundtrip() {
        let keys = make_keys("dev-secret");
        let token = keys.issue("alice@example.com", Duration::minutes(5)).expect("issue");
        assert_eq!(keys.decode(&token).as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn issue_default_uses_configured_ttl() {
        let keys = make_keys("dev-secret");
        let token = keys.issue_default("bob@example.com").expect("issue");
        assert_eq!(keys.decode(&token).as_deref(), Some("bob@example.com"));
        assert_eq!(keys.default_ttl_seconds(), 30 * 60);
    }

    #[test]
    fn decode_rejects_expired_token() {
        let keys = make_keys("dev-secret");
        let token = keys.issue("alice@example.com", Duration::seconds(-5)).expect("issue");
        assert!(keys.decode(&token).is_none());
    }

    #[test]
    fn decode_rejects_garbage() {
        let keys = make_keys("dev-secret");
        assert!(keys.decode("not-a-jwt").is_none());
        assert!(keys.decode("").is_none());
    }

    #[test]
    fn decode_rejects_wrong_secret() {
        let good = make_keys("secret-one");
        let evil = make_keys("secret-two");
        let token = good.issue("alice@example.com", Duration::minutes(5)).expect("issue");
        assert!(evil.decode(&token).is_none());
    }

    #[test]
    fn decode_rejects_tampered_payload() {
        let keys = make_keys("dev-secret");
        let token = keys.issue("alice@example.com", Duration::minutes(5)).expect("issue");
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = "eyJzdWIiOiJtYWxsb3J5QGV4YW1wbGUuY29tIiwiZXhwIjo5OTk5OTk5OTk5fQ";
        parts[1] = forged;
        assert!(keys.decode(&parts.join(".")).is_none());
    }
}
