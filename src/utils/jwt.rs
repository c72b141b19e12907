use crate::error::{AppError, AppResult};
use crate::models::AuthUser;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub exp: i64,
    pub iat: i64,
}

/// Stateless credential issuer/verifier. The token is the whole session:
/// there is no server-side session store behind it.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
        }
    }

    pub fn issue_token(&self, user: &AuthUser) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expires_in);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    /// Fails closed: tampered, expired or malformed tokens all come back as
    /// an error, never a panic.
    pub fn verify_token(&self, token: &str) -> AppResult<AuthUser> {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)?;

        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::AuthError("Credencial inválida".to_string()))?;

        Ok(AuthUser {
            id,
            email: claims.email,
            username: claims.username,
            full_name: claims.full_name,
        })
    }

    pub fn get_expires_in(&self) -> i64 {
        self.expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "maria@exemplo.com.br".to_string(),
            username: "maria_plantas".to_string(),
            full_name: "Maria Silva".to_string(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let service = JwtService::new("test-secret", 3600);
        let user = sample_user();

        let token = service.issue_token(&user).unwrap();
        let verified = service.verify_token(&token).unwrap();

        assert_eq!(verified.id, user.id);
        assert_eq!(verified.email, user.email);
        assert_eq!(verified.username, user.username);
        assert_eq!(verified.full_name, user.full_name);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = JwtService::new("test-secret", 3600);
        let token = service.issue_token(&sample_user()).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(service.verify_token(&tampered).is_err());

        let other_secret = JwtService::new("another-secret", 3600);
        assert!(other_secret.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s validation leeway
        let service = JwtService::new("test-secret", -120);
        let token = service.issue_token(&sample_user()).unwrap();

        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let service = JwtService::new("test-secret", 3600);
        assert!(service.verify_token("not-a-jwt").is_err());
        assert!(service.verify_token("").is_err());
    }
}
