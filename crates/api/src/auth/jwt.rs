use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthConfig;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, issued_at: DateTime<Utc>, expiration_hours: u64) -> Self {
        let exp = issued_at + Duration::hours(expiration_hours as i64);
        Self {
            sub: user_id.to_string(),
            email,
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthorized("token subject is not a user id".into()))
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_hours: u64,
}

impl JwtService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiration_hours: config.jwt_expiration_hours,
        }
    }

    /// Tokens are stamped with wall-clock time so expiry validation agrees
    /// with `jsonwebtoken`, which always checks against the system clock.
    pub fn create_token(&self, user_id: Uuid, email: String) -> Result<String, AppError> {
        let claims = Claims::new(user_id, email, Utc::now(), self.expiration_hours);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> JwtService {
        JwtService::new(&AuthConfig {
            jwt_secret: secret.into(),
            jwt_expiration_hours: 1,
        })
    }

    #[test]
    fn issued_tokens_verify() {
        let jwt = service("volley-secret");
        let id = Uuid::new_v4();
        let token = jwt.create_token(id, "a@example.jp".into()).unwrap();
        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), id);
        assert_eq!(claims.email, "a@example.jp");
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let token = service("one").create_token(Uuid::new_v4(), "a@example.jp".into()).unwrap();
        assert!(matches!(
            service("two").verify_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let jwt = service("volley-secret");
        let claims = Claims::new(
            Uuid::new_v4(),
            "a@example.jp".into(),
            Utc::now() - Duration::hours(5),
            1,
        );
        let token = encode(&Header::default(), &claims, &jwt.encoding_key).unwrap();
        assert!(jwt.verify_token(&token).is_err());
    }
}
