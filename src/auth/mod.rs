use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub kind: TokenKind,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn access(user: &User) -> Self {
        let now = Utc::now();
        let expiry_mins = config::config().security.access_token_expiry_mins;
        Self {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            kind: TokenKind::Access,
            exp: (now + Duration::minutes(expiry_mins as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn refresh(user: &User) -> Self {
        let now = Utc::now();
        let expiry_days = config::config().security.refresh_token_expiry_days;
        Self {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            kind: TokenKind::Refresh,
            exp: (now + Duration::days(expiry_days as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Access + refresh tokens issued together at login
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh: String,
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn generate_token_pair(user: &User) -> Result<TokenPair, JwtError> {
    Ok(TokenPair {
        token: generate_jwt(&Claims::access(user))?,
        refresh: generate_jwt(&Claims::refresh(user))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            age: 30,
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            can_be_contacted: true,
            can_data_be_shared: false,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn token_pair_round_trips_with_distinct_kinds() {
        let user = sample_user();
        let pair = generate_token_pair(&user).expect("token pair");

        let secret = &config::config().security.jwt_secret;
        let key = DecodingKey::from_secret(secret.as_bytes());
        let validation = Validation::default();

        let access = decode::<Claims>(&pair.token, &key, &validation).expect("access claims");
        let refresh = decode::<Claims>(&pair.refresh, &key, &validation).expect("refresh claims");

        assert_eq!(access.claims.sub, user.id);
        assert_eq!(access.claims.kind, TokenKind::Access);
        assert_eq!(refresh.claims.kind, TokenKind::Refresh);
        assert!(refresh.claims.exp > access.claims.exp);
    }
}
