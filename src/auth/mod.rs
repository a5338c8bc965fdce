use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;

/// The four user roles. A user holds exactly one, derived from which
/// role-detail table contains a row for their id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Admin,
    Superuser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Admin => "admin",
            Role::Superuser => "superuser",
        }
    }

    /// Prefix carried by generated user ids, e.g. `STU-1f3a9c2d`.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Role::Student => "STU",
            Role::Faculty => "FAC",
            Role::Admin => "ADM",
            Role::Superuser => "SUP",
        }
    }

    /// Map an identifier's prefix back to a role for login probing.
    pub fn from_id_prefix(identifier: &str) -> Option<Role> {
        let prefix = identifier.split('-').next()?;
        match prefix {
            "STU" => Some(Role::Student),
            "FAC" => Some(Role::Faculty),
            "ADM" => Some(Role::Admin),
            "SUP" => Some(Role::Superuser),
            _ => None,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            "admin" => Ok(Role::Admin),
            "superuser" => Ok(Role::Superuser),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: String, role: Role) -> Self {
        let now = Utc::now();
        let expiry_days = config::config().security.jwt_expiry_days;
        Self {
            sub: user_id,
            role,
            exp: (now + Duration::days(expiry_days)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, JwtError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;
    Ok(token_data.claims)
}
