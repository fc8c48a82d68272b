use crate::error::AppResult;
use crate::models::user::{UserDto, UserKind};
use crate::models::types::UserId;
use argon2::Argon2;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Claims embedded in the signed token: the sanitized user plus the
/// standard issued-at/expiry pair. Verifiable without a session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub kind: UserKind,
    pub iat: usize,
    pub exp: usize,
}

impl From<Claims> for UserDto {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            code: claims.code,
            kind: claims.kind,
        }
    }
}

/// Password hashing/verification and token encode/decode. No persistence,
/// no dependencies on the stores.
pub struct AuthService {
    argon: Argon2<'static>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl_secs: u64,
}

impl AuthService {
    pub fn new(secret: &[u8], token_ttl_secs: u64) -> Self {
        Self {
            argon: Argon2::default(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            token_ttl_secs,
        }
    }

    /// One-way salted hash; cost comes from the argon2id defaults, which are
    /// deliberately expensive.
    pub fn hash_password(&self, plain: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon.hash_password(plain.as_bytes(), &salt)?.to_string();
        Ok(hash)
    }

    /// Verifies a plaintext candidate against a stored hash.
    pub fn is_password_match(&self, plain: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)?;
        Ok(self.argon.verify_password(plain.as_bytes(), &parsed).is_ok())
    }

    /// Signs the DTO into a tamper-evident token with issued-at/expiry claims.
    pub fn encode_jwt(&self, dto: &UserDto) -> AppResult<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| crate::error::DomainError::InternalError(e.to_string()))?
            .as_secs() as usize;

        let claims = Claims {
            sub: dto.id,
            username: dto.username.clone(),
            code: dto.code.clone(),
            kind: dto.kind,
            iat: now,
            exp: now + self.token_ttl_secs as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifies signature and expiry, returning the embedded claims.
    pub fn decode_jwt(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svc() -> AuthService {
        AuthService::new(b"test-secret", 3600)
    }

    #[test]
    fn t_hash_verify() {
        let auth = svc();
        let hash = auth.hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(auth.is_password_match("hunter2", &hash).unwrap());
        assert!(!auth.is_password_match("hunter3", &hash).unwrap());
    }

    #[test]
    fn t_hashes_are_salted() {
        let auth = svc();
        let a = auth.hash_password("hunter2").unwrap();
        let b = auth.hash_password("hunter2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn t_jwt_roundtrip() {
        let auth = svc();
        let dto = UserDto {
            id: UserId::new(),
            username: "alice".into(),
            code: None,
            kind: UserKind::Creator,
        };
        let token = auth.encode_jwt(&dto).unwrap();
        let claims = auth.decode_jwt(&token).unwrap();
        assert_eq!(claims.sub, dto.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.kind, UserKind::Creator);
        assert!(claims.exp > claims.iat);
        assert_eq!(UserDto::from(claims), dto);
    }

    #[test]
    fn t_jwt_tampered_rejected() {
        let auth = svc();
        let dto = UserDto {
            id: UserId::new(),
            username: "alice".into(),
            code: None,
            kind: UserKind::Creator,
        };
        let mut token = auth.encode_jwt(&dto).unwrap();
        token.push('x');
        assert!(auth.decode_jwt(&token).is_err());
    }

    #[test]
    fn t_jwt_wrong_secret_rejected() {
        let dto = UserDto {
            id: UserId::new(),
            username: "alice".into(),
            code: Some("XK42".into()),
            kind: UserKind::Player,
        };
        let token = svc().encode_jwt(&dto).unwrap();
        let other = AuthService::new(b"other-secret", 3600);
        assert!(other.decode_jwt(&token).is_err());
    }
}
