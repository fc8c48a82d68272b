use crate::db::DbResult;
use crate::error::{AppResult, DomainError};
use crate::models::types::UserId;
use postgres_types::private::BytesMut;
use postgres_types::{FromSql, IsNull, ToSql, Type};
use serde::{Deserialize, Serialize};
use std::error::Error;
use tokio_postgres::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    Creator, // Owns games, authenticates with a password
    Player,  // Joins a game via a shared code, no password
}

impl ToSql for UserKind {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        let s = match self {
            UserKind::Creator => "creator",
            UserKind::Player => "player",
        };
        s.to_sql(ty, out)
    }

    fn accepts(ty: &Type) -> bool {
        ty == &Type::TEXT
    }

    fn to_sql_checked(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        self.to_sql(ty, out)
    }
}

impl FromSql<'_> for UserKind {
    fn from_sql(ty: &Type, raw: &[u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let s = String::from_sql(ty, raw)?;
        match s.as_str() {
            "creator" => Ok(UserKind::Creator),
            "player" => Ok(UserKind::Player),
            _ => Err(format!("Unknown user kind: {}", s).into()),
        }
    }

    fn accepts(ty: &Type) -> bool {
        ty == &Type::TEXT
    }
}

impl std::fmt::Display for UserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserKind::Creator => write!(f, "creator"),
            UserKind::Player => write!(f, "player"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID
    pub id: UserId,
    /// Username (unique among creators; per-code for players)
    pub username: String,
    /// Hashed password (argon), creators only
    pub password_hash: Option<String>,
    /// Actor kind, fixed at creation
    pub kind: UserKind,
    /// Game join code, players only
    pub code: Option<String>,
    /// Record creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn try_from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get::<_, UserId>("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get::<_, Option<String>>("password_hash")?,
            kind: row.try_get("kind")?,
            code: row.try_get::<_, Option<String>>("code")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub fn validate_username(s: &str) -> AppResult<()> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::Validation {
                field: "username",
                message: "cannot be empty".into(),
            });
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_')) {
            return Err(DomainError::Validation {
                field: "username",
                message: "only alphanumeric, hyphen, underscore allowed".into(),
            });
        }
        Ok(())
    }
}

/// Insert shape for a new user record. The id is generated here so the
/// caller can rely on it before the row round-trips.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub username: String,
    pub password_hash: Option<String>,
    pub kind: UserKind,
    pub code: Option<String>,
}

impl NewUser {
    pub fn creator(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            password_hash: Some(password_hash.into()),
            kind: UserKind::Creator,
            code: None,
        }
    }

    pub fn player(username: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            password_hash: None,
            kind: UserKind::Player,
            code: Some(code.into()),
        }
    }
}

/// Sanitized user representation returned to clients and embedded in tokens.
/// Deliberately has no password field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDto {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub kind: UserKind,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            code: user.code.clone(),
            kind: user.kind,
        }
    }
}
