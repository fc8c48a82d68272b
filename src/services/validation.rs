use crate::error::AuthError;
use crate::models::user::{User, UserKind};
use serde::Deserialize;

/// Raw auth request body as it arrives on the wire. Everything is optional
/// here; shape rules depend on the declared actor type and are enforced by
/// `validate_auth_request_body`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthBody {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub code: Option<String>,
}

impl AuthBody {
    pub fn is_player(&self) -> bool {
        self.kind.as_deref() == Some("player")
    }
}

/// Validated request, discriminated on actor type. Past this point the
/// required fields for each kind are guaranteed present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    Creator { username: String, password: String },
    Player { username: String, code: String },
}

impl AuthRequest {
    pub fn kind(&self) -> UserKind {
        match self {
            AuthRequest::Creator { .. } => UserKind::Creator,
            AuthRequest::Player { .. } => UserKind::Player,
        }
    }
}

fn require<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, AuthError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AuthError::Validation(message.to_string())),
    }
}

/// Structural check of the auth request body. Pure, no I/O; reports the
/// first violation found.
pub fn validate_auth_request_body(body: &AuthBody) -> Result<AuthRequest, AuthError> {
    let kind = require(&body.kind, "type is required")?;
    let username = require(&body.username, "username is required")?;
    User::validate_username(username).map_err(|e| AuthError::Validation(e.to_string()))?;

    match kind {
        "creator" => {
            let password = require(&body.password, "password is required for creator accounts")?;
            Ok(AuthRequest::Creator {
                username: username.to_string(),
                password: password.to_string(),
            })
        }
        "player" => {
            let code = require(&body.code, "code is required for player accounts")?;
            Ok(AuthRequest::Player {
                username: username.to_string(),
                code: code.to_string(),
            })
        }
        _ => Err(AuthError::Validation(
            "type must be either creator or player".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(kind: &str, username: &str, password: Option<&str>, code: Option<&str>) -> AuthBody {
        AuthBody {
            kind: Some(kind.to_string()),
            username: Some(username.to_string()),
            password: password.map(str::to_string),
            code: code.map(str::to_string),
        }
    }

    #[test]
    fn t_creator_ok() {
        let req = validate_auth_request_body(&body("creator", "alice", Some("hunter2"), None)).unwrap();
        assert_eq!(
            req,
            AuthRequest::Creator {
                username: "alice".into(),
                password: "hunter2".into(),
            }
        );
        assert_eq!(req.kind(), UserKind::Creator);
    }

    #[test]
    fn t_player_ok() {
        let req = validate_auth_request_body(&body("player", "bob", None, Some("XK42"))).unwrap();
        assert_eq!(
            req,
            AuthRequest::Player {
                username: "bob".into(),
                code: "XK42".into(),
            }
        );
    }

    #[test]
    fn t_missing_type() {
        let err = validate_auth_request_body(&AuthBody::default()).unwrap_err();
        assert!(matches!(err, AuthError::Validation(m) if m == "type is required"));
    }

    #[test]
    fn t_unknown_type() {
        let err = validate_auth_request_body(&body("admin", "alice", None, None)).unwrap_err();
        assert!(matches!(err, AuthError::Validation(m) if m.contains("creator or player")));
    }

    #[test]
    fn t_creator_missing_password() {
        let err = validate_auth_request_body(&body("creator", "alice", None, Some("XK42"))).unwrap_err();
        assert!(matches!(err, AuthError::Validation(m) if m.contains("password")));
    }

    #[test]
    fn t_player_missing_code() {
        let err = validate_auth_request_body(&body("player", "bob", Some("hunter2"), None)).unwrap_err();
        assert!(matches!(err, AuthError::Validation(m) if m.contains("code")));
    }

    #[test]
    fn t_username_bad_characters() {
        let err = validate_auth_request_body(&body("creator", "al ice!", Some("hunter2"), None)).unwrap_err();
        assert!(matches!(err, AuthError::Validation(m) if m.contains("username")));
    }

    #[test]
    fn t_blank_username() {
        let err = validate_auth_request_body(&body("creator", "   ", Some("hunter2"), None)).unwrap_err();
        assert!(matches!(err, AuthError::Validation(m) if m == "username is required"));
    }
}
