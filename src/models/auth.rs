use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::record_id::RecordId;

/// Identificador de un usuario
pub type UserId = RecordId;

/// Usuario autenticado devuelto por `/api/login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(alias = "fullName", alias = "display_name")]
    pub fullname: String,
    pub email: String,
}

/// Request de login
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request de registro
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub fullname: String,
    pub email: String,
    pub password: String,
}

/// Respuesta de login: `{user}` o `{error}`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: Option<User>,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Estado de la sesión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    SignedOut,
    SigningIn,
    SigningUp,
    SignedIn,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::SignedOut => "signed_out",
            SessionStatus::SigningIn => "signing_in",
            SessionStatus::SigningUp => "signing_up",
            SessionStatus::SignedIn => "signed_in",
        }
    }
}

/// Sesión guardada en el almacenamiento local
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub user: User,
    pub persisted_at: DateTime<Utc>,
}

impl PersistedSession {
    pub fn new(user: User) -> Self {
        Self {
            user,
            persisted_at: Utc::now(),
        }
    }

    /// Sesión más vieja que `max_age_hours`; `None` nunca expira, igual
    /// que una edad fuera del rango representable
    pub fn is_expired(&self, max_age_hours: Option<i64>, now: DateTime<Utc>) -> bool {
        match max_age_hours.and_then(TimeDelta::try_hours) {
            Some(max_age) => now - self.persisted_at > max_age,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> User {
        User {
            id: UserId::Number(1),
            fullname: "Ana Souza".to_string(),
            email: "ana@empresa.com".to_string(),
        }
    }

    #[test]
    fn test_login_response_shapes() {
        let ok: LoginResponse = serde_json::from_value(json!({
            "message": "Login bem-sucedido",
            "user": {"id": 1, "fullname": "Ana Souza", "email": "ana@empresa.com"}
        }))
        .unwrap();
        assert_eq!(ok.user, Some(user()));

        let failed: LoginResponse =
            serde_json::from_value(json!({"error": "Credenciais inválidas"})).unwrap();
        assert!(failed.user.is_none());
        assert_eq!(failed.error.as_deref(), Some("Credenciais inválidas"));
    }

    #[test]
    fn test_session_expiry() {
        let session = PersistedSession::new(user());
        let later = session.persisted_at + TimeDelta::hours(13);
        assert!(session.is_expired(Some(12), later));
        assert!(!session.is_expired(Some(24), later));
        assert!(!session.is_expired(None, later));
    }

    #[test]
    fn test_session_expiry_with_huge_max_age_never_expires() {
        let session = PersistedSession::new(user());
        let later = session.persisted_at + TimeDelta::days(365 * 50);
        assert!(!session.is_expired(Some(3_000_000_000_000), later));
        assert!(!session.is_expired(Some(i64::MAX), later));
    }
}
