//! Servicio de autenticación
//!
//! `SessionStore` mantiene el usuario autenticado en memoria y en el
//! almacenamiento local bajo la clave `user`. La sesión restaurada se
//! confía tal cual (no hay verificación contra el backend), pero expira
//! pasada la edad máxima configurada.

use chrono::Utc;
use tracing::{info, warn};

use super::auth_events::{AuthEvent, AuthEvents, SubscriptionId};
use crate::cache::LocalStorage;
use crate::client::ApiClient;
use crate::models::auth::{
    LoginRequest, LoginResponse, PersistedSession, RegisterRequest, SessionStatus, User,
};
use crate::utils::errors::{AppError, AppResult};

/// Clave única de la sesión persistida
pub const SESSION_KEY: &str = "user";

const LOGIN_PATH: &str = "api/login";
const REGISTER_PATH: &str = "api/register";

pub struct SessionStore {
    client: ApiClient,
    storage: LocalStorage,
    max_age_hours: Option<i64>,
    status: SessionStatus,
    user: Option<User>,
    events: AuthEvents,
}

impl SessionStore {
    /// Cargar la sesión persistida, sin round trip al backend
    pub fn restore(client: ApiClient, storage: LocalStorage, max_age_hours: Option<i64>) -> Self {
        let user = match storage.get::<PersistedSession>(SESSION_KEY) {
            Ok(Some(session)) if session.is_expired(max_age_hours, Utc::now()) => {
                info!("⏰ Sesión de {} expirada, descartando", session.user.email);
                discard(&storage);
                None
            }
            Ok(Some(session)) => {
                info!("🔓 Sesión restaurada para {}", session.user.email);
                Some(session.user)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("⚠️ Sesión persistida ilegible, descartando: {}", e);
                discard(&storage);
                None
            }
        };

        let status = if user.is_some() {
            SessionStatus::SignedIn
        } else {
            SessionStatus::SignedOut
        };

        Self {
            client,
            storage,
            max_age_hours,
            status,
            user,
            events: AuthEvents::new(),
        }
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> AppResult<User> {
        self.status = SessionStatus::SigningIn;
        info!("🔐 Iniciando sesión para {}", email);

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self
            .client
            .post(LOGIN_PATH, &request, "Erro no login")
            .await
            .and_then(login_user);

        let user = match result {
            Ok(user) => user,
            Err(e) => {
                warn!("❌ Login rechazado para {}: {}", email, e.user_message());
                // memoria y almacenamiento deben coincidir tras el rechazo
                self.status = SessionStatus::SignedOut;
                self.user = None;
                discard(&self.storage);
                return Err(e);
            }
        };

        if let Err(e) = self.storage.set(SESSION_KEY, &PersistedSession::new(user.clone())) {
            warn!("⚠️ No se pudo persistir la sesión: {}", e);
        }
        self.user = Some(user.clone());
        self.status = SessionStatus::SignedIn;
        info!("✅ Sesión iniciada: {}", user.fullname);
        self.events.publish(&AuthEvent::SignedIn(user.clone()));
        Ok(user)
    }

    /// Registrar una cuenta; nunca inicia sesión
    pub async fn sign_up(&mut self, email: &str, password: &str, full_name: &str) -> AppResult<()> {
        let previous = self.status;
        self.status = SessionStatus::SigningUp;
        info!("📝 Registrando cuenta {}", email);

        let request = RegisterRequest {
            fullname: full_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = self
            .client
            .post(REGISTER_PATH, &request, "Erro ao cadastrar")
            .await;
        self.status = previous;

        match result {
            Ok(_) => {
                info!("✅ Cuenta {} registrada", email);
                self.events.publish(&AuthEvent::SignedUp {
                    email: email.to_string(),
                });
                Ok(())
            }
            Err(e) => {
                warn!("❌ Registro rechazado para {}: {}", email, e.user_message());
                Err(e)
            }
        }
    }

    /// Limpia memoria y almacenamiento; no falla
    pub fn sign_out(&mut self) {
        let email = self.user.take().map(|u| u.email);
        self.status = SessionStatus::SignedOut;
        discard(&self.storage);
        info!("👋 Sesión cerrada ({})", email.as_deref().unwrap_or("sin usuario"));
        self.events.publish(&AuthEvent::SignedOut);
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::SignedIn && self.user.is_some()
    }

    pub fn max_age_hours(&self) -> Option<i64> {
        self.max_age_hours
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }
}

/// Un 2xx puede traer sólo `error`; eso también es un rechazo
fn login_user(body: serde_json::Value) -> AppResult<User> {
    let response: LoginResponse = serde_json::from_value(body)?;
    match (response.user, response.error) {
        (Some(user), None) => Ok(user),
        (_, Some(error)) => Err(AppError::Unauthorized(error)),
        (None, None) => Err(AppError::Unauthorized(
            response.message.unwrap_or_else(|| "Erro no login".to_string()),
        )),
    }
}

fn discard(storage: &LocalStorage) {
    if let Err(e) = storage.delete(SESSION_KEY) {
        warn!("⚠️ No se pudo borrar la sesión persistida: {}", e);
    }
}
