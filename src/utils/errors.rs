//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del cliente y su
//! conversión al mensaje único que se muestra al usuario.

use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    /// Fallo de red, DNS o conexión rechazada
    #[error("Transport error: {0}")]
    Transport(String),

    /// Respuesta no-2xx del backend
    #[error("{message}")]
    ServerRejection { status: u16, message: String },

    /// Cuerpo de respuesta que no se pudo interpretar
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Mensaje visible para el usuario: se prefiere el texto del servidor,
    /// si no hay, un mensaje genérico por categoría.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ServerRejection { message, .. } => message.clone(),
            AppError::Transport(_) => {
                "Não foi possível conectar ao servidor".to_string()
            }
            AppError::Parse(_) => "Resposta inválida do servidor".to_string(),
            AppError::Validation(errors) => {
                let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
                fields.sort_unstable();
                format!("Campos inválidos: {}", fields.join(", "))
            }
            AppError::InvalidQuery(msg)
            | AppError::Unauthorized(msg)
            | AppError::Storage(msg)
            | AppError::Export(msg)
            | AppError::Config(msg) => msg.clone(),
        }
    }

    /// Indica si el error vino de una respuesta del servidor
    pub fn is_server_rejection(&self) -> bool {
        matches!(self, AppError::ServerRejection { .. })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de rechazo del servidor
pub fn server_rejection(status: u16, message: impl Into<String>) -> AppError {
    AppError::ServerRejection {
        status,
        message: message.into(),
    }
}

/// Función helper para crear errores de consulta inválida
pub fn invalid_query(message: &str) -> AppError {
    AppError::InvalidQuery(message.to_string())
}

/// Función helper para crear errores de exportación
pub fn export_error(format: &str, err: impl std::fmt::Display) -> AppError {
    AppError::Export(format!("Falha ao gerar {}: {}", format, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1))]
        plate: String,
        #[validate(length(min = 1))]
        model: String,
    }

    #[test]
    fn test_server_message_is_preferred() {
        let err = server_rejection(401, "invalid credentials");
        assert_eq!(err.user_message(), "invalid credentials");
        assert_eq!(err.to_string(), "invalid credentials");
        assert!(err.is_server_rejection());
    }

    #[test]
    fn test_generic_fallbacks() {
        let err = AppError::Transport("connection refused".to_string());
        assert_eq!(err.user_message(), "Não foi possível conectar ao servidor");
        assert!(!err.is_server_rejection());

        let err: AppError = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err().into();
        assert!(matches!(err, AppError::Parse(_)));
        assert_eq!(err.user_message(), "Resposta inválida do servidor");
    }

    #[test]
    fn test_validation_lists_fields() {
        let sample = Sample {
            plate: String::new(),
            model: String::new(),
        };
        let err: AppError = sample.validate().unwrap_err().into();
        assert_eq!(err.user_message(), "Campos inválidos: model, plate");
    }
}
