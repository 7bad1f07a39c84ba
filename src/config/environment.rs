//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno: URLs del backend,
//! directorios locales y política de sesión.

use chrono::TimeDelta;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::utils::errors::{AppError, AppResult};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_AUTH_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SESSION_MAX_AGE_HOURS: i64 = 12;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub api_url: String,
    pub auth_url: String,
    pub storage_dir: PathBuf,
    pub export_dir: PathBuf,
    /// `None` desactiva la expiración de la sesión persistida
    pub session_max_age_hours: Option<i64>,
    pub log_level: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            storage_dir: default_storage_dir(),
            export_dir: PathBuf::from("."),
            session_max_age_hours: Some(DEFAULT_SESSION_MAX_AGE_HOURS),
            log_level: "info".to_string(),
        }
    }
}

impl EnvironmentConfig {
    /// Cargar configuración desde variables de entorno, con valores por defecto
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables inyectable
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let session_max_age_hours = match get("SESSION_MAX_AGE_HOURS") {
            Some(raw) => match parse_var::<i64>("SESSION_MAX_AGE_HOURS", &raw)? {
                hours if hours <= 0 => None,
                hours if TimeDelta::try_hours(hours).is_none() => {
                    return Err(AppError::Config(
                        "SESSION_MAX_AGE_HOURS fuera de rango".to_string(),
                    ));
                }
                hours => Some(hours),
            },
            None => defaults.session_max_age_hours,
        };

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or(defaults.environment),
            api_url: get("API_URL")
                .or_else(|| get("VITE_API_URL"))
                .map(|url| trim_url(&url))
                .unwrap_or(defaults.api_url),
            auth_url: get("AUTH_URL")
                .map(|url| trim_url(&url))
                .unwrap_or(defaults.auth_url),
            storage_dir: get("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            export_dir: get("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            session_max_age_hours,
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Nivel de log para el subscriber de tracing
    pub fn tracing_level(&self) -> tracing::Level {
        tracing::Level::from_str(&self.log_level).unwrap_or(tracing::Level::INFO)
    }
}

/// Directorio de datos por plataforma, respetando XDG en Linux
pub fn default_storage_dir() -> PathBuf {
    let base = match env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".config")),
        _ => dirs::config_dir().unwrap_or_default(),
    };

    base.join("vehicle-registry")
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} debe ser un número válido", key)))
}
