//! Cliente HTTP para el backend REST
//!
//! Este módulo contiene el cliente HTTP compartido por el gateway de
//! recursos y por el servicio de autenticación. Cada llamada es un único
//! round trip; los fallos se traducen a `AppError` sin reintentos.

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::utils::errors::{server_rejection, AppError, AppResult};

/// Cliente HTTP con URL base
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Crear nuevo cliente HTTP; sin timeout propio, se usa el del transporte
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("No se pudo crear el cliente HTTP: {}", e)))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Reusar un `reqwest::Client` existente
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL absoluta para una ruta relativa
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str, fallback: &str) -> AppResult<Value> {
        self.execute(self.request(Method::GET, path), fallback).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> AppResult<Value> {
        self.execute(self.request(Method::POST, path).json(body), fallback)
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> AppResult<Value> {
        self.execute(self.request(Method::PUT, path).json(body), fallback)
            .await
    }

    pub async fn delete(&self, path: &str, fallback: &str) -> AppResult<Value> {
        self.execute(self.request(Method::DELETE, path), fallback)
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("🌐 {} {}", method, url);
        self.client
            .request(method, url)
            .header("Accept", "application/json")
    }

    async fn execute(&self, request: RequestBuilder, fallback: &str) -> AppResult<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = extract_error_message(&text).unwrap_or_else(|| fallback.to_string());
            warn!("❌ Backend respondió {}: {}", status, message);
            return Err(server_rejection(status.as_u16(), message));
        }

        parse_body(&text)
    }
}

/// Cuerpo 2xx como JSON; vacío equivale a `null`
pub fn parse_body(text: &str) -> AppResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| AppError::Parse(e.to_string()))
}

/// Mensaje legible de un cuerpo de error: `error` o, si no, `message`
pub fn extract_error_message(text: &str) -> Option<String> {
    let body: Value = serde_json::from_str(text).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
