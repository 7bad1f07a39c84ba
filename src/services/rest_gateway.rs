//! Gateway REST por tabla
//!
//! Operaciones list/create/update/delete sobre `/{table}` y
//! `/{table}/{id}`, un round trip HTTP por operación.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::client::ApiClient;
use crate::utils::errors::AppResult;

/// Acceso al backend por recurso; los cuerpos van en la forma del backend
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn list(&self, table: &str) -> AppResult<Value>;
    async fn create(&self, table: &str, body: Value) -> AppResult<Value>;
    async fn update(&self, table: &str, id: &str, body: Value) -> AppResult<Value>;
    async fn delete(&self, table: &str, id: &str) -> AppResult<Value>;
}

/// Implementación HTTP sobre `ApiClient`
#[derive(Clone, Debug)]
pub struct HttpBackendGateway {
    client: ApiClient,
}

impl HttpBackendGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BackendGateway for HttpBackendGateway {
    async fn list(&self, table: &str) -> AppResult<Value> {
        let data = self
            .client
            .get(table, &format!("Failed to fetch {}", table))
            .await?;
        info!(
            "📋 GET /{} → {} registros",
            table,
            data.as_array().map(Vec::len).unwrap_or(0)
        );
        Ok(data)
    }

    async fn create(&self, table: &str, body: Value) -> AppResult<Value> {
        let created = self
            .client
            .post(table, &body, &format!("Failed to create {}", singular(table)))
            .await?;
        info!("✅ POST /{} completado", table);
        Ok(created)
    }

    async fn update(&self, table: &str, id: &str, body: Value) -> AppResult<Value> {
        let updated = self
            .client
            .put(
                &format!("{}/{}", table, id),
                &body,
                &format!("Failed to update {}", singular(table)),
            )
            .await?;
        info!("✏️ PUT /{}/{} completado", table, id);
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: &str) -> AppResult<Value> {
        let ack = self
            .client
            .delete(
                &format!("{}/{}", table, id),
                &format!("Failed to delete {}", singular(table)),
            )
            .await?;
        info!("🗑️ DELETE /{}/{} completado", table, id);
        Ok(ack)
    }
}

fn singular(table: &str) -> &str {
    table.strip_suffix('s').unwrap_or(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_for_messages() {
        assert_eq!(singular("vehicles"), "vehicle");
        assert_eq!(singular("setor"), "setor");
    }
}
