//! Servicio de vehículos
//!
//! CRUD tipado sobre el recurso `vehicles`, mapeando los campos entre la
//! forma frontend y la del backend en ambas direcciones.

use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::rest_gateway::BackendGateway;
use crate::dto::vehicle_dto::{record_from_backend, record_to_backend_body};
use crate::models::vehicle::{VehicleId, VehicleRecord};
use crate::utils::errors::AppResult;

/// Nombre del recurso en el backend
pub const VEHICLES_TABLE: &str = "vehicles";

#[derive(Clone)]
pub struct VehicleService {
    gateway: Arc<dyn BackendGateway>,
}

impl VehicleService {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self { gateway }
    }

    /// Listar vehículos; una respuesta que no es lista equivale a lista vacía
    pub async fn get_vehicles(&self) -> AppResult<Vec<VehicleRecord>> {
        match self.gateway.list(VEHICLES_TABLE).await? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| record_from_backend(item).map_err(Into::into))
                .collect(),
            _ => Ok(Vec::new()),
        }
    }

    pub async fn create_vehicle(&self, record: &VehicleRecord) -> AppResult<VehicleRecord> {
        let body = record_to_backend_body(&without_id(record))?;
        let created = record_from_backend(self.gateway.create(VEHICLES_TABLE, body).await?)?;
        info!(
            "🚗 Vehículo {} registrado",
            created.plate.as_deref().unwrap_or("?")
        );
        Ok(created)
    }

    pub async fn update_vehicle(
        &self,
        id: &VehicleId,
        record: &VehicleRecord,
    ) -> AppResult<VehicleRecord> {
        let body = record_to_backend_body(&without_id(record))?;
        let updated = self
            .gateway
            .update(VEHICLES_TABLE, &id.to_string(), body)
            .await?;
        Ok(record_from_backend(updated)?)
    }

    /// Devuelve el cuerpo de confirmación del backend
    pub async fn delete_vehicle(&self, id: &VehicleId) -> AppResult<Value> {
        self.gateway.delete(VEHICLES_TABLE, &id.to_string()).await
    }
}

/// El `id` viaja en la ruta, nunca en el cuerpo
fn without_id(record: &VehicleRecord) -> VehicleRecord {
    VehicleRecord {
        id: None,
        ..record.clone()
    }
}
