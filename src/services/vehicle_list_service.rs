//! Estado de la lista de vehículos
//!
//! Guarda la lista completa traída del backend, la vista filtrada por el
//! término de búsqueda y orquesta la recarga después de cada eliminación.
//! Cada `load()` recibe un número de generación: una carga que termina
//! después de otra más reciente se descarta.

use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use super::query_service::{Query, QueryExecutor};
use super::rest_gateway::BackendGateway;
use super::vehicle_service::{VehicleService, VEHICLES_TABLE};
use crate::dto::vehicle_dto::record_from_backend;
use crate::models::vehicle::{VehicleForm, VehicleId, VehicleRecord};
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    Loading,
    Ready,
}

/// Resultado de una carga
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// La lista fue reemplazada; contiene el número de registros
    Applied(usize),
    /// Una carga más reciente ya estaba en curso; el resultado se descartó
    Superseded,
}

#[derive(Debug)]
struct ListInner {
    status: ListStatus,
    vehicles: Vec<VehicleRecord>,
    filtered: Vec<VehicleRecord>,
    search_term: String,
    last_error: Option<String>,
}

pub struct VehicleListState {
    executor: QueryExecutor,
    service: VehicleService,
    generation: AtomicU64,
    inner: RwLock<ListInner>,
}

impl VehicleListState {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self {
            executor: QueryExecutor::new(gateway.clone()),
            service: VehicleService::new(gateway),
            generation: AtomicU64::new(0),
            inner: RwLock::new(ListInner {
                status: ListStatus::Loading,
                vehicles: Vec::new(),
                filtered: Vec::new(),
                search_term: String::new(),
                last_error: None,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ListInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ListInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Traer la lista completa y reemplazar la lista y la vista filtrada.
    /// Si falla, se conserva la lista anterior y se guarda el mensaje.
    pub async fn load(&self) -> AppResult<LoadOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.write().status = ListStatus::Loading;
        debug!("🔄 Carga #{} de vehículos iniciada", generation);

        let result = self
            .executor
            .execute(Query::from(VEHICLES_TABLE).select(Some("*")))
            .await
            .and_then(parse_records);

        let mut inner = self.write();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("⏭️ Carga #{} descartada: hay una más reciente", generation);
            return Ok(LoadOutcome::Superseded);
        }
        inner.status = ListStatus::Ready;

        match result {
            Ok(vehicles) => {
                let filtered = filter_vehicles(&vehicles, &inner.search_term);
                inner.filtered = filtered;
                inner.vehicles = vehicles;
                inner.last_error = None;
                info!("📋 {} vehículos cargados", inner.vehicles.len());
                Ok(LoadOutcome::Applied(inner.vehicles.len()))
            }
            Err(e) => {
                warn!("❌ Error al cargar vehículos: {}", e);
                inner.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Recalcular la vista filtrada sin tocar la red
    pub fn set_search_term(&self, term: &str) {
        let mut inner = self.write();
        let filtered = filter_vehicles(&inner.vehicles, term);
        inner.search_term = term.to_string();
        inner.filtered = filtered;
    }

    /// Eliminar en el backend y recargar; sin eliminación optimista
    pub async fn remove(&self, id: &VehicleId) -> AppResult<LoadOutcome> {
        self.executor
            .execute(Query::from(VEHICLES_TABLE).delete().eq("id", Value::from(id)))
            .await?;
        info!("🗑️ Vehículo {} eliminado", id);
        self.load().await
    }

    /// Validar y crear; recargar queda a cargo de quien llama
    pub async fn create(&self, form: VehicleForm) -> AppResult<VehicleRecord> {
        let record = form.into_record()?;
        self.service.create_vehicle(&record).await
    }

    /// Validar y actualizar; recargar queda a cargo de quien llama
    pub async fn update(&self, id: &VehicleId, form: VehicleForm) -> AppResult<VehicleRecord> {
        let record = form.into_record()?;
        self.service.update_vehicle(id, &record).await
    }

    pub fn status(&self) -> ListStatus {
        self.read().status
    }

    pub fn vehicles(&self) -> Vec<VehicleRecord> {
        self.read().vehicles.clone()
    }

    pub fn filtered(&self) -> Vec<VehicleRecord> {
        self.read().filtered.clone()
    }

    pub fn search_term(&self) -> String {
        self.read().search_term.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    /// Buscar en la lista completa por id
    pub fn find(&self, id: &VehicleId) -> Option<VehicleRecord> {
        self.read()
            .vehicles
            .iter()
            .find(|v| v.id.as_ref() == Some(id))
            .cloned()
    }

    /// "1 veículo cadastrado" / "N veículos cadastrados" sobre la vista filtrada
    pub fn count_label(&self) -> String {
        count_label(self.read().filtered.len())
    }
}

pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 veículo cadastrado".to_string()
    } else {
        format!("{} veículos cadastrados", count)
    }
}

/// Subsecuencia cuyo plate, owner_name, department o model contiene `term`
/// sin distinguir mayúsculas; término vacío devuelve todo.
pub fn filter_vehicles(vehicles: &[VehicleRecord], term: &str) -> Vec<VehicleRecord> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return vehicles.to_vec();
    }
    vehicles
        .iter()
        .filter(|vehicle| {
            vehicle
                .searchable_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Sólo una lista trae vehículos; cualquier otro cuerpo equivale a lista vacía
fn parse_records(data: Value) -> AppResult<Vec<VehicleRecord>> {
    let items = match data {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            warn!("⚠️ Respuesta de vehículos sin lista, se ignora: {}", other);
            Vec::new()
        }
    };
    items
        .into_iter()
        .map(|item| record_from_backend(item).map_err(AppError::from))
        .collect()
}
