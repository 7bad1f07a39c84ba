//! Estado compartido de la aplicación
//!
//! Conecta la configuración con el cliente HTTP, la sesión y la lista de
//! vehículos. La sesión tiene un único dueño; la lista se comparte.

use std::sync::Arc;

use crate::cache::LocalStorage;
use crate::client::ApiClient;
use crate::config::environment::EnvironmentConfig;
use crate::services::auth_service::SessionStore;
use crate::services::rest_gateway::{BackendGateway, HttpBackendGateway};
use crate::services::vehicle_list_service::VehicleListState;
use crate::utils::errors::AppResult;

pub struct AppState {
    pub config: EnvironmentConfig,
    pub gateway: Arc<dyn BackendGateway>,
    pub session: SessionStore,
    pub vehicles: Arc<VehicleListState>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig) -> AppResult<Self> {
        let storage = LocalStorage::file(&config.storage_dir);
        let auth_client = ApiClient::new(config.auth_url.clone())?;
        Self::with_parts(config, auth_client, storage)
    }

    /// Igual que `new`, con cliente de auth y almacenamiento inyectados
    pub fn with_parts(
        config: EnvironmentConfig,
        auth_client: ApiClient,
        storage: LocalStorage,
    ) -> AppResult<Self> {
        let api_client = ApiClient::new(config.api_url.clone())?;
        let gateway: Arc<dyn BackendGateway> = Arc::new(HttpBackendGateway::new(api_client));
        let session = SessionStore::restore(auth_client, storage, config.session_max_age_hours);
        let vehicles = Arc::new(VehicleListState::new(gateway.clone()));

        Ok(Self {
            config,
            gateway,
            session,
            vehicles,
        })
    }
}
