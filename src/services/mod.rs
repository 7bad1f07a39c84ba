pub mod auth_events;
pub mod auth_service;
pub mod query_service;
pub mod report_service;
pub mod rest_gateway;
pub mod vehicle_list_service;
pub mod vehicle_service;

#[cfg(test)]
mod test_support;

pub use auth_service::SessionStore;
pub use query_service::{Query, QueryExecutor};
pub use rest_gateway::{BackendGateway, HttpBackendGateway};
pub use vehicle_list_service::VehicleListState;
pub use vehicle_service::VehicleService;
