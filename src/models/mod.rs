//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos intercambiados con el backend
//! y los que se guardan localmente.

pub mod auth;
pub mod record_id;
pub mod vehicle;

pub use auth::{PersistedSession, SessionStatus, User, UserId};
pub use record_id::RecordId;
pub use vehicle::{BackendVehicleRecord, VehicleForm, VehicleId, VehicleRecord};
