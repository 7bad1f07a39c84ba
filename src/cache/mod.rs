//! Cache
//!
//! Este módulo contiene el almacenamiento local persistente.

pub mod session_storage;

pub use session_storage::LocalStorage;
