//! Configuración del proyecto
//!
//! Este módulo contiene las variables de entorno y los valores por defecto.

pub mod environment;

pub use environment::*;
