//! DTOs
//!
//! Conversión entre las formas de datos del frontend y del backend.

pub mod vehicle_dto;
