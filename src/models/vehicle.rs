//! Modelo de Vehicle
//!
//! Este módulo contiene las dos formas del vehículo: la del frontend
//! (`VehicleRecord`) y la del backend (`BackendVehicleRecord`), además del
//! formulario validado que se envía al crear o editar.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use super::record_id::RecordId;
use crate::utils::validation::{normalize_plate, normalize_text, validate_not_blank, validate_plate};

/// Identificador de un vehículo
pub type VehicleId = RecordId;

/// Vehículo con los nombres de campo del frontend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<VehicleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub extension: Option<String>,
}

impl VehicleRecord {
    /// Campo de texto o cadena vacía si falta
    pub fn plate_or_empty(&self) -> &str {
        self.plate.as_deref().unwrap_or_default()
    }

    /// Campos sobre los que opera la búsqueda
    pub fn searchable_fields(&self) -> [&str; 4] {
        [
            self.plate.as_deref().unwrap_or_default(),
            self.owner_name.as_deref().unwrap_or_default(),
            self.department.as_deref().unwrap_or_default(),
            self.model.as_deref().unwrap_or_default(),
        ]
    }
}

/// Vehículo con los nombres de campo del backend (tabla `vehicles`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendVehicleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<VehicleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub ramal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cor: Option<String>,
}

/// Formulario de cadastro/edición; todos los campos son obligatorios
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VehicleForm {
    #[validate(custom = "validate_not_blank")]
    pub owner_name: String,
    #[validate(custom = "validate_not_blank")]
    pub extension: String,
    #[validate(custom = "validate_not_blank")]
    pub department: String,
    #[validate(custom = "validate_plate")]
    pub plate: String,
    #[validate(custom = "validate_not_blank")]
    pub model: String,
    #[validate(custom = "validate_not_blank")]
    pub color: String,
}

impl VehicleForm {
    /// Prellenar el formulario de edición con un registro existente
    pub fn from_record(record: &VehicleRecord) -> Self {
        let text = |field: &Option<String>| field.clone().unwrap_or_default();
        Self {
            owner_name: text(&record.owner_name),
            extension: text(&record.extension),
            department: text(&record.department),
            plate: text(&record.plate),
            model: text(&record.model),
            color: text(&record.color),
        }
    }

    /// Validar y convertir en registro listo para enviar (placa en mayúsculas)
    pub fn into_record(self) -> Result<VehicleRecord, validator::ValidationErrors> {
        self.validate()?;
        Ok(VehicleRecord {
            id: None,
            plate: Some(normalize_plate(&self.plate)),
            model: Some(normalize_text(&self.model)),
            color: Some(normalize_text(&self.color)),
            owner_name: Some(normalize_text(&self.owner_name)),
            department: Some(normalize_text(&self.department)),
            extension: Some(normalize_text(&self.extension)),
        })
    }
}

/// El backend guarda `ramal` como entero; se acepta número o texto
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "se esperaba texto o número, se recibió {}",
            other
        ))),
    }
}
