//! Mapeo de campos de vehículo entre frontend y backend
//!
//! | frontend     | backend |
//! |--------------|---------|
//! | `owner_name` | `name`  |
//! | `extension`  | `ramal` |
//! | `department` | `setor` |
//! | `color`      | `cor`   |
//!
//! `id`, `plate` y `model` se llaman igual en ambos lados.

use serde_json::Value;

use crate::models::vehicle::{BackendVehicleRecord, VehicleRecord};

/// Pares (frontend, backend) de nombres que difieren
pub const FIELD_PAIRS: [(&str, &str); 4] = [
    ("owner_name", "name"),
    ("extension", "ramal"),
    ("department", "setor"),
    ("color", "cor"),
];

/// Forma frontend → forma backend; los campos ausentes siguen ausentes
pub fn to_backend(record: &VehicleRecord) -> BackendVehicleRecord {
    BackendVehicleRecord {
        id: record.id.clone(),
        name: record.owner_name.clone(),
        ramal: record.extension.clone(),
        setor: record.department.clone(),
        plate: record.plate.clone(),
        model: record.model.clone(),
        cor: record.color.clone(),
    }
}

/// Forma backend → forma frontend
pub fn to_frontend(record: &BackendVehicleRecord) -> VehicleRecord {
    VehicleRecord {
        id: record.id.clone(),
        plate: record.plate.clone(),
        model: record.model.clone(),
        color: record.cor.clone(),
        owner_name: record.name.clone(),
        department: record.setor.clone(),
        extension: record.ramal.clone(),
    }
}

impl From<&VehicleRecord> for BackendVehicleRecord {
    fn from(record: &VehicleRecord) -> Self {
        to_backend(record)
    }
}

impl From<&BackendVehicleRecord> for VehicleRecord {
    fn from(record: &BackendVehicleRecord) -> Self {
        to_frontend(record)
    }
}

/// Renombrar las claves frontend presentes a su nombre backend.
/// Las demás claves pasan sin cambios; valores que no son objeto se devuelven tal cual.
pub fn object_to_backend(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            for (frontend, backend) in FIELD_PAIRS {
                if let Some(field) = map.remove(frontend) {
                    map.insert(backend.to_string(), field);
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Renombrar las claves backend a su nombre frontend. Si llegan ambos nombres,
/// gana el del backend salvo que sea `null`.
pub fn object_to_frontend(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            for (frontend, backend) in FIELD_PAIRS {
                let backend_value = map.remove(backend).filter(|v| !v.is_null());
                let frontend_value = map.remove(frontend).filter(|v| !v.is_null());
                if let Some(field) = backend_value.or(frontend_value) {
                    map.insert(frontend.to_string(), field);
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Mapear una lista o un objeto individual a la forma frontend
pub fn collection_to_frontend(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(object_to_frontend).collect()),
        other => object_to_frontend(other),
    }
}

/// Mapear un payload (objeto o lista de objetos) a la forma backend
pub fn collection_to_backend(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(object_to_backend).collect()),
        other => object_to_backend(other),
    }
}

/// Interpretar una respuesta del backend como `VehicleRecord`
pub fn record_from_backend(value: Value) -> Result<VehicleRecord, serde_json::Error> {
    serde_json::from_value(object_to_frontend(value))
}

/// Serializar un `VehicleRecord` como cuerpo para el backend
pub fn record_to_backend_body(record: &VehicleRecord) -> Result<Value, serde_json::Error> {
    serde_json::to_value(to_backend(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::VehicleId;
    use serde_json::json;

    fn frontend() -> VehicleRecord {
        VehicleRecord {
            id: Some(VehicleId::Number(1)),
            plate: Some("ABC1234".to_string()),
            model: Some("Civic".to_string()),
            color: Some("Preto".to_string()),
            owner_name: Some("Ana".to_string()),
            department: Some("TI".to_string()),
            extension: Some("1234".to_string()),
        }
    }

    #[test]
    fn test_frontend_round_trip_is_identity() {
        let record = frontend();
        assert_eq!(to_frontend(&to_backend(&record)), record);

        let partial = VehicleRecord {
            plate: Some("XYZ9999".to_string()),
            ..Default::default()
        };
        assert_eq!(to_frontend(&to_backend(&partial)), partial);
    }

    #[test]
    fn test_backend_round_trip_is_identity() {
        let backend = BackendVehicleRecord {
            id: Some(VehicleId::Text("a1".to_string())),
            name: Some("Bruno".to_string()),
            ramal: Some("55".to_string()),
            setor: Some("RH".to_string()),
            plate: Some("XYZ9999".to_string()),
            model: Some("Gol".to_string()),
            cor: None,
        };
        assert_eq!(to_backend(&to_frontend(&backend)), backend);
    }

    #[test]
    fn test_object_to_backend_renames_present_keys_only() {
        let mapped = object_to_backend(json!({
            "owner_name": "Ana",
            "color": "Preto",
            "plate": "ABC1234",
            "created_at": "2024-01-01"
        }));
        assert_eq!(
            mapped,
            json!({"name": "Ana", "cor": "Preto", "plate": "ABC1234", "created_at": "2024-01-01"})
        );
    }

    #[test]
    fn test_object_to_frontend_prefers_backend_name() {
        let mapped = object_to_frontend(json!({
            "id": 1,
            "name": "Ana",
            "owner_name": "Vazado",
            "ramal": 1234,
            "cor": null,
            "color": "Azul"
        }));
        assert_eq!(
            mapped,
            json!({"id": 1, "owner_name": "Ana", "extension": 1234, "color": "Azul"})
        );
    }

    #[test]
    fn test_non_objects_pass_through() {
        assert_eq!(object_to_frontend(Value::Null), Value::Null);
        assert_eq!(object_to_backend(json!("texto")), json!("texto"));
        assert_eq!(collection_to_frontend(json!([])), json!([]));
    }

    #[test]
    fn test_record_from_backend() {
        let record = record_from_backend(json!({
            "id": 1, "name": "Ana", "ramal": 1234, "setor": "TI",
            "plate": "ABC1234", "model": "Civic", "cor": "Preto"
        }))
        .unwrap();
        assert_eq!(record, frontend());
        assert_eq!(
            record_to_backend_body(&record).unwrap(),
            json!({"id": 1, "name": "Ana", "ramal": "1234", "setor": "TI",
                   "plate": "ABC1234", "model": "Civic", "cor": "Preto"})
        );
    }
}
