//! Utilidades de validación
//!
//! Funciones helper usadas por los derives de `validator` y por la
//! normalización de formularios.

use validator::ValidationError;

/// Longitud máxima de una placa
pub const PLATE_MAX_LEN: usize = 7;

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar la placa ya normalizada: no vacía y como máximo 7 caracteres
pub fn validate_plate(value: &str) -> Result<(), ValidationError> {
    validate_not_blank(value)?;
    let len = normalize_plate(value).chars().count();
    if len > PLATE_MAX_LEN {
        let mut error = ValidationError::new("plate_length");
        error.add_param("max".into(), &PLATE_MAX_LEN);
        error.add_param("actual".into(), &len);
        return Err(error);
    }
    Ok(())
}

/// Normalizar placa: sin espacios alrededor y en mayúsculas
pub fn normalize_plate(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Normalizar un campo de texto libre
pub fn normalize_text(value: &str) -> String {
    value.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Ana").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_validate_plate() {
        assert!(validate_plate("abc1234").is_ok());
        assert!(validate_plate(" ABC1D23 ").is_ok());
        assert!(validate_plate("ABC12345").is_err());
        assert!(validate_plate("").is_err());
    }

    #[test]
    fn test_normalize_plate() {
        assert_eq!(normalize_plate(" abc1d23 "), "ABC1D23");
    }
}
