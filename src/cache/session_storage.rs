//! Almacenamiento local clave-valor
//!
//! Equivalente durable del `localStorage` del navegador: un archivo JSON
//! `storage.json` con pares clave → valor serializado. Acceso síncrono.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::utils::errors::{AppError, AppResult};

pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Backend de almacenamiento de texto crudo
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> AppResult<Option<String>>;
    fn write(&self, key: &str, value: String) -> AppResult<()>;
    /// Devuelve `true` si la clave existía
    fn remove(&self, key: &str) -> AppResult<bool>;
}

/// Archivo JSON en disco, reescrito de forma atómica en cada escritura
pub struct FileBackend {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileBackend {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STORAGE_FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> AppResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                AppError::Storage(format!("{} corrupto: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn write(&self, key: &str, value: String) -> AppResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value);
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> AppResult<bool> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.save(&entries)?;
        }
        Ok(existed)
    }
}

/// Almacenamiento en memoria, no sobrevive al proceso
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: String) -> AppResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<bool> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.remove(key).is_some())
    }
}

/// Almacenamiento tipado sobre un backend de texto
#[derive(Clone)]
pub struct LocalStorage {
    backend: Arc<dyn StorageBackend>,
}

impl LocalStorage {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Almacenamiento en `dir/storage.json`
    pub fn file(dir: impl AsRef<Path>) -> Self {
        Self::new(Arc::new(FileBackend::new(dir)))
    }

    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryBackend::default()))
    }

    /// Leer y deserializar; `Ok(None)` si la clave no existe
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.backend.read(key)? {
            Some(raw) => {
                debug!("📥 Storage HIT para clave: {}", key);
                let value = serde_json::from_str(&raw).map_err(|e| {
                    AppError::Storage(format!("valor ilegible en '{}': {}", key, e))
                })?;
                Ok(Some(value))
            }
            None => {
                debug!("❌ Storage MISS para clave: {}", key);
                Ok(None)
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let serialized = serde_json::to_string(value)?;
        self.backend.write(key, serialized)?;
        debug!("💾 Storage SET para clave: {}", key);
        Ok(())
    }

    pub fn delete(&self, key: &str) -> AppResult<()> {
        match self.backend.remove(key) {
            Ok(existed) => {
                debug!("🗑️ Storage DELETE para clave: {} (existía: {})", key, existed);
                Ok(())
            }
            Err(e) => {
                warn!("⚠️ Error eliminando clave {}: {}", key, e);
                Err(e)
            }
        }
    }

    pub fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.backend.read(key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_storage_operations() {
        let storage = LocalStorage::memory();
        assert_eq!(storage.get::<String>("user").unwrap(), None);

        storage.set("user", &json!({"id": 1})).unwrap();
        assert!(storage.exists("user").unwrap());
        assert_eq!(
            storage.get::<serde_json::Value>("user").unwrap(),
            Some(json!({"id": 1}))
        );

        storage.delete("user").unwrap();
        assert!(!storage.exists("user").unwrap());
    }

    #[test]
    fn test_file_storage_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::file(dir.path().join("nested"));
        storage.set("user", &"ana@empresa.com").unwrap();
        storage.set("other", &3).unwrap();

        let reopened = LocalStorage::file(dir.path().join("nested"));
        assert_eq!(
            reopened.get::<String>("user").unwrap().as_deref(),
            Some("ana@empresa.com")
        );

        reopened.delete("user").unwrap();
        assert_eq!(storage.get::<String>("user").unwrap(), None);
        assert_eq!(storage.get::<i32>("other").unwrap(), Some(3));
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORAGE_FILE_NAME), "{no json").unwrap();
        let storage = LocalStorage::file(dir.path());
        assert!(matches!(storage.get::<String>("user"), Err(AppError::Storage(_))));
    }

    #[test]
    fn test_unreadable_value_is_storage_error() {
        let storage = LocalStorage::memory();
        storage.set("user", &"texto").unwrap();
        assert!(matches!(storage.get::<i64>("user"), Err(AppError::Storage(_))));
    }
}
