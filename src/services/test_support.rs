//! Gateway falso en memoria para los tests de las capas superiores

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::rest_gateway::BackendGateway;
use crate::utils::errors::{server_rejection, AppError, AppResult};

#[derive(Default)]
pub struct FakeGateway {
    rows: Mutex<Vec<Value>>,
    next_id: AtomicI64,
    fail_list: AtomicBool,
    fail_delete: AtomicBool,
    list_delays_ms: Mutex<VecDeque<u64>>,
    list_body: Mutex<Option<Value>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn with_rows(rows: Vec<Value>) -> Arc<Self> {
        let gateway = Self::default();
        gateway.next_id.store(rows.len() as i64 + 1, Ordering::SeqCst);
        *gateway.rows.lock().unwrap() = rows;
        Arc::new(gateway)
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Retardo para la próxima llamada a `list`
    pub fn push_list_delay(&self, ms: u64) {
        self.list_delays_ms.lock().unwrap().push_back(ms);
    }

    /// Cuerpo fijo para `list` en lugar de las filas
    pub fn set_list_body(&self, body: Value) {
        *self.list_body.lock().unwrap() = Some(body);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn rows(&self) -> Vec<Value> {
        self.rows.lock().unwrap().clone()
    }

    pub fn replace_rows(&self, rows: Vec<Value>) {
        *self.rows.lock().unwrap() = rows;
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn id_of(row: &Value) -> String {
    match row.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

#[async_trait]
impl BackendGateway for FakeGateway {
    async fn list(&self, table: &str) -> AppResult<Value> {
        self.record(format!("GET {}", table));
        let snapshot = self
            .list_body
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Value::Array(self.rows()));
        let delay = self.list_delays_ms.lock().unwrap().pop_front();
        if let Some(ms) = delay {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(AppError::Transport("connection refused".to_string()));
        }
        Ok(snapshot)
    }

    async fn create(&self, table: &str, mut body: Value) -> AppResult<Value> {
        self.record(format!("POST {} {}", table, body));
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if let Value::Object(map) = &mut body {
            map.insert("id".to_string(), json!(id));
        }
        self.rows.lock().unwrap().push(body.clone());
        Ok(body)
    }

    async fn update(&self, table: &str, id: &str, body: Value) -> AppResult<Value> {
        self.record(format!("PUT {}/{} {}", table, id, body));
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| id_of(row) == id)
            .ok_or_else(|| server_rejection(404, "Vehicle not found"))?;
        if let (Value::Object(target), Value::Object(changes)) = (row, body) {
            target.extend(changes);
            return Ok(Value::Object(target.clone()));
        }
        Err(AppError::Parse("payload no es un objeto".to_string()))
    }

    async fn delete(&self, table: &str, id: &str) -> AppResult<Value> {
        self.record(format!("DELETE {}/{}", table, id));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::Transport("connection reset".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| id_of(row) != id);
        if rows.len() == before {
            return Err(server_rejection(404, "Vehicle not found"));
        }
        Ok(json!({"message": "Vehicle deleted"}))
    }
}

/// Dos vehículos en la forma del backend
pub fn sample_rows() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Ana", "ramal": 1234, "setor": "TI",
               "plate": "ABC1234", "model": "Civic", "cor": "Preto"}),
        json!({"id": 2, "name": "Bruno", "ramal": 5678, "setor": "RH",
               "plate": "XYZ9999", "model": "Gol", "cor": "Branco"}),
    ]
}
