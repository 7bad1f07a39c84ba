//! Consultas declarativas sobre el backend REST
//!
//! Una `Query` describe recurso, operación, filtro de igualdad y orden;
//! `QueryExecutor::execute` la resuelve con una o más llamadas al gateway.
//! Mantiene la forma `from(table).select()/insert()/update()/delete()`
//! con `.eq()` y `.order()` que usaban las pantallas.
//!
//! El par `{data, error}` se expresa como `AppResult<Value>`.

use serde_json::{json, Value};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

use super::rest_gateway::BackendGateway;
use crate::dto::vehicle_dto::{collection_to_frontend, object_to_backend, object_to_frontend};
use crate::utils::errors::{invalid_query, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperation {
    Select { columns: Option<String> },
    Insert { payload: Value },
    Update { payload: Value },
    Delete,
}

impl QueryOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperation::Select { .. } => "select",
            QueryOperation::Insert { .. } => "insert",
            QueryOperation::Update { .. } => "update",
            QueryOperation::Delete => "delete",
        }
    }
}

/// Predicado de igualdad `column = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub operation: QueryOperation,
    pub filter: Option<Filter>,
    pub order: Option<OrderBy>,
}

/// Punto de partida `Query::from(table)`
#[derive(Debug, Clone)]
pub struct QueryTarget {
    table: String,
}

impl QueryTarget {
    /// `columns` se acepta por compatibilidad; siempre se devuelven todas
    pub fn select(self, columns: Option<&str>) -> Query {
        self.build(QueryOperation::Select {
            columns: columns.map(str::to_string),
        })
    }

    pub fn insert(self, payload: Value) -> Query {
        self.build(QueryOperation::Insert { payload })
    }

    pub fn update(self, payload: Value) -> Query {
        self.build(QueryOperation::Update { payload })
    }

    pub fn delete(self) -> Query {
        self.build(QueryOperation::Delete)
    }

    fn build(self, operation: QueryOperation) -> Query {
        Query {
            table: self.table,
            operation,
            filter: None,
            order: None,
        }
    }
}

impl Query {
    #[allow(clippy::should_implement_trait)]
    pub fn from(table: &str) -> QueryTarget {
        QueryTarget {
            table: table.to_string(),
        }
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filter = Some(Filter {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    /// Orden aplicado en el cliente sobre el resultado de un select
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(OrderBy {
            column: column.to_string(),
            ascending,
        });
        self
    }
}

#[derive(Clone)]
pub struct QueryExecutor {
    gateway: Arc<dyn BackendGateway>,
}

impl QueryExecutor {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self { gateway }
    }

    /// Un resultado `Ok` nunca es `null`: select devuelve una lista (vacía si
    /// el backend no trajo nada) y delete sin cuerpo devuelve `{"id": ...}`.
    pub async fn execute(&self, query: Query) -> AppResult<Value> {
        debug!("🔎 {} sobre '{}'", query.operation.as_str(), query.table);
        let Query {
            table,
            operation,
            filter,
            order,
        } = query;

        match operation {
            QueryOperation::Select { .. } => {
                let data = collection_to_frontend(self.gateway.list(&table).await?);
                Ok(shape_selection(data, filter.as_ref(), order.as_ref()))
            }
            QueryOperation::Insert { payload } => {
                let items = match payload {
                    Value::Array(items) => items,
                    single => vec![single],
                };
                let mut created = Vec::with_capacity(items.len());
                for item in items {
                    let response = self.gateway.create(&table, object_to_backend(item)).await?;
                    created.push(object_to_frontend(response));
                }
                Ok(Value::Array(created))
            }
            QueryOperation::Update { payload } => {
                let id = target_id(filter.as_ref(), "update")?;
                let updated = self
                    .gateway
                    .update(&table, &id, object_to_backend(payload))
                    .await?;
                Ok(Value::Array(vec![object_to_frontend(updated)]))
            }
            QueryOperation::Delete => {
                let id = target_id(filter.as_ref(), "delete")?;
                match self.gateway.delete(&table, &id).await? {
                    // 204 o cuerpo vacío: confirmación mínima con el id borrado
                    Value::Null => Ok(json!({ "id": id })),
                    ack => Ok(ack),
                }
            }
        }
    }
}

/// Segmento de ruta del recurso a partir del filtro `eq`
fn target_id(filter: Option<&Filter>, operation: &str) -> AppResult<String> {
    let filter = filter.ok_or_else(|| {
        invalid_query(&format!("{} requer um filtro eq(\"id\", valor)", operation))
    })?;
    if filter.column != "id" {
        warn!(
            "⚠️ {} filtra por '{}', pero el recurso se direcciona por id",
            operation, filter.column
        );
    }
    match &filter.value {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(invalid_query(&format!(
            "valor de filtro inválido para {}: {}",
            operation, other
        ))),
    }
}

fn shape_selection(data: Value, filter: Option<&Filter>, order: Option<&OrderBy>) -> Value {
    let mut items = match data {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => {
            if filter.is_none() {
                return single;
            }
            vec![single]
        }
    };

    if let Some(filter) = filter {
        items.retain(|item| item.get(&filter.column).map_or(false, |v| loosely_equal(v, &filter.value)));
    }

    if let Some(order) = order {
        items.sort_by(|a, b| {
            let ordering = compare_values(a.get(&order.column), b.get(&order.column));
            match (order.ascending, a.get(&order.column), b.get(&order.column)) {
                // Los valores ausentes quedan al final en ambos sentidos
                (false, Some(va), Some(vb)) if !va.is_null() && !vb.is_null() => ordering.reverse(),
                _ => ordering,
            }
        });
    }

    Value::Array(items)
}

/// `1` y `"1"` se consideran iguales: el id puede venir como número o texto
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n.to_string() == *s
        }
        _ => a == b,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
