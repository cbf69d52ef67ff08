//! Frontera query-string → parámetros de consulta.
//!
//! Claves aceptadas: `department`, `group`, `student`, `q` (búsqueda libre),
//! `date` (ISO o `today`), `date_from`, `date_to`, `period` (`7d`/`30d`/`90d`)
//! y `missed_min` (entero no negativo). Un valor vacío cuenta como ausente; un
//! `missed_min` o `period` ilegible desactiva ese filtro.

pub mod handlers;

use std::collections::HashMap;

use crate::analytics::{FilterParams, Period};

fn text(query: &HashMap<String, String>, key: &str) -> Option<String> {
    query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

pub fn filter_params_from_query(query: &HashMap<String, String>) -> FilterParams {
    FilterParams {
        department: text(query, "department"),
        group: text(query, "group"),
        student: text(query, "student"),
        search: text(query, "q"),
        date: text(query, "date"),
        date_from: text(query, "date_from"),
        date_to: text(query, "date_to"),
        period: text(query, "period").and_then(|p| Period::parse(&p)),
        missed_min: text(query, "missed_min").and_then(|v| v.parse::<i64>().ok()).filter(|n| *n >= 0),
    }
}
