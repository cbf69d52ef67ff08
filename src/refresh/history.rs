use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Una fila de `refresh_history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    /// RFC 3339, UTC.
    pub ts: String,
    pub status: String,
    pub message: String,
    /// Departamentos publicados por la conversión de asistencia; 0 si se omitió.
    pub departments: i64,
    pub duration_ms: i64,
}

/// Historial de refrescos en SQLite. Cada llamada abre una conexión de corta vida.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Crea el directorio padre, la base de datos y la tabla si no existen.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let conn = Connection::open(&path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS refresh_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ts TEXT NOT NULL,
                status TEXT NOT NULL,
                message TEXT,
                departments INTEGER,
                duration_ms INTEGER
            )",
            [],
        )?;
        Ok(HistoryStore { path })
    }

    pub fn record(&self, status: &str, message: &str, departments: i64, duration_ms: i64) -> Result<()> {
        let conn = Connection::open(&self.path)?;
        let ts = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO refresh_history (ts, status, message, departments, duration_ms)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![ts, status, message, departments, duration_ms],
        )?;
        Ok(())
    }

    /// Los más recientes primero.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let conn = Connection::open(&self.path)?;
        let mut stmt = conn.prepare(
            "SELECT id, ts, status, COALESCE(message, ''), COALESCE(departments, 0), COALESCE(duration_ms, 0)
             FROM refresh_history ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(HistoryEntry {
                id: row.get(0)?,
                ts: row.get(1)?,
                status: row.get(2)?,
                message: row.get(3)?,
                departments: row.get(4)?,
                duration_ms: row.get(5)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}
