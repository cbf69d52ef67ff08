//! Consultas sobre los snapshots publicados.
//!
//! - `filters`: filtro conjuntivo sobre registros planos
//! - `drilldown`: resumen y agregados por departamento / grupo / estudiante
//! - `alerts`: avisos por grupo según umbral de faltas
//!
//! Toda consulta parte del JSON publicado: el snapshot se carga y se vuelve a
//! aplanar, nunca se modifica en el lugar.

pub mod filters;
pub mod drilldown;
pub mod alerts;

pub use filters::{filter_records, DateWindow, FilterParams, Period, RecordFilter};
pub use drilldown::{
    build_summary, drill_departments, drill_groups, drill_students, required, DepartmentDrill, GroupDrill, Roster,
    StudentDrill, SummaryView,
};
pub use alerts::{check_alerts, GroupAlert};

use std::fs;
use std::path::Path;

use crate::error::{DashError, Result};
use crate::models::{flatten, DepartmentDoc, FlatRecord, SummaryDepartmentDoc};

pub fn load_attendance(path: &Path) -> Result<Vec<DepartmentDoc>> {
    if !path.exists() {
        return Err(DashError::InputMissing(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn load_statement(path: &Path) -> Result<Vec<SummaryDepartmentDoc>> {
    if !path.exists() {
        return Err(DashError::InputMissing(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Árbol de asistencia cargado junto con sus registros planos.
#[derive(Debug, Clone, Default)]
pub struct AttendanceSnapshot {
    pub departments: Vec<DepartmentDoc>,
    pub records: Vec<FlatRecord>,
}

impl AttendanceSnapshot {
    pub fn from_documents(departments: Vec<DepartmentDoc>) -> Self {
        let records = flatten(&departments);
        AttendanceSnapshot { departments, records }
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_attendance(path).map(Self::from_documents)
    }

    pub fn roster(&self) -> Roster {
        Roster::from_documents(&self.departments)
    }
}
