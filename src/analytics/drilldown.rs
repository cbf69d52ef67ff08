//! Drill-down: agregados por departamento, grupo y estudiante sobre registros filtrados.
//!
//! El tamaño de la nómina ("cuántos estudiantes hay") sale siempre de la
//! jerarquía completa sin filtrar; los ausentes ("cuántos estudiantes distintos
//! aparecen en los registros filtrados") salen del conjunto filtrado. Se cuentan
//! por (departamento, grupo, estudiante) distinto, nunca por registro.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::{DashError, Result};
use crate::models::{DepartmentDoc, FlatRecord};

/// Nómina por departamento y por grupo, tomada del árbol completo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    /// Solo departamentos con al menos un estudiante.
    by_department: BTreeMap<String, usize>,
    by_group: BTreeMap<String, BTreeMap<String, usize>>,
}

impl Roster {
    pub fn from_documents(departments: &[DepartmentDoc]) -> Self {
        let mut roster = Roster::default();
        for d in departments {
            let groups = roster.by_group.entry(d.department.clone()).or_default();
            let mut n = 0;
            for g in &d.groups {
                *groups.entry(g.group.clone()).or_default() += g.students.len();
                n += g.students.len();
            }
            if n > 0 {
                *roster.by_department.entry(d.department.clone()).or_default() += n;
            }
        }
        roster
    }

    pub fn department_total(&self, department: &str) -> usize {
        self.by_department.get(department).copied().unwrap_or(0)
    }

    pub fn groups_of(&self, department: &str) -> Option<&BTreeMap<String, usize>> {
        self.by_group.get(department)
    }

    pub fn total(&self) -> usize {
        self.by_department.values().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentDrill {
    pub department: String,
    pub total: usize,
    pub absent: usize,
    pub missed_total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDrill {
    pub group: String,
    pub total: usize,
    pub absent: usize,
    pub missed_total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentDrill {
    pub student: String,
    pub missed_total: i64,
    pub records: usize,
    /// Fechas de los registros que coinciden, en orden de registro.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    pub total_students: usize,
    pub present: usize,
    pub absent: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub by_department: Vec<DepartmentDrill>,
}

/// Ausentes y horas sumadas por departamento sobre los registros filtrados.
#[derive(Default)]
struct DepartmentTally {
    absent: BTreeMap<String, usize>,
    missed: BTreeMap<String, i64>,
    /// Departamentos tocados por el conjunto filtrado.
    in_scope: BTreeSet<String>,
    distinct: usize,
}

impl DepartmentTally {
    fn from_records(filtered: &[FlatRecord]) -> Self {
        let mut tally = DepartmentTally::default();
        let mut seen: HashSet<(&str, &str, &str)> = HashSet::new();
        for rec in filtered {
            tally.in_scope.insert(rec.department.clone());
            if seen.insert((&rec.department, &rec.group, &rec.student)) {
                *tally.absent.entry(rec.department.clone()).or_default() += 1;
            }
            *tally.missed.entry(rec.department.clone()).or_default() += rec.missed;
        }
        tally.distinct = seen.len();
        tally
    }

    /// Departamentos a reportar: los tocados, o todos los de la nómina si nada coincidió.
    fn departments<'a>(&'a self, roster: &'a Roster) -> Vec<&'a str> {
        if self.in_scope.is_empty() {
            roster.by_department.keys().map(String::as_str).collect()
        } else {
            self.in_scope.iter().map(String::as_str).collect()
        }
    }

    fn rows(&self, roster: &Roster) -> Vec<DepartmentDrill> {
        self.departments(roster)
            .into_iter()
            .map(|d| DepartmentDrill {
                department: d.to_string(),
                total: roster.department_total(d),
                absent: self.absent.get(d).copied().unwrap_or(0),
                missed_total: self.missed.get(d).copied().unwrap_or(0),
            })
            .collect()
    }
}

/// Cifras generales: nómina de los departamentos tocados contra ausentes distintos.
pub fn build_summary(roster: &Roster, filtered: &[FlatRecord]) -> SummaryView {
    let tally = DepartmentTally::from_records(filtered);
    let by_department = tally.rows(roster);
    let total_students: usize = by_department.iter().map(|d| d.total).sum();
    let absent = tally.distinct;

    SummaryView {
        total_students,
        present: total_students.saturating_sub(absent),
        absent,
        by_department,
    }
}

pub fn drill_departments(roster: &Roster, filtered: &[FlatRecord]) -> Vec<DepartmentDrill> {
    DepartmentTally::from_records(filtered).rows(roster)
}

/// Grupos de un departamento, incluidos los que no tienen registros.
pub fn drill_groups(roster: &Roster, filtered: &[FlatRecord], department: Option<&str>) -> Result<Vec<GroupDrill>> {
    let department = required(department, "department")?;
    let Some(groups) = roster.groups_of(department) else {
        return Ok(Vec::new());
    };

    let mut absent: BTreeMap<&str, usize> = BTreeMap::new();
    let mut missed: BTreeMap<&str, i64> = BTreeMap::new();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    for rec in filtered.iter().filter(|r| r.department == department) {
        if seen.insert((&rec.group, &rec.student)) {
            *absent.entry(&rec.group).or_default() += 1;
        }
        *missed.entry(&rec.group).or_default() += rec.missed;
    }

    Ok(groups
        .iter()
        .map(|(group, &total)| GroupDrill {
            group: group.clone(),
            total,
            absent: absent.get(group.as_str()).copied().unwrap_or(0),
            missed_total: missed.get(group.as_str()).copied().unwrap_or(0),
        })
        .collect())
}

/// Estudiantes de un grupo con sus horas sumadas y sus fechas.
pub fn drill_students(filtered: &[FlatRecord], department: Option<&str>, group: Option<&str>) -> Result<Vec<StudentDrill>> {
    let department = required(department, "department")?;
    let group = required(group, "group")?;

    let mut by_student: BTreeMap<&str, StudentDrill> = BTreeMap::new();
    for rec in filtered.iter().filter(|r| r.department == department && r.group == group) {
        let entry = by_student.entry(&rec.student).or_insert_with(|| StudentDrill {
            student: rec.student.clone(),
            missed_total: 0,
            records: 0,
            dates: Vec::new(),
        });
        entry.missed_total += rec.missed;
        entry.records += 1;
        entry.dates.push(rec.date.clone());
    }
    Ok(by_student.into_values().collect())
}

/// Valor del parámetro recortado y no vacío, o `MissingParameter(name)`.
pub fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DashError::MissingParameter(name)),
    }
}
