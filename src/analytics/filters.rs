//! Filtros sobre registros planos de asistencia.
//!
//! Todo filtro activo debe cumplirse (AND estricto); los inactivos son `None`.
//! La salida conserva el orden de entrada.

use chrono::{Duration, NaiveDate};

use crate::models::FlatRecord;

/// Ventanas relativas que terminan hoy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Last7Days,
    Last30Days,
    Last90Days,
}

impl Period {
    /// `7d`, `30d` o `90d`; cualquier otra cosa no es un período.
    pub fn parse(raw: &str) -> Option<Period> {
        match raw.trim() {
            "7d" => Some(Period::Last7Days),
            "30d" => Some(Period::Last30Days),
            "90d" => Some(Period::Last90Days),
            _ => None,
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Period::Last7Days => 7,
            Period::Last30Days => 30,
            Period::Last90Days => 90,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    pub department: Option<String>,
    pub group: Option<String>,
    pub student: Option<String>,
    /// Subcadena sin distinguir mayúsculas sobre departamento, grupo y estudiante.
    pub search: Option<String>,
    /// Fecha ISO exacta o la palabra `today`.
    pub date: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub period: Option<Period>,
    /// `None` es sin umbral, que no es lo mismo que 0.
    pub missed_min: Option<i64>,
}

/// Restricción de fechas resuelta desde período / rango / fecha exacta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateWindow {
    Any,
    Range { from: Option<String>, to: Option<String> },
    Exact(String),
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl FilterParams {
    /// Un período gana sobre un rango explícito y un rango sobre una fecha.
    pub fn window(&self, today: NaiveDate) -> DateWindow {
        if let Some(period) = self.period {
            return DateWindow::Range {
                from: Some(iso(today - Duration::days(period.days()))),
                to: Some(iso(today)),
            };
        }
        if self.date_from.is_some() || self.date_to.is_some() {
            return DateWindow::Range { from: self.date_from.clone(), to: self.date_to.clone() };
        }
        match self.date.as_deref() {
            Some("today") => DateWindow::Exact(iso(today)),
            Some(d) => DateWindow::Exact(d.to_string()),
            None => DateWindow::Any,
        }
    }

    pub fn compile(&self, today: NaiveDate) -> RecordFilter {
        RecordFilter {
            department: self.department.clone(),
            group: self.group.clone(),
            student: self.student.clone(),
            search: self.search.as_ref().map(|s| s.to_lowercase()),
            missed_min: self.missed_min,
            window: self.window(today),
        }
    }
}

/// Predicado compilado; la conjunción de todos los filtros activos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    department: Option<String>,
    group: Option<String>,
    student: Option<String>,
    search: Option<String>,
    missed_min: Option<i64>,
    window: DateWindow,
}

impl RecordFilter {
    pub fn matches(&self, rec: &FlatRecord) -> bool {
        if self.department.as_ref().is_some_and(|d| rec.department != *d) {
            return false;
        }
        if self.group.as_ref().is_some_and(|g| rec.group != *g) {
            return false;
        }
        if self.student.as_ref().is_some_and(|s| rec.student != *s) {
            return false;
        }
        if let Some(needle) = &self.search {
            let hit = rec.department.to_lowercase().contains(needle)
                || rec.group.to_lowercase().contains(needle)
                || rec.student.to_lowercase().contains(needle);
            if !hit {
                return false;
            }
        }
        if self.missed_min.is_some_and(|min| rec.missed < min) {
            return false;
        }
        // las fechas ISO se ordenan bien como texto
        match &self.window {
            DateWindow::Any => true,
            DateWindow::Exact(d) => rec.date == *d,
            DateWindow::Range { from, to } => {
                from.as_ref().is_none_or(|f| rec.date.as_str() >= f.as_str())
                    && to.as_ref().is_none_or(|t| rec.date.as_str() <= t.as_str())
            }
        }
    }

    pub fn apply(&self, records: &[FlatRecord]) -> Vec<FlatRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Filtra `records` con `params`; los períodos relativos se resuelven contra `today`.
pub fn filter_records(records: &[FlatRecord], params: &FilterParams, today: NaiveDate) -> Vec<FlatRecord> {
    params.compile(today).apply(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(dept: &str, group: &str, student: &str, date: &str, missed: i64) -> FlatRecord {
        FlatRecord {
            department: dept.into(),
            group: group.into(),
            student: student.into(),
            date: date.into(),
            missed,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()
    }

    #[test]
    fn missed_min_keeps_threshold_and_above() {
        let records = vec![
            rec("Д", "231", "А Б В", "2024-09-01", 5),
            rec("Д", "231", "А Б В", "2024-09-02", 10),
            rec("Д", "231", "А Б В", "2024-09-03", 15),
        ];
        let params = FilterParams { missed_min: Some(10), ..Default::default() };
        let out = filter_records(&records, &params, today());
        let missed: Vec<i64> = out.iter().map(|r| r.missed).collect();
        assert_eq!(missed, vec![10, 15]);
    }

    #[test]
    fn absent_threshold_is_not_zero() {
        let records = vec![rec("Д", "231", "А Б В", "2024-09-01", 0)];
        let out = filter_records(&records, &FilterParams::default(), today());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let records = vec![
            rec("Отделение Экономики", "231", "Иванов Иван Иванович", "2024-09-01", 2),
            rec("Отделение Права", "1ис", "Петров Петр Петрович", "2024-09-01", 2),
        ];
        let by_dept = FilterParams { search: Some("экономики".into()), ..Default::default() };
        assert_eq!(filter_records(&records, &by_dept, today()).len(), 1);
        let by_group = FilterParams { search: Some("1ИС".into()), ..Default::default() };
        assert_eq!(filter_records(&records, &by_group, today())[0].student, "Петров Петр Петрович");
    }

    #[test]
    fn period_overrides_explicit_range() {
        let records = vec![
            rec("Д", "231", "А Б В", "2024-09-22", 1),
            rec("Д", "231", "А Б В", "2024-09-23", 1),
            rec("Д", "231", "А Б В", "2024-09-30", 1),
            rec("Д", "231", "А Б В", "2024-10-01", 1),
        ];
        let params = FilterParams {
            period: Some(Period::Last7Days),
            date_from: Some("2000-01-01".into()),
            ..Default::default()
        };
        let dates: Vec<String> = filter_records(&records, &params, today()).into_iter().map(|r| r.date).collect();
        assert_eq!(dates, vec!["2024-09-23", "2024-09-30"]);
    }

    #[test]
    fn open_ended_range_and_today_keyword() {
        let records = vec![rec("Д", "231", "А Б В", "2024-09-01", 1), rec("Д", "231", "А Б В", "2024-09-30", 1)];
        let from_only = FilterParams { date_from: Some("2024-09-15".into()), ..Default::default() };
        assert_eq!(filter_records(&records, &from_only, today()).len(), 1);
        let to_only = FilterParams { date_to: Some("2024-09-15".into()), ..Default::default() };
        assert_eq!(filter_records(&records, &to_only, today())[0].date, "2024-09-01");
        let today_kw = FilterParams { date: Some("today".into()), ..Default::default() };
        assert_eq!(filter_records(&records, &today_kw, today())[0].date, "2024-09-30");
    }

    #[test]
    fn period_parse() {
        assert_eq!(Period::parse("30d"), Some(Period::Last30Days));
        assert_eq!(Period::parse("1y"), None);
    }
}
