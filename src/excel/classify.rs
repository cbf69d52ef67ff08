//! Clasificación de filas por su primera celda.
//!
//! La hoja llega como filas de texto sin tipos. Cada fila recibe exactamente un
//! rol, decidido por la etiqueta de su primera celda (y, en el registro de
//! asistencia, por la presencia de una fecha y horas). Las pruebas corren en
//! orden fijo y gana la primera que coincide.

use chrono::NaiveDate;

use crate::excel::cells::{parse_date, parse_hours, parse_int};

/// Prefijo de una fila de departamento ("Отделение " + nombre).
pub const DEPARTMENT_MARKER: &str = "Отделение ";

/// Etiquetas fijas que nunca traen datos: título, cabeceras de columna, totales.
pub const HEADER_LABELS: &[&str] = &[
    "Сводная ведомость по посещаемости",
    "Параметры:",
    "Отделение",
    "Специальность",
    "Учебная группа",
    "Студент",
    "Итого",
];

/// Columna de horas faltadas en el registro de asistencia (columna F).
pub const HOURS_COLUMN: usize = 5;

/// Familia de hoja que lee un clasificador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetShape {
    /// Registro por fecha: departamento → grupo → estudiante → eventos.
    AttendanceLog,
    /// Ведомость agregada: departamento → especialidad → grupo → totales por estudiante.
    Statement,
}

/// Qué tan estricto es reconocer un código de grupo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupRule {
    /// Hasta 10 bytes, empieza con dígito, un solo token.
    #[default]
    Loose,
    /// Hasta 15 bytes, empieza con dígito, solo dígitos y `./ -`, un solo token,
    /// y sin forma de fecha (exactamente dos `.` o exactamente dos `-`).
    Strict,
}

/// Rol semántico de una fila.
#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    Header,
    Department(String),
    Specialty(String),
    /// El nombre de grupo se pasa a minúsculas al clasificar.
    Group(String),
    Student(String),
    /// Fila de datos del registro: un evento de horas faltadas del estudiante actual.
    Attendance { date: NaiveDate, missed: i64 },
    Unknown,
}

impl RowKind {
    pub fn name(&self) -> &'static str {
        match self {
            RowKind::Header => "header",
            RowKind::Department(_) => "department",
            RowKind::Specialty(_) => "specialty",
            RowKind::Group(_) => "group",
            RowKind::Student(_) => "student",
            RowKind::Attendance { .. } => "attendance",
            RowKind::Unknown => "unknown",
        }
    }
}

/// Conteos de faltas leídos de columnas fijas de una fila de la ведомость.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SummaryCounts {
    /// Columna D: horas sin justificar.
    pub bad: i64,
    /// Columna E: horas justificadas.
    pub excused: i64,
    /// Columna H; si falta, las justificadas.
    pub total: i64,
}

impl SummaryCounts {
    /// Lee las columnas posicionales del formato esperado de la ведомость.
    pub fn from_cells(cells: &[String]) -> Self {
        let n = cells.len();
        let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");

        let excused = if n > 4 { parse_int(cell(4)) } else { 0 };
        let mut total = if n > 7 {
            parse_int(cell(7))
        } else if n > 4 {
            excused
        } else {
            0
        };
        let bad = if n > 3 { parse_int(cell(3)) } else { 0 };

        if total == 0 && excused > 0 {
            total = excused;
        }
        SummaryCounts { bad, excused, total }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0 && self.bad == 0 && self.excused == 0
    }
}

/// Una fila ya clasificada, con los números que traiga su formato.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub kind: RowKind,
    pub counts: SummaryCounts,
}

/// Clasificador de filas sin estado.
#[derive(Debug, Clone, Copy)]
pub struct RowClassifier {
    pub shape: SheetShape,
    pub group_rule: GroupRule,
}

impl RowClassifier {
    pub fn attendance_log() -> Self {
        RowClassifier { shape: SheetShape::AttendanceLog, group_rule: GroupRule::Loose }
    }

    pub fn statement() -> Self {
        RowClassifier { shape: SheetShape::Statement, group_rule: GroupRule::Loose }
    }

    pub fn with_group_rule(mut self, rule: GroupRule) -> Self {
        self.group_rule = rule;
        self
    }

    /// Clasifica una fila completa. Las filas vacías son `Unknown`.
    pub fn classify(&self, cells: &[String]) -> ClassifiedRow {
        let label = cells.first().map(|c| c.trim()).unwrap_or("");
        let counts = match self.shape {
            SheetShape::Statement => SummaryCounts::from_cells(cells),
            SheetShape::AttendanceLog => SummaryCounts::default(),
        };

        if self.shape == SheetShape::AttendanceLog && !label.is_empty() && !is_header(label) {
            let hours = cells.get(HOURS_COLUMN).and_then(|c| parse_hours(c));
            if let (Some(date), Some(h)) = (parse_date(label), hours) {
                return ClassifiedRow { kind: RowKind::Attendance { date, missed: h.trunc() as i64 }, counts };
            }
        }

        ClassifiedRow { kind: self.classify_label(label), counts }
    }

    /// Clasifica solo la etiqueta (sin detectar filas de datos).
    pub fn classify_label(&self, raw: &str) -> RowKind {
        let label = raw.trim();
        if label.is_empty() {
            return RowKind::Unknown;
        }
        if is_header(label) {
            return RowKind::Header;
        }
        if is_department(label) {
            return RowKind::Department(label.to_string());
        }
        if self.shape == SheetShape::Statement && is_specialty(label) {
            return RowKind::Specialty(label.to_string());
        }
        if is_group(label, self.group_rule) {
            return RowKind::Group(label.to_lowercase());
        }
        if is_student(label) {
            return RowKind::Student(label.to_string());
        }
        RowKind::Unknown
    }
}

pub fn is_header(label: &str) -> bool {
    HEADER_LABELS.contains(&label)
}

pub fn is_department(label: &str) -> bool {
    label.starts_with(DEPARTMENT_MARKER)
}

/// Códigos del estilo "09.02.07 Информационные системы".
pub fn is_specialty(label: &str) -> bool {
    label.len() >= 8
        && starts_with_digit(label)
        && label.contains(' ')
        && label.matches('.').count() >= 2
}

pub fn is_group(label: &str, rule: GroupRule) -> bool {
    let max_len = match rule {
        GroupRule::Loose => 10,
        GroupRule::Strict => 15,
    };
    if label.is_empty() || label.len() > max_len || !starts_with_digit(label) {
        return false;
    }
    if rule == GroupRule::Strict
        && !label.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '/' | ' ' | '-'))
    {
        return false;
    }
    if rule == GroupRule::Strict && (label.matches('.').count() == 2 || label.matches('-').count() == 2) {
        return false;
    }
    label.split_whitespace().count() == 1
}

/// Apellido / nombre / patronímico: tres tokens, el primero no numérico.
pub fn is_student(label: &str) -> bool {
    let words: Vec<&str> = label.split_whitespace().collect();
    words.len() == 3 && words[0].parse::<f64>().is_err()
}

fn starts_with_digit(label: &str) -> bool {
    label.chars().next().is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn header_literals_win_over_everything() {
        let c = RowClassifier::statement();
        assert_eq!(c.classify_label("Итого"), RowKind::Header);
        assert_eq!(c.classify_label("Отделение"), RowKind::Header);
        assert_eq!(c.classify_label("  Параметры:  "), RowKind::Header);
    }

    #[test]
    fn department_needs_marker_and_space() {
        let c = RowClassifier::statement();
        assert_eq!(
            c.classify_label("Отделение Экономики"),
            RowKind::Department("Отделение Экономики".to_string())
        );
        assert_eq!(c.classify_label("ОтделениеЭкономики"), RowKind::Unknown);
    }

    #[test]
    fn specialty_only_in_statement_shape() {
        let label = "38.02.01 Экономика и бухгалтерский учет";
        assert_eq!(RowClassifier::statement().classify_label(label), RowKind::Specialty(label.to_string()));
        assert_eq!(RowClassifier::attendance_log().classify_label(label), RowKind::Unknown);
    }

    #[test]
    fn group_rules() {
        assert!(is_group("231", GroupRule::Loose));
        assert!(is_group("1ИС-21", GroupRule::Loose));
        assert!(!is_group("1ИС-21", GroupRule::Strict));
        assert!(is_group("21-09/2024", GroupRule::Strict));
        assert!(!is_group("231 А", GroupRule::Loose));
        assert!(!is_group("А231", GroupRule::Loose));
        assert!(!is_group("12345678901", GroupRule::Loose));
        assert!(is_group("12345678901", GroupRule::Strict));
    }

    #[test]
    fn strict_rule_rejects_date_shaped_labels() {
        let c = RowClassifier::attendance_log().with_group_rule(GroupRule::Strict);
        assert_eq!(c.classify_label("01.09.2024"), RowKind::Unknown);
        assert_eq!(c.classify_label("2024-09-01"), RowKind::Unknown);
        assert_eq!(c.classify_label("09.02"), RowKind::Group("09.02".to_string()));
        assert_eq!(c.classify_label("21-09"), RowKind::Group("21-09".to_string()));
    }

    #[test]
    fn group_name_is_lowercased() {
        let c = RowClassifier::statement();
        assert_eq!(c.classify_label("1ИС"), RowKind::Group("1ис".to_string()));
    }

    #[test]
    fn student_is_three_words_not_numeric() {
        let c = RowClassifier::attendance_log();
        assert_eq!(
            c.classify_label("Иванов Иван Иванович"),
            RowKind::Student("Иванов Иван Иванович".to_string())
        );
        assert_eq!(c.classify_label("12 Иван Иванович"), RowKind::Unknown);
        assert_eq!(c.classify_label("Иванов Иван"), RowKind::Unknown);
    }

    #[test]
    fn attendance_row_requires_date_and_positive_hours() {
        let c = RowClassifier::attendance_log();
        let data = c.classify(&row(&["01.09.2024", "", "", "", "", "5"]));
        assert_eq!(
            data.kind,
            RowKind::Attendance { date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(), missed: 5 }
        );
        let no_hours = c.classify(&row(&["01.09.2024", "", "", "", "", "0"]));
        assert_eq!(no_hours.kind, RowKind::Unknown);
        let fractional = c.classify(&row(&["45536", "", "", "", "", "2.7"]));
        assert!(matches!(fractional.kind, RowKind::Attendance { missed: 2, .. }));
    }

    #[test]
    fn statement_counts_fallbacks() {
        let full = SummaryCounts::from_cells(&row(&["x", "", "", "3", "4", "", "", "9"]));
        assert_eq!(full, SummaryCounts { bad: 3, excused: 4, total: 9 });

        let short = SummaryCounts::from_cells(&row(&["x", "", "", "", "6"]));
        assert_eq!(short, SummaryCounts { bad: 0, excused: 6, total: 6 });

        let zero_total = SummaryCounts::from_cells(&row(&["x", "", "", "", "6", "", "", "0"]));
        assert_eq!(zero_total.total, 6);

        assert!(SummaryCounts::from_cells(&row(&["x"])).is_empty());
    }
}
