//! Módulo `excel`: de filas crudas de la hoja a árboles de asistencia.
//!
//! Submódulos:
//! - `io`: frontera de lectura (`SheetSource`) y libro leído con calamine
//! - `cells`: parseo de fechas y enteros
//! - `classify`: heurísticas de clasificación de filas
//! - `builder`: bucle común clasificar → contextualizar → insertar
//! - `attendance_log`: registro de asistencia plano por fecha
//! - `statement`: ведомость con totales ya agregados

pub mod io;
pub mod cells;
pub mod classify;
pub mod builder;
pub mod attendance_log;
pub mod statement;

pub use io::{cell_to_string, MemorySource, SheetSource, WorkbookSource};
pub use cells::{parse_date, parse_hours, parse_int};
pub use classify::{ClassifiedRow, GroupRule, RowClassifier, RowKind, SheetShape, SummaryCounts};
pub use builder::{build_tree, ParseContext, SheetLayout};
pub use attendance_log::{build_attendance, convert_attendance, AttendanceLogLayout};
pub use statement::{build_statement, convert_statement, StatementLayout};
