use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{DashError, Result};

/// Cualquier cosa que entregue una hoja como filas de celdas de texto, en orden.
///
/// No sobrevive información de tipos: los números llegan como texto y las
/// fechas como su número de serie.
pub trait SheetSource: Send + Sync {
    fn read_rows(&self) -> Result<Vec<Vec<String>>>;

    /// Última modificación del archivo subyacente, si lo hay.
    fn modified(&self) -> Option<SystemTime> {
        None
    }

    fn describe(&self) -> String;
}

/// Convierte un `Data` de calamine a String
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        // número de serie, lo decodifica `parse_date`
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Primera hoja de un libro en disco (`.xlsx`, `.xls`, `.ods`).
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    path: PathBuf,
}

impl WorkbookSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        WorkbookSource { path: path.as_ref().to_path_buf() }
    }
}

impl SheetSource for WorkbookSource {
    fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        if !self.path.exists() {
            return Err(DashError::InputMissing(self.path.clone()));
        }
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| DashError::Sheet(e.to_string()))?;

        let names = workbook.sheet_names().to_owned();
        let Some(first) = names.first() else {
            return Err(DashError::Sheet(format!("{}: workbook has no sheets", self.path.display())));
        };

        let range = workbook.worksheet_range(first).map_err(|e| DashError::Sheet(e.to_string()))?;
        Ok(range.rows().map(|r| r.iter().map(cell_to_string).collect()).collect())
    }

    fn modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Filas ya en memoria; para tests y para quien lee las hojas por su cuenta.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub rows: Vec<Vec<String>>,
}

impl MemorySource {
    pub fn from_strs(rows: &[&[&str]]) -> Self {
        MemorySource {
            rows: rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect(),
        }
    }
}

impl SheetSource for MemorySource {
    fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        format!("<memory: {} rows>", self.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_without_fraction_print_as_integers() {
        assert_eq!(cell_to_string(&Data::Float(5.0)), "5");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::String("  231 ".into())), "231");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn missing_workbook_is_reported() {
        let src = WorkbookSource::new("/definitely/not/here.xlsx");
        assert!(matches!(src.read_rows(), Err(DashError::InputMissing(_))));
        assert!(src.modified().is_none());
    }
}
