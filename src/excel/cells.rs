//! Conversión de celdas de texto a fechas y números.
//!
//! Nada aquí sabe de filas ni de contexto: cada función recibe el texto de una
//! celda y devuelve un valor normalizado o "sin valor".

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Las fechas seriales cuentan días desde esta época (1899-12-30).
pub fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

enum Layout {
    WithTime(&'static str),
    Date(&'static str),
    /// Formatos de año con dos dígitos; los de cuatro rechazan años menores a 1000.
    ShortYear(&'static str),
}

// chrono acepta uno o dos dígitos en %d, %m y %H; eso cubre también las
// variantes "2.1.2006" y "2.1.2006 0:00:00".
const DATE_LAYOUTS: &[Layout] = &[
    Layout::WithTime("%d.%m.%Y %H:%M:%S"),
    Layout::Date("%d.%m.%Y"),
    Layout::Date("%d/%m/%Y"),
    Layout::Date("%Y-%m-%d"),
    Layout::ShortYear("%d.%m.%y"),
    Layout::ShortYear("%d/%m/%y"),
    Layout::Date("%m/%d/%Y"),
    Layout::Date("%m-%d-%Y"),
];

/// Decodifica un número de serie (días enteros desde la época).
///
/// Solo se aceptan valores en `[1, 100000)`; la parte fraccionaria es la hora
/// del día y se descarta.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..100_000.0).contains(&serial) {
        return None;
    }
    serial_epoch().checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Inversa de [`serial_to_date`], para hojas que guardan fechas como números.
pub fn date_to_serial(date: NaiveDate) -> i64 {
    (date - serial_epoch()).num_days()
}

/// Interpreta una celda como fecha.
///
/// Primero prueba el número de serie y luego cada formato de texto en orden.
/// `None` significa "no es una fecha", nunca un error.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(num) = value.parse::<f64>() {
        if let Some(date) = serial_to_date(num) {
            return Some(date);
        }
    }

    for layout in DATE_LAYOUTS {
        let parsed = match layout {
            Layout::WithTime(fmt) => NaiveDateTime::parse_from_str(value, fmt)
                .ok()
                .map(|dt| dt.date())
                .filter(|d| d.year() >= 1000),
            Layout::Date(fmt) => NaiveDate::parse_from_str(value, fmt).ok().filter(|d| d.year() >= 1000),
            Layout::ShortYear(fmt) => NaiveDate::parse_from_str(value, fmt).ok(),
        };
        if parsed.is_some() {
            return parsed;
        }
    }
    None
}

/// Interpreta una celda como entero; 0 por defecto.
///
/// Si no es entero, prueba como flotante truncado hacia cero ("7.9" -> 7).
pub fn parse_int(raw: &str) -> i64 {
    let value = raw.trim();
    if value.is_empty() {
        return 0;
    }
    if let Ok(n) = value.parse::<i64>() {
        return n;
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() => f.trunc() as i64,
        _ => 0,
    }
}

/// Interpreta una celda de horas; solo cuentan valores estrictamente positivos.
pub fn parse_hours(raw: &str) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<f64>() {
        Ok(h) if h.is_finite() && h > 0.0 => Some(h),
        _ => None,
    }
}
