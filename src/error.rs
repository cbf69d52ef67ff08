use std::path::PathBuf;
use thiserror::Error;

/// Errores del refresco y de la frontera de consultas.
///
/// El parseo de celdas y la clasificación de filas nunca fallan: una celda
/// inservible es "sin valor" y una fila inservible se salta.
#[derive(Debug, Error)]
pub enum DashError {
    /// Se pidió un drill-down sin uno de sus parámetros obligatorios.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("refresh already in progress")]
    RefreshInProgress,

    #[error("input file not found: {0}")]
    InputMissing(PathBuf),

    #[error("failed to read sheet: {0}")]
    Sheet(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("history store: {0}")]
    History(#[from] rusqlite::Error),
}

impl DashError {
    /// Verdadero para errores del cliente, no de los datos ni del host.
    pub fn is_validation(&self) -> bool {
        matches!(self, DashError::MissingParameter(_))
    }
}

pub type Result<T> = std::result::Result<T, DashError>;
