//! Refresco: hoja → árbol → snapshot JSON publicado.
//!
//! Como mucho corre un refresco a la vez; una petición concurrente se rechaza,
//! no se encola. Los snapshots se reemplazan de forma atómica (archivo temporal
//! y rename): un lector ve el documento viejo completo o el nuevo completo.

pub mod history;
pub mod scheduler;

pub use history::{HistoryEntry, HistoryStore};
pub use scheduler::spawn_scheduler;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::error::{DashError, Result};
use crate::excel::{convert_attendance, convert_statement, SheetSource, WorkbookSource};

/// Resultado de una hoja durante un refresco.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SheetOutcome {
    Published { departments: usize },
    Unchanged,
    InputMissing,
}

impl SheetOutcome {
    fn departments(&self) -> usize {
        match self {
            SheetOutcome::Published { departments } => *departments,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub attendance: SheetOutcome,
    pub statement: SheetOutcome,
    pub finished_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshStatus {
    pub in_progress: bool,
    pub last_refresh: Option<String>,
    pub seconds_since: Option<i64>,
}

/// Una hoja y el snapshot donde se publica.
struct Job {
    source: Arc<dyn SheetSource>,
    output: PathBuf,
}

/// Limpia la bandera de refresco en curso al terminar, sea como sea.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DashError::RefreshInProgress)?;
        Ok(InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Refresher {
    attendance: Job,
    statement: Job,
    history: Option<HistoryStore>,
    in_progress: AtomicBool,
    /// Fechas de modificación vistas en la última conversión exitosa.
    last_modified: Mutex<HashMap<String, SystemTime>>,
    last_refresh: Mutex<Option<DateTime<Utc>>>,
}

impl Refresher {
    pub fn new(
        attendance: Arc<dyn SheetSource>,
        attendance_output: impl Into<PathBuf>,
        statement: Arc<dyn SheetSource>,
        statement_output: impl Into<PathBuf>,
    ) -> Self {
        Refresher {
            attendance: Job { source: attendance, output: attendance_output.into() },
            statement: Job { source: statement, output: statement_output.into() },
            history: None,
            in_progress: AtomicBool::new(false),
            last_modified: Mutex::new(HashMap::new()),
            last_refresh: Mutex::new(None),
        }
    }

    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = Some(history);
        self
    }

    /// Libros y almacén de historial en las rutas configuradas.
    pub fn from_config(config: &Config) -> Result<Self> {
        let history = HistoryStore::open(config.history_db_path())?;
        Ok(Refresher::new(
            Arc::new(WorkbookSource::new(config.attendance_input())),
            config.attendance_output(),
            Arc::new(WorkbookSource::new(config.statement_input())),
            config.statement_output(),
        )
        .with_history(history))
    }

    pub fn attendance_output(&self) -> &Path {
        &self.attendance.output
    }

    pub fn statement_output(&self) -> &Path {
        &self.statement.output
    }

    pub fn history(&self) -> Option<&HistoryStore> {
        self.history.as_ref()
    }

    /// Convierte las hojas cuya entrada cambió desde que se escribió su snapshot.
    pub fn refresh(&self) -> Result<RefreshReport> {
        self.run(false)
    }

    /// Convierte ambas hojas sin mirar fechas de modificación.
    pub fn force_refresh(&self) -> Result<RefreshReport> {
        self.run(true)
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    pub fn status(&self) -> RefreshStatus {
        let last = self.last_refresh.lock().map(|g| *g).unwrap_or(None);
        RefreshStatus {
            in_progress: self.is_refreshing(),
            last_refresh: last.map(|t| t.to_rfc3339()),
            seconds_since: last.map(|t| (Utc::now() - t).num_seconds()),
        }
    }

    fn run(&self, force: bool) -> Result<RefreshReport> {
        let _guard = InFlight::acquire(&self.in_progress)?;
        let started = Instant::now();
        info!("refresh started (force: {})", force);

        let result = self.convert_both(force);
        let duration_ms = started.elapsed().as_millis() as i64;

        match &result {
            Ok(report) => {
                info!(
                    "refresh finished in {} ms: attendance {:?}, statement {:?}",
                    duration_ms, report.attendance, report.statement
                );
                if let Ok(mut last) = self.last_refresh.lock() {
                    *last = Some(Utc::now());
                }
                self.note_history("success", &summarize(report), report.attendance.departments(), duration_ms);
            }
            Err(e) => {
                error!("refresh failed after {} ms: {}", duration_ms, e);
                self.note_history("failed", &e.to_string(), 0, duration_ms);
            }
        }
        result
    }

    fn convert_both(&self, force: bool) -> Result<RefreshReport> {
        let attendance = self.convert(&self.attendance, force, |rows| {
            publish_json(&self.attendance.output, &convert_attendance(rows))
        })?;
        let statement = self.convert(&self.statement, force, |rows| {
            publish_json(&self.statement.output, &convert_statement(rows))
        })?;
        Ok(RefreshReport { attendance, statement, finished_at: Utc::now().to_rfc3339() })
    }

    /// Lee, convierte y publica una hoja salvo que no haya cambiado.
    fn convert<F>(&self, job: &Job, force: bool, publish: F) -> Result<SheetOutcome>
    where
        F: FnOnce(&[Vec<String>]) -> Result<usize>,
    {
        let name = job.source.describe();
        let modified = job.source.modified();
        if !force && !self.should_update(&name, modified, &job.output) {
            info!("{} unchanged, skipping", name);
            return Ok(SheetOutcome::Unchanged);
        }

        let rows = match job.source.read_rows() {
            Ok(rows) => rows,
            Err(DashError::InputMissing(path)) => {
                warn!("input not found: {}", path.display());
                return Ok(SheetOutcome::InputMissing);
            }
            Err(e) => return Err(e),
        };

        let departments = publish(&rows)?;
        info!("{} → {} ({} departments)", name, job.output.display(), departments);
        if let (Some(m), Ok(mut cache)) = (modified, self.last_modified.lock()) {
            cache.insert(name, m);
        }
        Ok(SheetOutcome::Published { departments })
    }

    /// Verdadero si falta la salida, si es más vieja que la entrada o si la
    /// entrada es posterior a la fecha registrada en la última conversión.
    fn should_update(&self, name: &str, modified: Option<SystemTime>, output: &Path) -> bool {
        let Some(input_time) = modified else {
            return true;
        };
        let Ok(output_time) = fs::metadata(output).and_then(|m| m.modified()) else {
            return true;
        };
        if input_time > output_time {
            return true;
        }
        match self.last_modified.lock() {
            Ok(cache) => cache.get(name).is_some_and(|seen| input_time > *seen),
            Err(_) => true,
        }
    }

    fn note_history(&self, status: &str, message: &str, departments: usize, duration_ms: i64) {
        if let Some(h) = &self.history {
            if let Err(e) = h.record(status, message, departments as i64, duration_ms) {
                warn!("could not record refresh history: {}", e);
            }
        }
    }
}

fn summarize(report: &RefreshReport) -> String {
    let describe = |o: &SheetOutcome| match o {
        SheetOutcome::Published { departments } => format!("published ({} departments)", departments),
        SheetOutcome::Unchanged => "unchanged".to_string(),
        SheetOutcome::InputMissing => "input missing".to_string(),
    };
    format!("attendance {}, statement {}", describe(&report.attendance), describe(&report.statement))
}

/// Escribe `value` como JSON junto a `path` y lo renombra a su lugar.
///
/// Devuelve la cantidad de entradas de primer nivel escritas.
pub fn publish_json<T: Serialize>(path: &Path, value: &[T]) -> Result<usize> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let bytes = serde_json::to_vec_pretty(value)?;
    if let Err(e) = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(value.len())
}
