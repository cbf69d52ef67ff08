use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(90 * 60);
pub const DEFAULT_ABSENCE_THRESHOLD: i64 = 10;

/// Configuración en tiempo de ejecución, leída del entorno (y de `.env` si existe).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub attendance_input: PathBuf,
    pub attendance_output: PathBuf,
    pub statement_input: PathBuf,
    pub statement_output: PathBuf,
    pub history_db_path: PathBuf,
    pub refresh_interval: Duration,
    pub absence_threshold: i64,
    /// Vacío significa cualquier origen.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("."),
            attendance_input: PathBuf::from("Посещаемость.xlsx"),
            attendance_output: PathBuf::from("public/attendance.json"),
            statement_input: PathBuf::from("ведомость.xls"),
            statement_output: PathBuf::from("public/summary.json"),
            history_db_path: PathBuf::from("data/refresh_history.db"),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            absence_threshold: DEFAULT_ABSENCE_THRESHOLD,
            cors_origins: Vec::new(),
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();
        Config::from_lookup(var)
    }

    /// Construye desde cualquier búsqueda clave → valor; lo ausente o inválido queda por defecto.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Self {
        let mut c = Config::default();
        if let Some(v) = get("SERVER_HOST") {
            c.host = v;
        }
        if let Some(p) = get("SERVER_PORT").and_then(|v| v.parse().ok()) {
            c.port = p;
        }
        if let Some(v) = get("DATA_DIR") {
            c.data_dir = PathBuf::from(v);
        }
        if let Some(v) = get("ATTENDANCE_INPUT") {
            c.attendance_input = PathBuf::from(v);
        }
        if let Some(v) = get("ATTENDANCE_OUTPUT") {
            c.attendance_output = PathBuf::from(v);
        }
        if let Some(v) = get("STATEMENT_INPUT") {
            c.statement_input = PathBuf::from(v);
        }
        if let Some(v) = get("STATEMENT_OUTPUT") {
            c.statement_output = PathBuf::from(v);
        }
        if let Some(v) = get("HISTORY_DB_PATH") {
            c.history_db_path = PathBuf::from(v);
        }
        if let Some(d) = get("REFRESH_INTERVAL").and_then(|v| parse_interval(&v)) {
            c.refresh_interval = d;
        }
        if let Some(t) = get("ABSENCE_THRESHOLD").and_then(|v| v.parse::<i64>().ok()) {
            if (1..=100).contains(&t) {
                c.absence_threshold = t;
            }
        }
        if let Some(v) = get("CORS_ORIGINS") {
            c.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty() && *o != "*")
                .map(str::to_string)
                .collect();
        }
        c
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() { p.to_path_buf() } else { self.data_dir.join(p) }
    }

    pub fn attendance_input(&self) -> PathBuf {
        self.resolve(&self.attendance_input)
    }

    pub fn attendance_output(&self) -> PathBuf {
        self.resolve(&self.attendance_output)
    }

    pub fn statement_input(&self) -> PathBuf {
        self.resolve(&self.statement_input)
    }

    pub fn statement_output(&self) -> PathBuf {
        self.resolve(&self.statement_output)
    }

    pub fn history_db_path(&self) -> PathBuf {
        self.resolve(&self.history_db_path)
    }
}

/// `30s`, `90m`, `2h` o un número de minutos sin unidad. Cero se rechaza.
pub fn parse_interval(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (i, c) if c.is_ascii_alphabetic() => (&raw[..i], c.to_ascii_lowercase()),
        _ => (raw, 'm'),
    };
    let n: u64 = digits.trim().parse().ok()?;
    if n == 0 {
        return None;
    }
    let secs = match unit {
        's' => n,
        'm' => n.checked_mul(60)?,
        'h' => n.checked_mul(3600)?,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}
