// Biblioteca raíz del crate `attendance-dash`.
// Hoja de cálculo → árbol → JSON publicado → consultas con filtros y drill-down.
pub mod error;
pub mod config;
pub mod excel;
pub mod models;
pub mod analytics;
pub mod refresh;
pub mod api_json;
pub mod server;

pub use error::{DashError, Result};
pub use config::Config;
pub use refresh::Refresher;

/// Ejecuta el servidor HTTP (reexport para usarlo desde `main`)
pub use server::run_server;
