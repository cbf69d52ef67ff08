// --- Panel de asistencia - Archivo principal ---

use attendance_dash::refresh::spawn_scheduler;
use attendance_dash::{run_server, Config, Refresher};
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("=== Attendance dashboard (API) ===");

    let refresher = match Refresher::from_config(&config) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            error!("cannot open refresh history at {}: {}", config.history_db_path().display(), e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    let _scheduler = spawn_scheduler(Arc::clone(&refresher), config.refresh_interval);
    run_server(&config, refresher).await
}
