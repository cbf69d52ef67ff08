use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api_json::handlers::{
    drill_departments_handler, drill_groups_handler, drill_students_handler, health_handler, list_handler,
    refresh_data_handler, refresh_history_handler, refresh_status_handler, statement_handler, summary_handler,
};
use crate::config::Config;
use crate::refresh::Refresher;

/// Compartido por todas las peticiones.
pub struct AppState {
    pub refresher: Arc<Refresher>,
    pub attendance_path: PathBuf,
    pub statement_path: PathBuf,
    pub absence_threshold: i64,
}

impl AppState {
    pub fn new(refresher: Arc<Refresher>, absence_threshold: i64) -> Self {
        AppState {
            attendance_path: refresher.attendance_output().to_path_buf(),
            statement_path: refresher.statement_output().to_path_buf(),
            refresher,
            absence_threshold,
        }
    }
}

/// Rutas bajo `/api`; las usan `run_server` y los tests HTTP.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_handler))
            .route("/attendance", web::get().to(list_handler))
            .route("/attendance/summary", web::get().to(summary_handler))
            .route("/attendance/drill/departments", web::get().to(drill_departments_handler))
            .route("/attendance/drill/groups", web::get().to(drill_groups_handler))
            .route("/attendance/drill/students", web::get().to(drill_students_handler))
            .route("/statement", web::get().to(statement_handler))
            .route("/admin/refresh-data", web::post().to(refresh_data_handler))
            .route("/admin/refresh-status", web::get().to(refresh_status_handler))
            .route("/admin/refresh-history", web::get().to(refresh_history_handler)),
    );
}

fn cors(origins: &[String]) -> Cors {
    let cors = Cors::default().allow_any_method().allow_any_header().max_age(3600);
    if origins.is_empty() {
        return cors.allow_any_origin();
    }
    origins.iter().fold(cors, |c, o| c.allowed_origin(o))
}

pub async fn run_server(config: &Config, refresher: Arc<Refresher>) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(refresher, config.absence_threshold));
    let origins = config.cors_origins.clone();
    let bind = config.bind_addr();
    info!("listening on http://{}", bind);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins))
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}
