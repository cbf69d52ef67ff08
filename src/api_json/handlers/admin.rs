use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use super::error_response;
use crate::server::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 20;

pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "ok", "service": "attendance-dash"}))
}

/// POST /api/admin/refresh-data[?force=true]
pub async fn refresh_data_handler(state: web::Data<AppState>, query: web::Query<HashMap<String, String>>) -> impl Responder {
    let force = query.get("force").is_some_and(|v| v == "true" || v == "1");
    info!("manual refresh requested (force: {})", force);

    let refresher = Arc::clone(&state.refresher);
    let outcome = web::block(move || if force { refresher.force_refresh() } else { refresher.refresh() }).await;
    match outcome {
        Ok(Ok(report)) => HttpResponse::Ok().json(json!({"status": "success", "report": report})),
        Ok(Err(e)) => error_response(&e),
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": format!("refresh task failed: {}", e)})),
    }
}

/// GET /api/admin/refresh-status
pub async fn refresh_status_handler(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.refresher.status())
}

/// GET /api/admin/refresh-history?limit=N
pub async fn refresh_history_handler(state: web::Data<AppState>, query: web::Query<HashMap<String, String>>) -> impl Responder {
    let limit = query.get("limit").and_then(|s| s.parse::<usize>().ok()).unwrap_or(DEFAULT_HISTORY_LIMIT);
    let Some(history) = state.refresher.history() else {
        return HttpResponse::Ok().json(json!({"history": []}));
    };
    match history.recent(limit) {
        Ok(rows) => HttpResponse::Ok().json(json!({"history": rows})),
        Err(e) => error_response(&e),
    }
}
