use actix_web::{web, HttpResponse, Responder};
use chrono::{Local, NaiveDate};
use log::error;
use serde_json::json;
use std::collections::HashMap;

use super::error_response;
use crate::analytics::{
    build_summary, check_alerts, drill_departments, drill_groups, drill_students, filter_records, load_statement,
    required, AttendanceSnapshot,
};
use crate::api_json::filter_params_from_query;
use crate::models::FlatRecord;
use crate::server::AppState;

type Query = web::Query<HashMap<String, String>>;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

struct FlatRecordSet {
    snapshot: AttendanceSnapshot,
    filtered: Vec<FlatRecord>,
}

/// Carga el árbol publicado y aplica los filtros de la consulta.
fn load_filtered(state: &AppState, query: &HashMap<String, String>) -> Result<FlatRecordSet, HttpResponse> {
    let snapshot = AttendanceSnapshot::load(&state.attendance_path).map_err(|e| {
        error!("cannot load attendance snapshot: {}", e);
        HttpResponse::InternalServerError().json(json!({"error": format!("cannot load attendance: {}", e)}))
    })?;
    let params = filter_params_from_query(query);
    let filtered = filter_records(&snapshot.records, &params, today());
    Ok(FlatRecordSet { snapshot, filtered })
}

/// GET /api/attendance
pub async fn list_handler(state: web::Data<AppState>, query: Query) -> impl Responder {
    match load_filtered(&state, &query) {
        Ok(set) => {
            check_alerts(&set.filtered, state.absence_threshold);
            HttpResponse::Ok().json(set.filtered)
        }
        Err(resp) => resp,
    }
}

/// GET /api/attendance/summary
pub async fn summary_handler(state: web::Data<AppState>, query: Query) -> impl Responder {
    match load_filtered(&state, &query) {
        Ok(set) => HttpResponse::Ok().json(build_summary(&set.snapshot.roster(), &set.filtered)),
        Err(resp) => resp,
    }
}

/// GET /api/attendance/drill/departments
pub async fn drill_departments_handler(state: web::Data<AppState>, query: Query) -> impl Responder {
    match load_filtered(&state, &query) {
        Ok(set) => HttpResponse::Ok().json(drill_departments(&set.snapshot.roster(), &set.filtered)),
        Err(resp) => resp,
    }
}

/// GET /api/attendance/drill/groups?department=...
pub async fn drill_groups_handler(state: web::Data<AppState>, query: Query) -> impl Responder {
    let department = match required(query.get("department").map(String::as_str), "department") {
        Ok(d) => d.to_string(),
        Err(e) => return error_response(&e),
    };
    let set = match load_filtered(&state, &query) {
        Ok(set) => set,
        Err(resp) => return resp,
    };
    match drill_groups(&set.snapshot.roster(), &set.filtered, Some(&department)) {
        Ok(groups) => HttpResponse::Ok().json(groups),
        Err(e) => error_response(&e),
    }
}

/// GET /api/attendance/drill/students?department=...&group=...
pub async fn drill_students_handler(state: web::Data<AppState>, query: Query) -> impl Responder {
    let department = query.get("department").map(String::as_str);
    let group = query.get("group").map(String::as_str);
    if let Err(e) = required(department, "department").and_then(|_| required(group, "group")) {
        return error_response(&e);
    }
    let set = match load_filtered(&state, &query) {
        Ok(set) => set,
        Err(resp) => return resp,
    };
    match drill_students(&set.filtered, department, group) {
        Ok(students) => HttpResponse::Ok().json(students),
        Err(e) => error_response(&e),
    }
}

/// GET /api/statement
pub async fn statement_handler(state: web::Data<AppState>) -> impl Responder {
    match load_statement(&state.statement_path) {
        Ok(departments) => HttpResponse::Ok().json(departments),
        Err(e) => {
            error!("cannot load statement snapshot: {}", e);
            error_response(&e)
        }
    }
}
