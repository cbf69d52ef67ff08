pub mod attendance;
pub mod admin;

pub use attendance::*;
pub use admin::*;

use actix_web::HttpResponse;
use serde_json::json;

use crate::error::DashError;

/// 400 para errores del cliente, 409 si ya hay un refresco en curso, 500 en otro caso.
pub fn error_response(e: &DashError) -> HttpResponse {
    let body = json!({"error": e.to_string()});
    match e {
        _ if e.is_validation() => HttpResponse::BadRequest().json(body),
        DashError::RefreshInProgress => HttpResponse::Conflict().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}
