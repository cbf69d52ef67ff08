use actix_web::{test, web, App};
use attendance_dash::excel::MemorySource;
use attendance_dash::refresh::Refresher;
use attendance_dash::server::{configure, AppState};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

fn refresher(dir: &Path) -> Arc<Refresher> {
    Arc::new(Refresher::new(
        Arc::new(MemorySource::from_strs(&[
            &["Отделение Экономики"],
            &["231"],
            &["Иванов Иван Иванович"],
            &["01.09.2024", "", "", "", "", "5"],
            &["02.09.2024", "", "", "", "", "7"],
            &["Петров Петр Петрович"],
            &["01.09.2024", "", "", "", "", "1"],
        ])),
        dir.join("public/attendance.json"),
        Arc::new(MemorySource::from_strs(&[
            &["Отделение Экономики"],
            &["38.02.01 Экономика и бухгалтерский учет"],
            &["231"],
            &["Иванов Иван Иванович", "", "", "2", "10", "", "", "12"],
        ])),
        dir.join("public/summary.json"),
    ))
}

macro_rules! app {
    ($refresher:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new($refresher, 10)))
                .configure(configure),
        )
        .await
    };
}

#[actix_web::test]
async fn health_is_ok() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(refresher(dir.path()));
    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn missing_snapshot_is_a_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(refresher(dir.path()));
    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/attendance").to_request()).await;
    assert_eq!(resp.status().as_u16(), 500);
}

#[actix_web::test]
async fn drill_groups_without_department_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(refresher(dir.path()));
    let req = test::TestRequest::get().uri("/api/attendance/drill/groups?department=").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("department"));
}

#[actix_web::test]
async fn refresh_then_query() {
    let dir = tempfile::tempdir().unwrap();
    let r = refresher(dir.path());
    let app = app!(Arc::clone(&r));

    let resp = test::call_service(&app, test::TestRequest::post().uri("/api/admin/refresh-data").to_request()).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get().uri("/api/attendance?missed_min=5").to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.as_array().unwrap().len(), 2);

    let req = test::TestRequest::get().uri("/api/attendance/summary").to_request();
    let summary: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary["total_students"], 2);
    assert_eq!(summary["absent"], 2);
    assert_eq!(summary["present"], 0);

    let req = test::TestRequest::get()
        .uri("/api/attendance/drill/students?department=%D0%9E%D1%82%D0%B4%D0%B5%D0%BB%D0%B5%D0%BD%D0%B8%D0%B5%20%D0%AD%D0%BA%D0%BE%D0%BD%D0%BE%D0%BC%D0%B8%D0%BA%D0%B8&group=231")
        .to_request();
    let students: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(students[0]["student"], "Иванов Иван Иванович");
    assert_eq!(students[0]["missed_total"], 12);

    let req = test::TestRequest::get().uri("/api/statement").to_request();
    let statement: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(statement[0]["totalMissed"], 12);

    let req = test::TestRequest::get().uri("/api/admin/refresh-status").to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["in_progress"], false);
    assert!(status["last_refresh"].is_string());
}
