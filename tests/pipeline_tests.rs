use attendance_dash::excel::*;
use attendance_dash::models::{flatten, FlatRecord};
use chrono::NaiveDate;

fn sheet(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect()
}

fn log_sheet() -> Vec<Vec<String>> {
    sheet(&[
        &["Сводная ведомость по посещаемости"],
        &["Параметры:", "период 01.09.2024 - 30.09.2024"],
        &["Отделение Экономики"],
        &["231"],
        &["Иванов Иван Иванович"],
        &["01.09.2024", "", "", "", "", "5"],
        &["02.09.2024", "", "", "", "", "2"],
        &["Петров Петр Петрович"],
        &["03.09.2024", "", "", "", "", "4"],
        &["Отделение Права"],
        &["1ИС"],
        &["Сидоров Сидор Сидорович"],
        &["45545", "", "", "", "", "3"],
        &["Итого", "", "", "", "", "14"],
    ])
}

#[test]
fn single_event_lands_under_its_lineage() {
    let rows = sheet(&[
        &["Отделение Экономики"],
        &["231"],
        &["Иванов Иван Иванович"],
        &["01.09.2024", "", "", "", "", "5"],
    ]);
    let docs = convert_attendance(&rows);
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].department, "Отделение Экономики");
    assert_eq!(docs[0].groups[0].group, "231");
    let student = &docs[0].groups[0].students[0];
    assert_eq!(student.student, "Иванов Иван Иванович");
    assert_eq!(student.attendance.len(), 1);
    assert_eq!(student.attendance[0].date, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
    assert_eq!(student.attendance[0].missed, 5);
}

#[test]
fn boilerplate_is_ignored_and_groups_lowercased() {
    let docs = convert_attendance(&log_sheet());
    assert_eq!(docs.len(), 2);
    let petrov = &docs[0].groups[0].students[1];
    assert_eq!(petrov.attendance.len(), 1);
    assert_eq!(petrov.attendance[0].missed, 4);
    // serial 45545 = 2024-09-10; los grupos van en minúsculas
    assert_eq!(docs[1].groups[0].group, "1ис");
    assert_eq!(docs[1].groups[0].students[0].attendance[0].date, NaiveDate::from_ymd_opt(2024, 9, 10).unwrap());
}

#[test]
fn flatten_counts_every_event_once() {
    let mut flat = flatten(&convert_attendance(&log_sheet()));
    flat.sort();
    assert_eq!(flat.len(), 4);
    let total: i64 = flat.iter().map(|r| r.missed).sum();
    assert_eq!(total, 14);
    assert!(flat.contains(&FlatRecord {
        department: "Отделение Права".into(),
        group: "1ис".into(),
        student: "Сидоров Сидор Сидорович".into(),
        date: "2024-09-10".into(),
        missed: 3,
    }));
}

#[test]
fn conversion_is_deterministic() {
    let rows = log_sheet();
    assert_eq!(convert_attendance(&rows), convert_attendance(&rows));
    let mut a = flatten(&convert_attendance(&rows));
    let mut b = flatten(&convert_attendance(&rows));
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn memory_source_feeds_the_builder() {
    let src = MemorySource::from_strs(&[
        &["Отделение Экономики"],
        &["231"],
        &["Иванов Иван Иванович"],
        &["2024-09-05", "", "", "", "", "1.5"],
    ]);
    let rows = src.read_rows().unwrap();
    let docs = convert_attendance(&rows);
    assert_eq!(docs[0].groups[0].students[0].attendance[0].missed, 1);
}

#[test]
fn statement_header_total_plus_students() {
    // el total de cabecera se reemplaza y luego los estudiantes igual suman
    let rows = sheet(&[
        &["Отделение Экономики", "", "", "", "", "", "", "50"],
        &["38.02.01 Экономика и бухгалтерский учет"],
        &["231"],
        &["Иванов Иван Иванович", "", "", "0", "0", "", "", "10"],
        &["Петров Петр Петрович", "", "", "0", "0", "", "", "20"],
    ]);
    let docs = convert_statement(&rows);
    assert_eq!(docs[0].total_missed, 80);
    assert_eq!(docs[0].specialties[0].total_missed, 30);
    assert_eq!(docs[0].specialties[0].groups[0].total_missed, 30);
}

#[test]
fn statement_header_after_children_wins() {
    let rows = sheet(&[
        &["Отделение Экономики"],
        &["38.02.01 Экономика и бухгалтерский учет"],
        &["231"],
        &["Иванов Иван Иванович", "", "", "0", "0", "", "", "10"],
        &["Отделение Экономики", "", "", "", "", "", "", "7"],
    ]);
    let docs = convert_statement(&rows);
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].total_missed, 7);
}

#[test]
fn statement_repeated_student_adds_counts() {
    let rows = sheet(&[
        &["Отделение Права"],
        &["40.02.01 Право и организация социального обеспечения"],
        &["1ИС"],
        &["Иванов Иван Иванович", "", "", "1", "1", "", "", "2"],
        &["Иванов Иван Иванович", "", "", "1", "2", "", "", "3"],
    ]);
    let docs = convert_statement(&rows);
    let students = &docs[0].specialties[0].groups[0].students;
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].missed_total, 5);
    assert_eq!(students[0].missed_bad, 2);
    assert_eq!(students[0].missed_excused, 3);
}

#[test]
fn statement_documents_serialize_camel_case() {
    let rows = sheet(&[
        &["Отделение Права"],
        &["40.02.01 Право и организация социального обеспечения"],
        &["1ИС"],
        &["Иванов Иван Иванович", "", "", "1", "1", "", "", "2"],
    ]);
    let json = serde_json::to_value(convert_statement(&rows)).unwrap();
    assert_eq!(json[0]["totalMissed"], 2);
    assert_eq!(json[0]["specialties"][0]["groups"][0]["students"][0]["missedExcused"], 1);
}

#[test]
fn strict_group_rule_keeps_student_across_zero_hour_dates() {
    // las filas con fecha y cero horas pasan a las pruebas de etiqueta y no deben parecer grupos
    let rows = sheet(&[
        &["Отделение Экономики"],
        &["231"],
        &["Иванов Иван Иванович"],
        &["01.09.2024", "", "", "", "", "0"],
        &["02.09.2024", "", "", "", "", "4"],
        &["2024-09-03", "", "", "", "", ""],
        &["2024-09-04", "", "", "", "", "3"],
    ]);
    let tree = build_tree(AttendanceLogLayout::new(GroupRule::Strict), &rows);
    assert_eq!(tree.event_count(), 2);
    let docs = tree.into_documents();
    assert_eq!(docs[0].groups.len(), 1);
    assert_eq!(docs[0].groups[0].group, "231");
    let missed: Vec<i64> = docs[0].groups[0].students[0].attendance.iter().map(|e| e.missed).collect();
    assert_eq!(missed, vec![4, 3]);
}
