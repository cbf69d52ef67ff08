//! Lectura de la ведомость: totales ya agregados por departamento → especialidad
//! → grupo → estudiante.
//!
//! Las filas de cabecera (departamento, especialidad, grupo) insertan su nodo y,
//! si traen un total positivo, reemplazan el total del nodo. Las filas de
//! estudiante suman su total hacia arriba, se haya reemplazado antes o no.

use log::debug;

use crate::excel::builder::{build_tree, ParseContext, SheetLayout};
use crate::excel::classify::{ClassifiedRow, GroupRule, RowClassifier, RowKind};
use crate::models::{
    SpecialtyNode, StatementTree, StudentTotals, SummaryDepartmentDoc, SummaryGroupNode,
    SummaryStudentNode,
};

#[derive(Debug, Default)]
pub struct StatementLayout {
    group_rule: GroupRule,
    tree: StatementTree,
}

impl StatementLayout {
    pub fn new(group_rule: GroupRule) -> Self {
        StatementLayout { group_rule, ..Default::default() }
    }

    fn upsert_student(&mut self, ctx: &ParseContext, name: &str, row: &ClassifiedRow) {
        let (Some(dept_name), Some(specialty_name), Some(group_name)) = (&ctx.department, &ctx.specialty, &ctx.group)
        else {
            debug!("statement row '{}' outside department/specialty/group context, dropped", name);
            return;
        };
        if row.counts.is_empty() {
            return;
        }
        let total = row.counts.total;

        let dept = self.tree.department_mut(dept_name);
        note_overridden_total(dept.total.is_overridden(), &dept.name);
        dept.total.accumulate(total);

        let specialty = dept.specialties.get_or_insert_with(specialty_name, || SpecialtyNode::new(specialty_name));
        note_overridden_total(specialty.total.is_overridden(), &specialty.name);
        specialty.total.accumulate(total);

        let group = specialty.groups.get_or_insert_with(group_name, || SummaryGroupNode::new(group_name));
        note_overridden_total(group.total.is_overridden(), &group.name);
        group.total.accumulate(total);

        let student = group.students.get_or_insert_with(name, || SummaryStudentNode {
            name: name.to_string(),
            totals: StudentTotals::default(),
        });
        student.totals.missed_total += total;
        student.totals.missed_bad += row.counts.bad;
        student.totals.missed_excused += row.counts.excused;
    }
}

fn note_overridden_total(overridden: bool, node: &str) {
    if overridden {
        debug!("'{}' has a header total; student rows are still added on top of it", node);
    }
}

impl SheetLayout for StatementLayout {
    type Output = StatementTree;

    fn classifier(&self) -> RowClassifier {
        RowClassifier::statement().with_group_rule(self.group_rule)
    }

    fn upsert(&mut self, ctx: &ParseContext, row: &ClassifiedRow) {
        let total = row.counts.total;
        match &row.kind {
            RowKind::Department(name) => {
                let dept = self.tree.department_mut(name);
                if total > 0 {
                    dept.total.override_with(total);
                }
            }
            RowKind::Specialty(name) => {
                let Some(dept_name) = &ctx.department else {
                    debug!("specialty '{}' before any department, ignored", name);
                    return;
                };
                let specialty = self
                    .tree
                    .department_mut(dept_name)
                    .specialties
                    .get_or_insert_with(name, || SpecialtyNode::new(name));
                if total > 0 {
                    specialty.total.override_with(total);
                }
            }
            RowKind::Group(name) => {
                let (Some(dept_name), Some(specialty_name)) = (&ctx.department, &ctx.specialty) else {
                    debug!("group '{}' outside department/specialty context, ignored", name);
                    return;
                };
                let group = self
                    .tree
                    .department_mut(dept_name)
                    .specialties
                    .get_or_insert_with(specialty_name, || SpecialtyNode::new(specialty_name))
                    .groups
                    .get_or_insert_with(name, || SummaryGroupNode::new(name));
                if total > 0 {
                    group.total.override_with(total);
                }
            }
            RowKind::Student(name) => self.upsert_student(ctx, name, row),
            RowKind::Attendance { .. } | RowKind::Header | RowKind::Unknown => {}
        }
    }

    fn finish(self) -> StatementTree {
        self.tree
    }
}

/// Construye el árbol de la ведомость desde las filas de la hoja.
pub fn build_statement(rows: &[Vec<String>]) -> StatementTree {
    build_tree(StatementLayout::new(GroupRule::Loose), rows)
}

pub fn convert_statement(rows: &[Vec<String>]) -> Vec<SummaryDepartmentDoc> {
    build_statement(rows).into_documents()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect()
    }

    #[test]
    fn totals_accumulate_without_headers() {
        let sheet = rows(&[
            &["Сводная ведомость по посещаемости"],
            &["Отделение Информатики"],
            &["09.02.07 Информационные системы"],
            &["1ИС"],
            &["Иванов Иван Иванович", "", "", "2", "6", "", "", "8"],
            &["Петров Петр Петрович", "", "", "", "4"],
            &["Итого", "", "", "", "", "", "", "12"],
        ]);
        let docs = convert_statement(&sheet);
        assert_eq!(docs.len(), 1);
        let dept = &docs[0];
        assert_eq!(dept.total_missed, 12);
        let specialty = &dept.specialties[0];
        assert_eq!(specialty.total_missed, 12);
        let group = &specialty.groups[0];
        assert_eq!(group.group, "1ис");
        assert_eq!(group.total_missed, 12);
        assert_eq!(group.students.len(), 2);
        assert_eq!(group.students[0].missed_bad, 2);
        assert_eq!(group.students[1].missed_total, 4);
    }

    #[test]
    fn student_without_specialty_is_dropped() {
        let sheet = rows(&[
            &["Отделение Информатики"],
            &["1ИС"],
            &["Иванов Иван Иванович", "", "", "", "6"],
        ]);
        let docs = convert_statement(&sheet);
        assert_eq!(docs[0].total_missed, 0);
        assert!(docs[0].specialties.is_empty());
    }

    #[test]
    fn zero_count_students_are_skipped() {
        let sheet = rows(&[
            &["Отделение Информатики"],
            &["09.02.07 Информационные системы"],
            &["1ИС"],
            &["Иванов Иван Иванович", "", "", "", "", "", "", ""],
        ]);
        let docs = convert_statement(&sheet);
        assert!(docs[0].specialties[0].groups[0].students.is_empty());
    }
}
