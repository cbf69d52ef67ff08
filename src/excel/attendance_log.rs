//! Lectura del registro de asistencia (una fila por evento de horas faltadas).
//!
//! Las filas estructurales (departamento, grupo, estudiante) solo mueven el
//! contexto; los nodos se crean cuando llega el primer evento bajo ellos, así
//! el árbol publicado nunca tiene grupos vacíos.

use log::debug;

use crate::excel::builder::{build_tree, ParseContext, SheetLayout};
use crate::excel::classify::{ClassifiedRow, GroupRule, RowClassifier, RowKind};
use crate::models::{AttendanceEvent, AttendanceTree, DepartmentDoc};

#[derive(Debug, Default)]
pub struct AttendanceLogLayout {
    group_rule: GroupRule,
    tree: AttendanceTree,
    dropped: usize,
}

impl AttendanceLogLayout {
    pub fn new(group_rule: GroupRule) -> Self {
        AttendanceLogLayout { group_rule, ..Default::default() }
    }
}

impl SheetLayout for AttendanceLogLayout {
    type Output = AttendanceTree;

    fn classifier(&self) -> RowClassifier {
        RowClassifier::attendance_log().with_group_rule(self.group_rule)
    }

    fn upsert(&mut self, ctx: &ParseContext, row: &ClassifiedRow) {
        let RowKind::Attendance { date, missed } = row.kind else {
            return;
        };
        match (&ctx.department, &ctx.group, &ctx.student) {
            (Some(dept), Some(group), Some(student)) => {
                self.tree.record(dept, group, student, AttendanceEvent { date, missed });
            }
            _ => {
                self.dropped += 1;
                debug!("attendance row {} outside department/group/student context, dropped", date);
            }
        }
    }

    fn finish(self) -> AttendanceTree {
        if self.dropped > 0 {
            debug!("attendance log: {} data rows dropped for missing context", self.dropped);
        }
        self.tree
    }
}

/// Construye el árbol de asistencia desde las filas de la hoja.
pub fn build_attendance(rows: &[Vec<String>]) -> AttendanceTree {
    build_tree(AttendanceLogLayout::new(GroupRule::Loose), rows)
}

/// Construye y convierte directo a los documentos publicados.
pub fn convert_attendance(rows: &[Vec<String>]) -> Vec<DepartmentDoc> {
    build_attendance(rows).into_documents()
}
